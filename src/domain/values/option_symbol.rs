//! Option contract symbol decoding.
//!
//! Two encodings are recognized:
//!
//! - **OCC**: `ROOT` + `YYMMDD` + `C|P` + 8-digit strike ×1000, e.g.
//!   `TSLA260227C00455000` (TSLA, 2026-02-27, $455 call). The root may be
//!   space-padded to six characters as in the OSI listing format.
//! - **Merrill**: `ROOT#` + year letter + 4-digit month/day + `C|P` + strike
//!   ×1000, e.g. `TSLA#A3026C475000` (TSLA, 2026-01-30, $475 call). The year
//!   letter is an offset from [`MERRILL_BASE_YEAR`] (`A` = 2026, `B` = 2027).
//!   The 4-digit field is read as `MMDD`; when that is not a calendar date it
//!   is read as `DD` plus a two-digit series tag, with the month fixed to
//!   January.
//!
//! Decoding is case-insensitive and never fails loudly: anything that does
//! not match one of the shapes exactly yields `None`.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::option_type::OptionType;

/// Year represented by the letter `A` in Merrill symbols.
pub const MERRILL_BASE_YEAR: i32 = 2026;

const OCC_TAIL_LEN: usize = 15;
const MAX_ROOT_LEN: usize = 6;
const MAX_STRIKE_DIGITS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolFormat {
    Occ,
    Merrill,
}

impl fmt::Display for SymbolFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolFormat::Occ => write!(f, "occ"),
            SymbolFormat::Merrill => write!(f, "merrill"),
        }
    }
}

/// A decoded option contract identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionSymbol {
    pub root: String,
    pub expiration: NaiveDate,
    pub option_type: OptionType,
    pub strike: f64,
    pub format: SymbolFormat,
}

impl OptionSymbol {
    /// Decode an OCC or Merrill symbol. Returns `None` for anything else.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_uppercase();
        if s.is_empty() {
            return None;
        }
        match s.split_once('#') {
            Some((root, rest)) => parse_merrill(root, rest),
            None => parse_occ(&s),
        }
    }

    /// Canonical OCC rendering (unpadded root).
    pub fn to_occ(&self) -> String {
        format!(
            "{}{:02}{:02}{:02}{}{:08}",
            self.root,
            self.expiration.year().rem_euclid(100),
            self.expiration.month(),
            self.expiration.day(),
            self.option_type.code(),
            (self.strike * 1000.0).round() as u64
        )
    }
}

impl FromStr for OptionSymbol {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionSymbol::parse(s).ok_or_else(|| format!("Unrecognized option symbol: {s}"))
    }
}

impl fmt::Display for OptionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ${:.2} {}",
            self.root,
            self.expiration.format("%Y-%m-%d"),
            self.strike,
            self.option_type
        )
    }
}

fn parse_occ(s: &str) -> Option<OptionSymbol> {
    if !s.is_ascii() || s.len() <= OCC_TAIL_LEN {
        return None;
    }
    let (root, tail) = s.split_at(s.len() - OCC_TAIL_LEN);
    let root = valid_root(root.trim_end())?;

    let (date, rest) = tail.split_at(6);
    let (code, strike) = rest.split_at(1);

    let digits = digits_only(date)?;
    let expiration = NaiveDate::from_ymd_opt(
        2000 + number(&digits[0..2]) as i32,
        number(&digits[2..4]),
        number(&digits[4..6]),
    )?;
    let option_type = OptionType::from_code(code.chars().next()?)?;
    let strike = scaled_strike(strike, MAX_STRIKE_DIGITS)?;

    Some(OptionSymbol {
        root,
        expiration,
        option_type,
        strike,
        format: SymbolFormat::Occ,
    })
}

fn parse_merrill(root: &str, rest: &str) -> Option<OptionSymbol> {
    let root = valid_root(root)?;
    if !rest.is_ascii() || rest.len() < 7 {
        return None;
    }

    let year_letter = rest.chars().next()?;
    if !year_letter.is_ascii_uppercase() {
        return None;
    }
    let year = MERRILL_BASE_YEAR + (year_letter as u8 - b'A') as i32;

    let month_day = digits_only(&rest[1..5])?;
    let expiration = merrill_date(year, month_day)?;
    let option_type = OptionType::from_code(rest[5..6].chars().next()?)?;
    let strike = scaled_strike(&rest[6..], MAX_STRIKE_DIGITS)?;

    Some(OptionSymbol {
        root,
        expiration,
        option_type,
        strike,
        format: SymbolFormat::Merrill,
    })
}

fn merrill_date(year: i32, field: &str) -> Option<NaiveDate> {
    let head = number(&field[0..2]);
    let tail = number(&field[2..4]);
    NaiveDate::from_ymd_opt(year, head, tail).or_else(|| NaiveDate::from_ymd_opt(year, 1, head))
}

fn valid_root(root: &str) -> Option<String> {
    let mut chars = root.chars();
    let first = chars.next()?;
    if root.len() > MAX_ROOT_LEN
        || !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(root.to_string())
}

fn digits_only(s: &str) -> Option<&str> {
    if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
        Some(s)
    } else {
        None
    }
}

fn scaled_strike(s: &str, max_digits: usize) -> Option<f64> {
    let digits = digits_only(s)?;
    if digits.len() > max_digits {
        return None;
    }
    let raw: u64 = digits.parse().ok()?;
    Some(raw as f64 / 1000.0)
}

/// Caller guarantees `s` is all ASCII digits.
fn number(s: &str) -> u32 {
    s.bytes().fold(0, |acc, b| acc * 10 + (b - b'0') as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_occ_padded_root() {
        let sym = OptionSymbol::parse("F     260116P00012500").unwrap();
        assert_eq!(sym.root, "F");
        assert_eq!(sym.expiration, date(2026, 1, 16));
        assert_eq!(sym.option_type, OptionType::Put);
        assert_eq!(sym.strike, 12.5);
    }

    #[test]
    fn test_occ_adjusted_root_with_digit() {
        let sym = OptionSymbol::parse("TSLA1260227C00455000").unwrap();
        assert_eq!(sym.root, "TSLA1");
        assert_eq!(sym.strike, 455.0);
    }

    #[test]
    fn test_occ_rejects_bad_calendar_date() {
        assert!(OptionSymbol::parse("TSLA261327C00455000").is_none());
        assert!(OptionSymbol::parse("TSLA260230C00455000").is_none());
    }

    #[test]
    fn test_occ_rejects_wrong_widths() {
        assert!(OptionSymbol::parse("TSLA260227C0045500").is_none());
        assert!(OptionSymbol::parse("260227C00455000").is_none());
        assert!(OptionSymbol::parse("TSLA260227X00455000").is_none());
        assert!(OptionSymbol::parse("TOOLONGROOT260227C00455000").is_none());
    }

    #[test]
    fn test_merrill_month_day_field() {
        let sym = OptionSymbol::parse("AAPL#A0320P190000").unwrap();
        assert_eq!(sym.expiration, date(2026, 3, 20));
        assert_eq!(sym.option_type, OptionType::Put);
        assert_eq!(sym.strike, 190.0);
        assert_eq!(sym.format, SymbolFormat::Merrill);
    }

    #[test]
    fn test_merrill_rejects_malformed() {
        assert!(OptionSymbol::parse("TSLA#13026C475000").is_none());
        assert!(OptionSymbol::parse("TSLA#A30X6C475000").is_none());
        assert!(OptionSymbol::parse("TSLA#A3026C").is_none());
        assert!(OptionSymbol::parse("TSLA#A3026C475000000").is_none());
        assert!(OptionSymbol::parse("#A3026C475000").is_none());
        assert!(OptionSymbol::parse("TSLA#A9926C475000").is_none());
    }

    #[test]
    fn test_to_occ_from_merrill() {
        let sym = OptionSymbol::parse("TSLA#A3026C475000").unwrap();
        assert_eq!(sym.to_occ(), "TSLA260130C00475000");
        let back = OptionSymbol::parse(&sym.to_occ()).unwrap();
        assert_eq!(back.expiration, sym.expiration);
        assert_eq!(back.format, SymbolFormat::Occ);
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert!(OptionSymbol::parse("  TSLA260227C00455000\n").is_some());
        assert!(OptionSymbol::parse("   ").is_none());
    }

    #[test]
    fn test_serialized_shape() {
        let sym = OptionSymbol::parse("TSLA260227C00455000").unwrap();
        let json = serde_json::to_value(&sym).unwrap();
        assert_eq!(json["expiration"], "2026-02-27");
        assert_eq!(json["option_type"], "call");
        assert_eq!(json["format"], "occ");
    }
}
