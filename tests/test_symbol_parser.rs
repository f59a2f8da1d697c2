//! Option symbol decoding through the public API.

mod common;

use common::d;
use wheelhouse::domain::values::option_symbol::{OptionSymbol, SymbolFormat};
use wheelhouse::domain::values::option_type::OptionType;

#[test]
fn test_occ_call() {
    let s = OptionSymbol::parse("TSLA260227C00455000").unwrap();
    assert_eq!(s.root, "TSLA");
    assert_eq!(s.expiration, d(2026, 2, 27));
    assert_eq!(s.option_type, OptionType::Call);
    assert_eq!(s.strike, 455.0);
    assert_eq!(s.format, SymbolFormat::Occ);
}

#[test]
fn test_occ_put() {
    let s = OptionSymbol::parse("TSLA260227P00400000").unwrap();
    assert_eq!(s.option_type, OptionType::Put);
    assert_eq!(s.strike, 400.0);
    assert_eq!(s.expiration, d(2026, 2, 27));
}

#[test]
fn test_occ_fractional_strike() {
    let s = OptionSymbol::parse("SPY260320C00512500").unwrap();
    assert_eq!(s.root, "SPY");
    assert_eq!(s.strike, 512.5);
}

#[test]
fn test_merrill_call() {
    let s = OptionSymbol::parse("TSLA#A3026C475000").unwrap();
    assert_eq!(s.root, "TSLA");
    assert_eq!(s.expiration, d(2026, 1, 30));
    assert_eq!(s.option_type, OptionType::Call);
    assert_eq!(s.strike, 475.0);
    assert_eq!(s.format, SymbolFormat::Merrill);
}

#[test]
fn test_merrill_put() {
    let s = OptionSymbol::parse("TSLA#A3026P450000").unwrap();
    assert_eq!(s.option_type, OptionType::Put);
    assert_eq!(s.strike, 450.0);
    assert_eq!(s.expiration, d(2026, 1, 30));
}

#[test]
fn test_merrill_year_letter_offset() {
    let s = OptionSymbol::parse("TSLA#B3026C475000").unwrap();
    assert_eq!(s.expiration, d(2027, 1, 30));
}

#[test]
fn test_invalid_inputs() {
    assert!(OptionSymbol::parse("INVALID_FORMAT").is_none());
    assert!(OptionSymbol::parse("").is_none());
    assert!(OptionSymbol::parse("   ").is_none());
    assert!(OptionSymbol::parse("TSLA261340C00455000").is_none());
    assert!(OptionSymbol::parse("TSLA260227X00455000").is_none());
    assert!(OptionSymbol::parse("TSLA#").is_none());
    assert!("garbage".parse::<OptionSymbol>().is_err());
}

#[test]
fn test_case_insensitive() {
    assert_eq!(
        OptionSymbol::parse("tsla#a3026c475000"),
        OptionSymbol::parse("TSLA#A3026C475000")
    );
    assert_eq!(
        OptionSymbol::parse("tsla260227c00455000"),
        OptionSymbol::parse("TSLA260227C00455000")
    );
}

#[test]
fn test_merrill_converts_to_occ() {
    let s: OptionSymbol = "TSLA#A3026C475000".parse().unwrap();
    assert_eq!(s.to_occ(), "TSLA260130C00475000");
    assert_eq!(OptionSymbol::parse(&s.to_occ()).unwrap().expiration, s.expiration);
}
