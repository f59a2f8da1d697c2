use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

impl OptionType {
    /// Decode the single-letter type code used in option symbols.
    pub fn from_code(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'C' => Some(OptionType::Call),
            'P' => Some(OptionType::Put),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            OptionType::Call => 'C',
            OptionType::Put => 'P',
        }
    }

    pub fn is_call(&self) -> bool {
        matches!(self, OptionType::Call)
    }

    /// Value of one share's worth of the contract at expiry.
    pub fn intrinsic(&self, strike: f64, underlying: f64) -> f64 {
        match self {
            OptionType::Call => (underlying - strike).max(0.0),
            OptionType::Put => (strike - underlying).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            _ => Err(format!("Unknown option type: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsic() {
        assert_eq!(OptionType::Call.intrinsic(100.0, 110.0), 10.0);
        assert_eq!(OptionType::Call.intrinsic(100.0, 90.0), 0.0);
        assert_eq!(OptionType::Put.intrinsic(100.0, 90.0), 10.0);
        assert_eq!(OptionType::Put.intrinsic(100.0, 110.0), 0.0);
    }

    #[test]
    fn test_parse_and_code() {
        assert_eq!("CALL".parse::<OptionType>(), Ok(OptionType::Call));
        assert_eq!("p".parse::<OptionType>(), Ok(OptionType::Put));
        assert!("straddle".parse::<OptionType>().is_err());
        assert_eq!(OptionType::from_code('c'), Some(OptionType::Call));
        assert_eq!(OptionType::from_code('X'), None);
        assert_eq!(OptionType::Put.code(), 'P');
    }
}
