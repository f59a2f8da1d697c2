use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Whether an option position was opened by buying or by writing the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => write!(f, "buy"),
            TradeAction::Sell => write!(f, "sell"),
        }
    }
}

impl FromStr for TradeAction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buy" | "long" => Ok(TradeAction::Buy),
            "sell" | "short" | "write" => Ok(TradeAction::Sell),
            _ => Err(format!("Unknown trade action: {s}")),
        }
    }
}
