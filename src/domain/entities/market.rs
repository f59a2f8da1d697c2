use crate::domain::values::option_type::OptionType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily close from the price history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
}

/// One row of an options chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionQuote {
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub last_price: f64,
    pub bid: f64,
    pub ask: f64,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
}

impl OptionQuote {
    pub fn new(strike: f64, last_price: f64) -> Self {
        Self {
            strike,
            last_price,
            ..Default::default()
        }
    }
}

/// Calls and puts for a single expiration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub calls: Vec<OptionQuote>,
    pub puts: Vec<OptionQuote>,
}

impl OptionChain {
    pub fn side(&self, option_type: OptionType) -> &[OptionQuote] {
        match option_type {
            OptionType::Call => &self.calls,
            OptionType::Put => &self.puts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }
}

/// Quote metadata for the underlying.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub short_name: Option<String>,
    pub regular_market_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_high: Option<f64>,
    pub day_low: Option<f64>,
    pub volume: Option<u64>,
}

/// Everything fetched for one advisory run.
#[derive(Debug, Clone, Serialize)]
pub struct MarketData {
    pub symbol: String,
    pub history: Vec<PriceBar>,
    pub chains: BTreeMap<NaiveDate, OptionChain>,
    pub quote: Quote,
}

impl MarketData {
    pub fn closes(&self) -> Vec<f64> {
        self.history.iter().map(|b| b.close).collect()
    }

    /// Live quote price, falling back to the most recent close.
    pub fn current_price(&self) -> Option<f64> {
        self.quote
            .regular_market_price
            .or_else(|| self.history.last().map(|b| b.close))
    }
}
