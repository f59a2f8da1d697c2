//! Market data gathering and the indicator header for an advisory run.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::entities::market::MarketData;
use crate::domain::error::DomainError;
use crate::domain::ports::market_data::MarketDataSource;
use crate::domain::values::indicators::{
    filter_by_weeks, latest, moving_average, rsi, DEFAULT_MA_WINDOW, DEFAULT_RSI_PERIOD,
};

/// Price history fetched for indicators; enough for a 50-day average.
pub const HISTORY_RANGE: &str = "1y";

/// Range fetched when the quote carries no price.
const FALLBACK_RANGE: &str = "5d";

/// Regular market price from the quote, else the latest close.
pub async fn current_price(source: &dyn MarketDataSource, symbol: &str) -> Result<f64, DomainError> {
    if let Some(p) = source.quote(symbol).await?.regular_market_price {
        return Ok(p);
    }
    source
        .history(symbol, FALLBACK_RANGE)
        .await?
        .last()
        .map(|b| b.close)
        .ok_or_else(|| DomainError::MarketData(format!("no price available for {symbol}")))
}

/// Fetch history, quote, and chains for `symbol`.
///
/// With a `(min_weeks, max_weeks)` window only expirations inside it are
/// fetched. A chain that fails to load is skipped.
pub async fn fetch_symbol_data(
    source: &dyn MarketDataSource,
    symbol: &str,
    window: Option<(f64, f64)>,
    today: NaiveDate,
) -> Result<MarketData, DomainError> {
    let history = source.history(symbol, HISTORY_RANGE).await?;
    let quote = source.quote(symbol).await?;

    let mut expirations = source.expirations(symbol).await?;
    if let Some((min_weeks, max_weeks)) = window {
        expirations = filter_by_weeks(expirations, min_weeks, max_weeks, today);
    }
    debug!(symbol, source = source.name(), count = expirations.len(), "fetching chains");

    let mut chains = BTreeMap::new();
    for expiration in expirations {
        match source.option_chain(symbol, expiration).await {
            Ok(chain) => {
                chains.insert(expiration, chain);
            }
            Err(e) => warn!(symbol, %expiration, error = %e, "skipping expiration"),
        }
    }

    Ok(MarketData {
        symbol: symbol.to_string(),
        history,
        chains,
        quote,
    })
}

/// Header printed before chains and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketConditions {
    pub symbol: String,
    pub price: f64,
    /// `None` until there are enough closes for the window.
    pub ma50: Option<f64>,
    pub rsi: Option<f64>,
    pub shares: u32,
    pub cash: f64,
    pub min_weeks: f64,
    pub max_weeks: f64,
    pub expirations: Vec<NaiveDate>,
}

impl MarketConditions {
    pub fn from_market(
        data: &MarketData,
        shares: u32,
        cash: f64,
        window: (f64, f64),
    ) -> Result<Self, DomainError> {
        let price = data
            .current_price()
            .ok_or_else(|| DomainError::MarketData(format!("no price available for {}", data.symbol)))?;
        let closes = data.closes();

        Ok(Self {
            symbol: data.symbol.clone(),
            price,
            ma50: latest(&moving_average(&closes, DEFAULT_MA_WINDOW)),
            rsi: latest(&rsi(&closes, DEFAULT_RSI_PERIOD)),
            shares,
            cash,
            min_weeks: window.0,
            max_weeks: window.1,
            expirations: data.chains.keys().copied().collect(),
        })
    }

    /// RSI for rule evaluation; neutral 50 without enough history.
    pub fn rsi_or_neutral(&self) -> f64 {
        self.rsi.unwrap_or(50.0)
    }

    /// MA50 for rule evaluation; the current price without enough history,
    /// which never reads as a trend.
    pub fn ma50_or_price(&self) -> f64 {
        self.ma50.unwrap_or(self.price)
    }
}
