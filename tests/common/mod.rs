//! Shared test helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wheelhouse::config::AdvisorConfig;
use wheelhouse::domain::entities::market::{OptionChain, OptionQuote, PriceBar, Quote};
use wheelhouse::domain::error::DomainError;
use wheelhouse::domain::ports::market_data::MarketDataSource;
use wheelhouse::domain::ports::notifier::AlertNotifier;
use wheelhouse::infrastructure::json::ledger_store::JsonLedgerStore;
use wheelhouse::Wheelhouse;

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

/// Fixed "today" for every scenario.
pub fn today() -> NaiveDate {
    d(2026, 1, 5)
}

/// Two and three weeks out: inside the default 2-4 week window.
pub fn near_expirations() -> (NaiveDate, NaiveDate) {
    (today() + Duration::days(14), today() + Duration::days(21))
}

/// Ten weeks out: outside the window.
pub fn far_expiration() -> NaiveDate {
    today() + Duration::days(70)
}

pub fn quote(strike: f64, last: f64) -> OptionQuote {
    OptionQuote::new(strike, last)
}

/// Chains around a $200 underlying.
pub fn sample_chains() -> BTreeMap<NaiveDate, OptionChain> {
    let (first, second) = near_expirations();
    BTreeMap::from([
        (
            first,
            OptionChain {
                calls: vec![quote(200.0, 10.0), quote(210.0, 8.0), quote(220.0, 6.0), quote(230.0, 4.0)],
                puts: vec![quote(170.0, 2.0), quote(180.0, 3.0), quote(190.0, 4.0), quote(200.0, 5.0)],
            },
        ),
        (
            second,
            OptionChain {
                calls: vec![quote(200.0, 12.0), quote(210.0, 10.0), quote(220.0, 8.0)],
                puts: vec![quote(180.0, 3.0), quote(190.0, 4.0), quote(200.0, 5.0)],
            },
        ),
        (
            far_expiration(),
            OptionChain {
                calls: vec![quote(210.0, 20.0)],
                puts: vec![quote(190.0, 15.0)],
            },
        ),
    ])
}

/// Steady uptrend ending at 200: price above MA50 and RSI at 100.
pub fn rising_closes() -> Vec<f64> {
    (0..100).map(|i| 150.5 + i as f64 * 0.5).collect()
}

/// Steady downtrend ending at 200: RSI at 0.
pub fn falling_closes() -> Vec<f64> {
    (0..100).map(|i| 249.5 - i as f64 * 0.5).collect()
}

/// Alternating moves: RSI 50, price at the average.
pub fn flat_closes() -> Vec<f64> {
    (0..100).map(|i| if i % 2 == 0 { 200.0 } else { 201.0 }).collect()
}

/// In-memory market data source.
pub struct FakeMarketData {
    pub price: Option<f64>,
    pub closes: Vec<f64>,
    pub chains: BTreeMap<NaiveDate, OptionChain>,
    pub failing: Vec<NaiveDate>,
}

impl FakeMarketData {
    pub fn new(price: f64, closes: Vec<f64>) -> Self {
        Self {
            price: Some(price),
            closes,
            chains: sample_chains(),
            failing: Vec::new(),
        }
    }
}

#[async_trait]
impl MarketDataSource for FakeMarketData {
    fn name(&self) -> &str {
        "fake"
    }

    async fn history(&self, _symbol: &str, _range: &str) -> Result<Vec<PriceBar>, DomainError> {
        let start = today() - Duration::days(self.closes.len() as i64);
        Ok(self
            .closes
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar {
                date: start + Duration::days(i as i64),
                close: *c,
            })
            .collect())
    }

    async fn quote(&self, symbol: &str) -> Result<Quote, DomainError> {
        Ok(Quote {
            symbol: symbol.to_string(),
            regular_market_price: self.price,
            ..Default::default()
        })
    }

    async fn expirations(&self, _symbol: &str) -> Result<Vec<NaiveDate>, DomainError> {
        Ok(self.chains.keys().copied().collect())
    }

    async fn option_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<OptionChain, DomainError> {
        if self.failing.contains(&expiration) {
            return Err(DomainError::MarketData(format!("chain unavailable for {symbol} {expiration}")));
        }
        self.chains
            .get(&expiration)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("{symbol} {expiration}")))
    }
}

/// Captures sent alerts instead of mailing them.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl AlertNotifier for RecordingNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// A wheelhouse over `market` and a fresh ledger in a temp directory.
pub fn setup(config: AdvisorConfig, market: FakeMarketData) -> (tempfile::TempDir, Wheelhouse) {
    let dir = tempfile::tempdir().unwrap();
    let ledger = JsonLedgerStore::open(dir.path().join("data").join("portfolio.json")).unwrap();
    let wh = Wheelhouse::with_providers(config, Arc::new(market), Arc::new(ledger));
    (dir, wh)
}
