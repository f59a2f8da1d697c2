//! Strategy port for option trade recommendations.
//!
//! A [`Strategy`] is a pure rule set: given the market snapshot and portfolio
//! state in a [`StrategyContext`], it returns zero or more [`Recommendation`]s.
//! Rule sets never fetch data or touch the ledger.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AdvisorConfig;
use crate::domain::entities::market::OptionChain;
use crate::domain::error::DomainError;

/// Which rule set produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StrategyKind {
    #[serde(rename = "Covered Calls")]
    CoveredCalls,
    #[serde(rename = "Wheel Strategy")]
    Wheel,
    #[serde(rename = "Speculative")]
    Speculative,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::CoveredCalls => write!(f, "Covered Calls"),
            StrategyKind::Wheel => write!(f, "Wheel Strategy"),
            StrategyKind::Speculative => write!(f, "Speculative"),
        }
    }
}

/// The trade a recommendation suggests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecommendationAction {
    #[serde(rename = "Sell Covered Call")]
    SellCoveredCall,
    #[serde(rename = "Sell Cash-Secured Put")]
    SellCashSecuredPut,
    #[serde(rename = "After Assignment: Sell Covered Call")]
    SellCoveredCallAfterAssignment,
    #[serde(rename = "Buy Call")]
    BuyCall,
    #[serde(rename = "Buy Put")]
    BuyPut,
}

impl fmt::Display for RecommendationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecommendationAction::SellCoveredCall => "Sell Covered Call",
            RecommendationAction::SellCashSecuredPut => "Sell Cash-Secured Put",
            RecommendationAction::SellCoveredCallAfterAssignment => "After Assignment: Sell Covered Call",
            RecommendationAction::BuyCall => "Buy Call",
            RecommendationAction::BuyPut => "Buy Put",
        };
        f.write_str(s)
    }
}

/// One suggested trade.
///
/// Money fields are rounded to cents when the record is built; optional
/// fields are only set by the rule sets that compute them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub strategy: StrategyKind,
    pub action: RecommendationAction,
    pub expiration: NaiveDate,
    pub strike: f64,
    /// Per-share premium.
    pub premium: f64,
    pub qty: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_premium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annualized_yield_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_cash: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_even_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_wheel_income: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_wheel_yield_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proj_profit: Option<f64>,
    pub rationale: String,
}

impl Recommendation {
    pub fn new(
        strategy: StrategyKind,
        action: RecommendationAction,
        expiration: NaiveDate,
        strike: f64,
        premium: f64,
        qty: u32,
        rationale: String,
    ) -> Self {
        Self {
            strategy,
            action,
            expiration,
            strike,
            premium: round_cents(premium),
            qty,
            total_premium: None,
            annualized_yield_pct: None,
            required_cash: None,
            break_even_price: None,
            total_wheel_income: None,
            total_wheel_yield_pct: None,
            proj_profit: None,
            rationale,
        }
    }
}

/// Round to two decimals.
pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Inputs shared by every rule set for one advisory run.
pub struct StrategyContext<'a> {
    pub price: f64,
    pub rsi: f64,
    pub ma50: f64,
    /// Chains for the expirations inside the configured window.
    pub chains: &'a BTreeMap<NaiveDate, OptionChain>,
    pub shares: u32,
    pub cash: f64,
    pub portfolio_value: f64,
    pub today: NaiveDate,
    pub config: &'a AdvisorConfig,
}

pub trait Strategy: Send + Sync {
    /// Unique name for this rule set.
    fn name(&self) -> &'static str;

    /// Whether the configuration turns this rule set on.
    fn enabled(&self, config: &AdvisorConfig) -> bool;

    fn recommend(&self, ctx: &StrategyContext<'_>) -> Result<Vec<Recommendation>, DomainError>;
}
