//! Advisor settings.
//!
//! Hardcoded defaults, overridden key-by-key from a JSON file. The file uses
//! upper-case keys (`SHARES`, `CASH_AVAILABLE`, `WHEEL_PUT_OTM_PCT`, ...);
//! anything it leaves out keeps its default.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::domain::error::DomainError;

pub const CONFIG_PATH_ENV: &str = "WHEELHOUSE_CONFIG";
pub const LEDGER_PATH_ENV: &str = "WHEELHOUSE_LEDGER";
const DEFAULT_CONFIG_PATH: &str = "./data/config.json";
const DEFAULT_LEDGER_PATH: &str = "./data/portfolio.json";

/// EPS year used as the base of price projections.
const BASE_EPS_YEAR: &str = "2025";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct AdvisorConfig {
    pub symbol: String,
    #[serde(alias = "TSLA_SHARES")]
    pub shares: u32,
    pub cash_available: f64,
    /// Max fraction of portfolio value at risk per speculative trade.
    pub risk_tolerance: f64,
    pub eps_projections: BTreeMap<String, f64>,
    /// RSI above this favors buying calls.
    pub bullish_threshold: f64,
    /// RSI below this favors buying puts.
    pub dip_threshold: f64,
    pub options_min_weeks: f64,
    pub options_max_weeks: f64,
    pub enable_covered_calls: bool,
    pub enable_wheel_strategy: bool,
    pub enable_speculative: bool,
    pub covered_call_otm_pct: Vec<f64>,
    pub wheel_put_otm_pct: Vec<f64>,
    /// Collateral multiple of strike × 100 required per cash-secured put.
    pub wheel_min_cash_ratio: f64,
    pub monitor: MonitorSettings,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            symbol: "TSLA".into(),
            shares: 525,
            cash_available: 0.0,
            risk_tolerance: 0.05,
            eps_projections: BTreeMap::from([
                ("2025".to_string(), 1.64),
                ("2026".to_string(), 2.17),
                ("2030".to_string(), 11.24),
            ]),
            bullish_threshold: 50.0,
            dip_threshold: 30.0,
            options_min_weeks: 2.0,
            options_max_weeks: 4.0,
            enable_covered_calls: true,
            enable_wheel_strategy: true,
            enable_speculative: true,
            covered_call_otm_pct: vec![0.05, 0.075, 0.10],
            wheel_put_otm_pct: vec![0.05, 0.075, 0.10],
            wheel_min_cash_ratio: 1.1,
            monitor: MonitorSettings::default(),
        }
    }
}

/// The single short call watched by the monitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct MonitorSettings {
    pub symbol: String,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub contracts: u32,
    /// Average fill per share when the calls were written.
    pub original_credit_per_share: f64,
    pub price_threshold: f64,
    pub dte_threshold: i64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            symbol: "TSLA".into(),
            strike: 475.0,
            expiration: NaiveDate::from_ymd_opt(2026, 1, 30).unwrap_or(NaiveDate::MIN),
            contracts: 2,
            original_credit_per_share: 3.15,
            price_threshold: 460.0,
            dte_threshold: 7,
        }
    }
}

impl AdvisorConfig {
    /// Parse an override document. Fails on non-object JSON or mistyped values.
    pub fn from_json_str(s: &str) -> Result<Self, DomainError> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| DomainError::Parse(format!("config: {e}")))?;
        if !value.is_object() {
            return Err(DomainError::Parse("config: top level must be an object".into()));
        }
        let config: AdvisorConfig =
            serde_json::from_value(value).map_err(|e| DomainError::Parse(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from `path`. A missing file means defaults; a broken one
    /// is reported and ignored.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                return Self::default();
            }
        };
        match Self::from_json_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from `$WHEELHOUSE_CONFIG`, or `./data/config.json`.
    pub fn load_default() -> Self {
        Self::load(&config_path())
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.symbol.trim().is_empty() {
            return Err(DomainError::InvalidInput("SYMBOL must not be empty".into()));
        }
        if !(0.0..=1.0).contains(&self.risk_tolerance) {
            return Err(DomainError::InvalidInput(format!(
                "RISK_TOLERANCE must be between 0 and 1, got {}",
                self.risk_tolerance
            )));
        }
        if self.options_min_weeks > self.options_max_weeks {
            return Err(DomainError::InvalidInput(format!(
                "OPTIONS_MIN_WEEKS ({}) exceeds OPTIONS_MAX_WEEKS ({})",
                self.options_min_weeks, self.options_max_weeks
            )));
        }
        let offsets = self.covered_call_otm_pct.iter().chain(&self.wheel_put_otm_pct);
        if let Some(bad) = offsets.into_iter().find(|p| !(0.0..1.0).contains(*p)) {
            return Err(DomainError::InvalidInput(format!(
                "OTM offsets must be in [0, 1), got {bad}"
            )));
        }
        if self.wheel_min_cash_ratio <= 0.0 {
            return Err(DomainError::InvalidInput("WHEEL_MIN_CASH_RATIO must be positive".into()));
        }
        Ok(())
    }

    /// EPS for the projection base year, else the earliest year listed, else 0.
    pub fn base_eps(&self) -> f64 {
        self.eps_projections
            .get(BASE_EPS_YEAR)
            .or_else(|| self.eps_projections.values().next())
            .copied()
            .unwrap_or(0.0)
    }

    /// Furthest projection year and its EPS, for rationale text.
    pub fn long_term_eps(&self) -> Option<(i32, f64)> {
        self.eps_projections
            .iter()
            .filter_map(|(y, eps)| y.parse::<i32>().ok().map(|y| (y, *eps)))
            .max_by_key(|(y, _)| *y)
    }
}

pub fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn ledger_path() -> PathBuf {
    std::env::var(LEDGER_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LEDGER_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = AdvisorConfig::default();
        assert_eq!(c.shares, 525);
        assert_eq!(c.base_eps(), 1.64);
        assert_eq!(c.long_term_eps(), Some((2030, 11.24)));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let c = AdvisorConfig::from_json_str(r#"{"CASH_AVAILABLE": 50000, "DIP_THRESHOLD": 25}"#).unwrap();
        assert_eq!(c.cash_available, 50_000.0);
        assert_eq!(c.dip_threshold, 25.0);
        assert_eq!(c.shares, 525);
        assert_eq!(c.wheel_put_otm_pct, vec![0.05, 0.075, 0.10]);
    }

    #[test]
    fn test_legacy_share_key() {
        let c = AdvisorConfig::from_json_str(r#"{"TSLA_SHARES": 300}"#).unwrap();
        assert_eq!(c.shares, 300);
    }

    #[test]
    fn test_nested_monitor_override() {
        let c = AdvisorConfig::from_json_str(
            r#"{"MONITOR": {"STRIKE": 500, "EXPIRATION": "2026-03-20"}}"#,
        )
        .unwrap();
        assert_eq!(c.monitor.strike, 500.0);
        assert_eq!(c.monitor.expiration, NaiveDate::from_ymd_opt(2026, 3, 20).unwrap());
        assert_eq!(c.monitor.contracts, 2);
    }

    #[test]
    fn test_rejects_non_object_and_bad_types() {
        assert!(AdvisorConfig::from_json_str("[1, 2]").is_err());
        assert!(AdvisorConfig::from_json_str(r#"{"SHARES": "many"}"#).is_err());
        assert!(AdvisorConfig::from_json_str(r#"{"RISK_TOLERANCE": 3}"#).is_err());
        assert!(AdvisorConfig::from_json_str(
            r#"{"OPTIONS_MIN_WEEKS": 6, "OPTIONS_MAX_WEEKS": 4}"#
        )
        .is_err());
    }

    #[test]
    fn test_load_missing_and_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert_eq!(AdvisorConfig::load(&missing), AdvisorConfig::default());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert_eq!(AdvisorConfig::load(&broken), AdvisorConfig::default());

        let good = dir.path().join("config.json");
        std::fs::write(&good, r#"{"SHARES": 100}"#).unwrap();
        assert_eq!(AdvisorConfig::load(&good).shares, 100);
    }
}
