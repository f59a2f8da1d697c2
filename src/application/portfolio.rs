//! In-memory portfolio: shares, cash, and option positions opened this
//! session, optionally mirrored to the ledger.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::AdvisorConfig;
use crate::domain::entities::snapshot::PortfolioSnapshot;
use crate::domain::error::DomainError;
use crate::domain::ports::ledger_repository::{LedgerRepository, NewOptionsPosition, NewTransaction};
use crate::domain::values::option_type::OptionType;
use crate::domain::values::sizing::contract_value;
use crate::domain::values::trade_action::TradeAction;
use crate::domain::values::transaction_kind::TransactionKind;

/// Fraction of the premium paid still credited as time value.
const TIME_VALUE_FACTOR: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeldOption {
    pub option_type: OptionType,
    pub action: TradeAction,
    pub strike: f64,
    pub premium: f64,
    pub qty: u32,
    /// Ledger id when the position was recorded.
    pub ledger_id: Option<u64>,
}

pub struct Portfolio {
    pub symbol: String,
    pub shares: u32,
    pub cash: f64,
    pub positions: Vec<HeldOption>,
    ledger: Option<Arc<dyn LedgerRepository>>,
}

impl Portfolio {
    /// A detached portfolio that records nothing.
    pub fn new(symbol: impl Into<String>, shares: u32, cash: f64) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            cash,
            positions: Vec::new(),
            ledger: None,
        }
    }

    /// Start from config, then the latest snapshot, then the recorded stock
    /// position, each overriding the previous.
    pub fn load(config: &AdvisorConfig, ledger: Option<Arc<dyn LedgerRepository>>) -> Result<Self, DomainError> {
        let mut portfolio = Self::new(config.symbol.clone(), config.shares, config.cash_available);

        if let Some(ledger) = &ledger {
            if let Some(snapshot) = ledger.latest_snapshot()? {
                portfolio.shares = snapshot.shares;
                portfolio.cash = snapshot.cash;
            }
            if let Some(stock) = ledger.stock_position(&portfolio.symbol)? {
                portfolio.shares = stock.quantity;
            }
        }

        portfolio.ledger = ledger;
        Ok(portfolio)
    }

    pub fn has_ledger(&self) -> bool {
        self.ledger.is_some()
    }

    /// Open an option position. Buys debit cash and must be covered by it;
    /// sells credit it. Recorded in the ledger only when an expiration is
    /// known, and cash moves only after that recording succeeds.
    pub fn add_position(
        &mut self,
        option_type: OptionType,
        strike: f64,
        premium: f64,
        qty: u32,
        expiration: Option<NaiveDate>,
        action: TradeAction,
    ) -> Result<HeldOption, DomainError> {
        if qty == 0 {
            return Err(DomainError::InvalidInput("quantity must be positive".into()));
        }
        if premium < 0.0 || strike <= 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "invalid strike {strike} or premium {premium}"
            )));
        }

        let cost = contract_value(premium, qty);
        let cash = match action {
            TradeAction::Buy if cost > self.cash => {
                return Err(DomainError::InsufficientCash {
                    required: cost,
                    available: self.cash,
                })
            }
            TradeAction::Buy => self.cash - cost,
            TradeAction::Sell => self.cash + cost,
        };

        let mut held = HeldOption {
            option_type,
            action,
            strike,
            premium,
            qty,
            ledger_id: None,
        };

        if let (Some(ledger), Some(expiration)) = (&self.ledger, expiration) {
            let id = ledger.add_options_position(NewOptionsPosition {
                option_type,
                action,
                symbol: self.symbol.clone(),
                strike,
                expiration,
                quantity: qty,
                premium,
                notes: None,
            })?;
            ledger.add_transaction(NewTransaction {
                kind: TransactionKind::for_option(action, option_type),
                symbol: self.symbol.clone(),
                quantity: qty,
                price: premium,
                total_cost: match action {
                    TradeAction::Buy => cost,
                    TradeAction::Sell => -cost,
                },
                strike: Some(strike),
                expiration: Some(expiration),
                premium: Some(premium),
                notes: None,
            })?;
            held.ledger_id = Some(id);
        }

        self.cash = cash;
        self.positions.push(held.clone());
        Ok(held)
    }

    /// Shares at `price`, cash, and each option's intrinsic value plus half
    /// its premium as a rough time value.
    pub fn value(&self, price: f64) -> f64 {
        self.value_with_shares(self.shares, price)
    }

    fn value_with_shares(&self, shares: u32, price: f64) -> f64 {
        let options: f64 = self
            .positions
            .iter()
            .map(|p| {
                let intrinsic = p.option_type.intrinsic(p.strike, price);
                contract_value(intrinsic, p.qty) + contract_value(p.premium, p.qty) * TIME_VALUE_FACTOR
            })
            .sum();
        shares as f64 * price + self.cash + options
    }

    /// Set the share count. With a ledger, upserts the stock position,
    /// records the buy or sell of the difference, and saves a snapshot.
    /// The count changes only once the ledger writes succeed.
    pub fn update_shares(&mut self, new_shares: u32, price: Option<f64>) -> Result<(), DomainError> {
        let old_shares = self.shares;
        let Some(ledger) = &self.ledger else {
            self.shares = new_shares;
            return Ok(());
        };

        let px = price.unwrap_or(0.0);
        ledger.update_stock_position(&self.symbol, new_shares, px, price, None)?;

        if new_shares != old_shares {
            let (kind, diff) = if new_shares > old_shares {
                (TransactionKind::BuyStock, new_shares - old_shares)
            } else {
                (TransactionKind::SellStock, old_shares - new_shares)
            };
            ledger.add_transaction(NewTransaction {
                kind,
                symbol: self.symbol.clone(),
                quantity: diff,
                price: px,
                total_cost: diff as f64 * px,
                strike: None,
                expiration: None,
                premium: None,
                notes: None,
            })?;
        }

        let total = price.map(|p| self.value_with_shares(new_shares, p)).unwrap_or(0.0);
        ledger.save_snapshot(new_shares, self.cash, total, None)?;
        self.shares = new_shares;
        Ok(())
    }

    /// Record the current state. `None` without a ledger.
    pub fn save_snapshot(&self, price: f64, notes: Option<String>) -> Result<Option<PortfolioSnapshot>, DomainError> {
        match &self.ledger {
            Some(ledger) => ledger
                .save_snapshot(self.shares, self.cash, self.value(price), notes)
                .map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::json::ledger_store::JsonLedgerStore;

    #[test]
    fn test_value_shares_and_cash() {
        let p = Portfolio::new("TSLA", 100, 10_000.0);
        assert_eq!(p.value(200.0), 30_000.0);
    }

    #[test]
    fn test_buy_debits_and_sell_credits() {
        let mut p = Portfolio::new("TSLA", 100, 10_000.0);
        p.add_position(OptionType::Call, 210.0, 5.0, 2, None, TradeAction::Buy).unwrap();
        assert_eq!(p.cash, 9_000.0);
        p.add_position(OptionType::Put, 190.0, 3.0, 1, None, TradeAction::Sell).unwrap();
        assert_eq!(p.cash, 9_300.0);
        assert_eq!(p.positions.len(), 2);
        assert!(p.positions.iter().all(|h| h.ledger_id.is_none()));
    }

    #[test]
    fn test_insufficient_cash() {
        let mut p = Portfolio::new("TSLA", 100, 100.0);
        let err = p
            .add_position(OptionType::Call, 210.0, 5.0, 1, None, TradeAction::Buy)
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientCash { .. }));
        assert_eq!(p.cash, 100.0);
        assert!(p.positions.is_empty());
    }

    #[test]
    fn test_value_counts_intrinsic_and_time_value() {
        let mut p = Portfolio::new("TSLA", 0, 10_000.0);
        p.add_position(OptionType::Call, 200.0, 5.0, 1, None, TradeAction::Buy).unwrap();
        // cash 9,500 + intrinsic 10 * 100 + half of 500 premium
        assert_eq!(p.value(210.0), 9_500.0 + 1_000.0 + 250.0);
        // out of the money: time value only
        assert_eq!(p.value(190.0), 9_500.0 + 250.0);
    }

    fn unwritable_ledger() -> (tempfile::TempDir, Arc<dyn LedgerRepository>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.json");
        let store = JsonLedgerStore::open(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        (dir, Arc::new(store))
    }

    #[test]
    fn test_failed_ledger_write_leaves_cash_alone() {
        let (_dir, ledger) = unwritable_ledger();
        let config = AdvisorConfig {
            cash_available: 10_000.0,
            ..AdvisorConfig::default()
        };
        let mut p = Portfolio::load(&config, Some(ledger)).unwrap();
        let expiration = NaiveDate::from_ymd_opt(2026, 2, 20);

        let result = p.add_position(OptionType::Call, 200.0, 5.0, 2, expiration, TradeAction::Buy);
        assert!(matches!(result, Err(DomainError::Storage(_))));
        assert_eq!(p.cash, 10_000.0);
        assert!(p.positions.is_empty());

        assert!(p.update_shares(p.shares + 100, Some(200.0)).is_err());
        assert_eq!(p.shares, config.shares);
    }

    #[test]
    fn test_detached_updates_do_not_fail() {
        let mut p = Portfolio::new("TSLA", 100, 0.0);
        p.update_shares(200, Some(250.0)).unwrap();
        assert_eq!(p.shares, 200);
        assert!(p.save_snapshot(250.0, None).unwrap().is_none());
    }
}
