use crate::domain::entities::options_position::OptionsPosition;
use crate::domain::entities::snapshot::PortfolioSnapshot;
use crate::domain::entities::stock_position::StockPosition;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::values::option_type::OptionType;
use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::trade_action::TradeAction;
use crate::domain::values::transaction_kind::TransactionKind;
use chrono::NaiveDate;

/// Fields supplied when recording a transaction; id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub symbol: String,
    pub quantity: u32,
    pub price: f64,
    pub total_cost: f64,
    pub strike: Option<f64>,
    pub expiration: Option<NaiveDate>,
    pub premium: Option<f64>,
    pub notes: Option<String>,
}

/// Fields supplied when opening an options position. New positions start `open`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOptionsPosition {
    pub option_type: OptionType,
    pub action: TradeAction,
    pub symbol: String,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub quantity: u32,
    pub premium: f64,
    pub notes: Option<String>,
}

pub trait LedgerRepository: Send + Sync {
    fn save_snapshot(
        &self,
        shares: u32,
        cash: f64,
        total_value: f64,
        notes: Option<String>,
    ) -> Result<PortfolioSnapshot, DomainError>;

    fn add_transaction(&self, tx: NewTransaction) -> Result<Transaction, DomainError>;

    /// Returns the new position's id.
    fn add_options_position(&self, position: NewOptionsPosition) -> Result<u64, DomainError>;

    /// Returns `false` when no position has `id`.
    fn update_options_position(
        &self,
        id: u64,
        status: PositionStatus,
        profit_loss: Option<f64>,
        notes: Option<String>,
    ) -> Result<bool, DomainError>;

    /// Returns `false` when no position has `id`.
    fn delete_options_position(&self, id: u64) -> Result<bool, DomainError>;

    /// Open positions on `symbol`, soonest expiration first, then by strike.
    fn open_options_positions(&self, symbol: &str) -> Result<Vec<OptionsPosition>, DomainError>;

    /// All positions on `symbol`, newest first.
    fn all_options_positions(&self, symbol: &str, limit: usize) -> Result<Vec<OptionsPosition>, DomainError>;

    fn recent_transactions(&self, limit: usize) -> Result<Vec<Transaction>, DomainError>;

    fn portfolio_history(&self, limit: usize) -> Result<Vec<PortfolioSnapshot>, DomainError>;

    fn latest_snapshot(&self) -> Result<Option<PortfolioSnapshot>, DomainError>;

    /// Insert or replace the position for `symbol`.
    fn update_stock_position(
        &self,
        symbol: &str,
        quantity: u32,
        avg_cost: f64,
        current_price: Option<f64>,
        notes: Option<String>,
    ) -> Result<StockPosition, DomainError>;

    fn stock_position(&self, symbol: &str) -> Result<Option<StockPosition>, DomainError>;
}
