use std::sync::Arc;

use chrono::NaiveDate;

use crate::domain::entities::options_position::OptionsPosition;
use crate::domain::entities::snapshot::PortfolioSnapshot;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::ledger_repository::{LedgerRepository, NewOptionsPosition, NewTransaction};
use crate::domain::values::option_symbol::OptionSymbol;
use crate::domain::values::option_type::OptionType;
use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::sizing::contract_value;
use crate::domain::values::trade_action::TradeAction;
use crate::domain::values::transaction_kind::TransactionKind;

/// Option contract fields for a manual ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSpec {
    pub symbol: String,
    pub option_type: OptionType,
    pub strike: f64,
    pub expiration: NaiveDate,
}

impl From<OptionSymbol> for ContractSpec {
    fn from(s: OptionSymbol) -> Self {
        Self {
            symbol: s.root,
            option_type: s.option_type,
            strike: s.strike,
            expiration: s.expiration,
        }
    }
}

pub struct LedgerUseCase {
    repo: Arc<dyn LedgerRepository>,
}

impl LedgerUseCase {
    pub fn new(repo: Arc<dyn LedgerRepository>) -> Self {
        Self { repo }
    }

    /// Record a position opened outside the advisor, with its transaction.
    /// Cash is not touched.
    pub fn record_position(
        &self,
        contract: ContractSpec,
        action: TradeAction,
        quantity: u32,
        premium: f64,
        notes: Option<String>,
    ) -> Result<OptionsPosition, DomainError> {
        if quantity == 0 {
            return Err(DomainError::InvalidInput("quantity must be positive".into()));
        }
        if contract.strike <= 0.0 || premium < 0.0 {
            return Err(DomainError::InvalidInput(format!(
                "invalid strike {} or premium {premium}",
                contract.strike
            )));
        }

        let id = self.repo.add_options_position(NewOptionsPosition {
            option_type: contract.option_type,
            action,
            symbol: contract.symbol.clone(),
            strike: contract.strike,
            expiration: contract.expiration,
            quantity,
            premium,
            notes: notes.clone(),
        })?;

        let cost = contract_value(premium, quantity);
        self.repo.add_transaction(NewTransaction {
            kind: TransactionKind::for_option(action, contract.option_type),
            symbol: contract.symbol.clone(),
            quantity,
            price: premium,
            total_cost: match action {
                TradeAction::Buy => cost,
                TradeAction::Sell => -cost,
            },
            strike: Some(contract.strike),
            expiration: Some(contract.expiration),
            premium: Some(premium),
            notes,
        })?;

        self.repo
            .all_options_positions(&contract.symbol, usize::MAX)?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::Storage(format!("position {id} missing after insert")))
    }

    pub fn update_position(
        &self,
        id: u64,
        status: PositionStatus,
        profit_loss: Option<f64>,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        if self.repo.update_options_position(id, status, profit_loss, notes)? {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!("options position {id}")))
        }
    }

    pub fn delete_position(&self, id: u64) -> Result<(), DomainError> {
        if self.repo.delete_options_position(id)? {
            Ok(())
        } else {
            Err(DomainError::NotFound(format!("options position {id}")))
        }
    }

    pub fn positions(&self, symbol: &str, all: bool, limit: usize) -> Result<Vec<OptionsPosition>, DomainError> {
        if all {
            self.repo.all_options_positions(symbol, limit)
        } else {
            let mut open = self.repo.open_options_positions(symbol)?;
            open.truncate(limit);
            Ok(open)
        }
    }

    pub fn transactions(&self, limit: usize) -> Result<Vec<Transaction>, DomainError> {
        self.repo.recent_transactions(limit)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<PortfolioSnapshot>, DomainError> {
        self.repo.portfolio_history(limit)
    }
}
