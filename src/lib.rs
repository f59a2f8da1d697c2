pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::chain_view::{near_money_chains, ExpirationView};
use crate::application::chat::{ChatSession, DEFAULT_MODEL};
use crate::application::ledger::{ContractSpec, LedgerUseCase};
use crate::application::market::{self, fetch_symbol_data, MarketConditions};
use crate::application::monitor::{send_monitor_alert, MonitorReport, MonitorUseCase};
use crate::application::portfolio::Portfolio;
use crate::application::recommend::{RecommendUseCase, RecommendationRun};
use crate::config::AdvisorConfig;
use crate::domain::entities::market::MarketData;
use crate::domain::entities::options_position::OptionsPosition;
use crate::domain::entities::snapshot::PortfolioSnapshot;
use crate::domain::entities::transaction::Transaction;
use crate::domain::error::DomainError;
use crate::domain::ports::chat_provider::ChatProvider;
use crate::domain::ports::ledger_repository::LedgerRepository;
use crate::domain::ports::market_data::MarketDataSource;
use crate::domain::ports::notifier::AlertNotifier;
use crate::domain::ports::strategy::StrategyContext;
use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::trade_action::TradeAction;
use crate::infrastructure::chat::xai::XaiChatProvider;
use crate::infrastructure::feeds::yahoo::YahooMarketData;
use crate::infrastructure::json::ledger_store::JsonLedgerStore;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;

/// Market header plus every recommendation for one run.
#[derive(Debug, Serialize)]
pub struct Advice {
    pub conditions: MarketConditions,
    pub portfolio_value: f64,
    #[serde(flatten)]
    pub run: RecommendationRun,
}

#[derive(Debug, Serialize)]
pub struct ChainReport {
    pub conditions: MarketConditions,
    pub band: f64,
    pub expirations: Vec<ExpirationView>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioSummary {
    pub symbol: String,
    pub shares: u32,
    pub cash: f64,
    pub price: f64,
    pub total_value: f64,
    pub open_positions: Vec<OptionsPosition>,
}

pub struct Wheelhouse {
    config: AdvisorConfig,
    market: Arc<dyn MarketDataSource>,
    ledger: Arc<dyn LedgerRepository>,
    ledger_uc: LedgerUseCase,
    recommend_uc: RecommendUseCase,
    monitor_uc: MonitorUseCase,
}

impl Wheelhouse {
    /// Yahoo market data and the JSON ledger at `ledger_path`.
    pub fn new(config: AdvisorConfig, ledger_path: &Path) -> Result<Self, DomainError> {
        let market: Arc<dyn MarketDataSource> = Arc::new(YahooMarketData::new());
        let ledger: Arc<dyn LedgerRepository> = Arc::new(JsonLedgerStore::open(ledger_path)?);
        Ok(Self::with_providers(config, market, ledger))
    }

    pub fn with_providers(
        config: AdvisorConfig,
        market: Arc<dyn MarketDataSource>,
        ledger: Arc<dyn LedgerRepository>,
    ) -> Self {
        Self {
            ledger_uc: LedgerUseCase::new(ledger.clone()),
            recommend_uc: RecommendUseCase::default(),
            monitor_uc: MonitorUseCase::new(market.clone()),
            config,
            market,
            ledger,
        }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn window(&self) -> (f64, f64) {
        (self.config.options_min_weeks, self.config.options_max_weeks)
    }

    pub fn portfolio(&self) -> Result<Portfolio, DomainError> {
        Portfolio::load(&self.config, Some(self.ledger.clone()))
    }

    /// History, quote, and the chains inside the configured week window.
    pub async fn market_data(&self, today: NaiveDate) -> Result<MarketData, DomainError> {
        fetch_symbol_data(self.market.as_ref(), &self.config.symbol, Some(self.window()), today).await
    }

    pub async fn current_price(&self) -> Result<f64, DomainError> {
        market::current_price(self.market.as_ref(), &self.config.symbol).await
    }

    pub async fn advise(&self, today: NaiveDate) -> Result<Advice, DomainError> {
        let data = self.market_data(today).await?;
        let portfolio = self.portfolio()?;
        let conditions = MarketConditions::from_market(&data, portfolio.shares, portfolio.cash, self.window())?;
        let portfolio_value = portfolio.value(conditions.price);

        let ctx = StrategyContext {
            price: conditions.price,
            rsi: conditions.rsi_or_neutral(),
            ma50: conditions.ma50_or_price(),
            chains: &data.chains,
            shares: portfolio.shares,
            cash: portfolio.cash,
            portfolio_value,
            today,
            config: &self.config,
        };
        let run = self.recommend_uc.execute(&ctx);

        Ok(Advice {
            conditions,
            portfolio_value,
            run,
        })
    }

    pub async fn chain(&self, today: NaiveDate, band: f64) -> Result<ChainReport, DomainError> {
        if !(band > 0.0 && band < 1.0) {
            return Err(DomainError::InvalidInput(format!("band must be in (0, 1), got {band}")));
        }
        let data = self.market_data(today).await?;
        let portfolio = self.portfolio()?;
        let conditions = MarketConditions::from_market(&data, portfolio.shares, portfolio.cash, self.window())?;
        let expirations = near_money_chains(&data, conditions.price, conditions.rsi_or_neutral(), band);
        Ok(ChainReport {
            conditions,
            band,
            expirations,
        })
    }

    pub async fn portfolio_summary(&self) -> Result<PortfolioSummary, DomainError> {
        let portfolio = self.portfolio()?;
        let price = self.current_price().await?;
        Ok(PortfolioSummary {
            symbol: portfolio.symbol.clone(),
            shares: portfolio.shares,
            cash: portfolio.cash,
            price,
            total_value: portfolio.value(price),
            open_positions: self.ledger.open_options_positions(&portfolio.symbol)?,
        })
    }

    /// Set the share count; without `price` the live price is used.
    pub async fn update_shares(&self, shares: u32, price: Option<f64>) -> Result<PortfolioSnapshot, DomainError> {
        let price = match price {
            Some(p) => p,
            None => self.current_price().await?,
        };
        let mut portfolio = self.portfolio()?;
        portfolio.update_shares(shares, Some(price))?;
        self.ledger
            .latest_snapshot()?
            .ok_or_else(|| DomainError::Storage("snapshot missing after update".into()))
    }

    pub async fn snapshot(&self, price: Option<f64>, notes: Option<String>) -> Result<PortfolioSnapshot, DomainError> {
        let price = match price {
            Some(p) => p,
            None => self.current_price().await?,
        };
        self.portfolio()?
            .save_snapshot(price, notes)?
            .ok_or_else(|| DomainError::Storage("no ledger attached".into()))
    }

    pub fn record_position(
        &self,
        contract: ContractSpec,
        action: TradeAction,
        quantity: u32,
        premium: f64,
        notes: Option<String>,
    ) -> Result<OptionsPosition, DomainError> {
        self.ledger_uc.record_position(contract, action, quantity, premium, notes)
    }

    pub fn update_position(
        &self,
        id: u64,
        status: PositionStatus,
        profit_loss: Option<f64>,
        notes: Option<String>,
    ) -> Result<(), DomainError> {
        self.ledger_uc.update_position(id, status, profit_loss, notes)
    }

    pub fn delete_position(&self, id: u64) -> Result<(), DomainError> {
        self.ledger_uc.delete_position(id)
    }

    pub fn positions(&self, all: bool, limit: usize) -> Result<Vec<OptionsPosition>, DomainError> {
        self.ledger_uc.positions(&self.config.symbol, all, limit)
    }

    pub fn transactions(&self, limit: usize) -> Result<Vec<Transaction>, DomainError> {
        self.ledger_uc.transactions(limit)
    }

    pub fn history(&self, limit: usize) -> Result<Vec<PortfolioSnapshot>, DomainError> {
        self.ledger_uc.history(limit)
    }

    pub async fn monitor(&self, today: NaiveDate) -> Result<MonitorReport, DomainError> {
        self.monitor_uc.report(&self.config.monitor, today).await
    }

    pub async fn send_alert(
        &self,
        report: &MonitorReport,
        notifier: &dyn AlertNotifier,
        now: NaiveDateTime,
    ) -> Result<bool, DomainError> {
        send_monitor_alert(report, notifier, now).await
    }

    /// Chat backed by xAI when `XAI_API_KEY` is set, mock replies otherwise.
    pub fn chat_session(&self) -> ChatSession {
        let provider = XaiChatProvider::from_env().map(|p| Arc::new(p) as Arc<dyn ChatProvider>);
        let model = std::env::var("XAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        ChatSession::new(provider, model)
    }
}
