use crate::domain::entities::market::{OptionChain, PriceBar, Quote};
use crate::domain::error::DomainError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Source of prices and options chains for one underlying.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily closes over `range` (provider notation, e.g. `"1y"`), oldest first.
    async fn history(&self, symbol: &str, range: &str) -> Result<Vec<PriceBar>, DomainError>;

    async fn quote(&self, symbol: &str) -> Result<Quote, DomainError>;

    /// Listed expiration dates, ascending.
    async fn expirations(&self, symbol: &str) -> Result<Vec<NaiveDate>, DomainError>;

    async fn option_chain(&self, symbol: &str, expiration: NaiveDate) -> Result<OptionChain, DomainError>;
}
