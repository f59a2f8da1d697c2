use chrono::{DateTime, Utc};
use crate::domain::entities::timestamp;
use serde::{Deserialize, Serialize};

/// Point-in-time record of holdings and estimated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub id: u64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub shares: u32,
    pub cash: f64,
    pub total_value: f64,
    pub notes: Option<String>,
}
