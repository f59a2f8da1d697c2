use crate::domain::values::transaction_kind::TransactionKind;
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::entities::timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub symbol: String,
    pub quantity: u32,
    pub price: f64,
    pub strike: Option<f64>,
    pub expiration: Option<NaiveDate>,
    pub premium: Option<f64>,
    /// Cash out of the account; negative when premium was received.
    pub total_cost: f64,
    pub notes: Option<String>,
}
