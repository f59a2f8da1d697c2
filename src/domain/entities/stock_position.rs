use chrono::{DateTime, Utc};
use crate::domain::entities::timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPosition {
    pub id: u64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    pub symbol: String,
    pub quantity: u32,
    pub avg_cost: f64,
    pub current_price: Option<f64>,
    pub total_value: f64,
    pub notes: Option<String>,
}

impl StockPosition {
    /// Marked value, at `current_price` when known and at cost otherwise.
    pub fn mark(quantity: u32, avg_cost: f64, current_price: Option<f64>) -> f64 {
        quantity as f64 * current_price.unwrap_or(avg_cost)
    }
}
