use crate::domain::values::option_type::OptionType;
use crate::domain::values::position_status::PositionStatus;
use crate::domain::values::trade_action::TradeAction;
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::entities::timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsPosition {
    pub id: u64,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub action: TradeAction,
    pub symbol: String,
    pub strike: f64,
    pub expiration: NaiveDate,
    pub quantity: u32,
    pub premium: f64,
    pub status: PositionStatus,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub closed_at: Option<DateTime<Utc>>,
    pub profit_loss: Option<f64>,
    pub notes: Option<String>,
}

impl OptionsPosition {
    /// Apply a status change, stamping `closed_at` on terminal statuses.
    pub fn transition(
        &mut self,
        status: PositionStatus,
        profit_loss: Option<f64>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.updated_at = now;
        if profit_loss.is_some() {
            self.profit_loss = profit_loss;
        }
        if status.is_terminal() {
            self.closed_at = Some(now);
        }
        if let Some(n) = notes.filter(|n| !n.is_empty()) {
            self.notes = Some(n);
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}
