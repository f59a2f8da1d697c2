use serde::{Deserialize, Serialize};
use std::fmt;

use super::option_type::OptionType;
use super::trade_action::TradeAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    BuyCall,
    SellCall,
    BuyPut,
    SellPut,
    BuyStock,
    SellStock,
}

impl TransactionKind {
    pub fn for_option(action: TradeAction, option_type: OptionType) -> Self {
        match (action, option_type) {
            (TradeAction::Buy, OptionType::Call) => TransactionKind::BuyCall,
            (TradeAction::Sell, OptionType::Call) => TransactionKind::SellCall,
            (TradeAction::Buy, OptionType::Put) => TransactionKind::BuyPut,
            (TradeAction::Sell, OptionType::Put) => TransactionKind::SellPut,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::BuyCall => "buy_call",
            TransactionKind::SellCall => "sell_call",
            TransactionKind::BuyPut => "buy_put",
            TransactionKind::SellPut => "sell_put",
            TransactionKind::BuyStock => "buy_stock",
            TransactionKind::SellStock => "sell_stock",
        };
        write!(f, "{s}")
    }
}
