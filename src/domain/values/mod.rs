pub mod indicators;
pub mod option_symbol;
pub mod option_type;
pub mod position_status;
pub mod sizing;
pub mod trade_action;
pub mod transaction_kind;
