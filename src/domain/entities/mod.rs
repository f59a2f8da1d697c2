pub mod market;
pub mod options_position;
pub mod snapshot;
pub mod stock_position;
pub mod timestamp;
pub mod transaction;
