pub mod chain_view;
pub mod chat;
pub mod ledger;
pub mod market;
pub mod monitor;
pub mod portfolio;
pub mod recommend;
pub mod strategies;
