pub mod chat_provider;
pub mod ledger_repository;
pub mod market_data;
pub mod notifier;
pub mod strategy;
