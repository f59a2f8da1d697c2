pub mod chat;
pub mod feeds;
pub mod json;
pub mod notify;
