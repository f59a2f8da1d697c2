use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Chat error: {0}")]
    Chat(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Insufficient cash for position: need ${required:.2}, have ${available:.2}")]
    InsufficientCash { required: f64, available: f64 },
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Storage(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
