use crate::domain::error::DomainError;
use async_trait::async_trait;

/// Delivers alert messages to the user.
#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), DomainError>;
}
