//! Inbound port. UI (adapter) calls into the application.

use crate::domain::DomainError;

/// Input port: interactive front-end driving the session coordinator.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Run the operator loop until the operator quits.
    async fn run(&self) -> Result<(), DomainError>;
}
