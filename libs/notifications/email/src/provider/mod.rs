//! Email provider implementations

pub mod logging;
pub mod mock;
pub mod smtp;

pub use logging::LogEmailProvider;
pub use mock::MockEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

/// Result of sending an email
#[derive(Debug, Clone)]
pub struct SendResult {
    /// Provider-specific message ID
    pub message_id: String,
}

/// Outbound mail transport.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &Email) -> Result<SendResult>;

    async fn health_check(&self) -> Result<()>;

    fn name(&self) -> &'static str;
}
