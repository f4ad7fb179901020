//! Development provider that writes messages to the log and keeps nothing.
//!
//! Selected when `SMTP_HOST` is unset outside production, so OTP codes can be
//! read from the server output.

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogEmailProvider;

impl LogEmailProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmailProvider for LogEmailProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            body = email.body_text.as_deref().unwrap_or_default(),
            "Email not delivered, SMTP is not configured"
        );

        Ok(SendResult {
            message_id: format!("log-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_provider_accepts_every_message() {
        let provider = LogEmailProvider::new();

        for n in 0..3 {
            let email = Email::new("ada@example.com", "Your OTP Code").with_text(format!("{n}"));
            let result = provider.send(&email).await.unwrap();
            assert_eq!(result.message_id, format!("log-{}", email.id));
        }
        assert!(provider.health_check().await.is_ok());
        assert_eq!(provider.name(), "log");
    }
}
