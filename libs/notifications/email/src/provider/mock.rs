//! In-process provider for tests. Records every message instead of
//! delivering it, so the buffer grows for the provider's lifetime.

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone, Default)]
pub struct MockEmailProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose sends always fail.
    pub fn failing() -> Self {
        let provider = Self::new();
        provider.set_failing(true);
        provider
    }

    /// Toggle failure mode. Clones share the flag.
    pub fn set_failing(&self, failing: bool) {
        self.should_fail.store(failing, Ordering::SeqCst);
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == address)
    }

    /// Most recent message addressed to `address`.
    pub async fn last_sent_to(&self, address: &str) -> Option<Email> {
        self.sent_emails
            .lock()
            .await
            .iter()
            .rev()
            .find(|e| e.to == address)
            .cloned()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("Mock provider configured to fail"));
        }

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email captured by mock provider"
        );
        if let Some(text) = &email.body_text {
            tracing::debug!(email_id = %email.id, body = %text, "Mock email body");
        }

        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("Mock health check failed"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_records_email() {
        let provider = MockEmailProvider::new();
        let email = Email::new("ada@example.com", "Your OTP Code").with_text("123456");

        let result = provider.send(&email).await.unwrap();
        assert!(result.message_id.starts_with("mock-"));
        assert_eq!(provider.sent_count().await, 1);
        assert!(provider.was_sent_to("ada@example.com").await);
        assert!(!provider.was_sent_to("bob@example.com").await);
    }

    #[tokio::test]
    async fn test_failing_toggle_is_shared_between_clones() {
        let provider = MockEmailProvider::new();
        let handle = provider.clone();
        handle.set_failing(true);

        let email = Email::new("ada@example.com", "x").with_text("y");
        assert!(provider.send(&email).await.is_err());
        assert!(provider.health_check().await.is_err());

        handle.set_failing(false);
        assert!(provider.send(&email).await.is_ok());
    }

    #[tokio::test]
    async fn test_last_sent_to() {
        let provider = MockEmailProvider::new();
        provider
            .send(&Email::new("ada@example.com", "first").with_text("1"))
            .await
            .unwrap();
        provider
            .send(&Email::new("ada@example.com", "second").with_text("2"))
            .await
            .unwrap();

        let last = provider.last_sent_to("ada@example.com").await.unwrap();
        assert_eq!(last.subject, "second");
    }
}
