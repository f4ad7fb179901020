//! One-time-password delivery.

use crate::error::{NotificationError, NotificationResult};
use crate::models::{Email, EmailPriority};
use crate::provider::{EmailProvider, SendResult};
use crate::templates::TemplateEngine;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

/// Name of the built-in OTP template.
pub const OTP_TEMPLATE: &str = "otp_verification";

/// Renders the OTP template and hands it to an [`EmailProvider`].
#[derive(Clone)]
pub struct OtpMailer {
    provider: Arc<dyn EmailProvider>,
    templates: Arc<TemplateEngine>,
    app_name: String,
}

impl OtpMailer {
    pub fn new(
        provider: Arc<dyn EmailProvider>,
        templates: Arc<TemplateEngine>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            templates,
            app_name: app_name.into(),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Build the OTP email for `to` without sending it.
    ///
    /// The greeting uses the local part of the address.
    pub fn compose(&self, to: &str, code: &str, ttl_secs: u64) -> NotificationResult<Email> {
        let name = to
            .split_once('@')
            .map(|(local, _)| local)
            .filter(|local| !local.is_empty())
            .ok_or_else(|| NotificationError::InvalidInput(format!("invalid address: {}", to)))?;

        let data = json!({
            "name": name,
            "code": code,
            "expiry_minutes": ttl_secs.div_ceil(60),
            "app_name": self.app_name,
        });

        let rendered = self
            .templates
            .render(OTP_TEMPLATE, &data)
            .map_err(|e| NotificationError::TemplateError(e.to_string()))?;

        let mut email = Email::new(to, rendered.subject).with_priority(EmailPriority::High);
        email.body_text = rendered.body_text;
        email.body_html = rendered.body_html;
        Ok(email)
    }

    /// Render and send a verification code.
    #[instrument(skip(self, code), fields(provider = self.provider.name()))]
    pub async fn send_otp(
        &self,
        to: &str,
        code: &str,
        ttl_secs: u64,
    ) -> NotificationResult<SendResult> {
        let email = self.compose(to, code, ttl_secs)?;
        let result = self.provider.send(&email).await?;
        tracing::info!(email_id = %email.id, "OTP email sent");
        Ok(result)
    }
}
