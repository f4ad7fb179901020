//! Email templates rendered with Handlebars.
//!
//! Templates are registered as three Handlebars partials: `<name>_subject`,
//! and optionally `<name>_text` and `<name>_html`. Strict mode is on, so a
//! missing variable is a render error rather than an empty string.

use eyre::{eyre, Result};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Rendered template result
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Email template definition
#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

/// Handlebars-based template engine with the built-in templates registered.
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);

        let mut engine = Self {
            handlebars,
            templates: HashMap::new(),
        };
        engine.register_defaults()?;

        Ok(engine)
    }

    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.handlebars
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.handlebars
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.handlebars
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let render_part = |part: &str| {
            self.handlebars
                .render(&format!("{}_{}", name, part), data)
                .map_err(|e| eyre!("Failed to render {} of {}: {}", part, name, e))
        };

        Ok(RenderedTemplate {
            subject: render_part("subject")?,
            body_text: template
                .body_text
                .as_ref()
                .map(|_| render_part("text"))
                .transpose()?,
            body_html: template
                .body_html
                .as_ref()
                .map(|_| render_part("html"))
                .transpose()?,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn list_templates(&self) -> Vec<&str> {
        self.templates.keys().map(|s| s.as_str()).collect()
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(EmailTemplate {
            name: crate::otp::OTP_TEMPLATE.to_string(),
            subject: "Your OTP Code".to_string(),
            body_text: Some(
                r#"Dear {{name}},

Your OTP code is: {{code}}

This code is valid for {{expiry_minutes}} minutes.

If you did not request this code, please ignore this email.

Thank you,
The {{app_name}} Team"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body>
<div style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: auto; padding: 20px; border: 1px solid #ddd; border-radius: 10px;">
    <h1 style="color: #4CAF50; text-align: center;">{{app_name}}</h1>
    <p style="text-align: center; font-size: 16px; color: #555;">Secure your account with OTP verification</p>
    <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
    <p>Dear {{name}},</p>
    <p>Your OTP code is:</p>
    <p style="font-size: 24px; font-weight: bold; color: #4CAF50; text-align: center; letter-spacing: 4px;">{{code}}</p>
    <p>This code is valid for <strong>{{expiry_minutes}} minutes</strong>.</p>
    <p>If you did not request this code, please ignore this email.</p>
    <hr style="border: none; border-top: 1px solid #eee; margin: 20px 0;">
    <p style="text-align: center;">Thank you,<br>The {{app_name}} Team</p>
</div>
</body>
</html>"#
                    .to_string(),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_engine_has_otp_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.has_template("otp_verification"));
        assert_eq!(engine.list_templates(), vec!["otp_verification"]);
    }

    #[test]
    fn test_render_otp_template() {
        let engine = TemplateEngine::new().unwrap();
        let data = json!({
            "name": "ada",
            "code": "493027",
            "expiry_minutes": 60,
            "app_name": "Bloom Sweets",
        });

        let rendered = engine.render("otp_verification", &data).unwrap();
        assert_eq!(rendered.subject, "Your OTP Code");
        let text = rendered.body_text.unwrap();
        assert!(text.contains("Dear ada"));
        assert!(text.contains("493027"));
        assert!(text.contains("60 minutes"));
        assert!(rendered.body_html.unwrap().contains("Bloom Sweets"));
    }

    #[test]
    fn test_missing_variable_is_error() {
        let engine = TemplateEngine::new().unwrap();
        let result = engine.render("otp_verification", &json!({ "name": "ada" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_template_and_html_escaping() {
        let mut engine = TemplateEngine::new().unwrap();
        engine
            .register(EmailTemplate {
                name: "restock_alert".to_string(),
                subject: "Low stock: {{sweet}}".to_string(),
                body_text: None,
                body_html: Some("<p>{{sweet}}</p>".to_string()),
            })
            .unwrap();

        let rendered = engine
            .render("restock_alert", &json!({ "sweet": "<Kaju Katli>" }))
            .unwrap();
        assert!(rendered.body_text.is_none());
        assert_eq!(rendered.body_html.unwrap(), "<p>&lt;Kaju Katli&gt;</p>");
    }

    #[test]
    fn test_unknown_template() {
        let engine = TemplateEngine::new().unwrap();
        assert!(engine.render("nope", &json!({})).is_err());
    }
}
