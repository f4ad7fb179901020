use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims carried by every access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // User ID
    pub email: String, // User email
    pub name: String,  // First name
    pub role: String,  // "user" or "admin"
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl JwtClaims {
    /// Parse `sub` as a user id.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }
}

/// Identity fields placed into a token.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    pub user_id: &'a str,
    pub email: &'a str,
    pub name: &'a str,
    pub role: &'a str,
}

/// Stateless HS256 token issuer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    validation: Arc<Validation>,
    expires_in_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        tracing::info!(expires_in_secs = config.expires_in_secs, "JWT auth initialized");
        Self {
            encoding: Arc::new(EncodingKey::from_secret(config.secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            validation: Arc::new(validation),
            expires_in_secs: config.expires_in_secs,
        }
    }

    pub fn expires_in_secs(&self) -> i64 {
        self.expires_in_secs
    }

    /// Sign a token for `subject` with the configured lifetime.
    pub fn create_token(&self, subject: TokenSubject<'_>) -> eyre::Result<String> {
        self.create_token_with_ttl(subject, self.expires_in_secs)
    }

    fn create_token_with_ttl(
        &self,
        subject: TokenSubject<'_>,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.user_id.to_string(),
            email: subject.email.to_string(),
            name: subject.name.to_string(),
            role: subject.role.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("0123456789abcdef0123456789abcdef").unwrap())
    }

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            user_id: "0191d6a4-0000-7000-8000-000000000001",
            email: "ada@example.com",
            name: "Ada",
            role: "admin",
        }
    }

    #[test]
    fn test_create_and_verify_token() {
        let auth = auth();
        let token = auth.create_token(subject()).unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 432_000);
        assert!(claims.user_id().is_some());
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_expired_token_rejected() {
        let auth = auth();
        let token = auth.create_token_with_ttl(subject(), -10).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("ffffffffffffffffffffffffffffffff").unwrap());
        let token = other.create_token(subject()).unwrap();
        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}
