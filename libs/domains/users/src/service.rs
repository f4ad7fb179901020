//! User Service - registration, login and email verification

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::{JwtAuth, TokenSubject};
use chrono::Utc;
use email::OtpMailer;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::config::AuthConfig;
use crate::error::{UserError, UserResult};
use crate::models::{
    LoginRequest, OtpVerification, RegisterRequest, ResendOtpRequest, Role, User, UserResponse,
    VerifyOtpRequest, normalize_email,
};
use crate::otp;
use crate::repository::{OtpRepository, UserRepository};

/// Account lifecycle on top of the user and OTP repositories
pub struct UserService<R: UserRepository, O: OtpRepository> {
    users: Arc<R>,
    otps: Arc<O>,
    jwt: JwtAuth,
    mailer: OtpMailer,
    config: AuthConfig,
}

impl<R: UserRepository, O: OtpRepository> Clone for UserService<R, O> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            otps: Arc::clone(&self.otps),
            jwt: self.jwt.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
        }
    }
}

impl<R: UserRepository, O: OtpRepository> UserService<R, O> {
    pub fn new(users: R, otps: O, jwt: JwtAuth, mailer: OtpMailer, config: AuthConfig) -> Self {
        Self {
            users: Arc::new(users),
            otps: Arc::new(otps),
            jwt,
            mailer,
            config,
        }
    }

    /// Create an unverified account and email it a verification code.
    ///
    /// Delivery failures are logged only; the user can ask for a resend.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<UserResponse> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let email = normalize_email(&input.email);
        if self.users.get_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail(email));
        }

        let role = input.role.unwrap_or_default();
        if role == Role::Admin && !self.config.allow_admin_registration {
            return Err(UserError::AdminRegistrationDisabled);
        }

        let password_hash = hash_password(&input.password)?;
        let user = User::new(
            input.firstname.trim().to_string(),
            Some(input.lastname.trim().to_string()),
            email,
            password_hash,
            role,
        );
        let user = self.users.create(user).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");

        if let Err(e) = self.issue_otp(&user).await {
            tracing::warn!(user_id = %user.id, error = %e, "Could not deliver OTP after registration");
        }

        Ok(user.into())
    }

    /// Check credentials and issue a token
    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<(UserResponse, String)> {
        let email = normalize_email(&input.email);
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "Login rejected: wrong password");
            return Err(UserError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok((user.into(), token))
    }

    /// Consume the pending code, mark the user verified and issue a token
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn verify_otp(&self, input: VerifyOtpRequest) -> UserResult<(UserResponse, String)> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let user = self.unverified_user(input.user_id).await?;

        let record = self
            .otps
            .find_by_user(user.id)
            .await?
            .ok_or(UserError::OtpNotFound)?;

        if record.is_expired_at(Utc::now()) {
            self.otps.delete_by_user(user.id).await?;
            return Err(UserError::OtpExpired);
        }

        if !otp::codes_match(&input.otp, &record.code_hash) {
            return Err(UserError::InvalidOtp);
        }

        let user = self
            .users
            .set_verified(user.id)
            .await?
            .ok_or(UserError::NotFound(user.id))?;
        self.otps.delete_by_user(user.id).await?;

        let token = self.issue_token(&user)?;
        Ok((user.into(), token))
    }

    /// Replace the pending code and send it to the stored address
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn resend_otp(&self, input: ResendOtpRequest) -> UserResult<()> {
        input
            .validate()
            .map_err(|e| UserError::Validation(e.to_string()))?;

        let user = self.unverified_user(input.user_id).await?;
        if normalize_email(&input.email) != user.email {
            return Err(UserError::EmailMismatch);
        }

        self.issue_otp(&user).await
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> UserResult<User> {
        self.users.get_by_id(id).await?.ok_or(UserError::NotFound(id))
    }

    /// Store a fresh code for `user` and email it
    async fn issue_otp(&self, user: &User) -> UserResult<()> {
        let code = otp::generate_code();
        let record = OtpVerification::new(user.id, otp::hash_code(&code), self.config.otp_ttl_secs);
        self.otps.upsert_for_user(record).await?;

        self.mailer
            .send_otp(&user.email, &code, self.config.otp_ttl_secs)
            .await?;
        tracing::info!(user_id = %user.id, "OTP issued");
        Ok(())
    }

    async fn unverified_user(&self, id: Uuid) -> UserResult<User> {
        let user = self.get_user(id).await?;
        if user.verified {
            return Err(UserError::AlreadyVerified);
        }
        Ok(user)
    }

    fn issue_token(&self, user: &User) -> UserResult<String> {
        let user_id = user.id.to_string();
        self.jwt
            .create_token(TokenSubject {
                user_id: &user_id,
                email: &user.email,
                name: &user.firstname,
                role: user.role.as_str(),
            })
            .map_err(|e| UserError::Token(e.to_string()))
    }
}

// Password helpers

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockOtpRepository, MockUserRepository};
    use axum_helpers::JwtConfig;
    use email::{MockEmailProvider, TemplateEngine};

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn mailer(provider: MockEmailProvider) -> OtpMailer {
        let templates = TemplateEngine::new().unwrap();
        OtpMailer::new(Arc::new(provider), Arc::new(templates), "Sweet Shop")
    }

    fn service(
        users: MockUserRepository,
        otps: MockOtpRepository,
        provider: MockEmailProvider,
    ) -> UserService<MockUserRepository, MockOtpRepository> {
        let jwt = JwtAuth::new(&JwtConfig::new(SECRET).unwrap());
        UserService::new(users, otps, jwt, mailer(provider), AuthConfig::default())
    }

    fn register_request(role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            firstname: " Ada ".into(),
            lastname: "Lovelace".into(),
            email: "Ada@Example.com".into(),
            role,
            password: "Sweet@123".into(),
        }
    }

    fn stored_user(verified: bool) -> User {
        let mut user = User::new(
            "Ada".into(),
            Some("Lovelace".into()),
            "ada@example.com".into(),
            hash_password("Sweet@123").unwrap(),
            Role::User,
        );
        user.verified = verified;
        user
    }

    #[tokio::test]
    async fn test_register_creates_user_and_sends_otp() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().times(1).returning(|_| Ok(None));
        users.expect_create().times(1).returning(Ok);

        let mut otps = MockOtpRepository::new();
        otps.expect_upsert_for_user()
            .times(1)
            .returning(|otp| {
                assert_eq!(otp.code_hash.len(), 64);
                Ok(())
            });

        let provider = MockEmailProvider::new();
        let svc = service(users, otps, provider.clone());

        let user = svc.register(register_request(None)).await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.firstname, "Ada");
        assert_eq!(user.role, Role::User);
        assert!(!user.verified);
        assert!(provider.was_sent_to("ada@example.com").await);
    }

    #[tokio::test]
    async fn test_register_survives_mail_failure() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));
        users.expect_create().returning(Ok);
        let mut otps = MockOtpRepository::new();
        otps.expect_upsert_for_user().returning(|_| Ok(()));

        let svc = service(users, otps, MockEmailProvider::failing());
        assert!(svc.register(register_request(None)).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let mut users = MockUserRepository::new();
        users
            .expect_get_by_email()
            .times(1)
            .returning(|_| Ok(Some(stored_user(false))));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc.register(register_request(None)).await.unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_register_admin_disabled_by_default() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc
            .register(register_request(Some(Role::Admin)))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AdminRegistrationDisabled));
    }

    #[tokio::test]
    async fn test_login_success_and_failure() {
        let mut users = MockUserRepository::new();
        users
            .expect_get_by_email()
            .returning(|_| Ok(Some(stored_user(false))));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());

        let (user, token) = svc
            .login(LoginRequest {
                email: " ADA@example.com".into(),
                password: "Sweet@123".into(),
            })
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert!(!token.is_empty());

        let err = svc
            .login(LoginRequest {
                email: "ada@example.com".into(),
                password: "Wrong@123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_email().returning(|_| Ok(None));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc
            .login(LoginRequest {
                email: "nobody@example.com".into(),
                password: "Sweet@123".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_verify_otp_success() {
        let user = stored_user(false);
        let user_id = user.id;
        let lookup = user.clone();

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));
        users.expect_set_verified().times(1).returning(move |_| {
            let mut verified = user.clone();
            verified.verified = true;
            Ok(Some(verified))
        });

        let mut otps = MockOtpRepository::new();
        otps.expect_find_by_user().returning(move |id| {
            Ok(Some(OtpVerification::new(id, otp::hash_code("123456"), 600)))
        });
        otps.expect_delete_by_user().times(1).returning(|_| Ok(()));

        let svc = service(users, otps, MockEmailProvider::new());
        let (user, token) = svc
            .verify_otp(VerifyOtpRequest {
                user_id,
                otp: "123456".into(),
            })
            .await
            .unwrap();
        assert!(user.verified);
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_verify_otp_wrong_code_keeps_record() {
        let user = stored_user(false);
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_by_user().returning(move |id| {
            Ok(Some(OtpVerification::new(id, otp::hash_code("123456"), 600)))
        });
        otps.expect_delete_by_user().never();

        let svc = service(users, otps, MockEmailProvider::new());
        let err = svc
            .verify_otp(VerifyOtpRequest {
                user_id,
                otp: "654321".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidOtp));
    }

    #[tokio::test]
    async fn test_verify_otp_expired_deletes_record() {
        let user = stored_user(false);
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let mut otps = MockOtpRepository::new();
        otps.expect_find_by_user().returning(move |id| {
            let mut record = OtpVerification::new(id, otp::hash_code("123456"), 600);
            record.expires_at = Utc::now() - chrono::Duration::seconds(1);
            Ok(Some(record))
        });
        otps.expect_delete_by_user().times(1).returning(|_| Ok(()));

        let svc = service(users, otps, MockEmailProvider::new());
        let err = svc
            .verify_otp(VerifyOtpRequest {
                user_id,
                otp: "123456".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::OtpExpired));
    }

    #[tokio::test]
    async fn test_verify_otp_already_verified() {
        let user = stored_user(true);
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc
            .verify_otp(VerifyOtpRequest {
                user_id,
                otp: "123456".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyVerified));
    }

    #[tokio::test]
    async fn test_resend_otp_email_mismatch() {
        let user = stored_user(false);
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc
            .resend_otp(ResendOtpRequest {
                user_id,
                email: "someone@example.com".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailMismatch));
    }

    #[tokio::test]
    async fn test_resend_otp_delivery_failure() {
        let user = stored_user(false);
        let user_id = user.id;

        let mut users = MockUserRepository::new();
        users
            .expect_get_by_id()
            .returning(move |_| Ok(Some(user.clone())));
        let mut otps = MockOtpRepository::new();
        otps.expect_upsert_for_user().times(1).returning(|_| Ok(()));

        let svc = service(users, otps, MockEmailProvider::failing());
        let err = svc
            .resend_otp(ResendOtpRequest {
                user_id,
                email: "ADA@example.com".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailDelivery(_)));
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_get_by_id().returning(|_| Ok(None));

        let svc = service(users, MockOtpRepository::new(), MockEmailProvider::new());
        let err = svc.get_user(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }
}
