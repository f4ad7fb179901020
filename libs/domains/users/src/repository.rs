use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{OtpVerification, User};

/// Repository trait for user accounts
///
/// Emails are stored lowercased and are unique.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn create(&self, user: User) -> UserResult<User>;

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Look up by an already normalized email
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// Mark the user verified. Returns `None` when the user does not exist.
    async fn set_verified(&self, id: Uuid) -> UserResult<Option<User>>;
}

/// Storage for pending verification codes, at most one per user
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OtpRepository: Send + Sync {
    /// Insert or replace the user's pending code
    async fn upsert_for_user(&self, otp: OtpVerification) -> UserResult<()>;

    async fn find_by_user(&self, user_id: Uuid) -> UserResult<Option<OtpVerification>>;

    async fn delete_by_user(&self, user_id: Uuid) -> UserResult<()>;
}

/// In-memory user store for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn set_verified(&self, id: Uuid) -> UserResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(&id).map(|user| {
            user.verified = true;
            user.updated_at = Utc::now();
            user.clone()
        }))
    }
}

/// In-memory OTP store keyed by user
///
/// Expired records are left in place; the Mongo store relies on a TTL index
/// and callers check expiry themselves.
#[derive(Clone, Default)]
pub struct InMemoryOtpRepository {
    otps: Arc<RwLock<HashMap<Uuid, OtpVerification>>>,
}

impl InMemoryOtpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OtpRepository for InMemoryOtpRepository {
    async fn upsert_for_user(&self, otp: OtpVerification) -> UserResult<()> {
        self.otps.write().await.insert(otp.user_id, otp);
        Ok(())
    }

    async fn find_by_user(&self, user_id: Uuid) -> UserResult<Option<OtpVerification>> {
        Ok(self.otps.read().await.get(&user_id).cloned())
    }

    async fn delete_by_user(&self, user_id: Uuid) -> UserResult<()> {
        self.otps.write().await.remove(&user_id);
        Ok(())
    }
}
