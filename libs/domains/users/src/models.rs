use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

pub const MSG_NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const MSG_INVALID_EMAIL: &str = "Invalid email address";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const MSG_PASSWORD_WEAK: &str = "Password must include at least one lowercase letter, one uppercase letter, one number, and one special character";

/// Special characters accepted in passwords
pub const PASSWORD_SPECIALS: &str = "@$!%*?&";

/// User roles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// User entity as stored in MongoDB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub firstname: String,
    #[serde(default)]
    pub lastname: Option<String>,
    /// Lowercased, unique
    pub email: String,
    /// Argon2 PHC string. Only [`UserResponse`] goes over the wire.
    pub password_hash: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an unverified user (password must already be hashed)
    pub fn new(
        firstname: String,
        lastname: Option<String>,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            firstname,
            lastname,
            email,
            password_hash,
            role,
            verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Public view of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: Option<String>,
    pub email: String,
    pub role: Role,
    pub verified: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            firstname: user.firstname,
            lastname: user.lastname,
            email: user.email,
            role: user.role,
            verified: user.verified,
        }
    }
}

/// Pending email verification code for one user
#[derive(Debug, Clone, PartialEq)]
pub struct OtpVerification {
    pub id: Uuid,
    pub user_id: Uuid,
    /// SHA-256 hex of the code
    pub code_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpVerification {
    pub fn new(user_id: Uuid, code_hash: String, ttl_secs: u64) -> Self {
        let now = Utc::now();
        let ttl = chrono::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
        Self {
            id: Uuid::now_v7(),
            user_id,
            code_hash,
            created_at: now,
            expires_at: now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().chars().count() < 2 {
        return Err(ValidationError::new("name_length"));
    }
    Ok(())
}

fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !value.trim().validate_email() {
        return Err(ValidationError::new("email"));
    }
    Ok(())
}

/// Requires one lowercase, one uppercase, one digit and one of `@$!%*?&`,
/// and allows nothing outside those classes.
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    let allowed = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_special = value.chars().any(|c| PASSWORD_SPECIALS.contains(c));

    if allowed && has_lower && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength"))
    }
}

fn validate_otp_digits(value: &str) -> Result<(), ValidationError> {
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("otp_digits"));
    }
    Ok(())
}

/// Body of `POST /register`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_name", message = "Name must be at least 2 characters"))]
    pub firstname: String,
    #[validate(custom(function = "validate_name", message = "Name must be at least 2 characters"))]
    pub lastname: String,
    #[validate(custom(function = "validate_email", message = "Invalid email address"))]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        custom(
            function = "validate_password_strength",
            message = "Password must include at least one lowercase letter, one uppercase letter, one number, and one special character"
        )
    )]
    pub password: String,
}

/// Body of `POST /login`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(custom(function = "validate_email", message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Body of `POST /verify-otp`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub user_id: Uuid,
    #[validate(
        length(equal = 6, message = "OTP must be exactly 6 digits."),
        custom(function = "validate_otp_digits", message = "OTP must contain only numbers.")
    )]
    pub otp: String,
}

/// Body of `POST /resend-otp`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResendOtpRequest {
    pub user_id: Uuid,
    #[validate(custom(function = "validate_email", message = "Invalid email address"))]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
}

/// Response carrying a freshly issued token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserResponse,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
