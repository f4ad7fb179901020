/// Errors raised while connecting to or probing the database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    /// Connection failed after retries
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<core_config::ConfigError> for DatabaseError {
    fn from(e: core_config::ConfigError) -> Self {
        DatabaseError::ConfigError(e.to_string())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
