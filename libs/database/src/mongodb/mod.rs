//! MongoDB connector and helpers.

mod config;
mod connector;
mod convert;
mod errors;
mod health;

pub use config::MongoConfig;
pub use connector::{
    MongoError, connect, connect_from_config, connect_from_config_with_retry, connect_with_retry,
};
pub use convert::{from_bson_datetime, to_bson_datetime, uuid_to_bson};
pub use errors::{DUPLICATE_KEY_CODE, is_duplicate_key};
pub use health::{HealthStatus, check_health, check_health_detailed, ping};

pub use mongodb::{Client, Collection, Database};
