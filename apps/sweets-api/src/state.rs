//! Application state management

use axum_helpers::JwtAuth;
use domain_sweets::{MongoSweetRepository, SweetService};
use domain_users::{MongoOtpRepository, MongoUserRepository, UserService};
use email::OtpMailer;
use mongodb::{Client, Database};

use crate::config::Config;

pub type Users = UserService<MongoUserRepository, MongoOtpRepository>;
pub type Sweets = SweetService<MongoSweetRepository>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub mongo_client: Client,
    pub db: Database,
    pub jwt: JwtAuth,
    pub users: Users,
    pub sweets: Sweets,
}

impl AppState {
    pub fn new(config: Config, mongo_client: Client, mailer: OtpMailer) -> Self {
        let db = mongo_client.database(config.mongodb.database());
        let jwt = JwtAuth::new(&config.jwt);

        let users = UserService::new(
            MongoUserRepository::new(&db),
            MongoOtpRepository::new(&db),
            jwt.clone(),
            mailer,
            config.auth.clone(),
        );
        let sweets = SweetService::new(MongoSweetRepository::new(&db));

        Self {
            config,
            mongo_client,
            db,
            jwt,
            users,
            sweets,
        }
    }
}
