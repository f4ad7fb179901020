//! Sweets API - REST server

use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use email::{EmailProvider, LogEmailProvider, OtpMailer, SmtpProvider, TemplateEngine};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

    let mongo_client =
        database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;

    info!(
        "Successfully connected to MongoDB database: {}",
        config.mongodb.database()
    );

    let provider: Arc<dyn EmailProvider> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpProvider::new(smtp.clone())?),
        None => {
            warn!("SMTP_HOST not set, OTP emails will be logged instead of sent");
            Arc::new(LogEmailProvider::new())
        }
    };
    let mailer = OtpMailer::new(
        provider,
        Arc::new(TemplateEngine::new()?),
        config.mail_app_name.clone(),
    );
    info!(provider = mailer.provider_name(), "OTP mailer ready");

    let state = AppState::new(config, mongo_client, mailer);

    api::init_indexes(&state).await?;

    let api_routes = api::routes(&state);
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;
    let app = router
        .merge(health_router(state.config.app))
        .merge(api::health::router(state.clone()));

    info!("Starting Sweets API on port {}", state.config.server.port);

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        info!("Shutting down: closing MongoDB connections");
        drop(state.mongo_client);
        info!("MongoDB connection closed");
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Sweets API shutdown complete");
    Ok(())
}
