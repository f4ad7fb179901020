use crate::Environment;
use tracing::{debug, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset in development.
const DEV_FILTER: &str = "debug,hyper=info,h2=info,mongodb=info,lettre=info,tower_http=debug";

/// Default filter when `RUST_LOG` is unset in production.
const PROD_FILTER: &str = "info,mongodb=warn,lettre=warn";

/// Install color-eyre with the workspace defaults.
///
/// Call this first thing in `main()`. Repeated calls are ignored.
pub fn install_color_eyre() {
    let _ = color_eyre::config::HookBuilder::default()
        .display_location_section(true)
        .display_env_section(false)
        .install();
}

/// Build the `EnvFilter`, honouring `RUST_LOG` when present.
fn build_filter(environment: &Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if environment.is_production() {
            EnvFilter::new(PROD_FILTER)
        } else {
            EnvFilter::new(DEV_FILTER)
        }
    })
}

/// Initialize the global tracing subscriber.
///
/// - **Production** (`APP_ENV=production`): flattened JSON events for log shippers.
/// - **Development** (default): pretty, human-readable output.
///
/// Both variants install `tracing_error::ErrorLayer` so `eyre` reports carry span traces.
/// `RUST_LOG` overrides the default filter, e.g. `RUST_LOG=sweets_api=trace`.
///
/// Safe to call more than once; later calls are no-ops (useful in tests).
pub fn init_tracing(environment: &Environment) {
    let filter = build_filter(environment);

    let result = if environment.is_production() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .pretty(),
            )
            .with(tracing_error::ErrorLayer::default())
            .with(filter)
            .try_init()
    };

    match result {
        Ok(_) => info!(environment = ?environment, "Tracing initialized"),
        Err(_) => debug!("Tracing already initialized, skipping re-initialization"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_development() {
        init_tracing(&Environment::Development);
    }

    #[test]
    fn test_init_tracing_production() {
        init_tracing(&Environment::Production);
    }

    #[test]
    fn test_init_tracing_multiple_calls() {
        let env = Environment::Development;
        init_tracing(&env);
        init_tracing(&env);
    }

    #[test]
    fn test_build_filter_respects_rust_log() {
        temp_env::with_var("RUST_LOG", Some("warn"), || {
            let filter = build_filter(&Environment::Development);
            assert_eq!(filter.to_string(), "warn");
        });
    }

    #[test]
    fn test_build_filter_defaults_by_environment() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert!(build_filter(&Environment::Production)
                .to_string()
                .contains("mongodb=warn"));
            assert!(build_filter(&Environment::Development)
                .to_string()
                .contains("tower_http=debug"));
        });
    }
}
