//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you want the REST server (with OpenAPI/Swagger
//! UI) without the `.env` handling of the workspace's main `hms-run` binary.

use api_rest::{router, AppState};
use api_shared::ApiKeyProvider;
use hms_core::config::{resolve_data_dir, seed_mode_from_env_value};
use hms_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HMS REST API server
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `HMS_DATA_DIR`: Directory for the JSON collections (default: "hms_data")
/// - `HMS_SEED`: `demo` or `empty` fallback data for missing collections (default: "demo")
/// - `HMS_ADMIN_API_KEY` / `HMS_CLERK_API_KEY`: API keys for the two roles
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - no API key is configured or the store cannot be opened,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("hms_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        resolve_data_dir(std::env::var("HMS_DATA_DIR").ok()),
        seed_mode_from_env_value(std::env::var("HMS_SEED").ok())?,
    )?;
    let auth = ApiKeyProvider::from_env_values(
        std::env::var("HMS_ADMIN_API_KEY").ok(),
        std::env::var("HMS_CLERK_API_KEY").ok(),
    )?;
    let store = cfg.open_store()?;

    tracing::info!("-- Starting HMS REST API on {}", addr);

    let app = router(AppState::new(store, auth));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
