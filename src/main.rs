use api_rest::{router, AppState};
use api_shared::ApiKeyProvider;
use hms_core::config::{resolve_data_dir, seed_mode_from_env_value};
use hms_core::CoreConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the HMS application
///
/// Loads `.env`, resolves configuration once, opens the entity store and serves the REST API
/// (with Swagger UI at `/swagger-ui`). Every route except `/health` requires an `x-api-key`
/// header matching one of the configured role keys.
///
/// # Environment Variables
/// - `HMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HMS_DATA_DIR`: Directory for the JSON collections (default: "hms_data")
/// - `HMS_SEED`: `demo` or `empty` (default: "demo")
/// - `HMS_ADMIN_API_KEY`: API key granted the admin (chief) role
/// - `HMS_CLERK_API_KEY`: API key granted the clerk role
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, store opening or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hms_run=info".parse()?)
                .add_directive("hms_core=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let cfg = CoreConfig::new(
        resolve_data_dir(std::env::var("HMS_DATA_DIR").ok()),
        seed_mode_from_env_value(std::env::var("HMS_SEED").ok())?,
    )?;
    let auth = ApiKeyProvider::from_env_values(
        std::env::var("HMS_ADMIN_API_KEY").ok(),
        std::env::var("HMS_CLERK_API_KEY").ok(),
    )?;
    tracing::info!(?auth, "API keys configured");

    let store = cfg.open_store()?;

    tracing::info!("++ Starting HMS REST on {}", rest_addr);

    let app = router(AppState::new(store, auth));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
