use anyhow::{bail, Context};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jobly_api::config::config;
use jobly_api::database::DatabaseManager;
use jobly_api::{app, is_production, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = config();
    info!("Starting Jobly API in {:?} mode", config.environment);

    if is_production!() && config.security.jwt_secret.is_empty() {
        bail!("SECRET_KEY must be set in production");
    }

    let pool = DatabaseManager::connect(&config.database).await?;
    let app = app(AppState::new(pool, config.clone()));

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
