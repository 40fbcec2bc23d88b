//! Farm2Value dashboard - Backend Server
//!
//! Serves mango yield predictions, weather data and fruit counting to the
//! Farm2Value dashboard.

use std::net::SocketAddr;

use farm2value_backend::{config::Config, create_app, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farm2value_server=debug,farm2value_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::load()?;

    tracing::info!("Starting Farm2Value Dashboard Server");
    tracing::info!("Environment: {}", config.environment);
    if config.weather.api_key.is_empty() {
        tracing::warn!("Weather API key not configured; current conditions are unavailable");
    }
    if config.defaults.coordinates().is_none() {
        tracing::info!("No default coordinates configured; requests without a known district skip live weather");
    }

    let host: std::net::IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));

    // Create application state
    let state = AppState::new(config)?;

    // Build application
    let app = create_app(state);

    // Start server
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
