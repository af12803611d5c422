//! Car registry agent - HTTP conversation driver
//!
//! Opens the car registry, loads the agent profile and serves one session
//! per conversation over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use car_registry_agent::config::Config;
use car_registry_agent::routes::{self, AppState};
use car_registry_agent::{DialogueController, SqliteRecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_registry_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let profile = config.load_profile()?;

    let store = Arc::new(SqliteRecordStore::open(&config.db_path).await?);
    tracing::info!("🚗 Car registry open at {}", config.db_path.display());

    let state = AppState::new(profile, DialogueController::new(store));

    let app = routes::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("🔥 Car registry agent running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
