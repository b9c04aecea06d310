use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wallgame::config::Config;
use wallgame::services::store::{GameStore, NullStore, PgStore};
use wallgame::{db, routes, services, state};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let store: Arc<dyn GameStore> = match config.database_url.as_deref() {
        Some(url) => match db::init_pool(url, config.db_max_connections).await {
            Ok(pool) => Arc::new(PgStore::new(pool)),
            Err(e) => {
                warn!(error = %e, "database unavailable; games will not be persisted");
                Arc::new(NullStore)
            }
        },
        None => {
            info!("DATABASE_URL not set; games will not be persisted");
            Arc::new(NullStore)
        }
    };

    let port = config.port;
    let state = state::AppState::new(store, config);

    // Spawn background clock task.
    let _clock = services::clock::spawn_clock_task(state.clone());

    let app = routes::app(state);
    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%port, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(%port, "wallgame listening");
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
