mod api;

use axum::Router;
use std::sync::Arc;
use tidewatch::config::Config;
use tidewatch::services::DashboardService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let dashboard = Arc::new(DashboardService::from_config(&config));
        Self {
            config: Arc::new(config),
            dashboard,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tidewatch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Starting Tidewatch for {} on {}:{}",
        config.asset, config.host, config.port
    );

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(api::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Tidewatch listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
