//! Septoctor Inference Server
//!
//! HTTP front for the neonatal sepsis risk model.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SEPTOCTOR API                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────────────────────────────┐   │
//! │  │  Router   │  │  spawn_blocking                      │   │
//! │  │  (Axum)   │─▶│  map → order → score → explain       │   │
//! │  └───────────┘  └──────────────────┬───────────────────┘   │
//! │                                    ▼                        │
//! │                       ┌────────────────────────┐           │
//! │                       │ Arc<ModelContext>      │           │
//! │                       │ (loaded once, read-only)│          │
//! │                       └────────────────────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod models;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use septoctor_core::constants::{APP_NAME, APP_VERSION};
use septoctor_core::ModelContext;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging; `log` records from the core are bridged in
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "septoctor_api=debug,septoctor_core=info,tower_http=debug".into()))
        .with(config.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!config.json_logs).then(tracing_subscriber::fmt::layer))
        .init();

    tracing::info!("{} inference server v{} starting ({})", APP_NAME, APP_VERSION, config.environment);
    tracing::info!("Artifacts: {}", config.artifacts_dir.display());
    if config.is_production() && !config.json_logs {
        tracing::warn!("Production without LOG_FORMAT=json; log lines will not be structured");
    }

    let model = match ModelContext::load(&config.artifact_paths()) {
        Ok(model) => model,
        Err(e) => {
            tracing::error!("Failed to load model artifacts: {}", e);
            return Err(e).context("model artifacts failed to load");
        }
    };

    if !model.metadata().layout_compatible() {
        tracing::error!(
            unmapped = ?model.metadata().unmapped_features,
            "Serving with an incompatible feature layout; /predict will fail"
        );
    }

    // Build application state
    let state = AppState {
        model: Arc::new(model),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelContext>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/schema", get(handlers::schema::describe))
        .route("/predict", post(handlers::predict::predict))
        .route("/clinical-scores", post(handlers::scores::compute))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
