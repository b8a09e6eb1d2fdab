//! Credit Risk Prediction Server
//!
//! Unified scoring backend for three lending-portfolio services:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CREDIT RISK SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐  │
//! │  │ Default Risk │  │ Impairment / │  │ Branch           │  │
//! │  │ (PD scoring) │  │ ECL          │  │ Performance      │  │
//! │  └──────┬───────┘  └──────┬───────┘  └────────┬─────────┘  │
//! │         └─────────────────┼────────────────────┘            │
//! │                           ▼                                 │
//! │                  ┌────────────────┐                        │
//! │                  │ Model Registry │                        │
//! │                  │ (JSON bundles) │                        │
//! │                  └────────────────┘                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Models are loaded once at startup; requests that arrive before a
//! model bundle exists fall back to rule-based scoring (default risk)
//! or return 503 (impairment, branch).

mod config;
mod error;
mod handlers;
mod logic;
mod schemas;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::model::ModelRegistry;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "creditrisk_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("Credit risk server starting...");
    tracing::info!("Model directory: {}", config.model_dir.display());

    // Load model bundles once; missing or corrupt files are logged and
    // skipped, the affected endpoints degrade rather than abort startup.
    let registry = ModelRegistry::load(&config.model_dir);

    let state = AppState {
        registry: Arc::new(registry),
        config: config.clone(),
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let default_risk_routes = Router::new()
        .route("/api/v1/default-risk/predict", post(handlers::default_risk::predict))
        .route("/api/v1/default-risk/predict/all", post(handlers::default_risk::predict_all))
        .route("/api/v1/default-risk/models/info", get(handlers::default_risk::models_info));

    let impairment_routes = Router::new()
        .route("/api/v1/impairment/predict", post(handlers::impairment::predict))
        .route("/api/v1/impairment/predict/batch", post(handlers::impairment::predict_batch))
        .route("/api/v1/impairment/models/info", get(handlers::impairment::models_info));

    let branch_routes = Router::new()
        .route("/api/v1/branch/predict", post(handlers::branch::predict))
        .route("/api/v1/branch/predict/batch", post(handlers::branch::predict_batch))
        .route("/api/v1/branch/model/info", get(handlers::branch::model_info))
        .route("/api/v1/branch/model/feature-importance", get(handlers::branch::feature_importance));

    Router::new()
        .route("/health", get(handlers::health::check))
        .merge(default_risk_routes)
        .merge(impairment_routes)
        .merge(branch_routes)
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
