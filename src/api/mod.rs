//! SmartCare REST API
//!
//! HTTP API layer, built with Axum.
//!
//! # Endpoints
//!
//! ## Insights
//! - `GET /api/v1/insights/:subject_id` - Feeding, nap and growth predictions
//!
//! ## Feedback
//! - `POST /api/v1/feedback` - Rate a prediction type
//! - `GET /api/v1/subjects/:subject_id/feedback/summary` - Vote counts
//!
//! ## Subjects
//! - `GET /api/v1/subjects` - List subjects
//! - `POST /api/v1/subjects` - Register a subject
//! - `GET /api/v1/subjects/:subject_id` - Get a subject
//!
//! ## Events
//! - `POST /api/v1/subjects/:subject_id/events` - Log an event
//! - `GET /api/v1/subjects/:subject_id/events` - Recent events
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,no_run
//! use smartcare::api::{serve, AppState};
//! use smartcare::config::ApiConfig;
//! use smartcare::insights::InsightSettings;
//! use smartcare::storage::SqliteStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(SqliteStore::open(std::path::Path::new("./smartcare_data"))?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, &InsightSettings::default(), config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use extract::ApiJson;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/insights/:subject_id", get(routes::insights::get_insights))
        .route("/feedback", post(routes::feedback::submit_feedback))
        .route(
            "/subjects",
            get(routes::subjects::list_subjects).post(routes::subjects::create_subject),
        )
        .route("/subjects/:subject_id", get(routes::subjects::get_subject))
        .route(
            "/subjects/:subject_id/events",
            get(routes::events::list_events).post(routes::events::record_event),
        )
        .route(
            "/subjects/:subject_id/feedback/summary",
            get(routes::feedback::feedback_summary),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = Duration::from_secs(state.config.request_timeout_secs.max(1));
    let body_limit = state.config.max_body_size;

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin when none are configured; unparseable origins are skipped
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("SmartCare API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("SmartCare API shut down gracefully");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
