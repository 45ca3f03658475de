//! Tamper Sentinel Monitoring/Control Server
//!
//! REST API over the status board: state queries, the remote kill switch,
//! and counter resets. Every handler goes through the board's single
//! synchronization point; nothing here can block the detection loop, and a
//! misbehaving client only ever fails its own connection.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use calibration::ThresholdModel;
use serde::Serialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tamper_state::{StateError, StatusBoard};
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod rate_limit;
mod routes;
pub mod settings;

pub use settings::Settings;

/// Application state shared across handlers
pub struct AppState {
    /// Status board written by the fusion engine
    pub board: Arc<StatusBoard>,
    /// Calibrated model, read-only at runtime
    pub model: ThresholdModel,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(board: Arc<StatusBoard>, model: ThresholdModel) -> Self {
        Self {
            board,
            model,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Handler-level error
///
/// A `StateError` maps to a 500: it means the shared-state invariant broke,
/// which the detection loop treats as fatal too. Everything else the router
/// answers with a client error and the loop never notices.
pub struct ApiError(StateError);

impl From<StateError> for ApiError {
    fn from(err: StateError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub components: ComponentStatus,
}

/// Component status
#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub detector: ComponentHealth,
    pub sensors: ComponentHealth,
}

/// Individual component health
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub detail: Option<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/status", get(routes::status::get_status))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route("/api/v1/kill-switch", post(routes::control::set_kill_switch))
        .route(
            "/api/v1/reset-counters",
            post(routes::control::reset_counters),
        )
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<HealthResponse>, ApiError> {
    let snapshot = state.board.snapshot()?;

    let detector = if snapshot.total_readings > 0 {
        ComponentHealth {
            status: "ok".to_string(),
            detail: Some(format!("{} cycles", snapshot.total_readings)),
        }
    } else {
        ComponentHealth {
            status: "starting".to_string(),
            detail: None,
        }
    };

    let sensors = if snapshot.consecutive_faults > 0 {
        ComponentHealth {
            status: "degraded".to_string(),
            detail: Some(format!(
                "{} consecutive faulty cycles",
                snapshot.consecutive_faults
            )),
        }
    } else {
        ComponentHealth {
            status: "ok".to_string(),
            detail: None,
        }
    };

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        components: ComponentStatus { detector, sensors },
    }))
}

/// Unrecognized paths get a client error, never a crash
async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "unknown path" })),
    )
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server until it fails or the process exits
pub async fn run_server(settings: &Settings, state: Arc<AppState>) -> anyhow::Result<()> {
    let governor = rate_limit::create_governor_config(&rate_limit::RateLimitConfig::default());
    let app = create_router(state).layer(GovernorLayer { config: governor });

    info!("starting monitoring server on {}", settings.listen);

    let listener = tokio::net::TcpListener::bind(&settings.listen).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
