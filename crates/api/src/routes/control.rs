//! Control Routes (kill switch, counter reset)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{ApiError, AppState};

/// Kill switch request body
#[derive(Debug, Deserialize)]
pub struct KillSwitchRequest {
    pub engaged: bool,
}

/// Kill switch response
#[derive(Debug, Serialize)]
pub struct KillSwitchResponse {
    pub engaged: bool,
}

/// Engage or release the kill switch
///
/// Idempotent; the detection loop observes the change no later than its
/// next cycle. Actuation stops, detection and reporting do not.
pub async fn set_kill_switch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<KillSwitchRequest>,
) -> Json<KillSwitchResponse> {
    info!("kill switch request: engaged={}", request.engaged);
    state.board.set_kill_switch(request.engaged);
    Json(KillSwitchResponse {
        engaged: request.engaged,
    })
}

/// Reset response
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub reset: bool,
}

/// Zero the anomaly counters; the live alert state is untouched
pub async fn reset_counters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResetResponse>, ApiError> {
    state.board.reset_counters()?;
    Ok(Json(ResetResponse { reset: true }))
}
