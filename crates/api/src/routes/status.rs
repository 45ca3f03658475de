//! Status Route

use axum::{extract::State, Json};
use std::sync::Arc;
use tamper_state::SystemState;

use crate::{ApiError, AppState};

/// Get the current system snapshot
pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SystemState>, ApiError> {
    Ok(Json(state.board.snapshot()?))
}
