//! Alert Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tamper_state::AlertEvent;

use crate::{ApiError, AppState};

/// Response for the alerts endpoint
#[derive(Debug, Serialize)]
pub struct AlertResponse {
    /// Recent alert events, oldest first
    pub data: Vec<AlertEvent>,
    pub count: usize,
    /// Idle-to-alerting transitions since start or last reset
    pub anomaly_count: u64,
    pub light_anomalies: u64,
    pub shake_anomalies: u64,
}

/// Get recent alerts and anomaly counters
pub async fn get_alerts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AlertResponse>, ApiError> {
    let snapshot = state.board.snapshot()?;
    let data = state.board.recent_alerts()?;

    Ok(Json(AlertResponse {
        count: data.len(),
        data,
        anomaly_count: snapshot.anomaly_count,
        light_anomalies: snapshot.light_anomalies,
        shake_anomalies: snapshot.shake_anomalies,
    }))
}
