use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use crate::routes::SharedState;

pub const SERVICE_NAME: &str = "MediDoctor AI Platform";

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub disclaimer: String,
    pub uptime_seconds: u64,
}

/// API health check
pub async fn root(State(state): State<SharedState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "online".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        disclaimer: "PROTOTYPE ONLY - Not for medical diagnosis".to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}
