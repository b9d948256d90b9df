//! Health and capability handlers.

use axum::Json;
use chrono::Utc;
use serde::Serialize;

/// Letters the service can report. J and Z require motion and are only
/// reachable through their static approximations.
const LABELS: [char; 24] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S',
    'T', 'U', 'V', 'W', 'X', 'Y',
];

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Capability descriptor returned from the service root.
#[derive(Serialize)]
pub struct CapabilitiesResponse {
    pub service: String,
    pub version: String,
    pub pipeline: String,
    pub labels: Vec<char>,
    pub motion_signs_supported: bool,
}

/// Service root: status and capability descriptor.
pub async fn capabilities() -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        service: "asl-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pipeline: "skeleton".to_string(),
        labels: LABELS.to_vec(),
        motion_signs_supported: false,
    })
}
