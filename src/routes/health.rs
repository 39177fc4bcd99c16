//! Health check endpoints
//!
//! - /health  - liveness probe, 200 while the service is running
//! - /ready   - readiness probe, 200 once backing services are wired up
//! - /version - build information for deployment verification

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Serialize;
use std::sync::Arc;

use crate::routes::json_response;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: &'static str,
    pub timestamp: String,
    pub mode: String,
    pub node_id: String,
    pub store: StoreHealth,
    pub queue: QueueHealth,
}

#[derive(Serialize)]
pub struct StoreHealth {
    pub backend: &'static str,
}

#[derive(Serialize)]
pub struct QueueHealth {
    pub connected: bool,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
        mode: if state.args.dev_mode {
            "development".to_string()
        } else {
            "production".to_string()
        },
        node_id: state.args.node_id.to_string(),
        store: StoreHealth {
            backend: state.store_backend,
        },
        queue: QueueHealth {
            connected: state.nats.is_some(),
        },
    }
}

/// Liveness probe (/health)
pub fn health_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &build_health_response(&state))
}

/// Readiness probe (/ready)
///
/// The clock-in consumer needs the queue; in dev mode the queue is optional.
pub fn readiness_check(state: Arc<AppState>) -> Response<Full<Bytes>> {
    let response = build_health_response(&state);
    let status = if response.queue.connected || state.args.dev_mode {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    json_response(status, &response)
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_time: &'static str,
    pub service: &'static str,
}

/// Version endpoint (/version)
pub fn version_info() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
            build_time: option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
            service: "rosterd",
        },
    )
}
