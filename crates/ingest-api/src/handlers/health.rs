//! Health check endpoints for the cartnotify API.

use axum::{extract::State, http::StatusCode, Json};
use cartnotify_worker_pool::{PoolStatsSnapshot, StatusCounts};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Health status ("ok" or "unhealthy")
    pub status: String,
}

/// Detailed health check response for the API.
#[derive(Debug, Serialize)]
pub struct ApiHealthResponse {
    /// Overall health status
    pub status: String,

    /// Database connectivity status
    pub database: String,

    /// Events per status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<StatusCounts>,

    /// Counters of the local worker pool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<PoolStatsSnapshot>,

    /// Server uptime in seconds
    pub uptime_seconds: u64,

    /// Server version
    pub version: String,
}

/// Basic health check endpoint.
///
/// `GET /health`
///
/// Returns quickly without touching the database; suitable for load
/// balancer probes.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Detailed API health check endpoint.
///
/// `GET /api/health`
///
/// Reports database connectivity, the queue backlog by status and the
/// worker pool counters.
///
/// # Returns
///
/// - `200 OK` if the database is reachable
/// - `503 Service Unavailable` otherwise
pub async fn api_health(State(state): State<AppState>) -> (StatusCode, Json<ApiHealthResponse>) {
    let db_healthy = state.store.health_check().await;

    let events = if db_healthy {
        match state.store.count_by_status().await {
            Ok(counts) => Some(counts),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to count events for health check");
                None
            }
        }
    } else {
        None
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ApiHealthResponse {
        status: if db_healthy { "ok" } else { "unhealthy" }.to_string(),
        database: if db_healthy {
            "connected"
        } else {
            "disconnected"
        }
        .to_string(),
        events,
        workers: state.pool_stats.as_ref().map(|stats| stats.snapshot()),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let response = health_check().await;
        assert_eq!(response.status, "ok");
    }
}
