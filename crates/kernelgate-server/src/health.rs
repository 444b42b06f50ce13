//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the gateway is running.
    pub status: String,
    /// Seconds since the gateway started.
    pub uptime_secs: u64,
    /// Currently relayed WebSocket connections.
    pub connections: usize,
}

/// Build a health response from live counters.
#[must_use]
pub fn health_check(start_time: Instant, connections: usize) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        connections,
    }
}
