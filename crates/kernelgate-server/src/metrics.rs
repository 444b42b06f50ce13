//! Prometheus metrics recorder and name constants.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus metrics recorder (global).
///
/// Returns the `PrometheusHandle` used to render the `/metrics` endpoint.
/// Call once at startup, before any metrics are recorded.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

// Metric name constants to avoid typos across modules.

/// WebSocket connections opened total (counter).
pub const WS_CONNECTIONS_TOTAL: &str = "ws_connections_total";
/// WebSocket disconnections total (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Active relayed connections (gauge).
pub const WS_CONNECTIONS_ACTIVE: &str = "ws_connections_active";
/// Connection duration seconds (histogram).
pub const WS_CONNECTION_DURATION_SECONDS: &str = "ws_connection_duration_seconds";
/// Handshake rejections (counter, labels: reason).
pub const ADMISSION_REJECTIONS_TOTAL: &str = "admission_rejections_total";
/// Kernel connect failures (counter).
pub const KERNEL_CONNECT_FAILURES_TOTAL: &str = "kernel_connect_failures_total";
/// Inbound frames relayed to kernels (counter).
pub const FRAMES_INBOUND_TOTAL: &str = "frames_inbound_total";
/// Outbound frames relayed to clients (counter).
pub const FRAMES_OUTBOUND_TOTAL: &str = "frames_outbound_total";
/// Execute-request rewrites applied (counter).
pub const EXECUTE_REWRITES_TOTAL: &str = "execute_rewrites_total";
/// Inbound text frames that failed envelope parsing (counter).
pub const FRAME_PARSE_FAILURES_TOTAL: &str = "frame_parse_failures_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_and_render() {
        // Build a recorder + handle (no global install to avoid test conflicts).
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = handle.render();
        assert!(output.is_empty() || output.contains('\n') || output.contains('#'));
    }

    #[test]
    fn metric_names_are_snake_case() {
        let names = [
            WS_CONNECTIONS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_CONNECTIONS_ACTIVE,
            WS_CONNECTION_DURATION_SECONDS,
            ADMISSION_REJECTIONS_TOTAL,
            KERNEL_CONNECT_FAILURES_TOTAL,
            FRAMES_INBOUND_TOTAL,
            FRAMES_OUTBOUND_TOTAL,
            EXECUTE_REWRITES_TOTAL,
            FRAME_PARSE_FAILURES_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
