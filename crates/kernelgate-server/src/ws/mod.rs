//! The kernel channels WebSocket endpoint.
//!
//! `GET /api/kernels/{kernel_id}/channels` — admission, sub-protocol
//! negotiation, then upgrade into the relay.

pub mod admission;
pub mod intercept;
pub mod negotiate;
pub mod relay;

use axum::extract::{Path, Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use kernelgate_core::KernelId;
use serde::Deserialize;
use tracing::debug;

use crate::errors::GateError;
use crate::server::AppState;

/// Query parameters consumed at admission.
#[derive(Debug, Deserialize)]
pub struct ChannelsQuery {
    /// Client session identifier bound to the relay handle when present.
    pub session_id: Option<String>,
}

/// Handle the kernel channels upgrade request.
///
/// Admission (authentication, authorization, kernel resolution, relay handle
/// construction) runs to completion before the handshake is accepted; the
/// negotiated sub-protocol is applied to the upgrade response once.
pub async fn channels_handler(
    State(state): State<AppState>,
    Path(kernel_id): Path<String>,
    Query(query): Query<ChannelsQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, GateError> {
    let kernel_id = KernelId::parse(&kernel_id)?;
    let admission =
        admission::admit(&state, &kernel_id, query.session_id.as_deref(), &headers).await?;

    let offered = negotiate::offered_protocols(&headers);
    let selected = negotiate::select_subprotocol(
        admission.connection.preferred_subprotocol().as_deref(),
        &offered,
    );
    debug!(kernel_id = %kernel_id, selected = ?selected, "sub-protocol negotiated");

    let mut upgrade = ws.max_message_size(state.config.max_message_size);
    if let Some(protocol) = selected {
        upgrade = upgrade.protocols([protocol]);
    }

    let capacity = state.config.outbound_capacity;
    let active = state.active.clone();
    Ok(upgrade.on_upgrade(move |socket| relay::run_relay(socket, admission, capacity, active)))
}
