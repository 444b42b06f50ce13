//! Sub-protocol negotiation.
//!
//! Pure selection logic: the caller reads the relay handle's preference and
//! the client's offered list, and applies the returned selection to the
//! upgrade response exactly once. No hidden mutation during negotiation.

use axum::http::HeaderMap;
use axum::http::header::SEC_WEBSOCKET_PROTOCOL;
use kernelgate_core::KERNEL_WS_PROTOCOL_V1;

/// Sub-protocols offered by the client, in header order.
#[must_use]
pub fn offered_protocols(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(SEC_WEBSOCKET_PROTOCOL)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Choose one sub-protocol from the client's offered list, or none.
///
/// - `preferred` absent → the v1 kernel protocol is the effective preference.
/// - `preferred` explicitly empty → no preference; none is selected and the
///   transport falls back to the legacy protocol.
/// - The effective preference is selected only when the client offered it.
#[must_use]
pub fn select_subprotocol(preferred: Option<&str>, offered: &[String]) -> Option<String> {
    let effective = match preferred {
        None => KERNEL_WS_PROTOCOL_V1,
        Some("") => return None,
        Some(p) => p,
    };
    offered
        .iter()
        .any(|o| o == effective)
        .then(|| effective.to_owned())
}
