//! Wire-level constants shared across the gateway crates.

/// Default kernel WebSocket sub-protocol, selected when the backend
/// connection expresses no explicit preference.
pub const KERNEL_WS_PROTOCOL_V1: &str = "v1.kernel.websocket.jupyter.org";

/// Message type eligible for the credential-injection rewrite.
pub const MSG_TYPE_EXECUTE_REQUEST: &str = "execute_request";

/// Request header carrying the forwarded access token, read once at
/// connection admission.
pub const FORWARDED_TOKEN_HEADER: &str = "x-forwarded-access-token";

/// Environment variable set by the injected prelude before user code runs.
pub const FORWARDED_TOKEN_ENV: &str = "FORWARDED_ACCESS_TOKEN";

/// Value injected when the forwarded-token header is absent. The literal
/// absence is not distinguishable inside the executed code.
pub const MISSING_TOKEN_SENTINEL: &str = "None";

/// Authorization action checked at admission.
pub const AUTH_ACTION: &str = "execute";

/// Authorization resource class checked at admission.
pub const AUTH_RESOURCE: &str = "kernels";
