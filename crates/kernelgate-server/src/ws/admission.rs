//! Connection admission.
//!
//! Runs to completion before the transport handshake is accepted: resolve
//! identity, authorize, resolve the kernel, construct the relay handle.
//! Failure here rejects the handshake; no backend resource is touched before
//! the authorization check passes.

use std::sync::Arc;

use axum::http::HeaderMap;
use kernelgate_core::{AUTH_ACTION, AUTH_RESOURCE, KernelId};
use kernelgate_kernels::{Kernel, KernelConnection};
use tracing::{debug, warn};

use crate::auth::Identity;
use crate::errors::GateError;
use crate::server::AppState;
use crate::ws::intercept::ForwardedToken;

/// Everything the relay needs, produced by a successful admission.
pub struct Admission {
    /// The resolved kernel.
    pub kernel: Arc<Kernel>,
    /// Relay handle bound to the kernel, exclusively owned by this connection.
    pub connection: Arc<dyn KernelConnection>,
    /// Authenticated identity, for logging.
    pub identity: Identity,
    /// Forwarded access token captured from the request headers.
    pub token: ForwardedToken,
}

impl std::fmt::Debug for Admission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Admission")
            .field("kernel", &self.kernel)
            .field("identity", &self.identity)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

/// Admit one inbound connection request or reject the handshake.
pub async fn admit(
    state: &AppState,
    kernel_id: &KernelId,
    session_id: Option<&str>,
    headers: &HeaderMap,
) -> Result<Admission, GateError> {
    // Authenticate first.
    let Some(identity) = state.identity.authenticate(headers) else {
        warn!("could not authenticate websocket connection");
        return Err(GateError::Unauthenticated);
    };

    // Then authorize, before any backend resource is resolved.
    if !state
        .authorizer
        .is_authorized(&identity, AUTH_ACTION, AUTH_RESOURCE)
    {
        return Err(GateError::Unauthorized {
            user: identity.name,
            action: AUTH_ACTION.into(),
            resource: AUTH_RESOURCE.into(),
        });
    }

    let kernel = state.kernels.get_kernel(kernel_id)?;
    let connection = state.connections.create(kernel.clone());

    match session_id {
        Some(session_id) => connection.set_session(session_id.to_owned()),
        None => warn!(kernel_id = %kernel_id, "no session id specified"),
    }

    // Legacy connection classes need a preparation step before the
    // handshake; the capability is a static flag on the handle's contract.
    if connection.wants_prepare() {
        connection.prepare().await?;
    }

    let token = ForwardedToken::from_headers(headers);
    debug!(kernel_id = %kernel_id, user = %identity.name, "connection admitted");

    Ok(Admission {
        kernel,
        connection,
        identity,
        token,
    })
}
