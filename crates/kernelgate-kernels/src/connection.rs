//! Relay handle contract.
//!
//! A [`KernelConnection`] bridges one gateway connection to one kernel's
//! native protocol. It is created at admission, connected after the
//! transport handshake, fed every (possibly rewritten) inbound frame, and
//! disconnected exactly once when the transport closes. The gateway never
//! shares a handle between connections.

use std::sync::Arc;

use async_trait::async_trait;
use kernelgate_core::Frame;
use tokio::sync::mpsc;

use crate::errors::KernelsError;
use crate::manager::Kernel;

/// Channel on which a connection emits kernel→client frames. The gateway
/// owns the receiving end and forwards to the client sink in emission order.
pub type OutboundSender = mpsc::Sender<Frame>;

/// Per-connection adapter between the gateway and one kernel.
#[async_trait]
pub trait KernelConnection: Send + Sync {
    /// Sub-protocol this connection wants the gateway to select.
    ///
    /// `None` means no value is set (the gateway falls back to the v1
    /// protocol); `Some("")` means an explicit no-preference (legacy
    /// behavior, no sub-protocol selected).
    fn preferred_subprotocol(&self) -> Option<String>;

    /// Bind the client-supplied session identifier.
    fn set_session(&self, session_id: String);

    /// Whether this connection needs [`prepare`](Self::prepare) called
    /// before the handshake. Resolved once at construction; the gateway
    /// branches on it statically instead of probing capabilities at runtime.
    fn wants_prepare(&self) -> bool {
        false
    }

    /// Optional legacy preparation step, awaited once before the handshake
    /// when [`wants_prepare`](Self::wants_prepare) is set.
    async fn prepare(&self) -> Result<(), KernelsError> {
        Ok(())
    }

    /// Establish the kernel-side channel. Completes only once the kernel
    /// reports ready; not retried by the gateway on failure. Outbound
    /// frames are emitted on `outbound` for the connection's lifetime.
    async fn connect(&self, outbound: OutboundSender) -> Result<(), KernelsError>;

    /// Forward one inbound frame to the kernel.
    async fn handle_incoming(&self, frame: Frame);

    /// Tear down the kernel-side channel. Called exactly once per
    /// connection, after a successful or attempted connect.
    async fn disconnect(&self);
}

/// Builds the relay handle for a resolved kernel.
///
/// The concrete connection class is a deployment decision, so the gateway
/// takes it as an injected factory rather than naming a type.
pub trait ConnectionFactory: Send + Sync {
    /// Create a fresh, unconnected relay handle bound to `kernel`.
    fn create(&self, kernel: Arc<Kernel>) -> Arc<dyn KernelConnection>;
}
