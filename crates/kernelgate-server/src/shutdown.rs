//! Graceful shutdown coordination via `CancellationToken`.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default wait for the serve task to drain before giving up.
const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Coordinates graceful shutdown of the gateway.
///
/// The serve loop and every relay task observe the same token; cancelling it
/// stops accepting upgrades and lets in-flight relays wind down.
#[derive(Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
}

impl ShutdownCoordinator {
    /// Create a new coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a clone of the cancellation token.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Initiate shutdown. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether a shutdown has been initiated.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel and wait for the serve task to finish, up to `timeout`.
    pub async fn drain(&self, handle: JoinHandle<()>, timeout: Option<Duration>) {
        let timeout = timeout.unwrap_or(DEFAULT_DRAIN_TIMEOUT);
        self.shutdown();
        info!(timeout_secs = timeout.as_secs(), "draining gateway");
        if tokio::time::timeout(timeout, handle).await.is_err() {
            warn!("drain timed out after {timeout:?}, serve task still running");
        }
    }
}
