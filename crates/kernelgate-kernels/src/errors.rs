//! Kernel registry and connection errors.

use kernelgate_core::KernelId;

/// Errors surfaced by the kernel registry and relay handles.
#[derive(Debug, thiserror::Error)]
pub enum KernelsError {
    /// The registry has no kernel with this ID.
    #[error("kernel not found: {0}")]
    KernelNotFound(KernelId),

    /// The backend channel could not be established.
    #[error("kernel connect failed: {reason}")]
    ConnectFailed {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Legacy preparation step failed before the handshake.
    #[error("kernel connection prepare failed: {reason}")]
    PrepareFailed {
        /// Description of the underlying failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_includes_id() {
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        let err = KernelsError::KernelNotFound(id);
        assert!(err.to_string().contains("a1-b2-c3-d4-e5"));
    }

    #[test]
    fn connect_failed_display() {
        let err = KernelsError::ConnectFailed {
            reason: "socket refused".into(),
        };
        assert_eq!(err.to_string(), "kernel connect failed: socket refused");
    }
}
