//! Gateway error taxonomy.
//!
//! Admission failures map to HTTP responses on the handshake; everything
//! after the upgrade surfaces as transport closure, never as an HTTP error.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernelgate_core::{InvalidKernelId, KernelId};
use kernelgate_kernels::KernelsError;
use tracing::warn;

/// Fatal-at-admission and fatal-for-the-connection errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// No identity could be resolved from the request.
    #[error("could not authenticate websocket connection")]
    Unauthenticated,

    /// The identity lacks permission to execute on kernels.
    #[error("user {user} is not authorized to {action} on {resource}")]
    Unauthorized {
        /// Resolved identity name.
        user: String,
        /// Action that was checked.
        action: String,
        /// Resource class that was checked.
        resource: String,
    },

    /// The path parameter does not match the kernel identifier pattern.
    #[error(transparent)]
    InvalidKernelId(#[from] InvalidKernelId),

    /// The registry has no kernel with this ID.
    #[error("kernel not found: {0}")]
    KernelNotFound(KernelId),

    /// The relay handle's preparation step failed before the handshake.
    #[error("connection prepare failed: {reason}")]
    PrepareFailed {
        /// Description of the underlying failure.
        reason: String,
    },
}

impl GateError {
    /// Handshake status code observable to the client.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated | Self::Unauthorized { .. } => StatusCode::FORBIDDEN,
            Self::InvalidKernelId(_) | Self::KernelNotFound(_) => StatusCode::NOT_FOUND,
            Self::PrepareFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label for rejection metrics.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Unauthorized { .. } => "unauthorized",
            Self::InvalidKernelId(_) => "invalid_kernel_id",
            Self::KernelNotFound(_) => "kernel_not_found",
            Self::PrepareFailed { .. } => "prepare_failed",
        }
    }
}

impl From<KernelsError> for GateError {
    fn from(err: KernelsError) -> Self {
        match err {
            KernelsError::KernelNotFound(id) => Self::KernelNotFound(id),
            KernelsError::ConnectFailed { reason } | KernelsError::PrepareFailed { reason } => {
                Self::PrepareFailed { reason }
            }
        }
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        warn!(reason = self.reason(), error = %self, "websocket handshake rejected");
        metrics::counter!(crate::metrics::ADMISSION_REJECTIONS_TOTAL, "reason" => self.reason())
            .increment(1);
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failures_are_403() {
        assert_eq!(GateError::Unauthenticated.status(), StatusCode::FORBIDDEN);
        let err = GateError::Unauthorized {
            user: "u".into(),
            action: "execute".into(),
            resource: "kernels".into(),
        };
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_kernel_is_404() {
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        assert_eq!(GateError::KernelNotFound(id).status(), StatusCode::NOT_FOUND);
        let err = GateError::InvalidKernelId(InvalidKernelId("x".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn prepare_failure_is_500() {
        let err = GateError::PrepareFailed { reason: "boom".into() };
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn kernels_error_conversion() {
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        let converted: GateError = KernelsError::KernelNotFound(id.clone()).into();
        assert!(matches!(converted, GateError::KernelNotFound(k) if k == id));

        let converted: GateError = KernelsError::ConnectFailed { reason: "r".into() }.into();
        assert!(matches!(converted, GateError::PrepareFailed { .. }));
    }

    #[test]
    fn reason_labels_are_stable() {
        assert_eq!(GateError::Unauthenticated.reason(), "unauthenticated");
        let id = KernelId::parse("a1-b2-c3-d4-e5").unwrap();
        assert_eq!(GateError::KernelNotFound(id).reason(), "kernel_not_found");
    }

    #[test]
    fn unauthorized_message_names_the_check() {
        let err = GateError::Unauthorized {
            user: "alice".into(),
            action: "execute".into(),
            resource: "kernels".into(),
        };
        assert_eq!(
            err.to_string(),
            "user alice is not authorized to execute on kernels"
        );
    }
}
