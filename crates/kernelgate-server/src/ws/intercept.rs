//! Execute-request interception.
//!
//! Every inbound frame passes through [`rewrite_frame`] before reaching the
//! relay handle. Text frames that encode an `execute_request` with a code
//! payload get an environment-variable prelude carrying the forwarded access
//! token; everything else is forwarded untouched. Parse failures never
//! propagate: the original frame is forwarded byte-identical (fail-open),
//! with the error visible only in logs and metrics.

use axum::http::HeaderMap;
use kernelgate_core::{
    Envelope, FORWARDED_TOKEN_ENV, FORWARDED_TOKEN_HEADER, Frame, MISSING_TOKEN_SENTINEL,
    MSG_TYPE_EXECUTE_REQUEST,
};
use metrics::counter;
use tracing::debug;

use crate::metrics::{EXECUTE_REWRITES_TOTAL, FRAME_PARSE_FAILURES_TOTAL};

/// Forwarded access token captured once at connection admission.
#[derive(Clone, Debug)]
pub struct ForwardedToken(Option<String>);

impl ForwardedToken {
    /// Read the token from the admission-time request headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self(
            headers
                .get(FORWARDED_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(ToOwned::to_owned),
        )
    }

    /// Build directly from an optional value (tests, non-HTTP callers).
    #[must_use]
    pub fn from_value(value: Option<String>) -> Self {
        Self(value)
    }

    /// The value spliced into the injected assignment. An absent header
    /// injects the sentinel; code running in the kernel cannot distinguish
    /// absence from the sentinel string.
    #[must_use]
    pub fn injected_value(&self) -> &str {
        self.0.as_deref().unwrap_or(MISSING_TOKEN_SENTINEL)
    }
}

/// Produce the frame to actually forward to the relay handle.
#[must_use]
pub fn rewrite_frame(frame: Frame, token: &ForwardedToken) -> Frame {
    let Frame::Text(text) = frame else {
        return frame;
    };

    let mut envelope = match Envelope::parse(&text) {
        Ok(env) => env,
        Err(err) => {
            debug!(error = %err, "inbound frame is not an envelope, forwarding unmodified");
            counter!(FRAME_PARSE_FAILURES_TOTAL).increment(1);
            return Frame::Text(text);
        }
    };

    if envelope.msg_type() != Some(MSG_TYPE_EXECUTE_REQUEST) {
        return Frame::Text(text);
    }
    let Some(code) = envelope.code() else {
        return Frame::Text(text);
    };

    let injected = format!(
        "import os\nos.environ['{FORWARDED_TOKEN_ENV}'] = '{}'\n{code}",
        token.injected_value()
    );
    envelope.set_code(injected);
    counter!(EXECUTE_REWRITES_TOTAL).increment(1);
    Frame::Text(envelope.to_text())
}
