//! Client traffic unit.
//!
//! A [`Frame`] is one discrete unit of data crossing the gateway in either
//! direction: textual (candidate for envelope inspection) or binary (always
//! opaque passthrough).

/// One inbound or outbound unit of WebSocket traffic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// Textual frame, parseable as a structured message envelope.
    Text(String),
    /// Binary frame, forwarded unmodified.
    Binary(Vec<u8>),
}

impl Frame {
    /// The frame's text content, if textual.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(t) => Some(t),
            Self::Binary(_) => None,
        }
    }

    /// Whether this is a binary frame.
    #[must_use]
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// Payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(t) => t.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Whether the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<String> for Frame {
    fn from(t: String) -> Self {
        Self::Text(t)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(b)
    }
}
