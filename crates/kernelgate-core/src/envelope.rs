//! Kernel message envelope.
//!
//! A textual frame may encode a structured envelope: a JSON object with a
//! `header` (carrying `msg_type`) and a `content` object. [`Envelope::parse`]
//! is the single fallible entry point; callers that cannot tolerate failure
//! (the interceptor) match on [`ParseError`] and fall back to the original
//! text.
//!
//! The envelope keeps the full JSON value so a rewrite preserves every field
//! it does not touch.

use serde_json::Value;

/// Why a textual frame failed to parse as an envelope.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The text is not well-formed JSON.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The text is valid JSON but not an object.
    #[error("envelope is not a JSON object")]
    NotAnObject,
}

/// Typed view over one kernel protocol message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    value: Value,
}

impl Envelope {
    /// Parse a textual frame into an envelope.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(ParseError::NotAnObject);
        }
        Ok(Self { value })
    }

    /// The `header.msg_type` field, if present and textual.
    #[must_use]
    pub fn msg_type(&self) -> Option<&str> {
        self.value.get("header")?.get("msg_type")?.as_str()
    }

    /// The `content.code` field, if present and textual.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.value.get("content")?.get("code")?.as_str()
    }

    /// Replace `content.code`, creating the `content` object if the message
    /// somehow lacks one. Every other field is left untouched.
    pub fn set_code(&mut self, code: String) {
        // Parse guarantees the top level is an object.
        let Some(root) = self.value.as_object_mut() else {
            return;
        };
        let content = root
            .entry("content")
            .or_insert_with(|| Value::Object(serde_json::Map::new()));
        if let Some(obj) = content.as_object_mut() {
            let _ = obj.insert("code".to_owned(), Value::String(code));
        }
    }

    /// Re-serialize the envelope to wire text.
    #[must_use]
    pub fn to_text(&self) -> String {
        // Serializing a Value cannot fail.
        serde_json::to_string(&self.value).unwrap_or_default()
    }

    /// Borrow the underlying JSON value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.value
    }
}
