//! Validated kernel identifier.
//!
//! Kernel IDs arrive as path parameters and must match the fixed identifier
//! pattern before any backend resolution happens. The newtype keeps raw
//! strings out of the admission path.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pattern a kernel identifier must match (five `\w+` groups joined by `-`,
/// the shape of a UUID).
pub const KERNEL_ID_PATTERN: &str = r"^\w+-\w+-\w+-\w+-\w+$";

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(KERNEL_ID_PATTERN).expect("valid kernel id pattern"))
}

/// Error returned when a kernel identifier does not match the pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid kernel id: {0:?}")]
pub struct InvalidKernelId(pub String);

/// Identifier of a backend kernel session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KernelId(String);

impl KernelId {
    /// Generate a fresh random kernel ID (UUID v7, time-ordered).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Parse a kernel ID, validating it against [`KERNEL_ID_PATTERN`].
    pub fn parse(s: &str) -> Result<Self, InvalidKernelId> {
        if pattern().is_match(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(InvalidKernelId(s.to_owned()))
        }
    }

    /// Return the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume self and return the inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for KernelId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KernelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
