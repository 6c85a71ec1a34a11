//! Identifiers used by the reference list
//!
//! [`ReferenceId`] is the external numeric identifier a row links to and is
//! persisted. [`ItemKey`] only addresses rows while they are being edited and
//! never leaves the process.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use uuid::Uuid;

/// External numeric identifier of a referenced item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(i64);

impl ReferenceId {
    /// Wrap a raw id
    #[inline]
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw numeric value
    #[inline]
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Parse user input into an id
    ///
    /// Surrounding whitespace is ignored. Empty input, anything that is not a
    /// decimal integer, and values below 1 all map to `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match trimmed.parse::<i64>() {
            Ok(value) if value >= 1 => Some(Self(value)),
            _ => None,
        }
    }
}

impl Display for ReferenceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ReferenceId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

/// Opaque key addressing one row during an editing session
///
/// Generated once when the row is created and never derived from content.
/// Deliberately not serializable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey(Uuid);

impl ItemKey {
    /// Generate a fresh key
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ItemKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
