//! Error types for the editor
//!
//! Only two things can fail in a way the caller must hear about:
//! - the host record rejecting a read or write
//! - an unusable configuration
//!
//! Everything else degrades in place: malformed ids become absent, lookup
//! failures become placeholder metadata, invalid lists become a validity
//! flag, and edits that cannot apply are reported as [`IgnoreReason`]s.

use crate::config::ConfigError;
use reflist_core::HostError;

/// Main editor error type
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Host record operation failed
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// Configuration is unusable
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl EditorError {
    /// Whether retrying the same operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Host(HostError::Persist(_) | HostError::Read(_)))
    }
}

/// Result type alias for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Why an edit left the list untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IgnoreReason {
    /// No row carries the given key
    #[error("no item with that key")]
    UnknownKey,

    /// Removing would leave the list empty
    #[error("the list cannot shrink below one item")]
    LastItem,

    /// Ids, order and membership follow the default locale here
    #[error("list structure is read-only outside the default locale")]
    ReadOnlyStructure,

    /// This exact canonical value was already reconciled
    #[error("canonical value already processed")]
    AlreadyProcessed,

    /// The default locale does not reconcile against itself
    #[error("session edits the default locale")]
    CanonicalSession,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_error_display() {
        let err: EditorError = HostError::Persist("offline".to_string()).into();
        assert_eq!(err.to_string(), "host error: persist failed: offline");
        assert!(err.is_retryable());

        let err: EditorError = HostError::SubscriptionClosed.into();
        assert!(!err.is_retryable());
    }

    #[test]
    fn config_error_conversion() {
        let err: EditorError = ConfigError::InvalidServiceUrl("ftp://x".to_string()).into();
        assert!(matches!(err, EditorError::Config(_)));
    }

    #[test]
    fn ignore_reason_display() {
        assert_eq!(
            IgnoreReason::LastItem.to_string(),
            "the list cannot shrink below one item"
        );
    }
}
