//! Errors surfaced by the host record

/// Failures reported by a [`FieldHost`](crate::FieldHost) implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// Writing the field value failed
    #[error("persist failed: {0}")]
    Persist(String),

    /// Reading a field value failed
    #[error("read failed: {0}")]
    Read(String),

    /// The canonical-change channel is gone
    #[error("canonical subscription closed")]
    SubscriptionClosed,
}

/// Result alias for host operations
pub type HostResult<T> = Result<T, HostError>;
