//! Error types for external metadata lookups
//!
//! These never escape [`MetadataCache`](crate::MetadataCache); they exist so
//! fetcher implementations can say why a lookup failed and the cache can log it.

/// Why an external lookup produced no metadata
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// Response could not be interpreted
    #[error("unparseable response: {0}")]
    Parse(String),

    /// No item behind the id
    #[error("item not found")]
    NotFound,

    /// Lookup exceeded the configured time limit
    #[error("lookup timed out")]
    TimedOut,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_display() {
        assert_eq!(
            FetchError::Network("connection reset".to_string()).to_string(),
            "network error: connection reset"
        );
        assert_eq!(FetchError::NotFound.to_string(), "item not found");
    }
}
