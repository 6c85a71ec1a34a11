//! Metadata enrichment for reference ids
//!
//! Resolves a [`ReferenceId`](reflist_core::ReferenceId) to its
//! [`Metadata`](reflist_core::Metadata) through an external lookup.
//!
//! # Guarantees
//!
//! - **Single-flight**: concurrent requests for one id share one lookup
//! - **Memoized**: a resolved id is never looked up again in the session
//! - **Infallible**: lookup failures resolve to placeholder metadata
//!
//! # Example
//!
//! ```rust,ignore
//! use reflist_metadata::MetadataCache;
//!
//! let cache = MetadataCache::new(Arc::new(my_fetcher));
//! let meta = cache.resolve(ReferenceId::new(42)).await;
//! println!("{}", meta.title);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cache;
pub mod error;
pub mod fetcher;

pub use cache::{CacheStats, MetadataCache};
pub use error::FetchError;
pub use fetcher::{FetchedMetadata, MetadataFetcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
