//! Reference-list field editor
//!
//! Edits an ordered list of reference rows stored in one field of a host
//! record, for one locale at a time.
//!
//! # Core Concepts
//!
//! - [`ReferenceList`]: Key-addressed insert/remove/update, never below one row
//! - [`Reconciler`]: Follows the default locale's structure, keeps local comments
//! - [`Validator`]: Every row needs an id, and ids must be distinct
//! - [`PersistenceGate`]: Validates, flags, and orders writes to the host
//! - [`EditorSession`]: Wires the above to a [`FieldHost`](reflist_core::FieldHost)
//!   and a [`MetadataCache`](reflist_metadata::MetadataCache)
//!
//! # Example
//!
//! ```rust,ignore
//! use reflist_editor::{EditorConfig, EditorSession};
//!
//! # async fn example(host: Arc<dyn FieldHost>, fetcher: Arc<dyn MetadataFetcher>) -> EditorResult<()> {
//! let config = EditorConfig::from_json(r#"{ "service": "https://shop.example/items/" }"#)?;
//! let mut session = EditorSession::open(host, config.metadata_cache(fetcher), &config).await?;
//!
//! let first = session.list().items()[0].key();
//! session.update_id(first, "42").await?;
//! session.insert_after(first).await?;
//!
//! while let Some(result) = session.sync_next().await {
//!     result?;
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod gate;
pub mod list;
pub mod reconcile;
pub mod session;
pub mod validation;

pub use config::{ConfigError, EditorConfig, ValidationPolicy};
pub use error::{EditorError, EditorResult, IgnoreReason};
pub use gate::{PersistOutcome, PersistenceGate, StagedWrite};
pub use list::ReferenceList;
pub use reconcile::{merge, Reconciler};
pub use session::{EditOutcome, EditorSession, ItemView, MetadataState};
pub use validation::{ValidationIssue, ValidationReport, Validator};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for embedding the editor
    pub use crate::{
        EditOutcome, EditorConfig, EditorError, EditorSession, IgnoreReason, ItemView,
        MetadataState, PersistOutcome, ReferenceList, ValidationPolicy,
    };
    pub use reflist_core::{
        CanonicalEntry, CanonicalSnapshot, Comment, FieldContext, FieldHost, ItemKey, Metadata,
        ReferenceId,
    };
    pub use reflist_metadata::{FetchedMetadata, MetadataCache, MetadataFetcher};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
