//! Reference-list core model
//!
//! Shared vocabulary for the reference-list field editor.
//!
//! # Core Concepts
//!
//! - [`ReferenceItem`]: One editable row: opaque [`ItemKey`], optional [`ReferenceId`], [`Comment`]
//! - [`CanonicalEntry`]: The persisted shape of a row (no key, no metadata)
//! - [`Metadata`]: Derived title/image for an id, never persisted
//! - [`FieldHost`]: The host record operations the editor consumes
//!
//! # Example
//!
//! ```rust,ignore
//! use reflist_core::{CanonicalEntry, ReferenceId, ReferenceItem};
//!
//! let item = ReferenceItem::from_entry(CanonicalEntry::new(ReferenceId::parse("42"), "notes"));
//! assert_eq!(item.to_entry().id, ReferenceId::parse("42"));
//! ```

#![warn(unreachable_pub)]

mod error;
mod host;
mod id;
mod item;
mod metadata;

pub use error::{HostError, HostResult};
pub use host::{CanonicalSnapshot, FieldContext, FieldHost, Subscription};
pub use id::{ItemKey, ReferenceId};
pub use item::{CanonicalEntry, Comment, ReferenceItem};
pub use metadata::{Metadata, PLACEHOLDER_TITLE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
