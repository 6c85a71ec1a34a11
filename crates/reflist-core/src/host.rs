//! Host record contract
//!
//! The editor never talks to a content platform directly. It consumes the
//! operations below, which a host adapter implements:
//! - read the field value for the session's locale
//! - read the canonical (default-locale) value
//! - subscribe to canonical value changes
//! - write the field value and flag its validity

use crate::error::HostResult;
use crate::item::CanonicalEntry;
use async_trait::async_trait;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Which field and locale a session edits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldContext {
    /// Field identifier on the host record
    pub field_id: String,
    /// Locale being edited
    pub locale: String,
    /// Locale whose value is authoritative for structure
    pub default_locale: String,
}

impl FieldContext {
    /// Create a context
    #[must_use]
    pub fn new(
        field_id: impl Into<String>,
        locale: impl Into<String>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            locale: locale.into(),
            default_locale: default_locale.into(),
        }
    }

    /// Whether this session edits the default locale
    #[inline]
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.locale == self.default_locale
    }
}

/// One observed canonical value
///
/// Cheap to clone; clones share the same allocation, so identity can be
/// compared with [`CanonicalSnapshot::same_as`] to recognise echoes.
#[derive(Debug, Clone)]
pub struct CanonicalSnapshot(Arc<Vec<CanonicalEntry>>);

impl CanonicalSnapshot {
    /// Wrap an observed value
    #[must_use]
    pub fn new(entries: Vec<CanonicalEntry>) -> Self {
        Self(Arc::new(entries))
    }

    /// Reference identity, not structural equality
    #[inline]
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for CanonicalSnapshot {
    type Target = [CanonicalEntry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<CanonicalEntry>> for CanonicalSnapshot {
    fn from(entries: Vec<CanonicalEntry>) -> Self {
        Self::new(entries)
    }
}

/// Inbound stream of canonical value changes
///
/// Dropping the subscription, or calling [`Subscription::unsubscribe`],
/// detaches it from the host.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<CanonicalSnapshot>,
}

impl Subscription {
    /// Create a bounded channel; the host keeps the sender
    #[must_use]
    pub fn channel(buffer: usize) -> (mpsc::Sender<CanonicalSnapshot>, Self) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (sender, Self { receiver })
    }

    /// Wait for the next canonical value; `None` once the host side is gone
    pub async fn next(&mut self) -> Option<CanonicalSnapshot> {
        self.receiver.recv().await
    }

    /// Detach from the host
    pub fn unsubscribe(mut self) {
        self.receiver.close();
    }
}

/// Operations the editor needs from the record that owns the field
#[async_trait]
pub trait FieldHost: Send + Sync {
    /// Field and locale of this session
    fn context(&self) -> FieldContext;

    /// Current value of the field in the session's locale
    async fn field_value(&self) -> HostResult<Option<Vec<CanonicalEntry>>>;

    /// Current value of the field in the default locale
    async fn canonical_value(&self) -> HostResult<Option<Vec<CanonicalEntry>>>;

    /// Receive every subsequent change of the default-locale value
    fn subscribe_canonical(&self, buffer: usize) -> Subscription;

    /// Write the field value for the session's locale
    async fn persist(&self, entries: Vec<CanonicalEntry>) -> HostResult<()>;

    /// Flag the field valid or invalid on the record
    fn set_validity(&self, valid: bool);
}
