//! Testing utilities for the reflist workspace
//!
//! Shared fakes and fixtures: an in-memory host record, scripted metadata
//! fetchers, and entry builders.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use reflist_core::{
    CanonicalEntry, CanonicalSnapshot, FieldContext, FieldHost, HostError, HostResult,
    ReferenceId, Subscription,
};
use reflist_metadata::{FetchError, FetchedMetadata, MetadataFetcher};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

pub fn entry(id: i64, comment: &str) -> CanonicalEntry {
    CanonicalEntry::new(Some(ReferenceId::new(id)), comment)
}

pub fn blank_entry() -> CanonicalEntry {
    CanonicalEntry::new(None, "")
}

/// Entries from `(id, comment)` pairs; `None` ids stay absent
pub fn entries(rows: &[(Option<i64>, &str)]) -> Vec<CanonicalEntry> {
    rows.iter()
        .map(|(id, comment)| CanonicalEntry::new(id.map(ReferenceId::new), *comment))
        .collect()
}

#[derive(Debug, Default)]
struct HostState {
    field: Option<Vec<CanonicalEntry>>,
    canonical: Option<Vec<CanonicalEntry>>,
    writes: Vec<Vec<CanonicalEntry>>,
    validity: Vec<bool>,
    subscribers: Vec<mpsc::Sender<CanonicalSnapshot>>,
    fail_next_persist: Option<String>,
}

/// In-memory host record for one field
#[derive(Debug)]
pub struct MemoryHost {
    context: FieldContext,
    state: Mutex<HostState>,
}

impl MemoryHost {
    pub fn new(context: FieldContext) -> Self {
        Self {
            context,
            state: Mutex::new(HostState::default()),
        }
    }

    /// Host for a session editing the default locale
    pub fn canonical() -> Self {
        Self::new(FieldContext::new("references", "en-US", "en-US"))
    }

    /// Host for a session editing `locale` while `en-US` is the default
    pub fn localized(locale: &str) -> Self {
        Self::new(FieldContext::new("references", locale, "en-US"))
    }

    pub fn with_field_value(self, value: Vec<CanonicalEntry>) -> Self {
        self.state.lock().field = Some(value);
        self
    }

    pub fn with_canonical_value(self, value: Vec<CanonicalEntry>) -> Self {
        self.state.lock().canonical = Some(value);
        self
    }

    /// Change the default-locale value and notify every subscriber
    pub async fn publish_canonical(&self, value: Vec<CanonicalEntry>) -> CanonicalSnapshot {
        self.state.lock().canonical = Some(value.clone());
        let snapshot = CanonicalSnapshot::new(value);
        self.send_snapshot(snapshot.clone()).await;
        snapshot
    }

    /// Deliver an existing snapshot again, as an echo would
    pub async fn send_snapshot(&self, snapshot: CanonicalSnapshot) {
        let subscribers: Vec<_> = {
            let mut state = self.state.lock();
            state.subscribers.retain(|sender| !sender.is_closed());
            state.subscribers.clone()
        };
        for sender in subscribers {
            let _ = sender.send(snapshot.clone()).await;
        }
    }

    /// Drop every subscriber's sender, as a host going away would
    pub fn disconnect_subscribers(&self) {
        self.state.lock().subscribers.clear();
    }

    /// Make the next persist call fail
    pub fn fail_next_persist(&self, message: &str) {
        self.state.lock().fail_next_persist = Some(message.to_string());
    }

    pub fn writes(&self) -> Vec<Vec<CanonicalEntry>> {
        self.state.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.lock().writes.len()
    }

    pub fn last_write(&self) -> Option<Vec<CanonicalEntry>> {
        self.state.lock().writes.last().cloned()
    }

    pub fn stored_value(&self) -> Option<Vec<CanonicalEntry>> {
        self.state.lock().field.clone()
    }

    pub fn validity_flags(&self) -> Vec<bool> {
        self.state.lock().validity.clone()
    }

    pub fn last_validity(&self) -> Option<bool> {
        self.state.lock().validity.last().copied()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state
            .lock()
            .subscribers
            .iter()
            .filter(|sender| !sender.is_closed())
            .count()
    }
}

#[async_trait]
impl FieldHost for MemoryHost {
    fn context(&self) -> FieldContext {
        self.context.clone()
    }

    async fn field_value(&self) -> HostResult<Option<Vec<CanonicalEntry>>> {
        Ok(self.state.lock().field.clone())
    }

    async fn canonical_value(&self) -> HostResult<Option<Vec<CanonicalEntry>>> {
        Ok(self.state.lock().canonical.clone())
    }

    fn subscribe_canonical(&self, buffer: usize) -> Subscription {
        let (sender, subscription) = Subscription::channel(buffer);
        self.state.lock().subscribers.push(sender);
        subscription
    }

    async fn persist(&self, entries: Vec<CanonicalEntry>) -> HostResult<()> {
        let mut state = self.state.lock();
        if let Some(message) = state.fail_next_persist.take() {
            return Err(HostError::Persist(message));
        }
        state.writes.push(entries.clone());
        state.field = Some(entries);
        Ok(())
    }

    fn set_validity(&self, valid: bool) {
        self.state.lock().validity.push(valid);
    }
}

/// Fetcher answering from a fixed table; unknown ids are not found
#[derive(Debug, Default)]
pub struct StaticFetcher {
    table: HashMap<ReferenceId, FetchedMetadata>,
    failing: HashMap<ReferenceId, FetchError>,
    delay: Option<Duration>,
    calls: Mutex<HashMap<ReferenceId, usize>>,
    urls: Mutex<Vec<String>>,
    total: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, id: i64, title: &str, image_url: &str) -> Self {
        self.table
            .insert(ReferenceId::new(id), FetchedMetadata::new(title, image_url));
        self
    }

    pub fn with_failure(mut self, id: i64, error: FetchError) -> Self {
        self.failing.insert(ReferenceId::new(id), error);
        self
    }

    /// Sleep this long inside every lookup
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls_for(&self, id: i64) -> usize {
        self.calls
            .lock()
            .get(&ReferenceId::new(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }

    /// Page URLs requested so far, in call order
    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl MetadataFetcher for StaticFetcher {
    async fn fetch(&self, id: ReferenceId, url: &str) -> Result<FetchedMetadata, FetchError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.calls.lock().entry(id).or_insert(0) += 1;
        self.urls.lock().push(url.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failing.get(&id) {
            return Err(error.clone());
        }
        self.table.get(&id).cloned().ok_or(FetchError::NotFound)
    }
}
