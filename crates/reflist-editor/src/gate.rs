//! Persistence gate
//!
//! Every list snapshot passes through here on its way to the host record.
//! Staging validates the snapshot, raises the validity flag and stamps it
//! with an issue revision; writing serializes host writes and skips any
//! snapshot older than one already attempted, so neither a slow write nor a
//! retry after a newer failure can regress a newer state.

use crate::config::ValidationPolicy;
use crate::validation::{ValidationReport, Validator};
use reflist_core::{CanonicalEntry, FieldHost, HostResult};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What happened to a staged snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Handed to the host
    Written {
        /// Validity flag raised alongside
        valid: bool,
    },
    /// Invalid under [`ValidationPolicy::RefuseInvalid`]; host value untouched
    Withheld,
    /// A newer snapshot was attempted first; this one was dropped
    Superseded,
}

/// A validated snapshot waiting to be written
#[derive(Debug, Clone)]
pub struct StagedWrite {
    revision: u64,
    entries: Vec<CanonicalEntry>,
    report: ValidationReport,
    withheld: bool,
}

impl StagedWrite {
    /// Issue order of this snapshot
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validation result for this snapshot
    #[inline]
    #[must_use]
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }
}

/// Validates and orders writes of list snapshots to the host
pub struct PersistenceGate {
    host: Arc<dyn FieldHost>,
    policy: ValidationPolicy,
    validator: Validator,
    issued: AtomicU64,
    attempted: Mutex<u64>,
}

impl PersistenceGate {
    /// Create a gate in front of a host
    #[must_use]
    pub fn new(host: Arc<dyn FieldHost>, policy: ValidationPolicy) -> Self {
        Self {
            host,
            policy,
            validator: Validator::new(),
            issued: AtomicU64::new(0),
            attempted: Mutex::new(0),
        }
    }

    /// Active validation policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate a snapshot, flag the record, and stamp the issue revision
    pub fn stage(&self, entries: Vec<CanonicalEntry>) -> StagedWrite {
        let revision = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let report = self.validator.validate(&entries);
        let valid = report.is_valid();

        self.host.set_validity(valid);
        if !valid {
            tracing::warn!(
                revision,
                issues = report.issues.len(),
                "list failed validation"
            );
        }

        StagedWrite {
            revision,
            entries,
            withheld: !valid && self.policy == ValidationPolicy::RefuseInvalid,
            report,
        }
    }

    /// Write a staged snapshot unless a newer one was already attempted
    ///
    /// A failed write still counts as attempted, so older snapshots staged
    /// before it are superseded.
    ///
    /// # Errors
    /// Propagates the host's persist failure
    pub async fn write(&self, staged: StagedWrite) -> HostResult<PersistOutcome> {
        if staged.withheld {
            tracing::debug!(revision = staged.revision, "invalid list withheld");
            return Ok(PersistOutcome::Withheld);
        }

        let mut attempted = self.attempted.lock().await;
        if *attempted > staged.revision {
            tracing::warn!(
                revision = staged.revision,
                latest = *attempted,
                "skipping stale write"
            );
            return Ok(PersistOutcome::Superseded);
        }

        *attempted = staged.revision;
        if let Err(err) = self.host.persist(staged.entries).await {
            tracing::warn!(revision = staged.revision, error = %err, "persist failed");
            return Err(err);
        }

        Ok(PersistOutcome::Written {
            valid: staged.report.is_valid(),
        })
    }

    /// Stage and write in one step
    ///
    /// # Errors
    /// Propagates the host's persist failure
    pub async fn submit(&self, entries: Vec<CanonicalEntry>) -> HostResult<PersistOutcome> {
        let staged = self.stage(entries);
        self.write(staged).await
    }
}

impl fmt::Debug for PersistenceGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceGate")
            .field("policy", &self.policy)
            .field("issued", &self.issued.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
