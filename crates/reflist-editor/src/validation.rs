//! Id validation for reference lists
//!
//! A list is valid iff every row has an id and no id appears twice.

use reflist_core::{CanonicalEntry, ReferenceId};
use serde::Serialize;
use std::collections::HashMap;

/// One reason a list is invalid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// Row has no id
    MissingId {
        /// Zero-based row position
        position: usize,
    },
    /// Row repeats an id used earlier in the list
    DuplicateId {
        /// The repeated id
        id: ReferenceId,
        /// Position of the first occurrence
        first: usize,
        /// Position of this occurrence
        position: usize,
    },
}

/// Outcome of validating a list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Every problem found, in row order
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no problems were found
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Missing/duplicate id validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Create new validator instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validate persisted entries
    #[must_use]
    pub fn validate(&self, entries: &[CanonicalEntry]) -> ValidationReport {
        self.validate_ids(entries.iter().map(|entry| entry.id))
    }

    /// Validate a sequence of optional ids
    ///
    /// # Performance
    /// O(n) with one hash lookup per row
    pub fn validate_ids<I>(&self, ids: I) -> ValidationReport
    where
        I: IntoIterator<Item = Option<ReferenceId>>,
    {
        let mut first_seen: HashMap<ReferenceId, usize> = HashMap::new();
        let mut issues = Vec::new();

        for (position, id) in ids.into_iter().enumerate() {
            let Some(id) = id else {
                issues.push(ValidationIssue::MissingId { position });
                continue;
            };
            match first_seen.get(&id) {
                Some(&first) => issues.push(ValidationIssue::DuplicateId {
                    id,
                    first,
                    position,
                }),
                None => {
                    first_seen.insert(id, position);
                }
            }
        }

        ValidationReport { issues }
    }
}
