//! Sync run result types
//!
//! Returned by every engine entry point. Non-fatal problems are collected
//! as [`SyncIssue`]s in the summary instead of aborting the run.

use serde::{Deserialize, Serialize};

use crate::models::EntityKind;

/// A non-fatal problem encountered during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncIssue {
    /// The destination rejected one item of a create batch
    ItemCreation {
        kind: EntityKind,
        /// Source id, when the error row could be correlated
        source_id: Option<String>,
        code: String,
        message: String,
    },
    /// The destination rejected one item of an update batch
    ItemUpdate {
        kind: EntityKind,
        destination_id: Option<i64>,
        code: String,
        message: String,
    },
    /// A category never became ready within the depth bound
    UnresolvedDependency {
        category_id: String,
        parent_id: String,
    },
    /// A product references a category that has no mapping yet
    UnmappedCategory {
        product_id: String,
        category_id: String,
    },
    /// A category's ancestor walk stopped early
    MalformedRecord { category_id: String, reason: String },
    /// Input was cut down to the configured total
    Truncated { kept: usize, total: usize },
    /// A mapping row already held a different destination id
    MappingConflict {
        kind: EntityKind,
        source_id: String,
        existing_id: i64,
        rejected_id: i64,
    },
    /// A create row echoed an id that was not part of the request
    UncorrelatedResponse {
        kind: EntityKind,
        echoed: Option<String>,
        destination_id: Option<i64>,
    },
}

/// Outcome of one category or product run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub kind: EntityKind,
    /// Distinct source ids considered (including ancestors for categories)
    pub candidates: usize,
    /// Candidates that already had a mapping when the run started
    pub already_mapped: usize,
    /// New destination entities created and mapped
    pub created: usize,
    /// Existing destination entities updated (products only)
    pub updated: usize,
    /// Items the destination rejected
    pub failed: usize,
    /// Source ids left unmapped without a destination error
    #[serde(default)]
    pub incomplete: Vec<String>,
    /// Dependency levels executed (categories only)
    pub levels: usize,
    #[serde(default)]
    pub issues: Vec<SyncIssue>,
}

impl SyncSummary {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            candidates: 0,
            already_mapped: 0,
            created: 0,
            updated: 0,
            failed: 0,
            incomplete: Vec::new(),
            levels: 0,
            issues: Vec::new(),
        }
    }

    /// Fold another summary of the same kind into this one
    pub fn merge(&mut self, other: SyncSummary) {
        self.candidates += other.candidates;
        self.already_mapped += other.already_mapped;
        self.created += other.created;
        self.updated += other.updated;
        self.failed += other.failed;
        self.incomplete.extend(other.incomplete);
        self.levels = self.levels.max(other.levels);
        self.issues.extend(other.issues);
    }

    /// True when every candidate ended up mapped or updated
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.incomplete.is_empty()
    }
}

/// Outcome of one product feed pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSummary {
    pub cursor_before: u64,
    pub cursor_after: u64,
    pub fetched: usize,
    pub published: usize,
    pub truncated: bool,
}

/// Outcome of a reset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    pub products_deleted: usize,
    pub product_mappings_cleared: usize,
    pub categories_deleted: usize,
    pub category_mappings_cleared: usize,
    pub queue_drained: usize,
}
