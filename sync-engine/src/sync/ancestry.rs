//! Dependency resolver
//!
//! Walks each leaf category up to its root and records every visited
//! `(id → parent_id)` pair in an accumulator shared by one batch. The walk
//! is iterative with a visited-set guard and a hard depth cap, so dangling
//! parents and cycles end the walk with a [`SyncIssue::MalformedRecord`]
//! instead of an error.

use shared::{ROOT_SENTINEL, SourceCategory, SyncIssue};
use std::collections::{HashMap, HashSet};

/// Longest parent chain one walk will follow
pub const MAX_ANCESTOR_DEPTH: usize = 64;

/// Id lookup over the full category snapshot
pub struct CategoryIndex<'a> {
    by_id: HashMap<&'a str, &'a SourceCategory>,
}

impl<'a> CategoryIndex<'a> {
    /// Later duplicates of an id win
    pub fn new(categories: &'a [SourceCategory]) -> Self {
        let by_id = categories.iter().map(|c| (c.id.as_str(), c)).collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a SourceCategory> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Accumulated `id → parent_id` pairs for one batch, in discovery order
#[derive(Debug, Default)]
pub struct AncestorChains {
    parents: HashMap<String, String>,
    order: Vec<String>,
    issues: Vec<SyncIssue>,
}

impl AncestorChains {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parents.get(id).map(String::as_str)
    }

    /// Every recorded category id, leaves and ancestors alike
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids whose mapping state matters to this batch: the recorded ids plus
    /// any non-root parent they reference (which may be mapped even if absent
    /// from the snapshot)
    pub fn lookup_ids(&self) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut ids = Vec::with_capacity(self.order.len());
        for id in &self.order {
            if seen.insert(id) {
                ids.push(id.clone());
            }
        }
        for id in &self.order {
            if let Some(parent) = self.parents.get(id)
                && parent != ROOT_SENTINEL
                && seen.insert(parent)
            {
                ids.push(parent.clone());
            }
        }
        ids
    }

    pub fn issues(&self) -> &[SyncIssue] {
        &self.issues
    }

    pub fn take_issues(&mut self) -> Vec<SyncIssue> {
        std::mem::take(&mut self.issues)
    }

    fn record(&mut self, category: &SourceCategory) {
        self.parents
            .insert(category.id.clone(), category.parent_id.clone());
        self.order.push(category.id.clone());
    }

    fn malformed(&mut self, category_id: &str, reason: String) {
        tracing::warn!(category_id, %reason, "Ancestor walk stopped");
        self.issues.push(SyncIssue::MalformedRecord {
            category_id: category_id.to_string(),
            reason,
        });
    }
}

/// Walk `leaf` up to its root, merging into `chains`
///
/// Stops early at a node another leaf already recorded. A parent id that is
/// not in `index`, a cycle, or a chain longer than [`MAX_ANCESTOR_DEPTH`]
/// stops the walk at the last good node and records a malformed-record issue.
pub fn resolve_ancestor_chain(
    leaf: &SourceCategory,
    index: &CategoryIndex<'_>,
    chains: &mut AncestorChains,
) {
    if chains.contains(&leaf.id) {
        return;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = leaf;

    loop {
        visited.insert(current.id.as_str());
        chains.record(current);

        if current.is_root() {
            return;
        }

        let parent_id = current.parent_id.as_str();
        if visited.contains(parent_id) {
            chains.malformed(
                &current.id,
                format!("parent chain cycles back to {parent_id}"),
            );
            return;
        }
        if chains.contains(parent_id) {
            return;
        }
        if visited.len() >= MAX_ANCESTOR_DEPTH {
            chains.malformed(
                &leaf.id,
                format!("parent chain deeper than {MAX_ANCESTOR_DEPTH}"),
            );
            return;
        }

        match index.get(parent_id) {
            Some(parent) => current = parent,
            None => {
                chains.malformed(&current.id, format!("parent {parent_id} not found"));
                return;
            }
        }
    }
}

/// Resolve every leaf of one batch against the full snapshot
pub fn resolve_batch(leaves: &[SourceCategory], index: &CategoryIndex<'_>) -> AncestorChains {
    let mut chains = AncestorChains::new();
    for leaf in leaves {
        resolve_ancestor_chain(leaf, index, &mut chains);
    }
    chains
}
