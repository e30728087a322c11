//! Duplicate Resolver
//!
//! Multi-source reconciliation: rows from each source are concatenated in
//! a fixed priority order, deduplicated by identity key (first occurrence
//! wins) and then truncated. Truncation happens after the merge so that a
//! source with richer matches is not starved by a per-source cut.

use std::collections::HashSet;
use std::hash::Hash;

use crate::candidate::{Origin, WineCandidate};

/// Tie-break policy deciding which source wins a duplicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePriority {
    /// Catalog rows are kept over event-local rows with the same identity
    #[default]
    CatalogFirst,
}

impl SourcePriority {
    /// Origins in aggregation order
    pub fn order(self) -> [Origin; 2] {
        match self {
            SourcePriority::CatalogFirst => [Origin::Catalog, Origin::EventLocal],
        }
    }
}

/// Stable, first-occurrence-wins deduplication in O(n)
pub fn dedupe_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Concatenate sources in the given order, dedupe, then keep at most `limit`
pub fn reconcile<T, K, F>(sources: impl IntoIterator<Item = Vec<T>>, key: F, limit: usize) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut merged = dedupe_by(sources.into_iter().flatten(), key);
    merged.truncate(limit);
    merged
}

/// Dedupe wine candidates by `(lowercase name, lowercase producer)`
pub fn dedupe(rows: Vec<WineCandidate>) -> Vec<WineCandidate> {
    dedupe_by(rows, WineCandidate::identity_key)
}

/// Merge the two wine sources under `priority`, dedupe and cap at `limit`
pub fn merge_candidates(
    catalog: Vec<WineCandidate>,
    event_local: Vec<WineCandidate>,
    priority: SourcePriority,
    limit: usize,
) -> Vec<WineCandidate> {
    let mut catalog = Some(catalog);
    let mut event_local = Some(event_local);
    let ordered = priority.order().map(|origin| match origin {
        Origin::Catalog => catalog.take().unwrap_or_default(),
        Origin::EventLocal => event_local.take().unwrap_or_default(),
    });
    reconcile(ordered, WineCandidate::identity_key, limit)
}
