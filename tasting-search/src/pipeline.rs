//! Search pipeline and selection side effects
//!
//! Stateless pieces shared by the [`SearchController`](crate::controller::SearchController)
//! and the HTTP handlers.

use std::sync::Arc;

use tasting_common::config::SearchSettings;
use tracing::{debug, info, warn};

use crate::candidate::WineCandidate;
use crate::executor::DualSourceExecutor;
use crate::reconcile::{merge_candidates, SourcePriority};
use crate::store::WineStore;

/// Query both sources, merge by priority, dedupe and cap
#[derive(Clone)]
pub struct SearchPipeline {
    executor: DualSourceExecutor,
    priority: SourcePriority,
    min_term_len: usize,
    display_limit: usize,
}

impl SearchPipeline {
    pub fn new(store: Arc<dyn WineStore>, settings: &SearchSettings) -> Self {
        Self {
            executor: DualSourceExecutor::new(store, settings.per_source_limit),
            priority: SourcePriority::default(),
            min_term_len: settings.min_term_len,
            display_limit: settings.display_limit,
        }
    }

    pub fn with_priority(mut self, priority: SourcePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn store(&self) -> &Arc<dyn WineStore> {
        self.executor.store()
    }

    /// True when `term` is long enough to be queried (counted in characters)
    pub fn qualifies(&self, term: &str) -> bool {
        term.chars().count() >= self.min_term_len
    }

    /// Run the full search for `term`.
    ///
    /// Terms below the minimum length return an empty set without touching
    /// the store.
    pub async fn run(&self, term: &str) -> Vec<WineCandidate> {
        if !self.qualifies(term) {
            return Vec::new();
        }

        let results = self.executor.search(term).await;
        let merged = merge_candidates(
            results.catalog,
            results.event_local,
            self.priority,
            self.display_limit,
        );
        debug!(term, candidates = merged.len(), "Search pipeline complete");
        merged
    }
}

/// Outcome of the usage-counter side effect of a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsageUpdate {
    /// Stored counter incremented; `new_count` is the value after the write
    Recorded { new_count: u32 },
    /// Origin does not track usage
    NotTracked,
    /// Update failed; logged and ignored
    Failed,
}

impl UsageUpdate {
    pub fn is_recorded(&self) -> bool {
        matches!(self, UsageUpdate::Recorded { .. })
    }
}

/// Best-effort usage increment for a selected candidate.
///
/// Catalog wines get exactly one increment of the stored counter. The count
/// carried by `candidate` is never written back.
pub async fn record_selection(store: &dyn WineStore, candidate: &WineCandidate) -> UsageUpdate {
    if !candidate.origin().tracks_usage() {
        return UsageUpdate::NotTracked;
    }

    match store.increment_usage(&candidate.source_id).await {
        Ok(new_count) => {
            info!(source_id = %candidate.source_id, new_count, "Recorded wine selection");
            UsageUpdate::Recorded { new_count }
        }
        Err(e) => {
            warn!(
                source_id = %candidate.source_id,
                error = %e,
                "Failed to record wine selection, continuing"
            );
            UsageUpdate::Failed
        }
    }
}
