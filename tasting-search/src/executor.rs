//! Dual-Source Query Executor
//!
//! Fires the catalog and event-local queries together and waits for both.
//! A failing source degrades to an empty list; it never fails the search.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::candidate::{Origin, WineCandidate};
use crate::store::WineStore;

/// Per-source results of one search, already normalized and tagged
#[derive(Debug, Clone, Default)]
pub struct SourceResults {
    pub catalog: Vec<WineCandidate>,
    pub event_local: Vec<WineCandidate>,
    /// Origins whose query failed and were replaced by an empty list
    pub failed: Vec<Origin>,
}

/// Issues the two per-term source queries concurrently
#[derive(Clone)]
pub struct DualSourceExecutor {
    store: Arc<dyn WineStore>,
    per_source_limit: usize,
}

impl DualSourceExecutor {
    pub fn new(store: Arc<dyn WineStore>, per_source_limit: usize) -> Self {
        Self {
            store,
            per_source_limit,
        }
    }

    pub fn store(&self) -> &Arc<dyn WineStore> {
        &self.store
    }

    /// Query both collections for `term`, joined (not raced)
    pub async fn search(&self, term: &str) -> SourceResults {
        let (catalog, event_local) = tokio::join!(
            self.query_source(Origin::Catalog, term),
            self.query_source(Origin::EventLocal, term),
        );

        let mut results = SourceResults::default();
        match catalog {
            Some(rows) => results.catalog = rows,
            None => results.failed.push(Origin::Catalog),
        }
        match event_local {
            Some(rows) => results.event_local = rows,
            None => results.failed.push(Origin::EventLocal),
        }

        debug!(
            term,
            catalog = results.catalog.len(),
            event_local = results.event_local.len(),
            failed = results.failed.len(),
            "Dual-source search complete"
        );
        results
    }

    async fn query_source(&self, origin: Origin, term: &str) -> Option<Vec<WineCandidate>> {
        match self.store.search(origin, term, self.per_source_limit).await {
            Ok(mut rows) => {
                // Stores are asked for the cap, but a misbehaving one must not widen it
                rows.truncate(self.per_source_limit);
                // Rows must carry the origin of the collection they were read from
                rows.retain(|row| row.origin() == origin);
                Some(rows)
            }
            Err(e) => {
                warn!(%origin, term, error = %e, "Wine source query failed, treating as empty");
                None
            }
        }
    }
}
