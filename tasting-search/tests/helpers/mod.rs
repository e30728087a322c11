//! Shared test helpers: in-memory wine store and recording selection sink

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tasting_common::{Error, Result};
use tasting_search::{Origin, SelectionSink, WineCandidate, WineStore};

/// In-memory store with injectable failures and per-term latency
#[derive(Default)]
pub struct FakeStore {
    catalog: Vec<WineCandidate>,
    event_local: Vec<WineCandidate>,
    failing: Vec<Origin>,
    fail_updates: bool,
    delays: HashMap<String, Duration>,
    /// Counters after increments, keyed by source id; falls back to the seeded catalog
    usage_counts: Mutex<HashMap<String, u32>>,
    pub updates: Mutex<Vec<(String, u32)>>,
    pub queries: Mutex<Vec<(Origin, String)>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, rows: Vec<WineCandidate>) -> Self {
        self.catalog = rows;
        self
    }

    pub fn with_event_local(mut self, rows: Vec<WineCandidate>) -> Self {
        self.event_local = rows;
        self
    }

    pub fn failing(mut self, origin: Origin) -> Self {
        self.failing.push(origin);
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// Delay every source query for `term`
    pub fn with_delay(mut self, term: &str, delay: Duration) -> Self {
        self.delays.insert(term.to_string(), delay);
        self
    }

    pub fn update_log(&self) -> Vec<(String, u32)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl WineStore for FakeStore {
    async fn search(&self, origin: Origin, term: &str, limit: usize) -> Result<Vec<WineCandidate>> {
        self.queries.lock().unwrap().push((origin, term.to_string()));

        if let Some(delay) = self.delays.get(term) {
            tokio::time::sleep(*delay).await;
        }

        if self.failing.contains(&origin) {
            return Err(Error::Internal(format!("{} unavailable", origin)));
        }

        let needle = term.to_lowercase();
        let rows = match origin {
            Origin::Catalog => &self.catalog,
            Origin::EventLocal => &self.event_local,
        };
        Ok(rows
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.producer
                        .as_deref()
                        .map(|p| p.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn increment_usage(&self, source_id: &str) -> Result<u32> {
        if self.fail_updates {
            return Err(Error::Internal("write rejected".to_string()));
        }

        let mut counts = self.usage_counts.lock().unwrap();
        let stored = match counts.get(source_id) {
            Some(count) => *count,
            None => self
                .catalog
                .iter()
                .find(|c| c.source_id == source_id)
                .map(|c| c.usage_count())
                .ok_or_else(|| Error::NotFound(format!("catalog wine {}", source_id)))?,
        };
        let new_count = stored + 1;
        counts.insert(source_id.to_string(), new_count);
        self.updates.lock().unwrap().push((source_id.to_string(), new_count));
        Ok(new_count)
    }
}

/// Records selection callbacks in call order
#[derive(Default)]
pub struct RecordingSink {
    pub filled: Mutex<Vec<WineCandidate>>,
    pub display_values: Mutex<Vec<String>>,
}

impl SelectionSink for RecordingSink {
    fn fill_form(&self, candidate: &WineCandidate) {
        self.filled.lock().unwrap().push(candidate.clone());
    }

    fn display_value_changed(&self, name: &str) {
        self.display_values.lock().unwrap().push(name.to_string());
    }
}

pub fn catalog_wine(id: &str, name: &str, producer: Option<&str>, usage: u32) -> WineCandidate {
    WineCandidate::new(Origin::Catalog, id, name, producer.map(str::to_string)).with_usage_count(usage)
}

pub fn event_wine(id: &str, name: &str, producer: Option<&str>) -> WineCandidate {
    WineCandidate::new(Origin::EventLocal, id, name, producer.map(str::to_string))
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
