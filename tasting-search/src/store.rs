//! Storage adapter for the two wine collections
//!
//! [`WineStore`] is the seam between the search engine and the record
//! store. [`SqliteWineStore`] is the production implementation; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tasting_common::db::{CatalogRow, EventLocalRow, CATALOG_COLUMNS, EVENT_LOCAL_COLUMNS};
use tasting_common::{Error, Result};
use tracing::debug;

use crate::candidate::{Origin, WineCandidate};
use crate::normalize::fold_case;

/// Queryable wine record store
#[async_trait]
pub trait WineStore: Send + Sync {
    /// Case-insensitive substring match on name OR producer, capped at `limit`.
    ///
    /// Rows come back in whatever order the store chooses; callers must not
    /// rely on it being stable.
    async fn search(&self, origin: Origin, term: &str, limit: usize) -> Result<Vec<WineCandidate>>;

    /// Add one to a catalog wine's stored usage counter and return the new value.
    ///
    /// The increment happens in the store, so the result never depends on a
    /// count supplied by the caller.
    async fn increment_usage(&self, source_id: &str) -> Result<u32>;
}

/// Case-folded substring matcher shared by every store
#[derive(Debug, Clone)]
pub struct TermMatcher {
    needle: String,
}

impl TermMatcher {
    pub fn new(term: &str) -> Self {
        Self {
            needle: fold_case(term),
        }
    }

    /// True if `name` or `producer` contains the term, ignoring case
    pub fn matches(&self, name: &str, producer: Option<&str>) -> bool {
        fold_case(name).contains(&self.needle)
            || producer.is_some_and(|p| fold_case(p).contains(&self.needle))
    }
}

/// Rows that carry the two searchable fields
trait SearchableRow {
    fn name_and_producer(&self) -> (&str, Option<&str>);
}

impl SearchableRow for CatalogRow {
    fn name_and_producer(&self) -> (&str, Option<&str>) {
        (&self.wine_name, self.producer.as_deref())
    }
}

impl SearchableRow for EventLocalRow {
    fn name_and_producer(&self) -> (&str, Option<&str>) {
        (&self.wine_name, self.producer.as_deref())
    }
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteWineStore {
    pool: SqlitePool,
}

impl SqliteWineStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stream `sql` and keep the first `limit` rows the matcher accepts.
    ///
    /// SQLite's LIKE and LOWER() only fold ASCII, so matching happens here
    /// with the same case folding the dedup identity key uses.
    async fn scan<R>(&self, sql: &str, matcher: &TermMatcher, limit: usize) -> Result<Vec<WineCandidate>>
    where
        R: for<'r> FromRow<'r, SqliteRow> + SearchableRow + Send + Unpin + 'static,
        WineCandidate: From<R>,
    {
        let mut found = Vec::new();
        if limit == 0 {
            return Ok(found);
        }

        let mut rows = sqlx::query_as::<_, R>(sql).fetch(&self.pool);
        while let Some(row) = rows.try_next().await? {
            let (name, producer) = row.name_and_producer();
            if matcher.matches(name, producer) {
                found.push(WineCandidate::from(row));
                if found.len() >= limit {
                    break;
                }
            }
        }
        Ok(found)
    }
}

#[async_trait]
impl WineStore for SqliteWineStore {
    async fn search(&self, origin: Origin, term: &str, limit: usize) -> Result<Vec<WineCandidate>> {
        let matcher = TermMatcher::new(term);

        let candidates = match origin {
            Origin::Catalog => {
                let sql = format!("SELECT {} FROM catalog", CATALOG_COLUMNS);
                self.scan::<CatalogRow>(&sql, &matcher, limit).await?
            }
            Origin::EventLocal => {
                let sql = format!("SELECT {} FROM event_local", EVENT_LOCAL_COLUMNS);
                self.scan::<EventLocalRow>(&sql, &matcher, limit).await?
            }
        };

        debug!(%origin, term, rows = candidates.len(), "Source query complete");
        Ok(candidates)
    }

    async fn increment_usage(&self, source_id: &str) -> Result<u32> {
        let new_count: Option<i64> = sqlx::query_scalar(
            "UPDATE catalog SET usage_count = usage_count + 1 WHERE id = ? RETURNING usage_count",
        )
        .bind(source_id)
        .fetch_optional(&self.pool)
        .await?;

        let new_count =
            new_count.ok_or_else(|| Error::NotFound(format!("catalog wine {}", source_id)))?;
        Ok(u32::try_from(new_count.max(0)).unwrap_or(u32::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matcher_folds_non_ascii_case() {
        let matcher = TermMatcher::new("château");
        assert!(matcher.matches("CHÂTEAU MARGAUX", None));
        assert!(matcher.matches("Margaux", Some("Château Margaux")));
        assert!(!matcher.matches("Margaux", None));

        let matcher = TermMatcher::new("GRÜNER");
        assert!(matcher.matches("grüner veltliner", None));
    }

    #[test]
    fn test_matcher_treats_wildcards_literally() {
        let matcher = TermMatcher::new("100%");
        assert!(matcher.matches("100% Merlot", None));
        assert!(!matcher.matches("1000 Merlot", None));

        let matcher = TermMatcher::new("a_b");
        assert!(!matcher.matches("axb", None));
    }
}
