//! SQLite store and pipeline tests against a temporary database

use sqlx::SqlitePool;
use std::sync::Arc;
use tasting_common::config::SearchSettings;
use tasting_common::db::init_database;
use tasting_common::Error;
use tasting_search::{record_selection, Origin, SearchPipeline, SqliteWineStore, UsageUpdate, WineStore};
use tempfile::TempDir;

async fn setup() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = init_database(&dir.path().join("tasting.db"))
        .await
        .expect("Should initialize database");
    (dir, pool)
}

async fn insert_catalog(pool: &SqlitePool, id: &str, name: &str, producer: Option<&str>, usage: i64) {
    sqlx::query("INSERT INTO catalog (id, wine_name, producer, usage_count) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(producer)
        .bind(usage)
        .execute(pool)
        .await
        .unwrap();
}

async fn insert_event(pool: &SqlitePool, id: &str, name: &str, producer: Option<&str>) {
    sqlx::query("INSERT INTO event_local (id, wine_name, producer) VALUES (?, ?, ?)")
        .bind(id)
        .bind(name)
        .bind(producer)
        .execute(pool)
        .await
        .unwrap();
}

async fn usage_of(pool: &SqlitePool, id: &str) -> i64 {
    sqlx::query_scalar("SELECT usage_count FROM catalog WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_search_matches_name_or_producer_case_insensitively() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "Pinot Noir", Some("Domaine Drouhin"), 0).await;
    insert_catalog(&pool, "c2", "Chardonnay", Some("PINOT Estates"), 0).await;
    insert_catalog(&pool, "c3", "Riesling", None, 0).await;

    let store = SqliteWineStore::new(pool);
    let mut ids: Vec<_> = store
        .search(Origin::Catalog, "pinot", 6)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.source_id)
        .collect();
    ids.sort();

    assert_eq!(ids, vec!["c1", "c2"]);
}

#[tokio::test]
async fn test_search_respects_limit() {
    let (_dir, pool) = setup().await;
    for i in 0..10 {
        insert_event(&pool, &format!("e{i}"), &format!("Rosé {i}"), None).await;
    }

    let store = SqliteWineStore::new(pool);
    let rows = store.search(Origin::EventLocal, "rosé", 6).await.unwrap();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|c| c.origin() == Origin::EventLocal));
    assert!(rows.iter().all(|c| c.usage_count() == 0));
}

#[tokio::test]
async fn test_like_metacharacters_are_literal() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "100% Merlot", None, 0).await;
    insert_catalog(&pool, "c2", "1000 Merlot", None, 0).await;

    let store = SqliteWineStore::new(pool);
    let rows = store.search(Origin::Catalog, "100%", 6).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source_id, "c1");
}

#[tokio::test]
async fn test_search_folds_non_ascii_case() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "CHÂTEAU MARGAUX", None, 0).await;
    insert_catalog(&pool, "c2", "Margaux Réserve", Some("CHÂTEAU PALMER"), 0).await;
    insert_catalog(&pool, "c3", "Chateau Ste. Michelle", None, 0).await;
    insert_event(&pool, "e1", "GRÜNER VELTLINER", Some("Weingut Bründlmayer")).await;

    let store = SqliteWineStore::new(pool);

    let mut ids: Vec<_> = store
        .search(Origin::Catalog, "château", 6)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.source_id)
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["c1", "c2"]);

    let rows = store.search(Origin::EventLocal, "grüner", 6).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "GRÜNER VELTLINER");

    let rows = store.search(Origin::EventLocal, "BRÜNDL", 6).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_legacy_columns_are_normalized() {
    let (_dir, pool) = setup().await;
    sqlx::query(
        "INSERT INTO catalog (id, wine_name, grape_varieties, legacy_pairings_text, legacy_body_text)
         VALUES ('c1', 'Bordeaux Blend', '[\"Merlot\",\"Cabernet\"]', '[not json', 'Medium')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let store = SqliteWineStore::new(pool);
    let rows = store.search(Origin::Catalog, "bordeaux", 6).await.unwrap();
    let wine = &rows[0];

    assert_eq!(
        wine.grape_varieties,
        Some(vec!["Merlot".to_string(), "Cabernet".to_string()])
    );
    assert_eq!(wine.food_pairings, Some(vec!["[not json".to_string()]));
    assert_eq!(wine.wine_style, Some(vec!["Medium".to_string()]));
}

#[tokio::test]
async fn test_increment_usage_bumps_stored_value_and_rejects_unknown_id() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "Barolo", None, 3).await;

    let store = SqliteWineStore::new(pool.clone());
    assert_eq!(store.increment_usage("c1").await.unwrap(), 4);
    assert_eq!(store.increment_usage("c1").await.unwrap(), 5);
    assert_eq!(usage_of(&pool, "c1").await, 5);

    let err = store.increment_usage("missing").await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_record_selection_ignores_stale_candidate_count() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "Amarone", None, 3).await;

    let store = SqliteWineStore::new(pool.clone());
    let rows = store.search(Origin::Catalog, "amarone", 6).await.unwrap();

    // Two sessions selecting the same result set must both count
    record_selection(&store, &rows[0]).await;
    let usage = record_selection(&store, &rows[0]).await;
    assert_eq!(usage, UsageUpdate::Recorded { new_count: 5 });
    assert_eq!(usage_of(&pool, "c1").await, 5);

    let inflated = rows[0].clone().with_usage_count(999_999);
    assert_eq!(
        record_selection(&store, &inflated).await,
        UsageUpdate::Recorded { new_count: 6 }
    );
}

#[tokio::test]
async fn test_pipeline_merges_and_dedupes_real_tables() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "Chianti Classico", Some("Ruffino"), 7).await;
    insert_event(&pool, "e1", "CHIANTI CLASSICO", Some("ruffino")).await;
    insert_event(&pool, "e2", "Chianti Rufina", None).await;

    let store: Arc<dyn WineStore> = Arc::new(SqliteWineStore::new(pool));
    let pipeline = SearchPipeline::new(store, &SearchSettings::default());

    let candidates = pipeline.run("chianti").await;
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0].source_id, "c1");
    assert_eq!(candidates[0].usage_count(), 7);
    assert_eq!(candidates[1].source_id, "e2");

    assert!(pipeline.run("c").await.is_empty());
}

#[tokio::test]
async fn test_record_selection_increments_stored_counter() {
    let (_dir, pool) = setup().await;
    insert_catalog(&pool, "c1", "Amarone", None, 3).await;
    insert_event(&pool, "e1", "Amarone della Casa", None).await;

    let store = SqliteWineStore::new(pool.clone());
    let rows = store.search(Origin::Catalog, "amarone", 6).await.unwrap();
    let usage = record_selection(&store, &rows[0]).await;
    assert_eq!(usage, UsageUpdate::Recorded { new_count: 4 });
    assert_eq!(usage_of(&pool, "c1").await, 4);

    let rows = store.search(Origin::EventLocal, "amarone", 6).await.unwrap();
    assert_eq!(record_selection(&store, &rows[0]).await, UsageUpdate::NotTracked);
    assert_eq!(usage_of(&pool, "c1").await, 4);
}
