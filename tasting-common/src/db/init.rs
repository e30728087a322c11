//! Database initialization
//!
//! Creates the database file on first run and the two wine collections:
//! - `catalog`: shared wine catalog with popularity counters and legacy text columns
//! - `event_local`: wines entered for a single tasting event, no counters

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets the two concurrent search reads proceed alongside a counter write
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    // Idempotent - safe to call multiple times
    create_catalog_table(&pool).await?;
    create_event_local_table(&pool).await?;

    Ok(pool)
}

async fn create_catalog_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog (
            id TEXT PRIMARY KEY,
            wine_name TEXT NOT NULL,
            producer TEXT,
            vintage INTEGER,
            wine_type TEXT,
            beverage_type TEXT,
            region TEXT,
            country TEXT,
            price_point TEXT,
            alcohol_content REAL,
            sommelier_notes TEXT,
            image_url TEXT,
            grape_varieties TEXT,
            wine_style TEXT,
            food_pairings TEXT,
            usage_count INTEGER NOT NULL DEFAULT 0 CHECK (usage_count >= 0),
            website TEXT,
            legacy_grapes_text TEXT,
            legacy_pairings_text TEXT,
            legacy_body_text TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_catalog_wine_name ON catalog(wine_name)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_event_local_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS event_local (
            id TEXT PRIMARY KEY,
            wine_name TEXT NOT NULL,
            producer TEXT,
            vintage INTEGER,
            wine_type TEXT,
            beverage_type TEXT,
            region TEXT,
            country TEXT,
            price_point TEXT,
            alcohol_content REAL,
            sommelier_notes TEXT,
            image_url TEXT,
            grape_varieties TEXT,
            wine_style TEXT,
            food_pairings TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_event_local_wine_name ON event_local(wine_name)")
        .execute(pool)
        .await?;

    Ok(())
}
