//! Raw row models
//!
//! These mirror the table columns one-to-one. List-valued columns are kept
//! as the raw TEXT the store returns; normalization into lists happens in
//! the search adapter, not here.

use serde::{Deserialize, Serialize};

/// Row from the `catalog` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct CatalogRow {
    pub id: String,
    pub wine_name: String,
    pub producer: Option<String>,
    pub vintage: Option<i64>,
    pub wine_type: Option<String>,
    pub beverage_type: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub price_point: Option<String>,
    pub alcohol_content: Option<f64>,
    pub sommelier_notes: Option<String>,
    pub image_url: Option<String>,
    pub grape_varieties: Option<String>,
    pub wine_style: Option<String>,
    pub food_pairings: Option<String>,
    pub usage_count: i64,
    pub website: Option<String>,
    pub legacy_grapes_text: Option<String>,
    pub legacy_pairings_text: Option<String>,
    pub legacy_body_text: Option<String>,
}

/// Row from the `event_local` collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventLocalRow {
    pub id: String,
    pub wine_name: String,
    pub producer: Option<String>,
    pub vintage: Option<i64>,
    pub wine_type: Option<String>,
    pub beverage_type: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub price_point: Option<String>,
    pub alcohol_content: Option<f64>,
    pub sommelier_notes: Option<String>,
    pub image_url: Option<String>,
    pub grape_varieties: Option<String>,
    pub wine_style: Option<String>,
    pub food_pairings: Option<String>,
}

/// Column list for `catalog` selects, in `CatalogRow` order
pub const CATALOG_COLUMNS: &str = "id, wine_name, producer, vintage, wine_type, beverage_type, \
     region, country, price_point, alcohol_content, sommelier_notes, image_url, \
     grape_varieties, wine_style, food_pairings, usage_count, website, \
     legacy_grapes_text, legacy_pairings_text, legacy_body_text";

/// Column list for `event_local` selects, in `EventLocalRow` order
pub const EVENT_LOCAL_COLUMNS: &str = "id, wine_name, producer, vintage, wine_type, beverage_type, \
     region, country, price_point, alcohol_content, sommelier_notes, image_url, \
     grape_varieties, wine_style, food_pairings";
