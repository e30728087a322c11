//! Unified wine candidate
//!
//! Both collections are mapped into [`WineCandidate`] at the adapter
//! boundary. A candidate lives for one displayed result set and is never
//! written back, except for the usage counter on selection.

use serde::{Deserialize, Serialize};
use tasting_common::db::{CatalogRow, EventLocalRow};

use crate::normalize::{fold_case, normalize_wine_style, RawListField};

/// Which backing collection produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Shared catalog, popularity tracked
    Catalog,
    /// Wines entered for the current event, not tracked
    EventLocal,
}

impl Origin {
    /// Table name of the backing collection
    pub fn collection(self) -> &'static str {
        match self {
            Origin::Catalog => "catalog",
            Origin::EventLocal => "event_local",
        }
    }

    /// Whether selections from this origin bump a usage counter
    pub fn tracks_usage(self) -> bool {
        matches!(self, Origin::Catalog)
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.collection())
    }
}

/// Case-insensitive `(name, producer)` pair that identifies a wine across sources
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    name: String,
    producer: String,
}

/// A normalized wine record for the autocomplete dropdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineCandidate {
    pub source_id: String,
    origin: Origin,
    pub name: String,
    pub producer: Option<String>,
    pub vintage: Option<i64>,
    pub wine_type: Option<String>,
    pub beverage_type: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub price_point: Option<String>,
    pub alcohol_content: Option<f64>,
    pub notes: Option<String>,
    pub image_url: Option<String>,
    pub website: Option<String>,
    pub grape_varieties: Option<Vec<String>>,
    pub food_pairings: Option<Vec<String>>,
    pub wine_style: Option<Vec<String>>,
    #[serde(default)]
    usage_count: u32,
}

impl WineCandidate {
    /// Bare candidate with only identity fields set.
    ///
    /// Event-local candidates always carry a zero usage count.
    pub fn new(
        origin: Origin,
        source_id: impl Into<String>,
        name: impl Into<String>,
        producer: Option<String>,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            origin,
            name: name.into(),
            producer,
            vintage: None,
            wine_type: None,
            beverage_type: None,
            region: None,
            country: None,
            price_point: None,
            alcohol_content: None,
            notes: None,
            image_url: None,
            website: None,
            grape_varieties: None,
            food_pairings: None,
            wine_style: None,
            usage_count: 0,
        }
    }

    /// Set the usage count. Ignored for origins that do not track usage.
    pub fn with_usage_count(mut self, count: u32) -> Self {
        if self.origin.tracks_usage() {
            self.usage_count = count;
        }
        self
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn usage_count(&self) -> u32 {
        self.usage_count
    }

    /// Identity key used for cross-source deduplication
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            name: fold_case(&self.name),
            producer: fold_case(self.producer.as_deref().unwrap_or("")),
        }
    }

    /// Candidates decoded from untrusted input (e.g. a request body) may
    /// carry a usage count on an untracked origin; reset it.
    pub fn sanitized(mut self) -> Self {
        if !self.origin.tracks_usage() {
            self.usage_count = 0;
        }
        self
    }
}

impl From<CatalogRow> for WineCandidate {
    fn from(row: CatalogRow) -> Self {
        let grapes = RawListField::from(row.grape_varieties)
            .or_legacy(RawListField::from(row.legacy_grapes_text));
        let pairings = RawListField::from(row.food_pairings)
            .or_legacy(RawListField::from(row.legacy_pairings_text));
        let style = normalize_wine_style(
            RawListField::from(row.wine_style),
            row.legacy_body_text.as_deref(),
        );
        let usage_count = u32::try_from(row.usage_count.max(0)).unwrap_or(u32::MAX);

        Self {
            grape_varieties: grapes.normalize(),
            food_pairings: pairings.normalize(),
            wine_style: style,
            vintage: row.vintage,
            wine_type: row.wine_type,
            beverage_type: row.beverage_type,
            region: row.region,
            country: row.country,
            price_point: row.price_point,
            alcohol_content: row.alcohol_content,
            notes: row.sommelier_notes,
            image_url: row.image_url,
            website: row.website,
            ..WineCandidate::new(Origin::Catalog, row.id, row.wine_name, row.producer)
        }
        .with_usage_count(usage_count)
    }
}

impl From<EventLocalRow> for WineCandidate {
    fn from(row: EventLocalRow) -> Self {
        Self {
            grape_varieties: RawListField::from(row.grape_varieties).normalize(),
            food_pairings: RawListField::from(row.food_pairings).normalize(),
            wine_style: normalize_wine_style(RawListField::from(row.wine_style), None),
            vintage: row.vintage,
            wine_type: row.wine_type,
            beverage_type: row.beverage_type,
            region: row.region,
            country: row.country,
            price_point: row.price_point,
            alcohol_content: row.alcohol_content,
            notes: row.sommelier_notes,
            image_url: row.image_url,
            ..WineCandidate::new(Origin::EventLocal, row.id, row.wine_name, row.producer)
        }
    }
}
