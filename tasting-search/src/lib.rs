//! tasting-search library - wine name autocomplete engine
//!
//! Searches the shared wine catalog and the event-local wine list in
//! parallel, normalizes both into [`WineCandidate`]s, removes cross-source
//! duplicates and drives the autocomplete dropdown through
//! [`SearchController`]. A small HTTP surface exposes the same pipeline.

use axum::Router;
use std::sync::Arc;
use tasting_common::config::SearchSettings;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod candidate;
pub mod controller;
pub mod executor;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod store;

pub use candidate::{IdentityKey, Origin, WineCandidate};
pub use controller::{CallbackSink, Phase, SearchController, SelectionSink, ViewState};
pub use pipeline::{record_selection, SearchPipeline, UsageUpdate};
pub use store::{SqliteWineStore, WineStore};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: SearchPipeline,
}

impl AppState {
    /// Create new application state
    pub fn new(store: Arc<dyn WineStore>, settings: &SearchSettings) -> Self {
        Self {
            pipeline: SearchPipeline::new(store, settings),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/api/wines/search", get(api::search_wines))
        .route("/api/wines/select", post(api::select_wine))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
