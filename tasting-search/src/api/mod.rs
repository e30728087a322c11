//! HTTP API handlers for tasting-search

pub mod health;
pub mod wines;

pub use health::health_routes;
pub use wines::{search_wines, select_wine};
