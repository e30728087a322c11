//! # Tasting Common Library
//!
//! Shared code for the wine tasting services:
//! - Error type and result alias
//! - Bootstrap configuration and root folder resolution
//! - Database initialization and raw row models for the
//!   `catalog` and `event_local` collections

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
