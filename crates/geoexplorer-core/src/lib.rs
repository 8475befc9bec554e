//! geoexplorer core - Domain models, GeoJSON summaries and configuration
//!
//! This crate contains the domain types shared by the gateway and state
//! crates, the GeoJSON summarizer with its color scales, and the event bus.

pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod geo;
pub mod models;
pub mod summary;

pub use error::{ExplorerError, Result};
