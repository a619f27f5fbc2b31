//! Engine crate for the recipe recommendation core.
//!
//! This crate exposes the entry point that ties the loader, the
//! similarity search and the aggregation strategies together.

pub mod orchestrator;
pub mod params;
pub mod snapshot;

pub use orchestrator::{recommend, RecommendationEngine};
pub use params::{RecommendParams, RecommendationMode};
pub use snapshot::{strategy_for, RatingSnapshot};
