//! Seed selection and recommendation aggregation.
//!
//! This crate provides:
//! - SeedSelector for choosing the anchor recipes of item-based search
//! - RecommendationStrategy trait with item-based and user-based policies
//! - RecommendationList, the deduplicating accumulator both policies share
//!
//! ## Architecture
//! Given a filtered rating set and the matrix built from it:
//! 1. Item-based: seeds -> similar recipes per seed -> concatenate -> dedupe
//! 2. User-based: similar users -> one favourite recipe per user -> dedupe
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{ItemBasedStrategy, RecommendationStrategy, SeedSelector};
//!
//! let strategy = ItemBasedStrategy::new(SeedSelector::new(4.0)).with_k(10);
//! let recipes = strategy.recommend(user_id, &ratings, &matrix)?;
//! ```

pub mod traits;
pub mod seed;
pub mod recommendation_list;
pub mod strategies;

// Re-export main types
pub use recommendation_list::RecommendationList;
pub use seed::{select_seed, SeedSelector, DEFAULT_FALLBACK_RECIPE_ID, DEFAULT_RNG_SEED, MAX_SEEDS};
pub use strategies::{ItemBasedStrategy, UserBasedStrategy, DEFAULT_K, DEFAULT_MAX_RECOMMENDATIONS};
pub use traits::RecommendationStrategy;
