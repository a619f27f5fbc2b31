//! Core traits for the recommendation aggregator.
//!
//! This module defines the RecommendationStrategy trait so the item-based
//! and user-based policies can be selected at runtime behind one interface.

use data_loader::{FilteredRatingSet, RecipeId, Result, UserId};
use similarity::RatingMatrix;

/// Turns a neighborhood search into a recommendation list for one user.
///
/// ## Design Note
/// - `Send + Sync` allows strategies to be shared between request threads
/// - Strategies only read the rating set and matrix; both were built for
///   this call (or taken from an immutable snapshot)
/// - The returned list never repeats a recipe id
pub trait RecommendationStrategy: Send + Sync {
    /// Returns the name of this strategy (for logging/debugging)
    fn name(&self) -> &str;

    /// Recommend recipes for `user_id`.
    ///
    /// # Arguments
    /// * `user_id` - The user recommendations are for
    /// * `ratings` - The filtered rating set `matrix` was built from
    /// * `matrix` - The rating matrix to search
    fn recommend(
        &self,
        user_id: UserId,
        ratings: &FilteredRatingSet,
        matrix: &RatingMatrix,
    ) -> Result<Vec<RecipeId>>;
}
