//! # Recommendation Engine
//!
//! This module is the outward entry point of the recommendation core:
//! 1. Validate the request
//! 2. Load and filter ratings from the repository
//! 3. Build the rating matrix
//! 4. Run the strategy selected by the mode
//! 5. Return a deduplicated list of recipe ids
//!
//! Every call rebuilds its rating set and matrix from scratch; nothing is
//! cached between calls. Callers that want to amortise the build take a
//! `RatingSnapshot` and query it directly.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument};

use data_loader::{
    RatingsRepository, RecipeDetail, RecipeDetailSource, RecipeId, Result, UserId,
};
use similarity::Neighbor;

use crate::params::{RecommendParams, RecommendationMode};
use crate::snapshot::RatingSnapshot;

/// Recommendation engine over an injected ratings repository
#[derive(Clone)]
pub struct RecommendationEngine {
    repository: Arc<dyn RatingsRepository>,
}

impl RecommendationEngine {
    /// Create an engine reading from `repository`
    pub fn new(repository: Arc<dyn RatingsRepository>) -> Self {
        Self { repository }
    }

    /// Build a fresh snapshot for the given vote thresholds
    pub fn snapshot(&self, min_user_votes: usize, min_recipe_votes: usize) -> Result<Arc<RatingSnapshot>> {
        RatingSnapshot::build(self.repository.as_ref(), min_user_votes, min_recipe_votes).map(Arc::new)
    }

    /// Main entry point: recommend recipes for a user
    ///
    /// # Returns
    /// Recipe ids in recommendation order, never repeating an id
    ///
    /// # Errors
    /// `DataUnavailable`, `EmptyDataset`, `InsufficientData`, `UnknownId`
    /// or `InvalidArgument`, propagated unchanged
    #[instrument(skip(self, params))]
    pub fn recommend(
        &self,
        user_id: UserId,
        mode: RecommendationMode,
        params: &RecommendParams,
    ) -> Result<Vec<RecipeId>> {
        let start_time = Instant::now();
        params.validate()?;

        let snapshot = self.snapshot(params.min_user_votes, params.min_recipe_votes)?;
        let recommendations = snapshot.recommend(user_id, mode, params)?;

        info!(
            "Recommended {} recipes for user {} ({}) in {:.2?}",
            recommendations.len(),
            user_id,
            mode,
            start_time.elapsed()
        );
        Ok(recommendations)
    }

    /// Recommend and enrich each recipe through `details`
    pub fn recommend_with_details(
        &self,
        user_id: UserId,
        mode: RecommendationMode,
        params: &RecommendParams,
        details: &dyn RecipeDetailSource,
    ) -> Result<Vec<RecipeDetail>> {
        let recommendations = self.recommend(user_id, mode, params)?;
        Ok(details.enrich(&recommendations)?)
    }

    /// Recipes most similar to `recipe_id`
    pub fn similar_recipes(&self, recipe_id: RecipeId, params: &RecommendParams) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.snapshot(params.min_user_votes, params.min_recipe_votes)?
            .similar_recipes(recipe_id, params)
    }

    /// Users most similar to `user_id`
    pub fn similar_users(&self, user_id: UserId, params: &RecommendParams) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.snapshot(params.min_user_votes, params.min_recipe_votes)?
            .similar_users(user_id, params)
    }
}

/// Recommend with the mode given by name ("user-based", "item-based", ...)
///
/// An unknown mode fails with `InvalidArgument` before any data is read.
pub fn recommend(
    repository: Arc<dyn RatingsRepository>,
    user_id: UserId,
    mode: &str,
    params: &RecommendParams,
) -> Result<Vec<RecipeId>> {
    let mode: RecommendationMode = mode.parse()?;
    RecommendationEngine::new(repository).recommend(user_id, mode, params)
}

impl std::fmt::Debug for RecommendationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationEngine").finish_non_exhaustive()
    }
}
