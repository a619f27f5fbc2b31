//! Immutable rating snapshot.
//!
//! A snapshot bundles the filtered rating set with the matrix built from it.
//! It is fully constructed before anyone can see it and never mutated
//! afterwards, so an `Arc<RatingSnapshot>` can be shared between threads
//! serving concurrent requests. How often to rebuild one is up to the
//! caller.

use crate::params::{RecommendParams, RecommendationMode};
use data_loader::{load_ratings, FilteredRatingSet, RatingsRepository, RecipeId, Result, UserId};
use pipeline::{ItemBasedStrategy, RecommendationStrategy, SeedSelector, UserBasedStrategy};
use similarity::{build_matrix, Neighbor, NeighborKind, RatingMatrix};
use tracing::{debug, instrument};

/// A filtered rating set and its rating matrix
#[derive(Debug, Clone)]
pub struct RatingSnapshot {
    ratings: FilteredRatingSet,
    matrix: RatingMatrix,
    min_user_votes: usize,
    min_recipe_votes: usize,
}

impl RatingSnapshot {
    /// Read the repository, filter it and build the matrix
    #[instrument(skip(repository))]
    pub fn build(
        repository: &dyn RatingsRepository,
        min_user_votes: usize,
        min_recipe_votes: usize,
    ) -> Result<Self> {
        let ratings = load_ratings(repository, min_user_votes, min_recipe_votes)?;
        Self::from_ratings(ratings, min_user_votes, min_recipe_votes)
    }

    /// Build the matrix for an already-filtered rating set
    pub fn from_ratings(
        ratings: FilteredRatingSet,
        min_user_votes: usize,
        min_recipe_votes: usize,
    ) -> Result<Self> {
        let matrix = build_matrix(&ratings)?;
        debug!(
            "Snapshot ready: {} ratings, shape {:?}",
            ratings.len(),
            matrix.shape()
        );
        Ok(Self {
            ratings,
            matrix,
            min_user_votes,
            min_recipe_votes,
        })
    }

    pub fn ratings(&self) -> &FilteredRatingSet {
        &self.ratings
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    /// The vote thresholds this snapshot was filtered with
    pub fn thresholds(&self) -> (usize, usize) {
        (self.min_user_votes, self.min_recipe_votes)
    }

    /// Recommend recipes for `user_id` from this snapshot
    ///
    /// The vote thresholds in `params` are ignored; the snapshot's own apply.
    pub fn recommend(
        &self,
        user_id: UserId,
        mode: RecommendationMode,
        params: &RecommendParams,
    ) -> Result<Vec<RecipeId>> {
        params.validate()?;
        let strategy = strategy_for(mode, params);
        debug!("Recommending for user {} with {}", user_id, strategy.name());
        strategy.recommend(user_id, &self.ratings, &self.matrix)
    }

    /// Recipes nearest to `recipe_id`
    pub fn similar_recipes(&self, recipe_id: RecipeId, params: &RecommendParams) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.matrix
            .nearest(recipe_id, NeighborKind::Item, params.k, params.metric, true)
    }

    /// Users nearest to `user_id`
    pub fn similar_users(&self, user_id: UserId, params: &RecommendParams) -> Result<Vec<Neighbor>> {
        params.validate()?;
        self.matrix
            .nearest(user_id, NeighborKind::User, params.k, params.metric, true)
    }
}

/// Build the aggregation strategy a mode stands for
pub fn strategy_for(mode: RecommendationMode, params: &RecommendParams) -> Box<dyn RecommendationStrategy> {
    match mode {
        RecommendationMode::ItemBased => {
            let seeds = SeedSelector::new(params.min_rating)
                .with_max_seeds(params.max_seeds)
                .with_fallback(params.fallback_recipe_id)
                .with_rng_seed(params.rng_seed);
            Box::new(
                ItemBasedStrategy::new(seeds)
                    .with_k(params.k)
                    .with_metric(params.metric)
                    .with_max_recommendations(params.max_recommendations)
                    .with_exclude_rated(params.exclude_rated),
            )
        }
        RecommendationMode::UserBased => Box::new(
            UserBasedStrategy::new()
                .with_k(params.k)
                .with_metric(params.metric)
                .with_max_recommendations(params.max_recommendations)
                .with_exclude_rated(params.exclude_rated),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{InMemoryRatingsRepository, Interaction, RecommendError};
    use std::sync::Arc;

    fn repository() -> InMemoryRatingsRepository {
        InMemoryRatingsRepository::new(vec![
            Interaction::new(1, 100, 5.0),
            Interaction::new(1, 101, 1.0),
            Interaction::new(2, 100, 4.0),
            Interaction::new(2, 101, 5.0),
            Interaction::new(3, 100, 5.0),
            Interaction::new(3, 101, 1.0),
        ])
    }

    #[test]
    fn test_build_snapshot() {
        let snapshot = RatingSnapshot::build(&repository(), 0, 0).unwrap();
        assert_eq!(snapshot.ratings().len(), 6);
        assert_eq!(snapshot.matrix().shape(), (2, 3));
        assert_eq!(snapshot.thresholds(), (0, 0));
    }

    #[test]
    fn test_over_filtered_snapshot_is_empty_dataset() {
        let result = RatingSnapshot::build(&repository(), 10, 0);
        assert!(matches!(result, Err(RecommendError::EmptyDataset { .. })));
    }

    #[test]
    fn test_similar_recipes_scenario() {
        let snapshot = RatingSnapshot::build(&repository(), 0, 0).unwrap();
        let params = RecommendParams::default().with_k(1);
        let neighbors = snapshot.similar_recipes(100, &params).unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].id, 101);
    }

    #[test]
    fn test_snapshot_is_shareable_between_threads() {
        let snapshot = Arc::new(RatingSnapshot::build(&repository(), 0, 0).unwrap());
        let params = RecommendParams::default().with_k(2);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let snapshot = Arc::clone(&snapshot);
                let params = params.clone();
                std::thread::spawn(move || {
                    snapshot.recommend(1, RecommendationMode::UserBased, &params)
                })
            })
            .collect();

        let results: Vec<Vec<RecipeId>> = handles
            .into_iter()
            .map(|h| h.join().unwrap().unwrap())
            .collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
    }
}
