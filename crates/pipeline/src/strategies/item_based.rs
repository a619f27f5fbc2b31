//! Item-based aggregation.
//!
//! ## Algorithm
//! 1. Pick seed recipes for the user (SeedSelector)
//! 2. For each seed, find its `k` nearest recipes
//! 3. Concatenate the neighbor lists in seed order
//! 4. Deduplicate by recipe id, keeping first-seen order
//! 5. Truncate to `max_recommendations`

use super::{DEFAULT_K, DEFAULT_MAX_RECOMMENDATIONS};
use crate::recommendation_list::RecommendationList;
use crate::seed::SeedSelector;
use crate::traits::RecommendationStrategy;
use data_loader::{FilteredRatingSet, RecipeId, Result, UserId};
use similarity::{DistanceMetric, NeighborKind, RatingMatrix};
use tracing::{debug, instrument};

/// Recommends recipes similar to the user's highly rated ones
#[derive(Debug, Clone)]
pub struct ItemBasedStrategy {
    seeds: SeedSelector,
    k: usize,
    metric: DistanceMetric,
    max_recommendations: usize,
    exclude_rated: bool,
}

impl ItemBasedStrategy {
    /// Create a strategy drawing seeds from `seeds`
    pub fn new(seeds: SeedSelector) -> Self {
        Self {
            seeds,
            k: DEFAULT_K,
            metric: DistanceMetric::default(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            exclude_rated: false,
        }
    }

    /// Configure neighbors per seed (default: 10)
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Configure the distance metric (default: cosine)
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Configure the output cap (default: 10)
    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    /// Skip recipes the user already rated (default: false)
    pub fn with_exclude_rated(mut self, exclude: bool) -> Self {
        self.exclude_rated = exclude;
        self
    }

    /// Aggregate the neighborhoods of explicit seed recipes
    pub fn recommend_from_seeds(
        &self,
        seeds: &[RecipeId],
        matrix: &RatingMatrix,
        excluded: impl IntoIterator<Item = RecipeId>,
    ) -> Result<Vec<RecipeId>> {
        let mut neighbor_ids = Vec::with_capacity(seeds.len() * self.k);
        for &seed in seeds {
            let neighbors = matrix.nearest(seed, NeighborKind::Item, self.k, self.metric, false)?;
            neighbor_ids.extend(neighbors.into_iter().map(|n| n.id));
        }

        let mut list = RecommendationList::with_limit(self.max_recommendations).excluding(excluded);
        for id in neighbor_ids {
            if list.is_full() {
                break;
            }
            list.push(id);
        }
        Ok(list.into_vec())
    }
}

impl RecommendationStrategy for ItemBasedStrategy {
    fn name(&self) -> &str {
        "ItemBasedStrategy"
    }

    #[instrument(skip(self, ratings, matrix))]
    fn recommend(
        &self,
        user_id: UserId,
        ratings: &FilteredRatingSet,
        matrix: &RatingMatrix,
    ) -> Result<Vec<RecipeId>> {
        let seeds = self.seeds.select(user_id, ratings);
        let excluded: Vec<RecipeId> = if self.exclude_rated {
            ratings.user_ratings(user_id).iter().map(|r| r.recipe_id).collect()
        } else {
            Vec::new()
        };

        let recommendations = self.recommend_from_seeds(&seeds, matrix, excluded)?;
        debug!(
            "Item-based: {} seeds -> {} recommendations",
            seeds.len(),
            recommendations.len()
        );
        Ok(recommendations)
    }
}
