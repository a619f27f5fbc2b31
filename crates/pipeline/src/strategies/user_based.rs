//! User-based aggregation.
//!
//! ## Algorithm
//! 1. Find the `k` users nearest to the target user
//! 2. Walk the neighbors in order; for each one, take their highest-rated
//!    recipe that is not already in the list, falling through to their
//!    next-highest when it is
//! 3. Stop when every neighbor was consulted or the list is full
//!
//! Each neighbor contributes at most one recipe. A neighbor whose recipes
//! are all taken contributes nothing, so the walk always terminates.

use super::{DEFAULT_K, DEFAULT_MAX_RECOMMENDATIONS};
use crate::recommendation_list::RecommendationList;
use crate::traits::RecommendationStrategy;
use data_loader::{FilteredRatingSet, Interaction, RecipeId, Result, UserId};
use similarity::{DistanceMetric, NeighborKind, RatingMatrix};
use tracing::{debug, instrument};

/// Recommends the favourite recipes of similar users
#[derive(Debug, Clone)]
pub struct UserBasedStrategy {
    k: usize,
    metric: DistanceMetric,
    max_recommendations: usize,
    exclude_rated: bool,
}

impl UserBasedStrategy {
    pub fn new() -> Self {
        Self {
            k: DEFAULT_K,
            metric: DistanceMetric::default(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
            exclude_rated: false,
        }
    }

    /// Configure the number of similar users (default: 10)
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

    /// Skip recipes the target user already rated (default: false)
    pub fn with_exclude_rated(mut self, exclude: bool) -> Self {
        self.exclude_rated = exclude;
        self
    }
}

impl Default for UserBasedStrategy {
    fn default() -> Self {
        Self::new()
    }
}

/// A user's ratings from highest to lowest; equal ratings by recipe id
fn ranked_by_rating(mut ratings: Vec<Interaction>) -> Vec<Interaction> {
    ratings.sort_by(|a, b| {
        b.rating
            .total_cmp(&a.rating)
            .then(a.recipe_id.cmp(&b.recipe_id))
    });
    ratings
}

impl RecommendationStrategy for UserBasedStrategy {
    fn name(&self) -> &str {
        "UserBasedStrategy"
    }

    #[instrument(skip(self, ratings, matrix))]
    fn recommend(
        &self,
        user_id: UserId,
        ratings: &FilteredRatingSet,
        matrix: &RatingMatrix,
    ) -> Result<Vec<RecipeId>> {
        let neighbors = matrix.nearest(user_id, NeighborKind::User, self.k, self.metric, false)?;

        let mut list = RecommendationList::with_limit(self.max_recommendations);
        if self.exclude_rated {
            list = list.excluding(ratings.user_ratings(user_id).iter().map(|r| r.recipe_id));
        }

        for neighbor in &neighbors {
            if list.is_full() {
                break;
            }
            let favourite = ranked_by_rating(ratings.user_ratings(neighbor.id))
                .into_iter()
                .map(|r| r.recipe_id)
                .find(|&recipe_id| !list.rejects(recipe_id));
            if let Some(recipe_id) = favourite {
                list.push(recipe_id);
            }
        }

        debug!(
            "User-based: {} neighbors -> {} recommendations",
            neighbors.len(),
            list.len()
        );
        Ok(list.into_vec())
    }
}
