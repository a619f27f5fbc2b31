//! Seed Selector: picks the recipes an item-based search is anchored on.
//!
//! ## Algorithm
//! 1. Collect the recipes the user rated at or above `min_rating`
//! 2. Sample up to `max_seeds` of them with a seeded random source
//! 3. If none qualify, return the fallback recipe instead of failing
//!
//! The random source is injectable (`select_with_rng`); `select` uses a
//! `StdRng` seeded from `rng_seed`, so the same inputs always give the
//! same seeds.

use data_loader::{FilteredRatingSet, RecipeId, UserId};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// Recipe used as the anchor when a user has no qualifying ratings.
///
/// 27208 is among the most-rated recipes of the food.com dump, so it
/// usually survives the vote thresholds.
pub const DEFAULT_FALLBACK_RECIPE_ID: RecipeId = 27208;

/// Seed for the default random source
pub const DEFAULT_RNG_SEED: u64 = 42;

/// Upper bound on the number of seeds drawn per user
pub const MAX_SEEDS: usize = 5;

/// Chooses anchor recipes for a user
#[derive(Debug, Clone)]
pub struct SeedSelector {
    min_rating: f32,
    max_seeds: usize,
    fallback_recipe_id: RecipeId,
    rng_seed: u64,
}

impl SeedSelector {
    /// Create a selector with the given rating threshold and defaults
    pub fn new(min_rating: f32) -> Self {
        Self {
            min_rating,
            max_seeds: MAX_SEEDS,
            fallback_recipe_id: DEFAULT_FALLBACK_RECIPE_ID,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }

    /// Configure how many seeds to draw; clamped to 1..=MAX_SEEDS
    pub fn with_max_seeds(mut self, max_seeds: usize) -> Self {
        self.max_seeds = max_seeds.clamp(1, MAX_SEEDS);
        self
    }

    /// Configure the fallback anchor
    pub fn with_fallback(mut self, recipe_id: RecipeId) -> Self {
        self.fallback_recipe_id = recipe_id;
        self
    }

    /// Configure the seed of the default random source
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn fallback_recipe_id(&self) -> RecipeId {
        self.fallback_recipe_id
    }

    /// Select seeds using the selector's own seeded random source
    pub fn select(&self, user_id: UserId, ratings: &FilteredRatingSet) -> Vec<RecipeId> {
        let mut rng = StdRng::seed_from_u64(self.rng_seed);
        self.select_with_rng(user_id, ratings, &mut rng)
    }

    /// Select seeds drawing randomness from `rng`
    pub fn select_with_rng<R: Rng + ?Sized>(
        &self,
        user_id: UserId,
        ratings: &FilteredRatingSet,
        rng: &mut R,
    ) -> Vec<RecipeId> {
        let mut qualifying: Vec<RecipeId> = ratings
            .user_ratings(user_id)
            .into_iter()
            .filter(|r| r.rating >= self.min_rating)
            .map(|r| r.recipe_id)
            .collect();

        if qualifying.is_empty() {
            warn!(
                "User {} has no ratings >= {}, falling back to recipe {}",
                user_id, self.min_rating, self.fallback_recipe_id
            );
            return vec![self.fallback_recipe_id];
        }

        // Sample from a canonical order so only the rng decides the outcome
        qualifying.sort_unstable();
        let seeds: Vec<RecipeId> = qualifying
            .choose_multiple(rng, self.max_seeds)
            .copied()
            .collect();

        debug!(
            "Selected {} seeds for user {} from {} qualifying recipes",
            seeds.len(),
            user_id,
            qualifying.len()
        );
        seeds
    }
}

/// Select seeds with default sampling settings
pub fn select_seed(user_id: UserId, ratings: &FilteredRatingSet, min_rating: f32) -> Vec<RecipeId> {
    SeedSelector::new(min_rating).select(user_id, ratings)
}
