//! Request parameters and recommendation modes.
//!
//! `RecommendParams` carries every tunable of one recommendation call.
//! Defaults match the entry-point contract (50/50 vote thresholds, rating
//! 4.0, k = 10). A JSON file may override any subset of the fields.

use data_loader::{RecipeId, RecommendError, Result};
use pipeline::{DEFAULT_FALLBACK_RECIPE_ID, DEFAULT_RNG_SEED, MAX_SEEDS};
use serde::{Deserialize, Serialize};
use similarity::DistanceMetric;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Collaborative filtering flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationMode {
    /// Favourite recipes of similar users
    UserBased,
    /// Recipes similar to the user's highly rated recipes
    ItemBased,
}

impl fmt::Display for RecommendationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendationMode::UserBased => f.write_str("user-based"),
            RecommendationMode::ItemBased => f.write_str("item-based"),
        }
    }
}

impl FromStr for RecommendationMode {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "user-based" | "user_based" => Ok(RecommendationMode::UserBased),
            "item" | "item-based" | "item_based" | "recipe" => Ok(RecommendationMode::ItemBased),
            other => Err(RecommendError::InvalidArgument(format!(
                "unknown recommendation mode '{}'",
                other
            ))),
        }
    }
}

/// Tunables for one recommendation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendParams {
    /// A user must have strictly more ratings than this
    pub min_user_votes: usize,
    /// A recipe must have strictly more ratings than this
    pub min_recipe_votes: usize,
    /// Seed recipes need at least this rating
    pub min_rating: f32,
    /// Neighbors per similarity query
    pub k: usize,
    /// Cap on the returned list
    pub max_recommendations: usize,
    pub metric: DistanceMetric,
    /// Seed of the random source used for seed sampling
    pub rng_seed: u64,
    /// Seeds drawn per item-based call (1..=5)
    pub max_seeds: usize,
    /// Anchor used when the user has no qualifying ratings
    pub fallback_recipe_id: RecipeId,
    /// Never recommend recipes the user already rated
    pub exclude_rated: bool,
}

impl Default for RecommendParams {
    fn default() -> Self {
        Self {
            min_user_votes: 50,
            min_recipe_votes: 50,
            min_rating: 4.0,
            k: 10,
            max_recommendations: 10,
            metric: DistanceMetric::Cosine,
            rng_seed: DEFAULT_RNG_SEED,
            max_seeds: MAX_SEEDS,
            fallback_recipe_id: DEFAULT_FALLBACK_RECIPE_ID,
            exclude_rated: false,
        }
    }
}

impl RecommendParams {
    /// Configure both vote thresholds
    pub fn with_thresholds(mut self, min_user_votes: usize, min_recipe_votes: usize) -> Self {
        self.min_user_votes = min_user_votes;
        self.min_recipe_votes = min_recipe_votes;
        self
    }

    pub fn with_min_rating(mut self, min_rating: f32) -> Self {
        self.min_rating = min_rating;
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_max_recommendations(mut self, max: usize) -> Self {
        self.max_recommendations = max;
        self
    }

    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = seed;
        self
    }

    pub fn with_max_seeds(mut self, max_seeds: usize) -> Self {
        self.max_seeds = max_seeds;
        self
    }

    pub fn with_fallback_recipe_id(mut self, recipe_id: RecipeId) -> Self {
        self.fallback_recipe_id = recipe_id;
        self
    }

    pub fn with_exclude_rated(mut self, exclude: bool) -> Self {
        self.exclude_rated = exclude;
        self
    }

    /// Reject parameter combinations no call could honour
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RecommendError::InvalidArgument("k must be at least 1".to_string()));
        }
        if !self.min_rating.is_finite() {
            return Err(RecommendError::InvalidArgument(format!(
                "min_rating must be finite, got {}",
                self.min_rating
            )));
        }
        if self.max_recommendations == 0 {
            return Err(RecommendError::InvalidArgument(
                "max_recommendations must be at least 1".to_string(),
            ));
        }
        if !(1..=MAX_SEEDS).contains(&self.max_seeds) {
            return Err(RecommendError::InvalidArgument(format!(
                "max_seeds must be between 1 and {}, got {}",
                MAX_SEEDS, self.max_seeds
            )));
        }
        Ok(())
    }

    /// Parse parameters from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)
            .map_err(|e| RecommendError::InvalidArgument(format!("invalid parameters: {}", e)))?;
        params.validate()?;
        Ok(params)
    }

    /// Load parameters from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            RecommendError::InvalidArgument(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_entry_point_contract() {
        let params = RecommendParams::default();
        assert_eq!(params.min_user_votes, 50);
        assert_eq!(params.min_recipe_votes, 50);
        assert_eq!(params.min_rating, 4.0);
        assert_eq!(params.k, 10);
        assert_eq!(params.metric, DistanceMetric::Cosine);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!("user".parse::<RecommendationMode>().unwrap(), RecommendationMode::UserBased);
        assert_eq!("Item-Based".parse::<RecommendationMode>().unwrap(), RecommendationMode::ItemBased);
        assert_eq!("recipe".parse::<RecommendationMode>().unwrap(), RecommendationMode::ItemBased);
        assert!(matches!(
            "bogus".parse::<RecommendationMode>(),
            Err(RecommendError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validation() {
        assert!(RecommendParams::default().with_k(0).validate().is_err());
        assert!(RecommendParams::default().with_min_rating(f32::NAN).validate().is_err());
        assert!(RecommendParams::default().with_max_seeds(0).validate().is_err());
        assert!(RecommendParams::default().with_max_seeds(6).validate().is_err());
        assert!(RecommendParams::default().with_max_recommendations(0).validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let params =
            RecommendParams::from_json_str(r#"{ "k": 5, "metric": "euclidean", "min_user_votes": 3 }"#)
                .unwrap();
        assert_eq!(params.k, 5);
        assert_eq!(params.metric, DistanceMetric::Euclidean);
        assert_eq!(params.min_user_votes, 3);
        assert_eq!(params.min_recipe_votes, 50);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            RecommendParams::from_json_str(r#"{ "metric": "hamming" }"#),
            Err(RecommendError::InvalidArgument(_))
        ));
        assert!(RecommendParams::from_json_str(r#"{ "k": 0 }"#).is_err());
    }
}
