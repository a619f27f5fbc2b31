//! Rating Store Loader: minimum-activity filtering of raw interactions.
//!
//! A record survives when its user has strictly more than `min_user_votes`
//! records AND its recipe has strictly more than `min_recipe_votes` records.
//! Both counts are taken over the unfiltered input; the filter is applied
//! once, never re-applied to its own output.

use crate::error::Result;
use crate::repository::RatingsRepository;
use crate::types::*;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Per-user and per-recipe record counts over the raw input
#[derive(Debug, Default)]
pub struct VoteCounts {
    pub per_user: HashMap<UserId, usize>,
    pub per_recipe: HashMap<RecipeId, usize>,
}

impl VoteCounts {
    /// Count records per user and per recipe in parallel
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        interactions
            .par_iter()
            .fold(VoteCounts::default, |mut counts, interaction| {
                *counts.per_user.entry(interaction.user_id).or_insert(0) += 1;
                *counts.per_recipe.entry(interaction.recipe_id).or_insert(0) += 1;
                counts
            })
            .reduce(VoteCounts::default, |mut acc, counts| {
                for (user_id, n) in counts.per_user {
                    *acc.per_user.entry(user_id).or_insert(0) += n;
                }
                for (recipe_id, n) in counts.per_recipe {
                    *acc.per_recipe.entry(recipe_id).or_insert(0) += n;
                }
                acc
            })
    }

    pub fn user_votes(&self, user_id: UserId) -> usize {
        self.per_user.get(&user_id).copied().unwrap_or(0)
    }

    pub fn recipe_votes(&self, recipe_id: RecipeId) -> usize {
        self.per_recipe.get(&recipe_id).copied().unwrap_or(0)
    }
}

/// Load all interactions from `repository` and keep the active ones
///
/// Fails with `DataUnavailable` when the repository cannot be read.
#[instrument(skip(repository))]
pub fn load_ratings(
    repository: &dyn RatingsRepository,
    min_user_votes: usize,
    min_recipe_votes: usize,
) -> Result<FilteredRatingSet> {
    let interactions = repository.interactions()?;
    Ok(filter_interactions(interactions, min_user_votes, min_recipe_votes))
}

/// Apply the vote thresholds to an already-loaded record list
pub fn filter_interactions(
    interactions: Vec<Interaction>,
    min_user_votes: usize,
    min_recipe_votes: usize,
) -> FilteredRatingSet {
    let total = interactions.len();
    let counts = VoteCounts::from_interactions(&interactions);

    let kept = interactions.into_iter().filter(|interaction| {
        counts.user_votes(interaction.user_id) > min_user_votes
            && counts.recipe_votes(interaction.recipe_id) > min_recipe_votes
    });
    let ratings = FilteredRatingSet::new(kept);

    debug!(
        "Kept {} of {} records ({} users, {} recipes before filtering)",
        ratings.len(),
        total,
        counts.per_user.len(),
        counts.per_recipe.len()
    );
    ratings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DataLoadError, LoadResult, RecommendError};
    use crate::repository::InMemoryRatingsRepository;

    struct UnreadableRepository;

    impl RatingsRepository for UnreadableRepository {
        fn interactions(&self) -> LoadResult<Vec<Interaction>> {
            Err(DataLoadError::FileNotFound {
                path: "RAW_interactions.csv".to_string(),
            })
        }
    }

    fn sample() -> Vec<Interaction> {
        vec![
            // user 1: 3 votes, user 2: 2 votes, user 3: 1 vote
            Interaction::new(1, 100, 5.0),
            Interaction::new(1, 101, 4.0),
            Interaction::new(1, 102, 3.0),
            Interaction::new(2, 100, 2.0),
            Interaction::new(2, 101, 1.0),
            Interaction::new(3, 100, 5.0),
        ]
        // recipe 100: 3 votes, 101: 2 votes, 102: 1 vote
    }

    #[test]
    fn test_zero_thresholds_keep_everything() {
        let ratings = filter_interactions(sample(), 0, 0);
        assert_eq!(ratings.len(), 6);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // users need > 1 vote, recipes need > 1 vote
        let ratings = filter_interactions(sample(), 1, 1);
        let pairs: Vec<(UserId, RecipeId)> = ratings
            .records()
            .iter()
            .map(|r| (r.user_id, r.recipe_id))
            .collect();
        assert_eq!(pairs, vec![(1, 100), (1, 101), (2, 100), (2, 101)]);
    }

    #[test]
    fn test_counts_come_from_unfiltered_input() {
        // User 2 has 2 raw votes. After dropping recipe 102 user 1 would
        // also have 2, but user 1 is judged on its 3 raw votes.
        let ratings = filter_interactions(sample(), 2, 1);
        assert!(ratings.records().iter().all(|r| r.user_id == 1));
        assert_eq!(ratings.len(), 2);
    }

    #[test]
    fn test_every_kept_record_passes_raw_counts() {
        let raw = sample();
        let counts = VoteCounts::from_interactions(&raw);
        for (u, r) in [(0, 0), (1, 0), (0, 2), (2, 2), (5, 5)] {
            let ratings = filter_interactions(raw.clone(), u, r);
            for record in ratings.records() {
                assert!(counts.user_votes(record.user_id) > u);
                assert!(counts.recipe_votes(record.recipe_id) > r);
            }
        }
    }

    #[test]
    fn test_load_ratings_from_repository() {
        let repo = InMemoryRatingsRepository::new(sample());
        let ratings = load_ratings(&repo, 0, 2).unwrap();
        assert!(ratings.records().iter().all(|r| r.recipe_id == 100));
    }

    #[test]
    fn test_unreadable_repository() {
        let result = load_ratings(&UnreadableRepository, 0, 0);
        assert!(matches!(result, Err(RecommendError::DataUnavailable(_))));
    }
}
