//! Core domain types for the recipe rating dataset.
//!
//! - Type aliases keep user ids and recipe ids apart at the call site
//! - `Interaction` is one raw (user, recipe, rating) record
//! - `FilteredRatingSet` is the immutable record set the matrix is built from
//! - `RecipeDetail` is the flat, optionally-enriched description of a recipe

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user in the interaction dump
pub type UserId = u32;

/// Unique identifier for a recipe in the interaction dump
pub type RecipeId = u32;

// =============================================================================
// Interaction
// =============================================================================

/// A single rating a user gave to a recipe
///
/// Ratings are typically in 0-5. The date and review text of the raw dump
/// are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: UserId,
    pub recipe_id: RecipeId,
    pub rating: f32,
}

impl Interaction {
    pub fn new(user_id: UserId, recipe_id: RecipeId, rating: f32) -> Self {
        Self {
            user_id,
            recipe_id,
            rating,
        }
    }
}

// =============================================================================
// FilteredRatingSet
// =============================================================================

/// The set of interactions that survived the minimum-activity filters.
///
/// Every (user, recipe) pair appears at most once. When the input repeats a
/// pair, the last rating wins and keeps the position of the first occurrence.
/// Once built the set is never mutated; a new set means a new matrix.
#[derive(Debug, Clone, Default)]
pub struct FilteredRatingSet {
    records: Vec<Interaction>,
    /// Positions in `records` for each user, in record order
    by_user: HashMap<UserId, Vec<usize>>,
}

impl FilteredRatingSet {
    /// Build a set from records, collapsing repeated pairs
    pub fn new(interactions: impl IntoIterator<Item = Interaction>) -> Self {
        let mut records: Vec<Interaction> = Vec::new();
        let mut seen: HashMap<(UserId, RecipeId), usize> = HashMap::new();

        for interaction in interactions {
            let key = (interaction.user_id, interaction.recipe_id);
            match seen.get(&key) {
                Some(&pos) => records[pos].rating = interaction.rating,
                None => {
                    seen.insert(key, records.len());
                    records.push(interaction);
                }
            }
        }

        let mut by_user: HashMap<UserId, Vec<usize>> = HashMap::new();
        for (pos, record) in records.iter().enumerate() {
            by_user.entry(record.user_id).or_default().push(pos);
        }

        Self { records, by_user }
    }

    /// All records in load order
    pub fn records(&self) -> &[Interaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the user has at least one surviving rating
    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.by_user.contains_key(&user_id)
    }

    /// All ratings made by a user, in record order
    pub fn user_ratings(&self, user_id: UserId) -> Vec<Interaction> {
        self.by_user
            .get(&user_id)
            .map(|positions| positions.iter().map(|&pos| self.records[pos]).collect())
            .unwrap_or_default()
    }

    /// Unique user ids in ascending order
    pub fn user_ids(&self) -> Vec<UserId> {
        let mut ids: Vec<UserId> = self.by_user.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Unique recipe ids in ascending order
    pub fn recipe_ids(&self) -> Vec<RecipeId> {
        let mut ids: Vec<RecipeId> = self.records.iter().map(|r| r.recipe_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

// =============================================================================
// Recipe detail
// =============================================================================

/// One ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    /// Quantity text as shown to the user ("2 cups"), when known
    pub quantity: Option<String>,
}

/// Nutrition facts in the order the food.com dump lists them.
///
/// Calories are absolute; the remaining fields are percent of daily value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nutrition {
    pub calories: f32,
    pub total_fat: f32,
    pub sugar: f32,
    pub sodium: f32,
    pub protein: f32,
    pub saturated_fat: f32,
    pub carbohydrates: f32,
}

/// Everything known about a recipe.
///
/// Fields beyond the id are filled in by whichever detail source was
/// consulted; anything a source does not provide stays `None` or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeDetail {
    pub id: RecipeId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub ingredients: Vec<Ingredient>,
    pub servings: Option<u32>,
    pub preparation_minutes: Option<u32>,
    pub steps: Vec<String>,
    pub image: Option<String>,
    pub nutrition: Option<Nutrition>,
    pub tags: Vec<String>,
}

impl RecipeDetail {
    /// A detail record carrying only the id
    pub fn bare(id: RecipeId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}
