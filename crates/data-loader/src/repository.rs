//! Collaborators that supply data to the engine.
//!
//! - `RatingsRepository` yields the raw interaction records
//! - `RecipeDetailSource` turns a recipe id into a `RecipeDetail`
//!
//! Both are read-only from the engine's point of view. `Send + Sync`
//! lets one repository be shared by concurrent requests.

use crate::error::{DataLoadError, LoadResult};
use crate::parser;
use crate::types::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Source of raw (user, recipe, rating) records
pub trait RatingsRepository: Send + Sync {
    /// Returns every interaction record the store holds
    fn interactions(&self) -> LoadResult<Vec<Interaction>>;
}

/// Reads interactions from a food.com style CSV file on every call
#[derive(Debug, Clone)]
pub struct CsvRatingsRepository {
    path: PathBuf,
}

impl CsvRatingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RatingsRepository for CsvRatingsRepository {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn interactions(&self) -> LoadResult<Vec<Interaction>> {
        let interactions = parser::parse_interactions(&self.path)?;
        debug!("Read {} interaction records", interactions.len());
        Ok(interactions)
    }
}

/// Holds interactions in memory; used by tests and by callers that
/// already loaded their data elsewhere
#[derive(Debug, Clone, Default)]
pub struct InMemoryRatingsRepository {
    interactions: Vec<Interaction>,
}

impl InMemoryRatingsRepository {
    pub fn new(interactions: Vec<Interaction>) -> Self {
        Self { interactions }
    }
}

impl From<Vec<Interaction>> for InMemoryRatingsRepository {
    fn from(interactions: Vec<Interaction>) -> Self {
        Self::new(interactions)
    }
}

impl RatingsRepository for InMemoryRatingsRepository {
    fn interactions(&self) -> LoadResult<Vec<Interaction>> {
        Ok(self.interactions.clone())
    }
}

/// Source of recipe detail for a recipe id
pub trait RecipeDetailSource: Send + Sync {
    /// Returns `Ok(None)` when the source knows nothing about the recipe
    fn recipe_detail(&self, recipe_id: RecipeId) -> LoadResult<Option<RecipeDetail>>;

    /// Detail for each id in order; unknown ids yield a bare record
    fn enrich(&self, recipe_ids: &[RecipeId]) -> LoadResult<Vec<RecipeDetail>> {
        recipe_ids
            .iter()
            .map(|&id| Ok(self.recipe_detail(id)?.unwrap_or_else(|| RecipeDetail::bare(id))))
            .collect()
    }
}

/// Recipe details loaded up front from a recipes CSV
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    recipes: HashMap<RecipeId, RecipeDetail>,
}

impl RecipeCatalog {
    pub fn new(recipes: impl IntoIterator<Item = RecipeDetail>) -> Self {
        Self {
            recipes: recipes.into_iter().map(|r| (r.id, r)).collect(),
        }
    }

    /// Load the catalogue from a RAW_recipes.csv file
    #[instrument]
    pub fn load_from_file(path: &Path) -> LoadResult<Self> {
        let recipes = parser::parse_recipes(path)?;
        debug!("Loaded {} recipes", recipes.len());
        Ok(Self::new(recipes))
    }

    pub fn get(&self, recipe_id: RecipeId) -> Option<&RecipeDetail> {
        self.recipes.get(&recipe_id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl RecipeDetailSource for RecipeCatalog {
    fn recipe_detail(&self, recipe_id: RecipeId) -> LoadResult<Option<RecipeDetail>> {
        Ok(self.recipes.get(&recipe_id).cloned())
    }
}
