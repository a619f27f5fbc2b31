//! # Data Loader Crate
//!
//! This crate reads the food.com rating dump and prepares the filtered
//! record set the recommendation engine works on.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (Interaction, FilteredRatingSet, RecipeDetail)
//! - **parser**: Parse the CSV dumps into Rust structs
//! - **repository**: Ratings and recipe-detail collaborators
//! - **loader**: Minimum-activity filtering of raw interactions
//! - **error**: Error taxonomy shared by every crate in the workspace
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{load_ratings, CsvRatingsRepository};
//!
//! let repo = CsvRatingsRepository::new("data/RAW_interactions.csv");
//! let ratings = load_ratings(&repo, 50, 50)?;
//!
//! println!("{} ratings survived filtering", ratings.len());
//! ```

// Public modules
pub mod error;
pub mod types;
pub mod parser;
pub mod repository;
pub mod loader;

// Re-export commonly used types for convenience
pub use error::{DataLoadError, IdKind, LoadResult, RecommendError, Result};
pub use loader::{filter_interactions, load_ratings, VoteCounts};
pub use repository::{
    CsvRatingsRepository, InMemoryRatingsRepository, RatingsRepository, RecipeCatalog,
    RecipeDetailSource,
};
pub use types::{
    // Type aliases
    UserId,
    RecipeId,
    // Core types
    Interaction,
    FilteredRatingSet,
    RecipeDetail,
    Ingredient,
    Nutrition,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_rating_set() {
        let ratings = FilteredRatingSet::default();
        assert!(ratings.is_empty());
        assert!(ratings.user_ids().is_empty());
        assert!(ratings.recipe_ids().is_empty());
    }

    #[test]
    fn test_error_messages() {
        let err = RecommendError::UnknownId {
            kind: IdKind::Recipe,
            id: 42,
        };
        assert_eq!(err.to_string(), "Unknown recipe id 42");

        let err = RecommendError::InsufficientData {
            requested: 11,
            available: 3,
        };
        assert!(err.to_string().contains("11"));
    }
}
