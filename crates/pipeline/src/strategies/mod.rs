//! Strategy implementations for the recommendation aggregator.
//!
//! - `ItemBasedStrategy`: recipes similar to recipes the user liked
//! - `UserBasedStrategy`: favourite recipes of users similar to the user

pub mod item_based;
pub mod user_based;

// Re-export for convenience
pub use item_based::ItemBasedStrategy;
pub use user_based::UserBasedStrategy;

/// Default number of neighbors per query
pub const DEFAULT_K: usize = 10;

/// Default cap on the recommendation list length
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 10;
