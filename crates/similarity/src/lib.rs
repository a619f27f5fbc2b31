//! # Similarity Crate
//!
//! Sparse rating matrix and k-nearest-neighbor search for recipe
//! recommendations.
//!
//! ## Components
//!
//! ### Index Builder (`matrix`)
//! - Dense id <-> index mappings for users and recipes, in ascending id order
//! - A CSR recipe x user rating matrix plus its transpose
//!
//! ### Distance metrics (`metric`)
//! - Cosine (default), Euclidean and Manhattan over sparse vectors
//!
//! ### Neighbor Search Engine (`knn`)
//! - Exact brute-force k-NN over recipes (rows) or users (columns)
//! - Deterministic ordering: ascending distance, then ascending id
//!
//! ## Example Usage
//!
//! ```ignore
//! use similarity::{build_matrix, DistanceMetric};
//!
//! let matrix = build_matrix(&ratings)?;
//! let similar = matrix.nearest_items(recipe_id, 10, DistanceMetric::Cosine)?;
//! ```

// Public modules
pub mod matrix;
pub mod metric;
pub mod knn;

// Re-export commonly used types
pub use knn::{find_neighbors, Neighbor, NeighborKind};
pub use matrix::{build_matrix, IdMapping, RatingMatrix, SparseMatrix, SparseRow};
pub use metric::{DistanceMetric, MAX_COSINE_DISTANCE};
