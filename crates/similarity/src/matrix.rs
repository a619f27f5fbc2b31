//! Index Builder: dense id mappings and the sparse rating matrix.
//!
//! The matrix has one row per recipe and one column per user, matching the
//! (item, user) axis convention of every neighbor query. Cells that were
//! never rated are absent, which is different from a stored rating of 0.
//!
//! Storage is a `sprs` CSR matrix. A transposed CSR copy is kept so user
//! vectors (columns) can be read as contiguous rows as well.

use data_loader::{FilteredRatingSet, RecipeId, RecommendError, Result, UserId};
use sprs::{CsMat, CsVecView, TriMat};
use std::collections::HashMap;
use tracing::{debug, instrument};

// =============================================================================
// IdMapping
// =============================================================================

/// Bijection between domain ids and dense indices `0..len`
///
/// Indices are assigned in ascending id order, so the same id set always
/// produces the same mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMapping {
    /// index -> id, sorted ascending
    ids: Vec<u32>,
    /// id -> index
    indices: HashMap<u32, usize>,
}

impl IdMapping {
    /// Build a mapping from any id sequence; duplicates are ignored
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut ids: Vec<u32> = ids.into_iter().collect();
        ids.sort_unstable();
        ids.dedup();
        let indices = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self { ids, indices }
    }

    /// Forward lookup: id -> dense index
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.indices.get(&id).copied()
    }

    /// Inverse lookup: dense index -> id
    pub fn id_of(&self, index: usize) -> Option<u32> {
        self.ids.get(index).copied()
    }

    /// All ids in index order
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// Sparse storage
// =============================================================================

/// Compressed sparse row matrix of ratings
pub type SparseMatrix = CsMat<f32>;

/// Borrowed view of one matrix row: column indices ascending, with values
pub type SparseRow<'a> = CsVecView<'a, f32>;

// =============================================================================
// RatingMatrix
// =============================================================================

/// The recipe x user rating matrix with its id mappings.
///
/// Immutable once built; safe to share behind an `Arc` between readers.
#[derive(Debug, Clone)]
pub struct RatingMatrix {
    /// rows = recipes, columns = users
    items: SparseMatrix,
    /// rows = users, columns = recipes
    users_by_row: SparseMatrix,
    user_mapping: IdMapping,
    recipe_mapping: IdMapping,
}

impl RatingMatrix {
    pub fn items(&self) -> &SparseMatrix {
        &self.items
    }

    /// The transposed matrix (rows = users)
    pub fn users(&self) -> &SparseMatrix {
        &self.users_by_row
    }

    pub fn user_mapping(&self) -> &IdMapping {
        &self.user_mapping
    }

    pub fn recipe_mapping(&self) -> &IdMapping {
        &self.recipe_mapping
    }

    /// (num_recipes, num_users)
    pub fn shape(&self) -> (usize, usize) {
        self.items.shape()
    }

    /// Rating `user_id` gave `recipe_id`, if any
    pub fn rating(&self, user_id: UserId, recipe_id: RecipeId) -> Option<f32> {
        let r = self.recipe_mapping.index_of(recipe_id)?;
        let c = self.user_mapping.index_of(user_id)?;
        self.items.get(r, c).copied()
    }
}

/// Build the rating matrix and its mappings from a filtered rating set
///
/// Each (user, recipe) pair appears once in `ratings` (last write wins
/// there), so the matrix holds exactly that rating and never a sum.
///
/// Fails with `EmptyDataset` when there are no users or no recipes.
#[instrument(skip(ratings), fields(records = ratings.len()))]
pub fn build_matrix(ratings: &FilteredRatingSet) -> Result<RatingMatrix> {
    let user_mapping = IdMapping::from_ids(ratings.records().iter().map(|r| r.user_id));
    let recipe_mapping = IdMapping::from_ids(ratings.records().iter().map(|r| r.recipe_id));

    if user_mapping.is_empty() || recipe_mapping.is_empty() {
        return Err(RecommendError::EmptyDataset {
            users: user_mapping.len(),
            recipes: recipe_mapping.len(),
        });
    }

    // TriMat sums repeated coordinates. FilteredRatingSet already holds one
    // rating per (user, recipe), keeping the last one written, so nothing
    // is ever summed here.
    let mut triplets = TriMat::with_capacity(
        (recipe_mapping.len(), user_mapping.len()),
        ratings.len(),
    );
    for record in ratings.records() {
        // Both lookups succeed: the mappings were built from these records
        if let (Some(r), Some(c)) = (
            recipe_mapping.index_of(record.recipe_id),
            user_mapping.index_of(record.user_id),
        ) {
            triplets.add_triplet(r, c, record.rating);
        }
    }

    let items: SparseMatrix = triplets.to_csr();
    let users_by_row: SparseMatrix = items.transpose_view().to_csr();

    debug!(
        "Built {}x{} rating matrix with {} entries",
        recipe_mapping.len(),
        user_mapping.len(),
        items.nnz()
    );

    Ok(RatingMatrix {
        items,
        users_by_row,
        user_mapping,
        recipe_mapping,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Interaction;

    fn scenario() -> FilteredRatingSet {
        FilteredRatingSet::new(vec![
            Interaction::new(1, 100, 5.0),
            Interaction::new(1, 101, 1.0),
            Interaction::new(2, 100, 4.0),
            Interaction::new(2, 101, 5.0),
            Interaction::new(3, 100, 5.0),
            Interaction::new(3, 101, 1.0),
        ])
    }

    #[test]
    fn test_mapping_is_dense_sorted_and_bijective() {
        let mapping = IdMapping::from_ids(vec![40, 7, 19, 7]);

        assert_eq!(mapping.ids(), &[7, 19, 40]);
        assert_eq!(mapping.index_of(7), Some(0));
        assert_eq!(mapping.index_of(40), Some(2));
        assert_eq!(mapping.index_of(8), None);
        assert_eq!(mapping.id_of(3), None);

        for &id in mapping.ids() {
            let index = mapping.index_of(id).unwrap();
            assert!(index < mapping.len());
            assert_eq!(mapping.id_of(index), Some(id));
        }
    }

    #[test]
    fn test_duplicate_rating_keeps_last_value() {
        let ratings = FilteredRatingSet::new(vec![
            Interaction::new(1, 100, 3.0),
            Interaction::new(2, 100, 2.0),
            Interaction::new(1, 100, 4.0),
        ]);
        let matrix = build_matrix(&ratings).unwrap();

        assert_eq!(matrix.items().nnz(), 2);
        assert_eq!(matrix.rating(1, 100), Some(4.0));
        assert_eq!(matrix.rating(2, 100), Some(2.0));
    }

    #[test]
    fn test_user_axis_is_transpose_of_item_axis() {
        let matrix = build_matrix(&scenario()).unwrap();
        let (recipes, users) = matrix.shape();

        assert_eq!(matrix.users().shape(), (users, recipes));
        for r in 0..recipes {
            for c in 0..users {
                assert_eq!(matrix.items().get(r, c), matrix.users().get(c, r));
            }
        }
    }

    #[test]
    fn test_build_matrix_layout() {
        let matrix = build_matrix(&scenario()).unwrap();

        assert_eq!(matrix.shape(), (2, 3));
        assert_eq!(matrix.recipe_mapping().ids(), &[100, 101]);
        assert_eq!(matrix.user_mapping().ids(), &[1, 2, 3]);

        // Row for recipe 100 is [5, 4, 5]
        assert_eq!(matrix.items().outer_view(0).unwrap().data(), &[5.0, 4.0, 5.0]);
        assert_eq!(matrix.items().outer_view(1).unwrap().data(), &[1.0, 5.0, 1.0]);
        assert_eq!(matrix.users().outer_view(1).unwrap().data(), &[4.0, 5.0]);
        assert_eq!(matrix.rating(2, 101), Some(5.0));
        assert_eq!(matrix.rating(9, 101), None);
    }

    #[test]
    fn test_build_matrix_is_deterministic() {
        let a = build_matrix(&scenario()).unwrap();
        let b = build_matrix(&scenario()).unwrap();
        assert_eq!(a.items(), b.items());
        assert_eq!(a.user_mapping(), b.user_mapping());
        assert_eq!(a.recipe_mapping(), b.recipe_mapping());
    }

    #[test]
    fn test_empty_dataset() {
        let result = build_matrix(&FilteredRatingSet::default());
        assert!(matches!(
            result,
            Err(RecommendError::EmptyDataset { users: 0, recipes: 0 })
        ));
    }
}
