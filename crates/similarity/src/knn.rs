//! Neighbor Search Engine: exact brute-force k-nearest-neighbor queries.
//!
//! ## Algorithm
//! 1. Resolve the query id to its dense index
//! 2. Take the query's row (item queries) or column (user queries)
//! 3. Compute the distance to every other row/column in parallel
//! 4. Keep the `k` closest, ordered by (distance, id)
//!
//! The query is its own nearest neighbor at distance 0, so `k + 1`
//! candidates are required. It is removed by index rather than by position,
//! which keeps it out of the result even when another vector is an exact
//! duplicate with a smaller id.

use crate::matrix::{build_matrix, IdMapping, RatingMatrix, SparseMatrix};
use crate::metric::DistanceMetric;
use data_loader::{FilteredRatingSet, IdKind, RecommendError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::{debug, instrument};

/// Whether a query compares users (matrix columns) or items (matrix rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeighborKind {
    User,
    Item,
}

/// One entry of a neighbor result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// User id or recipe id depending on the query kind
    pub id: u32,
    /// Present when the caller asked for distances
    pub distance: Option<f32>,
}

fn by_distance_then_index(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

impl RatingMatrix {
    /// The `k` nearest neighbors of `query_id` in this matrix
    ///
    /// Results are ordered by ascending distance; ties go to the smaller id.
    #[instrument(skip(self))]
    pub fn nearest(
        &self,
        query_id: u32,
        kind: NeighborKind,
        k: usize,
        metric: DistanceMetric,
        include_distance: bool,
    ) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(RecommendError::InvalidArgument(
                "k must be at least 1".to_string(),
            ));
        }

        let (vectors, mapping, id_kind): (&SparseMatrix, &IdMapping, IdKind) = match kind {
            NeighborKind::Item => (self.items(), self.recipe_mapping(), IdKind::Recipe),
            NeighborKind::User => (self.users(), self.user_mapping(), IdKind::User),
        };

        let query_index = mapping
            .index_of(query_id)
            .ok_or(RecommendError::UnknownId {
                kind: id_kind,
                id: query_id,
            })?;

        let candidates = vectors.rows();
        if candidates < k + 1 {
            return Err(RecommendError::InsufficientData {
                requested: k + 1,
                available: candidates,
            });
        }

        let query = vectors.outer_view(query_index).ok_or(RecommendError::UnknownId {
            kind: id_kind,
            id: query_id,
        })?;
        let mut ranked: Vec<(f32, usize)> = (0..candidates)
            .into_par_iter()
            .filter(|&i| i != query_index)
            .filter_map(|i| {
                vectors
                    .outer_view(i)
                    .map(|row| (metric.distance(&query, &row), i))
            })
            .collect();

        // Dense indices follow ascending id order, so index order is id order
        if ranked.len() > k {
            ranked.select_nth_unstable_by(k - 1, by_distance_then_index);
            ranked.truncate(k);
        }
        ranked.sort_by(by_distance_then_index);

        let neighbors: Vec<Neighbor> = ranked
            .into_iter()
            .filter_map(|(distance, i)| {
                mapping.id_of(i).map(|id| Neighbor {
                    id,
                    distance: include_distance.then_some(distance),
                })
            })
            .collect();

        debug!(
            "Found {} {:?} neighbors for {} using {}",
            neighbors.len(),
            kind,
            query_id,
            metric
        );
        Ok(neighbors)
    }

    /// Recipes closest to `recipe_id`, with distances
    pub fn nearest_items(&self, recipe_id: u32, k: usize, metric: DistanceMetric) -> Result<Vec<Neighbor>> {
        self.nearest(recipe_id, NeighborKind::Item, k, metric, true)
    }

    /// Users closest to `user_id`, with distances
    pub fn nearest_users(&self, user_id: u32, k: usize, metric: DistanceMetric) -> Result<Vec<Neighbor>> {
        self.nearest(user_id, NeighborKind::User, k, metric, true)
    }
}

/// Build the matrix from `ratings` and run one neighbor query against it
///
/// Returns exactly `k` neighbors, never including `query_id` itself.
pub fn find_neighbors(
    query_id: u32,
    kind: NeighborKind,
    ratings: &FilteredRatingSet,
    k: usize,
    metric: DistanceMetric,
    include_distance: bool,
) -> Result<Vec<Neighbor>> {
    let matrix = build_matrix(ratings)?;
    matrix.nearest(query_id, kind, k, metric, include_distance)
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

    /// Four recipes rated by three users; 200 and 201 are identical
    fn with_duplicates() -> FilteredRatingSet {
        let mut records = Vec::new();
        for (recipe, ratings) in [
            (200, [4.0, 4.0, 1.0]),
            (201, [4.0, 4.0, 1.0]),
            (202, [4.0, 3.0, 1.0]),
            (203, [1.0, 1.0, 5.0]),
        ] {
            for (user, rating) in (1..=3).zip(ratings) {
                records.push(Interaction::new(user, recipe, rating));
            }
        }
        FilteredRatingSet::new(records)
    }

    #[test]
    fn test_item_scenario_two_recipes() {
        let neighbors =
            find_neighbors(100, NeighborKind::Item, &scenario(), 1, DistanceMetric::Cosine, false)
                .unwrap();
        assert_eq!(neighbors, vec![Neighbor { id: 101, distance: None }]);
    }

    #[test]
    fn test_user_query_uses_columns() {
        // Users 1 and 3 both rated [5, 1]
        let neighbors =
            find_neighbors(1, NeighborKind::User, &scenario(), 2, DistanceMetric::Cosine, true)
                .unwrap();
        assert_eq!(neighbors.len(), 2);
        assert_eq!(neighbors[0].id, 3);
        assert!(neighbors[0].distance.unwrap().abs() < 1e-6);
        assert_eq!(neighbors[1].id, 2);
    }

    #[test]
    fn test_query_never_returned_even_with_duplicate() {
        let matrix = build_matrix(&with_duplicates()).unwrap();

        // 200 and 201 are identical; querying the larger id must not return itself
        let neighbors = matrix.nearest_items(201, 3, DistanceMetric::Cosine).unwrap();
        let ids: Vec<u32> = neighbors.iter().map(|n| n.id).collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&201));
        assert_eq!(ids[0], 200);
    }

    #[test]
    fn test_sorted_by_distance_with_id_tiebreak() {
        let matrix = build_matrix(&with_duplicates()).unwrap();
        let neighbors = matrix.nearest_items(202, 3, DistanceMetric::Cosine).unwrap();

        // 200 and 201 are equidistant from 202; the smaller id comes first
        let ids: Vec<u32> = neighbors.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![200, 201, 203]);
        for pair in neighbors.windows(2) {
            assert!(pair[0].distance.unwrap() <= pair[1].distance.unwrap());
        }
    }

    #[test]
    fn test_exactly_k_results() {
        let matrix = build_matrix(&with_duplicates()).unwrap();
        for k in 1..=3 {
            let neighbors = matrix.nearest_items(200, k, DistanceMetric::Euclidean).unwrap();
            assert_eq!(neighbors.len(), k);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let result =
            find_neighbors(100, NeighborKind::Item, &scenario(), 2, DistanceMetric::Cosine, false);
        assert!(matches!(
            result,
            Err(RecommendError::InsufficientData { requested: 3, available: 2 })
        ));
    }

    #[test]
    fn test_unknown_id() {
        let result =
            find_neighbors(999, NeighborKind::User, &scenario(), 1, DistanceMetric::Cosine, false);
        assert!(matches!(
            result,
            Err(RecommendError::UnknownId { kind: IdKind::User, id: 999 })
        ));
    }

    #[test]
    fn test_zero_k_rejected() {
        let result =
            find_neighbors(100, NeighborKind::Item, &scenario(), 0, DistanceMetric::Cosine, false);
        assert!(matches!(result, Err(RecommendError::InvalidArgument(_))));
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let ratings = with_duplicates();
        let first = find_neighbors(203, NeighborKind::Item, &ratings, 3, DistanceMetric::Cosine, true).unwrap();
        let second = find_neighbors(203, NeighborKind::Item, &ratings, 3, DistanceMetric::Cosine, true).unwrap();
        assert_eq!(first, second);
    }
}
