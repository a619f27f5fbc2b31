//! Deduplicating accumulator for recommendation output.

use data_loader::RecipeId;
use std::collections::HashSet;

/// An insertion-ordered list of distinct recipe ids with an optional cap.
///
/// Ids placed in the exclusion set are never accepted.
#[derive(Debug, Clone, Default)]
pub struct RecommendationList {
    items: Vec<RecipeId>,
    seen: HashSet<RecipeId>,
    excluded: HashSet<RecipeId>,
    limit: Option<usize>,
}

impl RecommendationList {
    /// A list that stops accepting ids once it holds `limit` of them
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    /// Reject these ids from now on (builder pattern)
    pub fn excluding(mut self, ids: impl IntoIterator<Item = RecipeId>) -> Self {
        self.excluded.extend(ids);
        self
    }

    /// Whether `id` would be rejected as a duplicate or exclusion
    pub fn rejects(&self, id: RecipeId) -> bool {
        self.seen.contains(&id) || self.excluded.contains(&id)
    }

    /// Append `id` if it is new, allowed and there is room.
    ///
    /// Returns true when the id was added.
    pub fn push(&mut self, id: RecipeId) -> bool {
        if self.is_full() || self.rejects(id) {
            return false;
        }
        self.seen.insert(id);
        self.items.push(id);
        true
    }

    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.items.len() >= limit)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<RecipeId> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_seen_order_is_kept() {
        let mut list = RecommendationList::default();
        for id in [5, 3, 5, 9, 3] {
            list.push(id);
        }
        assert_eq!(list.into_vec(), vec![5, 3, 9]);
    }

    #[test]
    fn test_limit() {
        let mut list = RecommendationList::with_limit(2);
        assert!(list.push(1));
        assert!(list.push(2));
        assert!(list.is_full());
        assert!(!list.push(3));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_exclusions() {
        let mut list = RecommendationList::with_limit(5).excluding([7]);
        assert!(list.rejects(7));
        assert!(!list.push(7));
        assert!(list.push(8));
        assert_eq!(list.into_vec(), vec![8]);
    }
}
