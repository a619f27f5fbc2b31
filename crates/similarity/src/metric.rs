//! Distance metrics between sparse vectors.
//!
//! Missing entries count as zero. Every metric is symmetric and returns 0
//! for two identical non-zero vectors.

use crate::matrix::SparseRow;
use data_loader::RecommendError;
use serde::{Deserialize, Serialize};
use sprs::vec::{NnzEither, SparseIterTools};
use std::fmt;
use std::str::FromStr;

/// Cosine distance assigned when either vector has zero norm
pub const MAX_COSINE_DISTANCE: f32 = 2.0;

/// Supported distance metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// 1 - cosine similarity
    #[default]
    Cosine,
    /// L2 distance
    Euclidean,
    /// L1 distance
    Manhattan,
}

impl DistanceMetric {
    /// Distance between two sparse rows
    pub fn distance(&self, a: &SparseRow<'_>, b: &SparseRow<'_>) -> f32 {
        match self {
            DistanceMetric::Cosine => cosine_distance(a, b),
            DistanceMetric::Euclidean => {
                let sum: f64 = differences(a, b).map(|d| d * d).sum();
                sum.sqrt() as f32
            }
            DistanceMetric::Manhattan => differences(a, b).map(f64::abs).sum::<f64>() as f32,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = RecommendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" | "cityblock" => Ok(DistanceMetric::Manhattan),
            other => Err(RecommendError::InvalidArgument(format!(
                "unknown distance metric '{}'",
                other
            ))),
        }
    }
}

/// 1 - cos(a, b), or `MAX_COSINE_DISTANCE` when either norm is zero
fn cosine_distance(a: &SparseRow<'_>, b: &SparseRow<'_>) -> f32 {
    let norm_a = norm(a);
    let norm_b = norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return MAX_COSINE_DISTANCE;
    }

    let dot: f64 = a
        .iter()
        .nnz_zip(b.iter())
        .map(|(_, &x, &y)| x as f64 * y as f64)
        .sum();
    let similarity = (dot / (norm_a * norm_b)).clamp(-1.0, 1.0);
    (1.0 - similarity) as f32
}

fn norm(v: &SparseRow<'_>) -> f64 {
    v.data()
        .iter()
        .map(|&x| (x as f64) * (x as f64))
        .sum::<f64>()
        .sqrt()
}

/// `a_i - b_i` over the union of stored columns, a missing entry being zero
fn differences<'a>(a: &'a SparseRow<'_>, b: &'a SparseRow<'_>) -> impl Iterator<Item = f64> + 'a {
    a.iter().nnz_or_zip(b.iter()).map(|entry| match entry {
        NnzEither::Both((_, &x, &y)) => x as f64 - y as f64,
        NnzEither::Left((_, &x)) => x as f64,
        NnzEither::Right((_, &y)) => -(y as f64),
    })
}
