//! Distance metrics for ranking candidate best-matching units.
//!
//! Every metric maps a (sample, codebook vector) pair to a dissimilarity where
//! lower is better. Similarity measures (dot product, cosine) are folded into
//! that convention through `1 / (1 + similarity)`.

mod euclidean;
mod inner;

pub use euclidean::{Euclidean, SquaredEuclidean};
pub use inner::{CosineSimilarity, DotProduct};

use crate::error::{Result, SomError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for distance metrics between a sample and a codebook vector.
pub trait DistanceMetric: Send + Sync {
    /// Computes the dissimilarity between `sample` and `weights`.
    ///
    /// Both slices must have the same length.
    fn distance(&self, sample: &[f64], weights: &[f64]) -> f64;
}

/// Converts a similarity into a distance so that higher similarity ranks first.
#[inline]
pub(crate) fn similarity_to_distance(similarity: f64) -> f64 {
    1.0 / (1.0 + similarity)
}

/// Enum for the supported distance metrics.
///
/// The discriminants are the persisted `DistanceType` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum DistanceType {
    /// `sqrt(sum((a - b)^2))`.
    #[default]
    Euclidean = 0,
    /// Raw dot product, converted to a distance.
    DotProduct = 1,
    /// Cosine similarity, converted to a distance.
    CosineSimilarity = 2,
    /// `sum((a - b)^2)`.
    SquaredEuclidean = 3,
}

impl DistanceType {
    /// All metrics, in discriminant order.
    pub const ALL: [DistanceType; 4] = [
        DistanceType::Euclidean,
        DistanceType::DotProduct,
        DistanceType::CosineSimilarity,
        DistanceType::SquaredEuclidean,
    ];

    /// Returns the metric implementation for this variant.
    pub fn metric(&self) -> &'static dyn DistanceMetric {
        match self {
            DistanceType::Euclidean => &Euclidean,
            DistanceType::DotProduct => &DotProduct,
            DistanceType::CosineSimilarity => &CosineSimilarity,
            DistanceType::SquaredEuclidean => &SquaredEuclidean,
        }
    }

    /// Computes the distance using this metric.
    #[inline]
    pub fn compute(&self, sample: &[f64], weights: &[f64]) -> f64 {
        self.metric().distance(sample, weights)
    }

    /// Returns the persisted discriminant.
    #[inline]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Returns the canonical name used in configs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            DistanceType::Euclidean => "euclidean",
            DistanceType::DotProduct => "dot_product",
            DistanceType::CosineSimilarity => "cosine_similarity",
            DistanceType::SquaredEuclidean => "squared_euclidean",
        }
    }
}

impl TryFrom<u8> for DistanceType {
    type Error = SomError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_u8() == value)
            .ok_or_else(|| SomError::CorruptState(format!("unknown distance type {}", value)))
    }
}

impl FromStr for DistanceType {
    type Err = SomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "euclidean" | "0" => Ok(DistanceType::Euclidean),
            "dot" | "dot_product" | "1" => Ok(DistanceType::DotProduct),
            "cosine" | "cosine_similarity" | "2" => Ok(DistanceType::CosineSimilarity),
            "squared_euclidean" | "sqeuclidean" | "3" => Ok(DistanceType::SquaredEuclidean),
            other => Err(SomError::InvalidArgument(format!(
                "unknown distance type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for DistanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
