//! Euclidean and squared Euclidean distance.

use crate::metric::DistanceMetric;

/// Euclidean (L2) distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    #[inline]
    fn distance(&self, sample: &[f64], weights: &[f64]) -> f64 {
        SquaredEuclidean.distance(sample, weights).sqrt()
    }
}

/// Squared Euclidean distance (avoids the square root).
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl DistanceMetric for SquaredEuclidean {
    #[inline]
    fn distance(&self, sample: &[f64], weights: &[f64]) -> f64 {
        debug_assert_eq!(sample.len(), weights.len());

        sample
            .iter()
            .zip(weights.iter())
            .map(|(s, w)| (s - w) * (s - w))
            .sum()
    }
}
