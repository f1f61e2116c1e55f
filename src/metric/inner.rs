//! Inner-product based metrics: dot product and cosine similarity.

use crate::metric::{similarity_to_distance, DistanceMetric};

/// Dot product similarity, reported as `1 / (1 + a·b)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotProduct;

impl DotProduct {
    /// Computes the raw dot product.
    #[inline]
    pub fn similarity(sample: &[f64], weights: &[f64]) -> f64 {
        debug_assert_eq!(sample.len(), weights.len());

        sample.iter().zip(weights.iter()).map(|(s, w)| s * w).sum()
    }
}

impl DistanceMetric for DotProduct {
    #[inline]
    fn distance(&self, sample: &[f64], weights: &[f64]) -> f64 {
        similarity_to_distance(Self::similarity(sample, weights))
    }
}

/// Cosine similarity, reported as `1 / (1 + cos θ)`.
///
/// A zero-norm vector yields NaN, which never wins a strict `<` comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineSimilarity;

impl CosineSimilarity {
    /// Computes the raw cosine similarity in `[-1, 1]`.
    pub fn similarity(sample: &[f64], weights: &[f64]) -> f64 {
        debug_assert_eq!(sample.len(), weights.len());

        let (dot, norm_s, norm_w) = sample.iter().zip(weights.iter()).fold(
            (0.0, 0.0, 0.0),
            |(dot, ns, nw), (s, w)| (dot + s * w, ns + s * s, nw + w * w),
        );

        dot / (norm_s * norm_w).sqrt()
    }
}

impl DistanceMetric for CosineSimilarity {
    #[inline]
    fn distance(&self, sample: &[f64], weights: &[f64]) -> f64 {
        similarity_to_distance(Self::similarity(sample, weights))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert!((DotProduct::similarity(&a, &b) - 32.0).abs() < 1e-10);
        assert!((DotProduct.distance(&a, &b) - 1.0 / 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_identical() {
        let a = [0.2, 0.4, 0.6];
        assert!((CosineSimilarity::similarity(&a, &a) - 1.0).abs() < 1e-10);
        assert!((CosineSimilarity.distance(&a, &a) - 0.5).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_scale_invariant() {
        let a = [1.0, 2.0];
        let b = [2.0, 1.0];
        let b_scaled = [20.0, 10.0];
        let d1 = CosineSimilarity.distance(&a, &b);
        let d2 = CosineSimilarity.distance(&a, &b_scaled);
        assert!((d1 - d2).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert!(CosineSimilarity::similarity(&a, &b).abs() < 1e-10);
        assert!((CosineSimilarity.distance(&a, &b) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_cosine_zero_vector_is_nan() {
        let a = [0.0, 0.0];
        let b = [1.0, 0.0];
        assert!(CosineSimilarity.distance(&a, &b).is_nan());
    }
}
