//! The persisted lattice record.

use crate::error::{Result, SomError};
use crate::metric::DistanceType;
use crate::som::KernelType;
use serde::{Deserialize, Serialize};

/// Complete lattice state.
///
/// Field names match the on-disk keys. `weights` holds `W * H * D` values,
/// row-major with the dimension innermost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Lattice width.
    #[serde(rename = "W")]
    pub width: usize,
    /// Lattice height.
    #[serde(rename = "H")]
    pub height: usize,
    /// Codebook dimensionality.
    #[serde(rename = "D")]
    pub dimensions: usize,
    /// Distance metric discriminant.
    #[serde(rename = "DistanceType")]
    pub distance_type: u8,
    /// Neighborhood kernel discriminant.
    #[serde(rename = "NeighborhoodKernel", alias = "BMDistType")]
    pub kernel: u8,
    /// Flat weight buffer.
    pub weights: Vec<f64>,
}

impl Snapshot {
    /// Checks dimensions, enum values and weight count.
    ///
    /// Returns the decoded metric and kernel.
    pub fn validate(&self) -> Result<(DistanceType, KernelType)> {
        if self.width == 0 || self.height == 0 || self.dimensions == 0 {
            return Err(SomError::CorruptState(format!(
                "non-positive lattice size {}x{}x{}",
                self.width, self.height, self.dimensions
            )));
        }

        let expected = self
            .width
            .checked_mul(self.height)
            .and_then(|n| n.checked_mul(self.dimensions))
            .ok_or_else(|| SomError::CorruptState("lattice size overflows".to_string()))?;
        if self.weights.len() != expected {
            return Err(SomError::CorruptState(format!(
                "expected {} weights, found {}",
                expected,
                self.weights.len()
            )));
        }

        let distance = DistanceType::try_from(self.distance_type)?;
        let kernel = KernelType::try_from(self.kernel)?;
        Ok((distance, kernel))
    }
}
