//! Neighborhood kernels: update strength of a node relative to the BMU.

use crate::error::{Result, SomError};
use crate::som::GridPos;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Trait for neighborhood kernels.
pub trait NeighborhoodKernel: Send + Sync {
    /// Update coefficient for `node` when `bmu` won with the current `radius`.
    fn coefficient(&self, bmu: GridPos, node: GridPos, radius: f64) -> f64;
}

/// Same coefficient for the BMU and every node in its box.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uniform;

impl NeighborhoodKernel for Uniform {
    #[inline]
    fn coefficient(&self, _bmu: GridPos, _node: GridPos, _radius: f64) -> f64 {
        1.0
    }
}

/// Exponential falloff `exp((x-i)²(y-i)² / (-2r²))`.
///
/// `x`/`y` are the BMU column/row and `i` is the node row. The node column
/// does not take part: the coefficient depends on the row alone and is 1 on
/// row `y` and on row `x`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExponentialDecay;

impl NeighborhoodKernel for ExponentialDecay {
    fn coefficient(&self, bmu: GridPos, node: GridPos, radius: f64) -> f64 {
        let x = bmu.col as f64;
        let y = bmu.row as f64;
        let i = node.row as f64;

        let numerator = (x - i) * (y - i) * (x - i) * (y - i);
        if numerator == 0.0 {
            return 1.0;
        }
        (numerator / (-2.0 * radius * radius)).exp()
    }
}

/// Unnormalized 2D Gaussian centred on the BMU with `sigma = radius / 2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gaussian;

impl NeighborhoodKernel for Gaussian {
    fn coefficient(&self, bmu: GridPos, node: GridPos, radius: f64) -> f64 {
        let dx = node.col as f64 - bmu.col as f64;
        let dy = node.row as f64 - bmu.row as f64;
        let sigma = radius / 2.0;

        let numerator = dx * dx + dy * dy;
        if numerator == 0.0 {
            return 1.0;
        }
        (-numerator / (2.0 * sigma * sigma)).exp()
    }
}

/// Enum for the supported neighborhood kernels.
///
/// The discriminants are the persisted `NeighborhoodKernel` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum KernelType {
    /// Flat update over the box.
    #[default]
    Uniform = 0,
    /// Row-dependent exponential decay.
    ExponentialDecay = 1,
    /// 2D Gaussian.
    Gaussian = 2,
}

impl KernelType {
    /// All kernels, in discriminant order.
    pub const ALL: [KernelType; 3] = [
        KernelType::Uniform,
        KernelType::ExponentialDecay,
        KernelType::Gaussian,
    ];

    /// Returns the kernel implementation for this variant.
    pub fn kernel(&self) -> &'static dyn NeighborhoodKernel {
        match self {
            KernelType::Uniform => &Uniform,
            KernelType::ExponentialDecay => &ExponentialDecay,
            KernelType::Gaussian => &Gaussian,
        }
    }

    /// Computes the coefficient using this kernel.
    #[inline]
    pub fn coefficient(&self, bmu: GridPos, node: GridPos, radius: f64) -> f64 {
        self.kernel().coefficient(bmu, node, radius)
    }

    /// Returns the persisted discriminant.
    #[inline]
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    /// Returns the canonical name used in configs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            KernelType::Uniform => "uniform",
            KernelType::ExponentialDecay => "exponential_decay",
            KernelType::Gaussian => "gaussian",
        }
    }
}

impl TryFrom<u8> for KernelType {
    type Error = SomError;

    fn try_from(value: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.as_u8() == value)
            .ok_or_else(|| SomError::CorruptState(format!("unknown neighborhood kernel {}", value)))
    }
}

impl FromStr for KernelType {
    type Err = SomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "uniform" | "0" => Ok(KernelType::Uniform),
            "exp" | "exp_decay" | "exponential_decay" | "1" => Ok(KernelType::ExponentialDecay),
            "gaussian" | "2" => Ok(KernelType::Gaussian),
            other => Err(SomError::InvalidArgument(format!(
                "unknown neighborhood kernel '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
