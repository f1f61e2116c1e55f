//! Self-Organizing Map (SOM) lattice and training.
//!
//! - **Lattice**: dense `W x H x D` codebook with BMU search (map.rs)
//! - **Kernels**: neighborhood update coefficients (kernel.rs)
//! - **Training**: compounding annealed online updates (training.rs)
//! - **Quality**: quantization and topographic error (quality.rs)

mod kernel;
mod map;
mod node;
mod quality;
pub mod training;

pub use kernel::{ExponentialDecay, Gaussian, KernelType, NeighborhoodKernel, Uniform};
pub use map::Som;
pub use node::{Bmu, GridPos, Neighborhood};
pub use training::{AnnealingSchedule, Epoch, SomTrainer, TrainingSummary};
