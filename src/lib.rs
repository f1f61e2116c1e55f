//! # Kohonen - Self-Organizing Maps
//!
//! Kohonen is a Rust implementation of the rectangular-grid Self-Organizing
//! Map (SOM): an unsupervised competitive-learning lattice of neurons that
//! learns a topology-preserving 2D representation of high-dimensional data.
//!
//! ## Overview
//!
//! A [`Som`] owns a dense `W x H` lattice of `D`-dimensional codebook vectors.
//! Training repeatedly finds the best-matching unit (BMU) for a sample and
//! pulls the nodes in a box around it towards that sample, while the learning
//! rate and neighborhood radius anneal.
//!
//! ## Key Features
//!
//! - **Exhaustive BMU search** with four metrics: Euclidean, squared
//!   Euclidean, dot product and cosine similarity
//! - **Neighborhood kernels**: uniform, exponential decay and Gaussian
//! - **Compounding annealing** of learning rate and radius
//! - **Snapshots** in JSON or compact binary form
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kohonen::{DistanceType, KernelType, Som, SomConfig, SnapshotFormat};
//!
//! # fn main() -> kohonen::Result<()> {
//! let config = SomConfig::new(10, 10, 3)
//!     .with_distance(DistanceType::Euclidean)
//!     .with_kernel(KernelType::Gaussian)
//!     .with_seed(42);
//! let mut som = Som::new(&config)?;
//!
//! let samples = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
//! som.train(&samples, 1000, 0.5, 0.01, 5.0)?;
//!
//! let bmu = som.find_bmu(&[0.9, 0.1, 0.0])?;
//! println!("BMU at ({}, {}), distance {:.4}", bmu.pos.row, bmu.pos.col, bmu.distance);
//!
//! som.save("colors.json", SnapshotFormat::Json)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`metric`] - Distance metrics for BMU search
//! - [`som`] - Lattice, kernels, training and quality measures
//! - [`storage`] - Snapshot record and codecs
//! - [`config`] - Configuration structs

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod metric;
pub mod som;
pub mod storage;

// Re-export commonly used types
pub use config::{Config, SomConfig, StorageConfig, TrainingConfig};
pub use error::{Result, SomError};
pub use metric::{DistanceMetric, DistanceType};
pub use som::{
    AnnealingSchedule, Bmu, GridPos, KernelType, Neighborhood, NeighborhoodKernel, Som, SomTrainer,
    TrainingSummary,
};
pub use storage::{Snapshot, SnapshotCodec, SnapshotFormat};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
