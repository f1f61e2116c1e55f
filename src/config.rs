//! Configuration for the Kohonen SOM engine.

use crate::error::{Result, SomError};
use crate::metric::DistanceType;
use crate::som::KernelType;
use crate::storage::SnapshotFormat;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Main configuration, aggregating lattice, training and storage settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Lattice configuration.
    pub som: SomConfig,

    /// Training schedule configuration.
    pub training: TrainingConfig,

    /// Storage configuration.
    pub storage: StorageConfig,
}

impl Config {
    /// Reads a configuration from a JSON file.
    ///
    /// Missing sections and fields fall back to their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(reader)?;
        config.som.validate()?;
        Ok(config)
    }

    /// Writes the configuration to a JSON file.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Lattice configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SomConfig {
    /// Number of columns (W).
    /// Default: 10.
    pub width: usize,

    /// Number of rows (H).
    /// Default: 10.
    pub height: usize,

    /// Codebook vector dimensionality (D).
    /// Default: 3.
    pub dimensions: usize,

    /// Metric used for BMU search.
    /// Default: Euclidean.
    pub distance: DistanceType,

    /// Neighborhood kernel used for weight updates.
    /// Default: Uniform.
    pub kernel: KernelType,

    /// Random seed for weight initialization.
    /// Default: None (random).
    pub seed: Option<u64>,
}

impl Default for SomConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            dimensions: 3,
            distance: DistanceType::Euclidean,
            kernel: KernelType::Uniform,
            seed: None,
        }
    }
}

impl SomConfig {
    /// Creates a configuration for a `width x height` lattice of `dimensions`-long vectors.
    pub fn new(width: usize, height: usize, dimensions: usize) -> Self {
        Self {
            width,
            height,
            dimensions,
            ..Default::default()
        }
    }

    /// Sets the distance metric.
    pub fn with_distance(mut self, distance: DistanceType) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the neighborhood kernel.
    pub fn with_kernel(mut self, kernel: KernelType) -> Self {
        self.kernel = kernel;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Returns the total number of nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.width * self.height
    }

    /// Checks that width, height and dimensions are all positive.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.dimensions == 0 {
            return Err(SomError::InvalidDimension(format!(
                "width, height and dimensions must be positive (got {}x{}x{})",
                self.width, self.height, self.dimensions
            )));
        }
        Ok(())
    }
}

/// Training schedule configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of training iterations.
    /// Default: 1000.
    pub iterations: usize,

    /// Learning rate at iteration 0.
    /// Default: 0.5.
    pub start_learning_rate: f64,

    /// Learning rate the schedule anneals towards.
    /// Forced to 0 when greater than the start rate.
    /// Default: 0.01.
    pub end_learning_rate: f64,

    /// Initial neighborhood radius, in grid cells.
    /// Default: 3.0.
    pub neighborhood_radius: f64,

    /// Replay samples cyclically when there are fewer samples than iterations.
    /// When false, that case is rejected with `IndexOutOfRange`.
    /// Default: true.
    pub cyclic: bool,

    /// Emit a progress log line every `log_every` iterations (0 disables).
    /// Default: 1000.
    pub log_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            start_learning_rate: 0.5,
            end_learning_rate: 0.01,
            neighborhood_radius: 3.0,
            cyclic: true,
            log_every: 1000,
        }
    }
}

impl TrainingConfig {
    /// Creates a training configuration with the given schedule.
    pub fn new(
        iterations: usize,
        start_learning_rate: f64,
        end_learning_rate: f64,
        neighborhood_radius: f64,
    ) -> Self {
        Self {
            iterations,
            start_learning_rate,
            end_learning_rate,
            neighborhood_radius,
            ..Default::default()
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Snapshot format used when none can be inferred.
    /// Default: JSON.
    pub format: SnapshotFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            format: SnapshotFormat::Json,
        }
    }
}

impl StorageConfig {
    /// Picks the snapshot format for `path`.
    ///
    /// An explicit format wins, then the file extension, then `format`.
    pub fn resolve<P: AsRef<Path>>(
        &self,
        path: P,
        explicit: Option<SnapshotFormat>,
    ) -> SnapshotFormat {
        explicit
            .or_else(|| SnapshotFormat::from_path(path).ok())
            .unwrap_or(self.format)
    }
}
