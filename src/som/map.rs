//! Self-Organizing Map lattice.

use crate::config::SomConfig;
use crate::error::{Result, SomError};
use crate::metric::DistanceType;
use crate::som::{Bmu, GridPos, KernelType, Neighborhood};
use crate::storage::{self, Snapshot, SnapshotFormat};
use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::path::Path;

/// A rectangular Self-Organizing Map.
///
/// The lattice holds `W x H` nodes, each owning a `D`-long codebook vector.
/// All vectors live in one contiguous buffer addressed row-major with the
/// dimension innermost: node `(row, col)` starts at `D * (row * W + col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Som {
    /// Number of columns (W).
    width: usize,
    /// Number of rows (H).
    height: usize,
    /// Codebook dimensionality (D).
    dims: usize,
    /// Metric used for BMU search.
    distance: DistanceType,
    /// Kernel used for neighborhood updates.
    kernel: KernelType,
    /// `W * H * D` weights.
    weights: Vec<f64>,
}

impl Som {
    /// Creates a new SOM with weights drawn uniformly from `[0, 1)`.
    ///
    /// Uses `config.seed` when set, otherwise seeds from system entropy.
    pub fn new(config: &SomConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config, &mut rng)
    }

    /// Creates a new SOM drawing its initial weights from `rng`.
    pub fn with_rng<R: Rng + ?Sized>(config: &SomConfig, rng: &mut R) -> Result<Self> {
        config.validate()?;

        let total = config.total_nodes() * config.dimensions;
        let weights: Vec<f64> = (0..total).map(|_| rng.gen::<f64>()).collect();

        Ok(Self {
            width: config.width,
            height: config.height,
            dims: config.dimensions,
            distance: config.distance,
            kernel: config.kernel,
            weights,
        })
    }

    /// Creates a SOM from an existing weight buffer.
    ///
    /// `weights` must hold exactly `W * H * D` values in lattice order.
    pub fn from_weights(config: &SomConfig, weights: Vec<f64>) -> Result<Self> {
        config.validate()?;

        let expected = config.total_nodes() * config.dimensions;
        if weights.len() != expected {
            return Err(SomError::DimensionMismatch {
                expected,
                got: weights.len(),
            });
        }

        Ok(Self {
            width: config.width,
            height: config.height,
            dims: config.dimensions,
            distance: config.distance,
            kernel: config.kernel,
            weights,
        })
    }

    /// Number of columns (W).
    #[inline]
    pub fn cols(&self) -> usize {
        self.width
    }

    /// Number of rows (H).
    #[inline]
    pub fn rows(&self) -> usize {
        self.height
    }

    /// Codebook dimensionality (D).
    #[inline]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Returns the total number of nodes.
    #[inline]
    pub fn total_nodes(&self) -> usize {
        self.width * self.height
    }

    /// Active distance metric.
    #[inline]
    pub fn distance_type(&self) -> DistanceType {
        self.distance
    }

    /// Active neighborhood kernel.
    #[inline]
    pub fn kernel_type(&self) -> KernelType {
        self.kernel
    }

    /// Switches the distance metric.
    pub fn set_distance_type(&mut self, distance: DistanceType) {
        self.distance = distance;
    }

    /// Switches the neighborhood kernel.
    pub fn set_kernel_type(&mut self, kernel: KernelType) {
        self.kernel = kernel;
    }

    /// The whole weight buffer, in lattice order.
    #[inline]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Offset of node `(row, col)` in the weight buffer.
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        self.dims * (row * self.width + col)
    }

    #[inline]
    fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width
    }

    /// Gets the codebook vector of node `(row, col)`.
    #[inline]
    pub fn node_at(&self, row: usize, col: usize) -> Option<&[f64]> {
        if self.in_bounds(row, col) {
            let start = self.index(row, col);
            Some(&self.weights[start..start + self.dims])
        } else {
            None
        }
    }

    /// Gets a mutable view of the codebook vector of node `(row, col)`.
    ///
    /// The view borrows the lattice, so it cannot outlive a reload or any
    /// other mutating call.
    #[inline]
    pub fn node_at_mut(&mut self, row: usize, col: usize) -> Option<&mut [f64]> {
        if self.in_bounds(row, col) {
            let start = self.index(row, col);
            let dims = self.dims;
            Some(&mut self.weights[start..start + dims])
        } else {
            None
        }
    }

    /// Overwrites the codebook vector of node `(row, col)`.
    pub fn set_node_at(&mut self, row: usize, col: usize, values: &[f64]) -> Result<()> {
        if values.len() != self.dims {
            return Err(SomError::DimensionMismatch {
                expected: self.dims,
                got: values.len(),
            });
        }
        if row >= self.height {
            return Err(SomError::IndexOutOfRange {
                index: row,
                max: self.height,
            });
        }
        if col >= self.width {
            return Err(SomError::IndexOutOfRange {
                index: col,
                max: self.width,
            });
        }

        let start = self.index(row, col);
        self.weights[start..start + self.dims].copy_from_slice(values);
        Ok(())
    }

    /// Fails with `DimensionMismatch` unless `sample` has length `D`.
    #[inline]
    pub fn check_sample(&self, sample: &[f64]) -> Result<()> {
        if sample.len() != self.dims {
            return Err(SomError::DimensionMismatch {
                expected: self.dims,
                got: sample.len(),
            });
        }
        Ok(())
    }

    /// Iterates `(position, codebook vector)` pairs in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = (GridPos, &[f64])> + '_ {
        let width = self.width;
        self.weights
            .chunks_exact(self.dims)
            .enumerate()
            .map(move |(i, w)| (GridPos::new(i / width, i % width), w))
    }

    /// Finds the Best Matching Unit (BMU) for a sample.
    ///
    /// Scans every node once in row-major order. A later node replaces the
    /// current winner only if it is strictly closer, so ties go to the first
    /// node encountered.
    pub fn find_bmu(&self, sample: &[f64]) -> Result<Bmu> {
        self.check_sample(sample)?;

        let metric = self.distance.metric();
        let mut best = Bmu {
            pos: GridPos::default(),
            distance: f64::MAX,
        };

        for (pos, weights) in self.nodes() {
            let dist = metric.distance(sample, weights);
            if dist < best.distance {
                best = Bmu { pos, distance: dist };
            }
        }

        Ok(best)
    }

    /// Returns a copy of the BMU's codebook vector.
    pub fn cluster(&self, sample: &[f64]) -> Result<Vec<f64>> {
        let bmu = self.find_bmu(sample)?;
        let start = self.index(bmu.pos.row, bmu.pos.col);
        Ok(self.weights[start..start + self.dims].to_vec())
    }

    /// Finds the k nodes closest to a sample under the active metric.
    ///
    /// Returns `(position, distance)` pairs sorted by distance; equal
    /// distances keep row-major order. NaN distances rank last.
    pub fn find_k_nearest(&self, sample: &[f64], k: usize) -> Result<Vec<(GridPos, f64)>> {
        self.check_sample(sample)?;

        let metric = self.distance.metric();
        let mut distances: Vec<(GridPos, f64)> = self
            .nodes()
            .map(|(pos, w)| (pos, metric.distance(sample, w)))
            .collect();

        distances.sort_by(|a, b| a.1.is_nan().cmp(&b.1.is_nan()).then(a.1.total_cmp(&b.1)));
        distances.truncate(k);

        Ok(distances)
    }

    /// Pulls every node in the box around `bmu` towards `sample`.
    ///
    /// Each weight moves by `(sample - weight) * learning_rate * coef`, with
    /// `coef` given by the active kernel. Nodes outside the box are untouched.
    /// Returns the updated box.
    pub fn update_neighborhood(
        &mut self,
        sample: &[f64],
        bmu: GridPos,
        learning_rate: f64,
        radius: f64,
    ) -> Result<Neighborhood> {
        self.check_sample(sample)?;
        if !self.in_bounds(bmu.row, bmu.col) {
            return Err(SomError::IndexOutOfRange {
                index: bmu.row * self.width + bmu.col,
                max: self.total_nodes(),
            });
        }

        let neighborhood = Neighborhood::around(
            bmu,
            Neighborhood::half_width(radius),
            self.height,
            self.width,
        );
        let kernel = self.kernel.kernel();

        for pos in neighborhood.iter() {
            let coef = kernel.coefficient(bmu, pos, radius);
            let start = self.index(pos.row, pos.col);
            let node = &mut self.weights[start..start + self.dims];

            for (w, s) in node.iter_mut().zip(sample.iter()) {
                let error = s - *w;
                *w += error * learning_rate * coef;
            }
        }

        Ok(neighborhood)
    }

    /// Captures the full lattice state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.width,
            height: self.height,
            dimensions: self.dims,
            distance_type: self.distance.as_u8(),
            kernel: self.kernel.as_u8(),
            weights: self.weights.clone(),
        }
    }

    /// Rebuilds a lattice from a snapshot.
    ///
    /// The weights are copied into a fresh buffer in parallel.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        let (distance, kernel) = snapshot.validate()?;

        let mut weights = vec![0.0; snapshot.weights.len()];
        weights
            .par_iter_mut()
            .zip(snapshot.weights.par_iter())
            .for_each(|(dst, src)| *dst = *src);

        Ok(Self {
            width: snapshot.width,
            height: snapshot.height,
            dims: snapshot.dimensions,
            distance,
            kernel,
            weights,
        })
    }

    /// Saves the lattice to `path` in the given format.
    pub fn save<P: AsRef<Path>>(&self, path: P, format: SnapshotFormat) -> Result<()> {
        let path = path.as_ref();
        storage::save(&self.snapshot(), path, format)?;
        info!(
            "Saved {}x{}x{} SOM to {} ({})",
            self.width,
            self.height,
            self.dims,
            path.display(),
            format
        );
        Ok(())
    }

    /// Loads a lattice from `path` in the given format.
    pub fn load<P: AsRef<Path>>(path: P, format: SnapshotFormat) -> Result<Self> {
        let path = path.as_ref();
        let snapshot = storage::load(path, format)?;
        let som = Self::from_snapshot(&snapshot)?;
        info!(
            "Loaded {}x{}x{} SOM from {} ({})",
            som.width,
            som.height,
            som.dims,
            path.display(),
            format
        );
        Ok(som)
    }

    /// Replaces this lattice with the state stored at `path`.
    ///
    /// Dimensions, metric and kernel all come from the file. On error the
    /// lattice is left unchanged.
    pub fn reload<P: AsRef<Path>>(&mut self, path: P, format: SnapshotFormat) -> Result<()> {
        *self = Self::load(path, format)?;
        Ok(())
    }
}
