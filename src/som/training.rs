//! SOM training.
//!
//! Training is a single sequential pass of `iterations` steps. Each step picks
//! one sample, finds its BMU and pulls the box of nodes around it towards the
//! sample. The learning-rate gap and the neighborhood radius are annealed by
//! compounding `(1 - t / iterations)` factors, so each step's schedule depends
//! on every step before it.

use crate::config::TrainingConfig;
use crate::error::{Result, SomError};
use crate::som::Som;
use log::{debug, info};

/// Learning rate and radius in effect for one iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Epoch {
    /// 0-based iteration index.
    pub iteration: usize,
    /// Learning rate for this iteration.
    pub learning_rate: f64,
    /// Neighborhood radius for this iteration.
    pub radius: f64,
}

/// Compounding annealing schedule.
///
/// At step `t` both the learning-rate gap and the radius are multiplied by
/// `1 - t / iterations` and the results are carried into step `t + 1`.
#[derive(Debug, Clone)]
pub struct AnnealingSchedule {
    iterations: usize,
    end_learning_rate: f64,
    gap: f64,
    radius: f64,
    step: usize,
}

impl AnnealingSchedule {
    /// Creates a schedule.
    ///
    /// If `start_learning_rate < end_learning_rate` the end rate is forced to 0.
    pub fn new(
        iterations: usize,
        start_learning_rate: f64,
        end_learning_rate: f64,
        radius: f64,
    ) -> Self {
        let end_learning_rate = if start_learning_rate < end_learning_rate {
            0.0
        } else {
            end_learning_rate
        };

        Self {
            iterations,
            end_learning_rate,
            gap: start_learning_rate - end_learning_rate,
            radius,
            step: 0,
        }
    }

    /// Creates a schedule from a training configuration.
    pub fn from_config(config: &TrainingConfig) -> Self {
        Self::new(
            config.iterations,
            config.start_learning_rate,
            config.end_learning_rate,
            config.neighborhood_radius,
        )
    }

    /// The learning rate the schedule decays towards, after clamping.
    pub fn end_learning_rate(&self) -> f64 {
        self.end_learning_rate
    }
}

impl Iterator for AnnealingSchedule {
    type Item = Epoch;

    fn next(&mut self) -> Option<Epoch> {
        if self.step >= self.iterations {
            return None;
        }

        let decay = 1.0 - self.step as f64 / self.iterations as f64;
        self.gap *= decay;
        self.radius *= decay;

        let epoch = Epoch {
            iteration: self.step,
            learning_rate: self.end_learning_rate + self.gap,
            radius: self.radius,
        };
        self.step += 1;
        Some(epoch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.iterations.saturating_sub(self.step);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AnnealingSchedule {}

/// Index of the sample used at `iteration`.
///
/// Samples are replayed cyclically when there are fewer of them than
/// iterations.
#[inline]
pub fn sample_index(iteration: usize, num_samples: usize, iterations: usize) -> usize {
    if num_samples < iterations {
        iteration % num_samples
    } else {
        iteration
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingSummary {
    /// Iterations performed.
    pub iterations: usize,
    /// Learning rate used on the last iteration.
    pub final_learning_rate: f64,
    /// Radius used on the last iteration.
    pub final_radius: f64,
}

/// SOM trainer.
#[derive(Debug, Clone, Default)]
pub struct SomTrainer {
    config: TrainingConfig,
}

impl SomTrainer {
    /// Creates a new trainer.
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Returns the training configuration.
    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Checks every precondition before any weight is touched.
    fn validate<S: AsRef<[f64]>>(&self, som: &Som, samples: &[S]) -> Result<()> {
        if self.config.iterations == 0 {
            return Err(SomError::InvalidArgument(
                "iterations must be greater than 0".to_string(),
            ));
        }
        if samples.is_empty() {
            return Err(SomError::EmptyInput("No training samples provided".to_string()));
        }
        for sample in samples {
            som.check_sample(sample.as_ref())?;
        }
        if !self.config.cyclic && samples.len() < self.config.iterations {
            return Err(SomError::IndexOutOfRange {
                index: samples.len(),
                max: samples.len(),
            });
        }
        Ok(())
    }

    /// Trains `som` on `samples`.
    ///
    /// Always runs exactly `iterations` steps. If a step fails the weights
    /// updated by earlier steps stay updated.
    pub fn train<S: AsRef<[f64]>>(&self, som: &mut Som, samples: &[S]) -> Result<TrainingSummary> {
        self.validate(som, samples)?;

        let iterations = self.config.iterations;
        let schedule = AnnealingSchedule::from_config(&self.config);

        info!(
            "Starting SOM training with {} iterations on {} samples ({}x{} lattice, {}, {})",
            iterations,
            samples.len(),
            som.cols(),
            som.rows(),
            som.distance_type(),
            som.kernel_type()
        );
        if samples.len() < iterations {
            debug!("Fewer samples than iterations, replaying samples cyclically");
        }

        let mut summary = TrainingSummary {
            iterations,
            final_learning_rate: self.config.start_learning_rate,
            final_radius: self.config.neighborhood_radius,
        };

        for epoch in schedule {
            let sample = samples[sample_index(epoch.iteration, samples.len(), iterations)].as_ref();

            let bmu = som.find_bmu(sample)?;
            som.update_neighborhood(sample, bmu.pos, epoch.learning_rate, epoch.radius)?;

            let log_every = self.config.log_every;
            if (log_every > 0 && epoch.iteration % log_every == 0) || epoch.iteration == iterations - 1 {
                debug!(
                    "Iteration {}/{}: lr={:.4}, radius={:.2}, bmu=({}, {}), dist={:.4}",
                    epoch.iteration,
                    iterations,
                    epoch.learning_rate,
                    epoch.radius,
                    bmu.pos.row,
                    bmu.pos.col,
                    bmu.distance
                );
            }

            summary.final_learning_rate = epoch.learning_rate;
            summary.final_radius = epoch.radius;
        }

        info!("SOM training completed");
        Ok(summary)
    }
}

impl Som {
    /// Trains the lattice with the given schedule.
    ///
    /// Samples are replayed cyclically when there are fewer of them than
    /// iterations.
    pub fn train<S: AsRef<[f64]>>(
        &mut self,
        samples: &[S],
        iterations: usize,
        start_learning_rate: f64,
        end_learning_rate: f64,
        neighborhood_radius: f64,
    ) -> Result<TrainingSummary> {
        let config = TrainingConfig::new(
            iterations,
            start_learning_rate,
            end_learning_rate,
            neighborhood_radius,
        );
        SomTrainer::new(config).train(self, samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SomConfig;
    use crate::som::{GridPos, KernelType, Neighborhood};

    #[test]
    fn test_schedule_first_step_uses_start_rate() {
        let mut schedule = AnnealingSchedule::new(10, 0.8, 0.1, 4.0);
        let first = schedule.next().unwrap();
        assert_eq!(first.iteration, 0);
        assert!((first.learning_rate - 0.8).abs() < 1e-15);
        assert!((first.radius - 4.0).abs() < 1e-15);
    }

    #[test]
    fn test_schedule_compounds() {
        let epochs: Vec<Epoch> = AnnealingSchedule::new(4, 1.0, 0.0, 8.0).collect();
        assert_eq!(epochs.len(), 4);

        // Factors 1, 3/4, 1/2, 1/4 applied cumulatively.
        let expected = [1.0, 0.75, 0.375, 0.09375];
        for (epoch, factor) in epochs.iter().zip(expected) {
            assert!((epoch.learning_rate - factor).abs() < 1e-12);
            assert!((epoch.radius - 8.0 * factor).abs() < 1e-12);
        }

        // A per-step recomputation would give 0.25 at the last step.
        assert!((epochs[3].learning_rate - 0.25).abs() > 0.1);
    }

    #[test]
    fn test_schedule_gap_added_to_end_rate() {
        let epochs: Vec<Epoch> = AnnealingSchedule::new(2, 0.5, 0.1, 2.0).collect();
        assert!((epochs[0].learning_rate - 0.5).abs() < 1e-12);
        // gap 0.4 * 0.5 = 0.2
        assert!((epochs[1].learning_rate - 0.3).abs() < 1e-12);
        assert!((epochs[1].radius - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_schedule_inverted_rates_clamp_end_to_zero() {
        let schedule = AnnealingSchedule::new(3, 0.1, 0.5, 1.0);
        assert_eq!(schedule.end_learning_rate(), 0.0);

        let epochs: Vec<Epoch> = schedule.collect();
        assert!((epochs[0].learning_rate - 0.1).abs() < 1e-12);
        assert!(epochs.iter().all(|e| e.learning_rate >= 0.0));
    }

    #[test]
    fn test_schedule_len() {
        let schedule = AnnealingSchedule::new(7, 0.5, 0.1, 1.0);
        assert_eq!(schedule.len(), 7);
        assert_eq!(AnnealingSchedule::new(0, 0.5, 0.1, 1.0).count(), 0);
    }

    #[test]
    fn test_sample_index_cyclic() {
        let order: Vec<usize> = (0..5).map(|t| sample_index(t, 2, 5)).collect();
        assert_eq!(order, vec![0, 1, 0, 1, 0]);

        let order: Vec<usize> = (0..3).map(|t| sample_index(t, 5, 3)).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_single_iteration_updates_only_bmu() {
        let config = SomConfig::new(2, 2, 2);
        let mut som =
            Som::from_weights(&config, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();
        let before = som.clone();

        som.train(&[vec![0.1, 0.2]], 1, 1.0, 0.0, 0.0).unwrap();

        // rate 1.0 moves the BMU all the way onto the sample
        assert_eq!(som.node_at(0, 0).unwrap(), &[0.1, 0.2]);
        assert_eq!(som.node_at(0, 1), before.node_at(0, 1));
        assert_eq!(som.node_at(1, 0), before.node_at(1, 0));
        assert_eq!(som.node_at(1, 1), before.node_at(1, 1));
    }

    #[test]
    fn test_single_iteration_partial_rate() {
        let config = SomConfig::new(2, 2, 2);
        let mut som =
            Som::from_weights(&config, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]).unwrap();

        som.train(&[vec![0.8, 0.9]], 1, 0.25, 0.0, 0.0).unwrap();

        let node = som.node_at(1, 1).unwrap();
        assert!((node[0] - (1.0 + (0.8 - 1.0) * 0.25)).abs() < 1e-15);
        assert!((node[1] - (1.0 + (0.9 - 1.0) * 0.25)).abs() < 1e-15);
    }

    #[test]
    fn test_one_iteration_containment() {
        for kernel in KernelType::ALL {
            let config = SomConfig::new(7, 6, 3).with_kernel(kernel).with_seed(11);
            let mut som = Som::new(&config).unwrap();
            let before = som.clone();
            let sample = [0.5, 0.5, 0.5];

            let bmu = som.find_bmu(&sample).unwrap();
            som.train(&[sample], 1, 0.5, 0.0, 2.0).unwrap();

            let n = Neighborhood::around(bmu.pos, 2, som.rows(), som.cols());
            for ((pos, new), (_, old)) in som.nodes().zip(before.nodes()) {
                if !n.contains(pos) {
                    assert_eq!(new, old, "{:?} changed outside the box with {}", pos, kernel);
                }
            }
            assert_ne!(som.node_at(bmu.pos.row, bmu.pos.col), before.node_at(bmu.pos.row, bmu.pos.col));
        }
    }

    #[test]
    fn test_cyclic_replay_matches_manual_schedule() {
        // A single node is always the BMU, so its trajectory only depends on
        // the sample order and the schedule.
        let config = SomConfig::new(1, 1, 1);
        let mut som = Som::from_weights(&config, vec![0.0]).unwrap();
        let samples = [vec![1.0], vec![-1.0]];

        som.train(&samples, 5, 0.6, 0.1, 0.0).unwrap();

        let mut w = 0.0;
        for epoch in AnnealingSchedule::new(5, 0.6, 0.1, 0.0) {
            let s = samples[epoch.iteration % 2][0];
            w += (s - w) * epoch.learning_rate;
        }
        assert!((som.weights()[0] - w).abs() < 1e-15);
    }

    #[test]
    fn test_decayed_radius_shrinks_update_box() {
        // One row of nine scalar nodes; radii run 4, 3, 1.5, 0.375 so the
        // box half-width shrinks 4, 3, 2, 0.
        let config = SomConfig::new(9, 1, 1).with_kernel(KernelType::Gaussian);
        let initial: Vec<f64> = (0..9).map(|c| c as f64 / 10.0).collect();
        let mut som = Som::from_weights(&config, initial.clone()).unwrap();
        let samples = [vec![0.72], vec![0.13]];

        som.train(&samples, 4, 0.5, 0.0, 4.0).unwrap();

        let mut expected = initial;
        let mut half_widths = Vec::new();
        let mut before_last = Vec::new();
        let mut last_box = (0, 0);
        for epoch in AnnealingSchedule::new(4, 0.5, 0.0, 4.0) {
            let s = samples[epoch.iteration % 2][0];

            let mut bmu = 0;
            for c in 1..9 {
                if (expected[c] - s).abs() < (expected[bmu] - s).abs() {
                    bmu = c;
                }
            }

            let half = Neighborhood::half_width(epoch.radius);
            let (lo, hi) = (bmu.saturating_sub(half), (bmu + half).min(8));
            half_widths.push(half);
            before_last = expected.clone();
            last_box = (lo, hi);

            for c in lo..=hi {
                let coef = KernelType::Gaussian.coefficient(
                    GridPos::new(0, bmu),
                    GridPos::new(0, c),
                    epoch.radius,
                );
                expected[c] += (s - expected[c]) * epoch.learning_rate * coef;
            }
        }

        assert_eq!(half_widths, vec![4, 3, 2, 0]);
        assert_eq!(last_box.0, last_box.1);
        for (c, w) in som.weights().iter().enumerate() {
            assert!((w - expected[c]).abs() < 1e-12, "node {} diverged", c);
            if c != last_box.0 {
                assert!((w - before_last[c]).abs() < 1e-12, "node {} moved outside the box", c);
            }
        }
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut som = Som::new(&SomConfig::new(2, 2, 1).with_seed(1)).unwrap();
        let before = som.clone();
        let err = som.train(&[vec![0.5]], 0, 0.5, 0.1, 1.0).unwrap_err();
        assert!(matches!(err, SomError::InvalidArgument(_)));
        assert_eq!(som, before);
    }

    #[test]
    fn test_empty_samples_rejected() {
        let mut som = Som::new(&SomConfig::new(2, 2, 1)).unwrap();
        let samples: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            som.train(&samples, 3, 0.5, 0.1, 1.0),
            Err(SomError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_mismatched_sample_rejected_before_update() {
        let mut som = Som::new(&SomConfig::new(3, 3, 2).with_seed(2)).unwrap();
        let before = som.clone();
        let samples = vec![vec![0.1, 0.2], vec![0.3]];

        let err = som.train(&samples, 4, 0.5, 0.1, 1.0).unwrap_err();
        assert!(matches!(err, SomError::DimensionMismatch { expected: 2, got: 1 }));
        assert_eq!(som, before);
    }

    #[test]
    fn test_non_cyclic_short_samples_rejected() {
        let mut som = Som::new(&SomConfig::new(2, 2, 1)).unwrap();
        let trainer = SomTrainer::new(TrainingConfig {
            cyclic: false,
            ..TrainingConfig::new(5, 0.5, 0.1, 1.0)
        });

        let err = trainer.train(&mut som, &[vec![0.1], vec![0.2]]).unwrap_err();
        assert!(matches!(err, SomError::IndexOutOfRange { index: 2, max: 2 }));

        let ok = trainer.train(&mut som, &vec![vec![0.1]; 5]);
        assert!(ok.is_ok());
    }

    #[test]
    fn test_summary_reports_last_epoch() {
        let mut som = Som::new(&SomConfig::new(3, 3, 1).with_seed(4)).unwrap();
        let summary = som.train(&[vec![0.5]], 4, 1.0, 0.0, 8.0).unwrap();

        assert_eq!(summary.iterations, 4);
        assert!((summary.final_learning_rate - 0.09375).abs() < 1e-12);
        assert!((summary.final_radius - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_training_moves_bmu_towards_sample() {
        let config = SomConfig::new(4, 4, 2).with_kernel(KernelType::Gaussian).with_seed(21);
        let mut som = Som::new(&config).unwrap();
        let sample = [0.9, 0.1];

        let before = som.find_bmu(&sample).unwrap().distance;
        som.train(&[sample], 20, 0.5, 0.05, 2.0).unwrap();
        let after = som.find_bmu(&sample).unwrap().distance;

        assert!(after < before);
    }

    #[test]
    fn test_bmu_stays_in_bounds_during_training() {
        let config = SomConfig::new(3, 5, 2).with_seed(8);
        let mut som = Som::new(&config).unwrap();
        let samples = vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![0.5, 0.5]];
        som.train(&samples, 30, 0.4, 0.01, 2.0).unwrap();

        for s in &samples {
            let bmu = som.find_bmu(s).unwrap();
            assert!(bmu.pos.row < 5 && bmu.pos.col < 3);
        }
    }
}
