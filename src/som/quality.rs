//! Map quality measures.

use crate::error::{Result, SomError};
use crate::som::{GridPos, Som};

impl Som {
    /// Mean BMU distance over `samples` under the active metric.
    pub fn quantization_error<S: AsRef<[f64]>>(&self, samples: &[S]) -> Result<f64> {
        if samples.is_empty() {
            return Err(SomError::EmptyInput("No samples provided".to_string()));
        }

        let mut total = 0.0;
        for sample in samples {
            total += self.find_bmu(sample.as_ref())?.distance;
        }
        Ok(total / samples.len() as f64)
    }

    /// Fraction of samples whose best and second-best nodes are not grid neighbors.
    ///
    /// A sample without two scorable nodes (a single-node lattice, or NaN
    /// distances under the cosine metric) never counts as an error.
    pub fn topographic_error<S: AsRef<[f64]>>(&self, samples: &[S]) -> Result<f64> {
        if samples.is_empty() {
            return Err(SomError::EmptyInput("No samples provided".to_string()));
        }
        if self.total_nodes() < 2 {
            return Ok(0.0);
        }

        let mut errors = 0usize;
        for sample in samples {
            if let Some((first, second)) = self.best_two(sample.as_ref())? {
                if !first.is_adjacent(&second) {
                    errors += 1;
                }
            }
        }
        Ok(errors as f64 / samples.len() as f64)
    }

    /// Best and second-best nodes, same tie-break as BMU search.
    ///
    /// NaN distances are skipped. Returns `None` unless two nodes scored.
    fn best_two(&self, sample: &[f64]) -> Result<Option<(GridPos, GridPos)>> {
        self.check_sample(sample)?;

        let metric = self.distance_type().metric();
        let mut best: Option<(GridPos, f64)> = None;
        let mut second: Option<(GridPos, f64)> = None;

        for (pos, weights) in self.nodes() {
            let dist = metric.distance(sample, weights);
            if dist.is_nan() {
                continue;
            }
            match best {
                Some((_, d)) if dist >= d => {
                    if second.map_or(true, |(_, s)| dist < s) {
                        second = Some((pos, dist));
                    }
                }
                _ => {
                    second = best;
                    best = Some((pos, dist));
                }
            }
        }

        Ok(best.zip(second).map(|(b, s)| (b.0, s.0)))
    }
}
