use rand::Rng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sim::rng::{RandomSource, Stream};

use super::TwoSample;
use super::describe::{mean, percentile_sorted};
use super::types::BootstrapResult;

/// Percentile bootstrap for the difference in means `treatment - control`.
///
/// Each replicate resamples both arms with replacement at their original
/// sizes, independently of each other, matching the unpaired design.
/// Replicates are drawn sequentially from one seeded stream, so the first
/// `k` replicates are identical for any `n_boot >= k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentileBootstrap {
    n_boot: usize,
    seed: u64,
    confidence: f64,
}

impl PercentileBootstrap {
    /// 95% interval with the given replicate count and seed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_boot` is zero.
    pub fn new(n_boot: usize, seed: u64) -> Result<Self> {
        Self::with_confidence(n_boot, seed, 0.95)
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_boot` is zero or `confidence` is
    /// outside (0, 1).
    pub fn with_confidence(n_boot: usize, seed: u64, confidence: f64) -> Result<Self> {
        if n_boot == 0 {
            return Err(Error::invalid_argument("n_boot", "must be >= 1"));
        }
        if !(confidence > 0.0 && confidence < 1.0) {
            return Err(Error::invalid_argument(
                "confidence",
                format!("{confidence} is outside (0, 1)"),
            ));
        }
        Ok(Self {
            n_boot,
            seed,
            confidence,
        })
    }

    pub fn n_boot(&self) -> usize {
        self.n_boot
    }

    /// Runs the bootstrap on `sample`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if either arm is empty.
    pub fn run(&self, sample: &TwoSample) -> Result<BootstrapResult> {
        sample.require(1, "bootstrap")?;

        let mut rng = RandomSource::new(self.seed).stream(Stream::Bootstrap);
        let replicates: Vec<f64> = (0..self.n_boot)
            .map(|_| {
                let t = resampled_mean(&sample.treatment, &mut rng);
                let c = resampled_mean(&sample.control, &mut rng);
                t - c
            })
            .collect();

        let mut sorted = replicates.clone();
        sorted.sort_by(f64::total_cmp);
        let tail = (1.0 - self.confidence) / 2.0 * 100.0;
        let ci_lower = percentile_sorted(&sorted, tail);
        let ci_upper = percentile_sorted(&sorted, 100.0 - tail);

        let treat_mean = mean(&sample.treatment);
        let control_mean = mean(&sample.control);
        debug!(
            n_boot = self.n_boot,
            ci_lower = ci_lower,
            ci_upper = ci_upper,
            "bootstrap finished"
        );

        Ok(BootstrapResult {
            n_boot: self.n_boot,
            confidence: self.confidence,
            ci_lower,
            ci_upper,
            resampled_mean_diff: mean(&replicates),
            point_estimate_diff: treat_mean - control_mean,
            treat_mean,
            control_mean,
            replicates,
        })
    }
}

fn resampled_mean<R: Rng>(values: &[f64], rng: &mut R) -> f64 {
    let n = values.len();
    let total: f64 = (0..n).map(|_| values[rng.random_range(0..n)]).sum();
    total / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TwoSample {
        TwoSample::new(
            vec![4.0, 5.5, 6.0, 7.2, 5.1, 6.3, 4.9, 5.8],
            vec![7.1, 8.4, 6.9, 9.0, 7.7, 8.2, 7.5],
        )
    }

    #[test]
    fn zero_replicates_is_invalid_argument() {
        assert!(matches!(
            PercentileBootstrap::new(0, 1),
            Err(Error::InvalidArgument { name: "n_boot", .. })
        ));
        assert!(PercentileBootstrap::with_confidence(10, 1, 1.0).is_err());
    }

    #[test]
    fn produces_requested_replicates_and_ordered_interval() {
        let r = PercentileBootstrap::new(500, 1).unwrap().run(&sample()).unwrap();
        assert_eq!(r.replicates.len(), 500);
        assert!(r.ci_lower <= r.resampled_mean_diff);
        assert!(r.resampled_mean_diff <= r.ci_upper);
        assert!(r.contains(r.point_estimate_diff));
        assert!(r.ci_lower > 0.0, "clear separation should exclude zero");
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let boot = PercentileBootstrap::new(200, 9).unwrap();
        assert_eq!(boot.run(&sample()).unwrap(), boot.run(&sample()).unwrap());
    }

    #[test]
    fn more_replicates_extend_without_perturbing_prefix() {
        let short = PercentileBootstrap::new(50, 3).unwrap().run(&sample()).unwrap();
        let long = PercentileBootstrap::new(150, 3).unwrap().run(&sample()).unwrap();
        assert_eq!(short.replicates[..], long.replicates[..50]);
    }

    #[test]
    fn constant_arms_give_degenerate_interval() {
        let s = TwoSample::new(vec![2.0; 6], vec![3.0; 4]);
        let r = PercentileBootstrap::new(100, 1).unwrap().run(&s).unwrap();
        assert_eq!(r.ci_lower, 1.0);
        assert_eq!(r.ci_upper, 1.0);
        assert_eq!(r.resampled_mean_diff, 1.0);
    }

    #[test]
    fn narrower_confidence_gives_narrower_interval() {
        let wide = PercentileBootstrap::with_confidence(400, 5, 0.99)
            .unwrap()
            .run(&sample())
            .unwrap();
        let narrow = PercentileBootstrap::with_confidence(400, 5, 0.80)
            .unwrap()
            .run(&sample())
            .unwrap();
        assert!(narrow.ci_upper - narrow.ci_lower < wide.ci_upper - wide.ci_lower);
    }

    #[test]
    fn empty_group_is_invalid_input() {
        let s = TwoSample::new(vec![1.0], vec![]);
        assert!(matches!(
            PercentileBootstrap::new(10, 1).unwrap().run(&s),
            Err(Error::InvalidInput(_))
        ));
    }
}
