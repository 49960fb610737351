//! Result records produced by the hypothesis tests.

use std::fmt;

use serde::Serialize;

/// Outcome of a single two-sided hypothesis test.
///
/// `statistic` and `pvalue` are `NaN` when the data make the test
/// uninformative (e.g. both arms constant).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    /// Two-sided p-value in [0, 1], or `NaN`.
    pub pvalue: f64,
    /// `treat_mean - control_mean`.
    pub point_estimate_diff: f64,
    pub treat_mean: f64,
    pub control_mean: f64,
    pub treat_n: usize,
    pub control_n: usize,
    /// Welch-Satterthwaite degrees of freedom; `None` for the z-test.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degrees_of_freedom: Option<f64>,
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stat={:.4}  pvalue={:.4}  diff={:.4}  treat_mean={:.4} (n={})  control_mean={:.4} (n={})",
            self.statistic,
            self.pvalue,
            self.point_estimate_diff,
            self.treat_mean,
            self.treat_n,
            self.control_mean,
            self.control_n,
        )?;
        if let Some(df) = self.degrees_of_freedom {
            write!(f, "  df={df:.1}")?;
        }
        Ok(())
    }
}

/// Percentile bootstrap interval for a mean difference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapResult {
    pub n_boot: usize,
    /// Two-sided confidence level of `[ci_lower, ci_upper]`.
    pub confidence: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    /// Mean of the replicate differences.
    pub resampled_mean_diff: f64,
    /// Observed `treat_mean - control_mean`.
    pub point_estimate_diff: f64,
    pub treat_mean: f64,
    pub control_mean: f64,
    /// Replicate differences in generation order.
    #[serde(skip)]
    pub replicates: Vec<f64>,
}

impl BootstrapResult {
    /// Whether `value` lies inside the closed interval.
    pub fn contains(&self, value: f64) -> bool {
        self.ci_lower <= value && value <= self.ci_upper
    }
}

impl fmt::Display for BootstrapResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mean_diff={:.4}, {:.0}% CI=({:.4}, {:.4})  [n_boot={}]",
            self.resampled_mean_diff,
            self.confidence * 100.0,
            self.ci_lower,
            self.ci_upper,
            self.n_boot,
        )
    }
}
