use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{Error, Result};

use super::TwoSample;
use super::describe::mean;
use super::types::TestResult;

/// Two-sided p-value of a standard normal statistic; `NaN` for non-finite input.
pub(crate) fn two_sided_normal_pvalue(z: f64) -> f64 {
    if !z.is_finite() {
        return f64::NAN;
    }
    2.0 * Normal::standard().sf(z.abs())
}

/// Two-proportion z-test with a pooled-proportion standard error.
///
/// Both arms must hold only `0.0` / `1.0` values. When the pooled
/// proportion is 0 or 1 the standard error vanishes and the statistic and
/// p-value are `NaN`.
///
/// # Errors
///
/// Returns `InvalidInput` if either arm is empty or holds a non-binary value.
pub fn proportion_ztest(sample: &TwoSample) -> Result<TestResult> {
    sample.require(1, "proportion z-test")?;
    if let Some(v) = sample
        .control
        .iter()
        .chain(&sample.treatment)
        .find(|&&v| v != 0.0 && v != 1.0)
    {
        return Err(Error::InvalidInput(format!(
            "proportion z-test needs a binary metric, found value {v}"
        )));
    }

    let n_t = sample.treatment.len() as f64;
    let n_c = sample.control.len() as f64;
    let p_t = mean(&sample.treatment);
    let p_c = mean(&sample.control);

    let pooled = (p_t * n_t + p_c * n_c) / (n_t + n_c);
    let se = (pooled * (1.0 - pooled) * (1.0 / n_t + 1.0 / n_c)).sqrt();
    let z = (p_t - p_c) / se;

    Ok(TestResult {
        statistic: z,
        pvalue: two_sided_normal_pvalue(z),
        point_estimate_diff: p_t - p_c,
        treat_mean: p_t,
        control_mean: p_c,
        treat_n: sample.treatment.len(),
        control_n: sample.control.len(),
        degrees_of_freedom: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones_and_zeros(ones: usize, n: usize) -> Vec<f64> {
        (0..n).map(|i| if i < ones { 1.0 } else { 0.0 }).collect()
    }

    #[test]
    fn equal_shares_show_no_difference() {
        let control = vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let treatment = vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let r = proportion_ztest(&TwoSample::new(control, treatment)).unwrap();
        assert!(r.point_estimate_diff.abs() < 1e-12);
        assert!(r.pvalue > 0.5);
    }

    #[test]
    fn known_statistic_and_pvalue() {
        // 60/100 vs 40/100: pooled 0.5, se = sqrt(0.25 * 0.02)
        let sample = TwoSample::new(ones_and_zeros(40, 100), ones_and_zeros(60, 100));
        let r = proportion_ztest(&sample).unwrap();
        assert!((r.statistic - 2.828_427).abs() < 1e-5, "z = {}", r.statistic);
        assert!((r.pvalue - 0.004_678).abs() < 1e-5, "p = {}", r.pvalue);
        assert!((r.point_estimate_diff - 0.2).abs() < 1e-12);
        assert!(r.degrees_of_freedom.is_none());
    }

    #[test]
    fn sign_follows_treatment_minus_control() {
        let sample = TwoSample::new(ones_and_zeros(60, 100), ones_and_zeros(40, 100));
        let r = proportion_ztest(&sample).unwrap();
        assert!(r.statistic < 0.0);
    }

    #[test]
    fn all_zero_outcome_is_nan_not_error() {
        let sample = TwoSample::new(vec![0.0; 5], vec![0.0; 7]);
        let r = proportion_ztest(&sample).unwrap();
        assert!(r.statistic.is_nan());
        assert!(r.pvalue.is_nan());
        assert_eq!(r.point_estimate_diff, 0.0);
    }

    #[test]
    fn empty_group_is_invalid_input() {
        let sample = TwoSample::new(vec![], vec![1.0, 0.0]);
        assert!(matches!(
            proportion_ztest(&sample),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn non_binary_metric_is_invalid_input() {
        let sample = TwoSample::new(vec![0.0, 1.0], vec![7.5, 1.0]);
        assert!(matches!(
            proportion_ztest(&sample),
            Err(Error::InvalidInput(ref m)) if m.contains("binary")
        ));
    }
}
