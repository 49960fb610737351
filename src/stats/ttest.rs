use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::Result;

use super::TwoSample;
use super::describe::{mean, sample_variance};
use super::types::TestResult;

/// Two-sided Welch two-sample t-test (unequal variances).
///
/// The statistic is `(treat_mean - control_mean) / sqrt(s_t²/n_t + s_c²/n_c)`
/// with Welch-Satterthwaite degrees of freedom. If the combined standard
/// error is zero (both arms constant) the statistic, p-value, and degrees of
/// freedom are `NaN`. A single constant arm still yields a finite statistic.
///
/// # Errors
///
/// Returns `InvalidInput` if either arm has fewer than 2 observations.
pub fn welch_ttest(sample: &TwoSample) -> Result<TestResult> {
    sample.require(2, "Welch t-test")?;

    let n_t = sample.treatment.len() as f64;
    let n_c = sample.control.len() as f64;
    let m_t = mean(&sample.treatment);
    let m_c = mean(&sample.control);
    let se_t = sample_variance(&sample.treatment) / n_t;
    let se_c = sample_variance(&sample.control) / n_c;
    let se2 = se_t + se_c;
    let diff = m_t - m_c;

    let (statistic, pvalue, df) = if se2 > 0.0 && se2.is_finite() {
        let t = diff / se2.sqrt();
        let df = se2 * se2 / (se_t * se_t / (n_t - 1.0) + se_c * se_c / (n_c - 1.0));
        (t, two_sided_t_pvalue(t, df), df)
    } else {
        (f64::NAN, f64::NAN, f64::NAN)
    };

    Ok(TestResult {
        statistic,
        pvalue,
        point_estimate_diff: diff,
        treat_mean: m_t,
        control_mean: m_c,
        treat_n: sample.treatment.len(),
        control_n: sample.control.len(),
        degrees_of_freedom: Some(df),
    })
}

fn two_sided_t_pvalue(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return f64::NAN;
    }
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn shifted_means_detected() {
        let sample = TwoSample::new(
            vec![1.0, 2.0, 3.0, 4.0, 5.0],
            vec![6.0, 7.0, 8.0, 9.0, 10.0],
        );
        let r = welch_ttest(&sample).unwrap();
        assert_eq!(r.point_estimate_diff, 5.0);
        assert!((r.statistic - 5.0).abs() < 1e-12);
        assert!((r.degrees_of_freedom.unwrap() - 8.0).abs() < 1e-9);
        assert!(r.pvalue < 0.01);
        assert!((r.pvalue - 0.001_053).abs() < 1e-5, "p = {}", r.pvalue);
    }

    #[test]
    fn unequal_variances_use_satterthwaite_df() {
        let sample = TwoSample::new(
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0],
            vec![2.0, 4.0, 6.0, 8.0],
        );
        let r = welch_ttest(&sample).unwrap();
        assert!((r.statistic - 5.0_f64.sqrt()).abs() < 1e-9);
        assert!((r.degrees_of_freedom.unwrap() - 3.485_814).abs() < 1e-5);
        assert!((r.pvalue - 0.098_92).abs() < 1e-3, "p = {}", r.pvalue);
    }

    #[test]
    fn identical_samples_have_unit_pvalue() {
        let xs = vec![3.0, 4.0, 5.0, 6.0];
        let r = welch_ttest(&TwoSample::new(xs.clone(), xs)).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!((r.pvalue - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_arms_are_nan_not_error() {
        let r = welch_ttest(&TwoSample::new(vec![2.0; 4], vec![3.0; 4])).unwrap();
        assert!(r.statistic.is_nan());
        assert!(r.pvalue.is_nan());
        assert_eq!(r.point_estimate_diff, 1.0);
    }

    #[test]
    fn one_constant_arm_still_tests() {
        let r = welch_ttest(&TwoSample::new(vec![0.0; 5], vec![1.0, 2.0, 3.0])).unwrap();
        assert!(r.statistic.is_finite());
        assert!((r.degrees_of_freedom.unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn negative_and_zero_values_are_accepted() {
        let r = welch_ttest(&TwoSample::new(vec![-1.0, 0.0, -2.0], vec![0.0, 0.5, -0.5]));
        assert!(r.is_ok());
    }

    #[test]
    fn single_observation_is_invalid_input() {
        let sample = TwoSample::new(vec![1.0], vec![2.0, 3.0]);
        assert!(matches!(welch_ttest(&sample), Err(Error::InvalidInput(_))));
    }
}
