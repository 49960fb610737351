//! Plain reductions over `f64` slices.
//!
//! Empty or too-short inputs yield `NaN` rather than panicking.

use serde::Serialize;

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Unbiased sample variance (n - 1 denominator).
pub fn sample_variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|x| (x - m) * (x - m)).sum();
    ss / (values.len() - 1) as f64
}

pub fn sample_std(values: &[f64]) -> f64 {
    sample_variance(values).sqrt()
}

/// Percentile `q` (0..=100) of an ascending-sorted slice, linearly
/// interpolated between the two closest ranks.
pub fn percentile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Count, mean, and sample standard deviation of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
}

impl Moments {
    pub fn of(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: mean(values),
            std: sample_std(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&xs), 3.0);
        assert!((sample_variance(&xs) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn short_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(sample_variance(&[4.0]).is_nan());
        assert!(percentile_sorted(&[], 50.0).is_nan());
    }

    #[test]
    fn percentile_interpolates_linearly() {
        let xs: Vec<f64> = (1..=10).map(f64::from).collect();
        // rank = 0.025 * 9 = 0.225
        assert!((percentile_sorted(&xs, 2.5) - 1.225).abs() < 1e-12);
        // rank = 0.975 * 9 = 8.775
        assert!((percentile_sorted(&xs, 97.5) - 9.775).abs() < 1e-12);
        assert_eq!(percentile_sorted(&xs, 0.0), 1.0);
        assert_eq!(percentile_sorted(&xs, 100.0), 10.0);
    }

    #[test]
    fn single_value_percentile() {
        assert_eq!(percentile_sorted(&[3.5], 97.5), 3.5);
    }

    #[test]
    fn moments_of_constant_sample() {
        let m = Moments::of(&[2.0, 2.0, 2.0]);
        assert_eq!(m.count, 3);
        assert_eq!(m.mean, 2.0);
        assert_eq!(m.std, 0.0);
    }
}
