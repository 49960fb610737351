//! TOML-based experiment configuration and preset definitions.

use std::fs;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::sim::SessionModel;
use crate::stats::Metric;

/// Top-level experiment configuration parsed from TOML.
///
/// All fields have defaults matching the baseline experiment. Load from
/// TOML with [`ExperimentConfig::from_toml_file`] or use
/// [`ExperimentConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Population, session, and assignment parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Coefficients of the outcome model.
    #[serde(default)]
    pub outcome: OutcomeConfig,
    /// Hypothesis test parameters.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

/// Synthetic population and randomization parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Number of users to draw (must be >= 1).
    pub n_users: usize,
    /// Poisson mean of sessions per user (must be > 0).
    pub sessions_per_user_mean: f64,
    /// Master random seed.
    pub seed: u64,
    /// Probability that a session lands in the treatment group.
    pub p_treatment: f64,
    /// Start of the observation window.
    pub epoch: NaiveDateTime,
    /// Length of the observation window in days (must be >= 1).
    pub window_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            n_users: 5000,
            sessions_per_user_mean: 3.0,
            seed: 42,
            p_treatment: 0.5,
            epoch: default_epoch(),
            window_days: 30,
        }
    }
}

fn default_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Coefficients of the low-price charging and energy model.
///
/// `p = clip(base + slope * propensity + effect_slope * propensity * treated, 0, 1)`
/// where `base`/`slope` depend on whether the session hour is inside the
/// low-price window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutcomeConfig {
    /// First hour of the low-price window (inclusive).
    pub low_window_start_hour: u32,
    /// Last hour of the low-price window (inclusive).
    pub low_window_end_hour: u32,
    pub in_window_base: f64,
    pub in_window_slope: f64,
    pub off_window_base: f64,
    pub off_window_slope: f64,
    /// Treatment uplift per unit of propensity.
    pub effect_slope: f64,
    /// Mean of the base energy draw (kWh).
    pub energy_mean: f64,
    /// Standard deviation of the base energy draw (kWh).
    pub energy_std: f64,
    pub low_shift_mean: f64,
    pub low_shift_std: f64,
    pub other_shift_mean: f64,
    pub other_shift_std: f64,
    /// Floor applied to delivered energy (kWh).
    pub min_energy_kwh: f64,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            low_window_start_hour: 2,
            low_window_end_hour: 5,
            in_window_base: 0.6,
            in_window_slope: 0.3,
            off_window_base: 0.1,
            off_window_slope: 0.4,
            effect_slope: 0.15,
            energy_mean: 7.0,
            energy_std: 2.0,
            low_shift_mean: 1.5,
            low_shift_std: 0.5,
            other_shift_mean: 0.0,
            other_shift_std: 0.5,
            min_energy_kwh: 0.1,
        }
    }
}

/// Hypothesis test parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Bootstrap replicate count (must be >= 1).
    pub n_boot: usize,
    /// Seed of the bootstrap resampling stream.
    pub bootstrap_seed: u64,
    /// Two-sided confidence level of the bootstrap interval, in (0, 1).
    pub confidence: f64,
    /// Metric whose mean difference is bootstrapped.
    pub bootstrap_metric: Metric,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            n_boot: 2000,
            bootstrap_seed: 1,
            confidence: 0.95,
            bootstrap_metric: Metric::EnergyKwh,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"generator.n_users"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl ExperimentConfig {
    /// Returns the baseline experiment (5000 users, 3 sessions per user, seed 42).
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Returns the pilot preset: a small population with a cheaper bootstrap.
    pub fn pilot() -> Self {
        Self {
            generator: GeneratorConfig {
                n_users: 500,
                ..GeneratorConfig::default()
            },
            analysis: AnalysisConfig {
                n_boot: 500,
                ..AnalysisConfig::default()
            },
            ..Self::default()
        }
    }

    /// Returns the null-effect preset: the nudge has no causal effect.
    pub fn null_effect() -> Self {
        Self {
            outcome: OutcomeConfig {
                effect_slope: 0.0,
                ..OutcomeConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "pilot", "null_effect"];

    /// Loads an experiment from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "pilot" => Ok(Self::pilot()),
            "null_effect" => Ok(Self::null_effect()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses an experiment from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses an experiment from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let g = &self.generator;
        if g.n_users == 0 {
            errors.push(ConfigError::new("generator.n_users", "must be >= 1"));
        }
        if !(g.sessions_per_user_mean > 0.0 && g.sessions_per_user_mean.is_finite()) {
            errors.push(ConfigError::new(
                "generator.sessions_per_user_mean",
                "must be a finite value > 0",
            ));
        }
        if !(0.0..=1.0).contains(&g.p_treatment) {
            errors.push(ConfigError::new(
                "generator.p_treatment",
                "must be in [0.0, 1.0]",
            ));
        }
        if g.window_days == 0 {
            errors.push(ConfigError::new("generator.window_days", "must be >= 1"));
        } else if SessionModel::new(g.epoch, g.window_days).window_end().is_none() {
            errors.push(ConfigError::new(
                "generator.window_days",
                "window extends past the representable date range",
            ));
        }

        let o = &self.outcome;
        if o.low_window_end_hour > 23 {
            errors.push(ConfigError::new(
                "outcome.low_window_end_hour",
                "must be <= 23",
            ));
        }
        if o.low_window_start_hour > o.low_window_end_hour {
            errors.push(ConfigError::new(
                "outcome.low_window_start_hour",
                "must be <= outcome.low_window_end_hour",
            ));
        }
        for (field, std) in [
            ("outcome.energy_std", o.energy_std),
            ("outcome.low_shift_std", o.low_shift_std),
            ("outcome.other_shift_std", o.other_shift_std),
        ] {
            if !(std >= 0.0 && std.is_finite()) {
                errors.push(ConfigError::new(field, "must be a finite value >= 0"));
            }
        }

        let a = &self.analysis;
        if a.n_boot == 0 {
            errors.push(ConfigError::new("analysis.n_boot", "must be >= 1"));
        }
        if !(a.confidence > 0.0 && a.confidence < 1.0) {
            errors.push(ConfigError::new(
                "analysis.confidence",
                "must be in (0.0, 1.0)",
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ExperimentConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn baseline_matches_documented_defaults() {
        let cfg = ExperimentConfig::baseline();
        assert_eq!(cfg.generator.n_users, 5000);
        assert_eq!(cfg.generator.sessions_per_user_mean, 3.0);
        assert_eq!(cfg.generator.seed, 42);
        assert_eq!(cfg.analysis.n_boot, 2000);
        assert_eq!(
            cfg.generator.epoch.format("%Y-%m-%d %H:%M").to_string(),
            "2024-06-01 00:00"
        );
    }

    #[test]
    fn from_preset_unknown() {
        let err = ExperimentConfig::from_preset("nonexistent");
        assert!(err.is_err());
        let e = err.unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ExperimentConfig::PRESETS {
            let cfg = ExperimentConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn null_effect_zeroes_only_the_effect() {
        let null = ExperimentConfig::null_effect();
        assert_eq!(null.outcome.effect_slope, 0.0);
        assert_eq!(null.outcome.in_window_base, OutcomeConfig::default().in_window_base);
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[generator]
n_users = 200
sessions_per_user_mean = 2.5
seed = 7
p_treatment = 0.3
epoch = "2025-01-15T00:00:00"
window_days = 14

[outcome]
effect_slope = 0.25
low_window_start_hour = 1
low_window_end_hour = 4

[analysis]
n_boot = 100
bootstrap_seed = 9
confidence = 0.9
bootstrap_metric = "charged_in_low"
"#;
        let cfg = ExperimentConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.generator.n_users), Some(200));
        assert_eq!(cfg.as_ref().map(|c| c.generator.window_days), Some(14));
        assert_eq!(cfg.as_ref().map(|c| c.outcome.effect_slope), Some(0.25));
        assert_eq!(
            cfg.as_ref().map(|c| c.analysis.bootstrap_metric),
            Some(Metric::ChargedInLow)
        );
        // untouched outcome field keeps its default
        assert_eq!(cfg.as_ref().map(|c| c.outcome.energy_mean), Some(7.0));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[generator]
n_users = 10
bogus_field = true
"#;
        assert!(ExperimentConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ExperimentConfig::from_toml_str("[generator]\nseed = 99\n");
        assert!(cfg.is_ok());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.generator.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.generator.n_users), Some(5000));
        assert_eq!(cfg.as_ref().map(|c| c.analysis.confidence), Some(0.95));
    }

    #[test]
    fn validation_catches_overflowing_window() {
        let mut cfg = ExperimentConfig::baseline();
        cfg.generator.n_users = 10;
        cfg.generator.window_days = 200_000_000;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.window_days"));
        assert!(crate::sim::generate_experiment(&cfg).is_err());
    }

    #[test]
    fn validation_catches_zero_users() {
        let mut cfg = ExperimentConfig::baseline();
        cfg.generator.n_users = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.n_users"));
    }

    #[test]
    fn validation_catches_bad_treatment_share() {
        let mut cfg = ExperimentConfig::baseline();
        cfg.generator.p_treatment = 1.5;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "generator.p_treatment"));
    }

    #[test]
    fn validation_catches_zero_boot_and_bad_confidence() {
        let mut cfg = ExperimentConfig::baseline();
        cfg.analysis.n_boot = 0;
        cfg.analysis.confidence = 1.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "analysis.n_boot"));
        assert!(errors.iter().any(|e| e.field == "analysis.confidence"));
    }

    #[test]
    fn validation_catches_inverted_window() {
        let mut cfg = ExperimentConfig::baseline();
        cfg.outcome.low_window_start_hour = 6;
        let errors = cfg.validate();
        assert!(
            errors
                .iter()
                .any(|e| e.field == "outcome.low_window_start_hour")
        );
    }
}
