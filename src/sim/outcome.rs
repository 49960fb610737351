use chrono::Timelike;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::OutcomeConfig;
use crate::error::{Error, Result};

use super::rng::{RandomSource, Stream};
use super::types::{AssignedSession, Group, Session};

/// Ground-truth data-generating process for session outcomes.
///
/// The probability of charging in the low-price window depends on the hour
/// of day and the user's propensity, plus an additive treatment effect
/// proportional to propensity. Delivered energy is a normal base draw plus a
/// shift that is larger for low-window sessions.
#[derive(Debug, Clone)]
pub struct OutcomeModel {
    params: OutcomeConfig,
    base_energy: Normal<f64>,
    low_shift: Normal<f64>,
    other_shift: Normal<f64>,
}

fn normal(name: &'static str, mean: f64, std: f64) -> Result<Normal<f64>> {
    if !(std >= 0.0 && std.is_finite()) {
        return Err(Error::invalid_argument(
            name,
            format!("{std} is not a finite value >= 0"),
        ));
    }
    Normal::new(mean, std).map_err(|e| Error::invalid_argument(name, e.to_string()))
}

impl OutcomeModel {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if any energy standard deviation is negative
    /// or non-finite.
    pub fn new(params: OutcomeConfig) -> Result<Self> {
        let base_energy = normal("outcome.energy_std", params.energy_mean, params.energy_std)?;
        let low_shift = normal(
            "outcome.low_shift_std",
            params.low_shift_mean,
            params.low_shift_std,
        )?;
        let other_shift = normal(
            "outcome.other_shift_std",
            params.other_shift_mean,
            params.other_shift_std,
        )?;
        Ok(Self {
            params,
            base_energy,
            low_shift,
            other_shift,
        })
    }

    pub fn params(&self) -> &OutcomeConfig {
        &self.params
    }

    /// Whether `hour` falls inside the low-price window (inclusive on both ends).
    pub fn in_low_window(&self, hour: u32) -> bool {
        (self.params.low_window_start_hour..=self.params.low_window_end_hour).contains(&hour)
    }

    /// Untreated probability of charging in the low-price window.
    pub fn base_low_prob(&self, hour: u32, propensity: f64) -> f64 {
        let p = &self.params;
        if self.in_low_window(hour) {
            p.in_window_base + p.in_window_slope * propensity
        } else {
            p.off_window_base + p.off_window_slope * propensity
        }
    }

    /// Additive uplift of the nudge for a user with this propensity.
    pub fn effect(&self, propensity: f64) -> f64 {
        self.params.effect_slope * propensity
    }

    /// Final shift probability, clipped to [0, 1].
    pub fn shift_probability(&self, hour: u32, propensity: f64, group: Group) -> f64 {
        let mut p = self.base_low_prob(hour, propensity);
        if group == Group::Treatment {
            p += self.effect(propensity);
        }
        p.clamp(0.0, 1.0)
    }

    /// Draws `charged_in_low` and `energy_kwh` for every session.
    pub fn simulate(&self, sessions: Vec<AssignedSession>, seed: u64) -> Vec<Session> {
        let mut rng = RandomSource::new(seed).stream(Stream::Outcome);
        sessions
            .into_iter()
            .map(|s| {
                let p = self.shift_probability(s.session_ts.hour(), s.propensity, s.group);
                let charged_in_low = rng.random::<f64>() < p;

                let base = self.base_energy.sample(&mut rng);
                let shift = if charged_in_low {
                    self.low_shift.sample(&mut rng)
                } else {
                    self.other_shift.sample(&mut rng)
                };
                let energy_kwh = (base + shift).max(self.params.min_energy_kwh);

                Session {
                    user_id: s.user_id,
                    session_ts: s.session_ts,
                    group: s.group,
                    propensity: s.propensity,
                    charged_in_low,
                    energy_kwh,
                }
            })
            .collect()
    }

    /// Sample-level ground-truth effect on `low_share`.
    ///
    /// Mean over `sessions` of `p(treatment) - p(control)` at each session's
    /// hour and propensity, with clipping applied. Returns `NaN` for an empty
    /// slice.
    pub fn true_uplift(&self, sessions: &[Session]) -> f64 {
        if sessions.is_empty() {
            return f64::NAN;
        }
        let total: f64 = sessions
            .iter()
            .map(|s| {
                let hour = s.session_ts.hour();
                self.shift_probability(hour, s.propensity, Group::Treatment)
                    - self.shift_probability(hour, s.propensity, Group::Control)
            })
            .sum();
        total / sessions.len() as f64
    }
}
