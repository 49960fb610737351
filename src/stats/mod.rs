//! Group comparison tests and descriptive statistics.
//!
//! Every test consumes a [`TwoSample`]: the metric values of a session
//! dataset partitioned into control and treatment sequences.

pub mod bootstrap;
pub mod describe;
pub mod summary;
pub mod ttest;
pub mod types;
pub mod ztest;

pub use bootstrap::PercentileBootstrap;
pub use summary::{GroupSummary, summarize};
pub use ttest::welch_ttest;
pub use types::{BootstrapResult, TestResult};
pub use ztest::proportion_ztest;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::types::{Group, Session};

/// Session column that a test can be run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Binary low-price charging indicator, as 0.0 / 1.0.
    ChargedInLow,
    EnergyKwh,
    Propensity,
}

impl Metric {
    pub fn name(self) -> &'static str {
        match self {
            Metric::ChargedInLow => "charged_in_low",
            Metric::EnergyKwh => "energy_kwh",
            Metric::Propensity => "propensity",
        }
    }

    pub fn value(self, session: &Session) -> f64 {
        match self {
            Metric::ChargedInLow => f64::from(u8::from(session.charged_in_low)),
            Metric::EnergyKwh => session.energy_kwh,
            Metric::Propensity => session.propensity,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Metric values split by experiment arm.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwoSample {
    pub control: Vec<f64>,
    pub treatment: Vec<f64>,
}

impl TwoSample {
    pub fn new(control: Vec<f64>, treatment: Vec<f64>) -> Self {
        Self { control, treatment }
    }

    /// Partitions `sessions` by group, keeping dataset order within each arm.
    pub fn from_sessions(sessions: &[Session], metric: Metric) -> Self {
        let mut sample = Self::default();
        for s in sessions {
            let v = metric.value(s);
            match s.group {
                Group::Control => sample.control.push(v),
                Group::Treatment => sample.treatment.push(v),
            }
        }
        sample
    }

    pub fn group(&self, group: Group) -> &[f64] {
        match group {
            Group::Control => &self.control,
            Group::Treatment => &self.treatment,
        }
    }

    /// Fails with `InvalidInput` unless both arms hold at least `min` values.
    pub(crate) fn require(&self, min: usize, test: &str) -> Result<()> {
        for group in Group::ALL {
            let n = self.group(group).len();
            if n < min {
                return Err(Error::InvalidInput(format!(
                    "{test} needs at least {min} {group} observation(s), got {n}"
                )));
            }
        }
        Ok(())
    }
}
