//! Core experiment records: users, sessions, and group labels.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Experiment arm a session was randomized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Control,
    Treatment,
}

impl Group {
    /// Both arms in report order.
    pub const ALL: [Group; 2] = [Group::Control, Group::Treatment];

    pub fn as_str(self) -> &'static str {
        match self {
            Group::Control => "control",
            Group::Treatment => "treatment",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Group {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "control" => Ok(Group::Control),
            "treatment" => Ok(Group::Treatment),
            other => Err(format!(
                "unknown group \"{other}\", expected \"control\" or \"treatment\""
            )),
        }
    }
}

/// A driver with a latent propensity to charge off-peak.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Unique identifier, starting at 1.
    pub user_id: u64,
    /// Latent trait in [0, 1] drawn from the population prior.
    pub propensity: f64,
}

/// Session with a timestamp but no assignment or outcome yet.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSession {
    pub user_id: u64,
    pub session_ts: NaiveDateTime,
    /// Copied from the owning [`User`].
    pub propensity: f64,
}

/// Session that has been randomized but not yet simulated.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignedSession {
    pub user_id: u64,
    pub session_ts: NaiveDateTime,
    pub propensity: f64,
    pub group: Group,
}

impl AssignedSession {
    pub fn new(pending: PendingSession, group: Group) -> Self {
        Self {
            user_id: pending.user_id,
            session_ts: pending.session_ts,
            propensity: pending.propensity,
            group,
        }
    }
}

/// One charging event, the unit of analysis.
///
/// Field order matches the CSV column order of the session dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: u64,
    pub session_ts: NaiveDateTime,
    pub group: Group,
    pub propensity: f64,
    /// Whether charging happened in the low-price window.
    pub charged_in_low: bool,
    /// Energy delivered (kWh). Generated sessions are floored at 0.1; external data may not be.
    pub energy_kwh: f64,
}
