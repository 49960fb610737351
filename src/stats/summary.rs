//! Per-group descriptive statistics.

use std::fmt;

use serde::Serialize;

use crate::sim::types::{Group, Session};

use super::describe::Moments;
use super::{Metric, TwoSample};

/// Descriptive KPIs of one experiment arm.
///
/// Derived on demand from a session slice; never stored on its own.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: Group,
    /// Number of sessions in the arm.
    pub sessions: usize,
    /// Share of sessions charged in the low-price window.
    pub low_share: f64,
    pub avg_kwh: f64,
    /// Sample standard deviation of energy (`NaN` for a single session).
    pub std_kwh: f64,
}

/// Count, mean, and standard deviation of `metric` for every group present.
pub fn describe_by_group(sessions: &[Session], metric: Metric) -> Vec<(Group, Moments)> {
    let sample = TwoSample::from_sessions(sessions, metric);
    Group::ALL
        .into_iter()
        .filter(|&g| !sample.group(g).is_empty())
        .map(|g| (g, Moments::of(sample.group(g))))
        .collect()
}

/// Summarizes each group present in `sessions`, control first.
///
/// An empty dataset yields an empty summary; an absent group is omitted.
pub fn summarize(sessions: &[Session]) -> Vec<GroupSummary> {
    let low = describe_by_group(sessions, Metric::ChargedInLow);
    let energy = describe_by_group(sessions, Metric::EnergyKwh);
    low.into_iter()
        .zip(energy)
        .map(|((group, low), (_, energy))| GroupSummary {
            group,
            sessions: low.count,
            low_share: low.mean,
            avg_kwh: energy.mean,
            std_kwh: energy.std,
        })
        .collect()
}

/// Header line matching the [`GroupSummary`] `Display` layout.
pub const SUMMARY_HEADER: &str = "    group  sessions  low_share   avg_kwh   std_kwh";

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>9}  {:>8}  {:>9.4}  {:>8.4}  {:>8.4}",
            self.group.as_str(),
            self.sessions,
            self.low_share,
            self.avg_kwh,
            self.std_kwh
        )
    }
}
