//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use smart_charge_ab::config::ExperimentConfig;
use smart_charge_ab::sim::types::{Group, Session};

/// Baseline experiment shrunk to `n_users` users.
pub fn small_config(n_users: usize) -> ExperimentConfig {
    let mut cfg = ExperimentConfig::baseline();
    cfg.generator.n_users = n_users;
    cfg
}

/// 2024-06-01 at the given hour.
pub fn at_hour(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// A session with fixed user, timestamp, and propensity.
pub fn session(group: Group, charged_in_low: bool, energy_kwh: f64) -> Session {
    Session {
        user_id: 1,
        session_ts: at_hour(3),
        group,
        propensity: 0.3,
        charged_in_low,
        energy_kwh,
    }
}

/// Sessions carrying `values` as energy for the given arm.
pub fn energy_sessions(group: Group, values: &[f64]) -> Vec<Session> {
    values.iter().map(|&v| session(group, false, v)).collect()
}

/// `n` sessions of which the first `hits` charged in the low window.
pub fn binary_sessions(group: Group, n: usize, hits: usize) -> Vec<Session> {
    (0..n).map(|i| session(group, i < hits, 7.0)).collect()
}
