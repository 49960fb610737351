use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use rand_distr::{Distribution, Poisson};

use crate::error::{Error, Result};

use super::rng::{RandomSource, Stream};
use super::types::{PendingSession, User};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Expands users into timestamped charging sessions.
///
/// Each user gets `max(1, Poisson(sessions_per_user_mean))` sessions, each
/// placed at a uniformly random minute inside the observation window.
/// Sessions are emitted user by user; timestamps are not sorted.
#[derive(Debug, Clone)]
pub struct SessionModel {
    /// Start of the observation window.
    pub epoch: NaiveDateTime,
    /// Length of the observation window in days.
    pub window_days: u32,
}

impl SessionModel {
    pub fn new(epoch: NaiveDateTime, window_days: u32) -> Self {
        Self { epoch, window_days }
    }

    /// End of the observation window, or `None` if it overflows the calendar.
    pub fn window_end(&self) -> Option<NaiveDateTime> {
        Duration::try_days(i64::from(self.window_days))
            .and_then(|d| self.epoch.checked_add_signed(d))
    }

    /// Generates sessions for every user.
    ///
    /// Session counts and timestamps come from separate seed streams.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the mean is not a finite positive number
    /// or the window is empty.
    pub fn generate_sessions(
        &self,
        users: &[User],
        sessions_per_user_mean: f64,
        seed: u64,
    ) -> Result<Vec<PendingSession>> {
        if self.window_days == 0 {
            return Err(Error::invalid_argument("window_days", "must be >= 1"));
        }
        if self.window_end().is_none() {
            return Err(Error::invalid_argument(
                "window_days",
                format!("{} days past {} is out of range", self.window_days, self.epoch),
            ));
        }
        let counts = Poisson::new(sessions_per_user_mean).map_err(|e| {
            Error::invalid_argument("sessions_per_user_mean", e.to_string())
        })?;

        let source = RandomSource::new(seed);
        let mut count_rng = source.stream(Stream::SessionCount);
        let mut ts_rng = source.stream(Stream::SessionTimestamp);
        let window_minutes = i64::from(self.window_days) * MINUTES_PER_DAY;

        let mut sessions = Vec::with_capacity(
            (users.len() as f64 * sessions_per_user_mean.max(1.0)).ceil() as usize,
        );
        for user in users {
            let n_sessions = (counts.sample(&mut count_rng) as usize).max(1);
            for _ in 0..n_sessions {
                let offset = ts_rng.random_range(0..window_minutes);
                sessions.push(PendingSession {
                    user_id: user.user_id,
                    session_ts: self.epoch + Duration::minutes(offset),
                    propensity: user.propensity,
                });
            }
        }
        Ok(sessions)
    }
}
