use rand::distr::{Bernoulli, Distribution};

use crate::error::{Error, Result};

use super::rng::{RandomSource, Stream};
use super::types::{AssignedSession, Group, PendingSession};

/// Randomizes sessions into control or treatment.
///
/// The randomization unit is the session, not the user: each session gets an
/// independent Bernoulli(`p_treatment`) draw, so one user routinely appears
/// in both arms.
#[derive(Debug, Clone)]
pub struct GroupAssigner {
    p_treatment: f64,
    draw: Bernoulli,
}

impl GroupAssigner {
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `p_treatment` is outside [0, 1].
    pub fn new(p_treatment: f64) -> Result<Self> {
        let draw = Bernoulli::new(p_treatment).map_err(|_| {
            Error::invalid_argument("p_treatment", format!("{p_treatment} is outside [0, 1]"))
        })?;
        Ok(Self { p_treatment, draw })
    }

    pub fn p_treatment(&self) -> f64 {
        self.p_treatment
    }

    /// Assigns every session, preserving order.
    pub fn assign(&self, sessions: Vec<PendingSession>, seed: u64) -> Vec<AssignedSession> {
        let mut rng = RandomSource::new(seed).stream(Stream::Assignment);
        sessions
            .into_iter()
            .map(|s| {
                let group = if self.draw.sample(&mut rng) {
                    Group::Treatment
                } else {
                    Group::Control
                };
                AssignedSession::new(s, group)
            })
            .collect()
    }
}
