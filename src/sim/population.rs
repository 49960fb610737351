use rand_distr::{Beta, Distribution};

use crate::error::{Error, Result};

use super::rng::{RandomSource, Stream};
use super::types::User;

/// Draws users whose propensity follows a Beta prior.
///
/// The default prior is Beta(2, 5): most users rarely shift their charging,
/// with a right tail of highly flexible drivers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopulationModel {
    /// First shape parameter of the propensity prior.
    pub alpha: f64,
    /// Second shape parameter of the propensity prior.
    pub beta: f64,
}

impl Default for PopulationModel {
    fn default() -> Self {
        Self {
            alpha: 2.0,
            beta: 5.0,
        }
    }
}

impl PopulationModel {
    /// Generates `n_users` users with ids `1..=n_users`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `n_users` is zero or the prior shape
    /// parameters are not positive.
    pub fn generate_users(&self, n_users: usize, seed: u64) -> Result<Vec<User>> {
        if n_users == 0 {
            return Err(Error::invalid_argument("n_users", "must be >= 1"));
        }
        let prior = Beta::new(self.alpha, self.beta)
            .map_err(|e| Error::invalid_argument("propensity prior", e.to_string()))?;

        let mut rng = RandomSource::new(seed).stream(Stream::Propensity);
        Ok((1..=n_users as u64)
            .map(|user_id| User {
                user_id,
                propensity: prior.sample(&mut rng),
            })
            .collect())
    }
}
