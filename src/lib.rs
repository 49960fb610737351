//! Smart-charging A/B experiment simulator and analysis toolkit.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
/// Synthetic experiment generation.
pub mod sim;
pub mod stats;
pub mod telemetry;

pub use error::{Error, Result};
