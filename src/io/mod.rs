//! Thin file wrappers around the library core.

/// Session dataset CSV.
pub mod dataset;
pub mod export;
