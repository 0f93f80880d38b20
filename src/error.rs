/*
 * Error Module
 *
 * Errors raised while constructing a simulation. Everything that runs per
 * frame is total over validated state, so configuration is the only failure.
 */

use thiserror::Error;

/// Errors emitted when building a grid or a simulation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimError {
    /// A configuration value that cannot be used (e.g. non-positive cell width).
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
