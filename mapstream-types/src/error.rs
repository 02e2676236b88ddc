//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TypesError {
    /// There is no way to convert coordinates between the two systems.
    #[error("no transform available from {from} to {to}")]
    UnsupportedTransform {
        /// Source coordinate system.
        from: String,
        /// Target coordinate system.
        to: String,
    },
    /// A point could not be projected (outside of projection domain or not finite).
    #[error("failed to project point ({0}, {1})")]
    Projection(f64, f64),
    /// A projection definition was rejected.
    #[error("invalid projection definition: {0}")]
    InvalidDefinition(String),
    /// Input is not valid for the requested computation.
    #[error("degenerate input: {0}")]
    Degenerate(String),
}
