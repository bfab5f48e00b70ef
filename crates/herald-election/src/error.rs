//! Error types for herald-election.

use thiserror::Error;

/// Result type for election configuration.
pub type Result<T> = std::result::Result<T, ElectionError>;

/// Rejected election parameters. Rounds themselves never fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ElectionError {
    /// A diameter-bounded election needs a bound of at least one hop.
    #[error("diameter bound must be at least 1")]
    ZeroDiameterBound,

    /// A wave graduation must grow with distance.
    #[error("wave graduation factor must be at least 1")]
    ZeroGraduationFactor,
}
