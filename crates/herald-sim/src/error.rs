//! Error types for herald-sim.
//!
//! Everything here is raised while loading or validating a configuration.
//! Once a [`Simulation`](crate::Simulation) exists, running it cannot fail.

use herald_election::ElectionError;
use herald_topology::{DeviceId, TopologyError};
use thiserror::Error;

/// Result type for simulator operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level simulator error.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// A configuration that cannot be loaded or would not make sense to run.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse JSON content.
    #[error("failed to parse config JSON: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// A length or duration that must be a positive finite number.
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("speed must be finite and non-negative, got {0}")]
    InvalidSpeed(f64),

    #[error("at least one device is required")]
    NoDevices,

    #[error("explicit layout has {found} positions for {expected} devices")]
    LayoutMismatch { expected: usize, found: usize },

    #[error("device {0} has a non-finite position")]
    NonFinitePosition(DeviceId),

    #[error("jitter deviation must lie in [0, 1), got {0}")]
    InvalidDeviation(f64),

    #[error("fail time must be finite and non-negative, got {0}")]
    InvalidFailTime(f64),

    #[error("algorithm and variant names must not be empty")]
    EmptyName,

    #[error("algorithm {0:?} is defined twice")]
    DuplicateAlgorithm(String),

    #[error("variant {0:?} is defined twice")]
    DuplicateVariant(String),

    #[error("variant {variant:?} refers to unknown algorithm {algorithm:?}")]
    UnknownAlgorithm { variant: String, algorithm: String },

    #[error("at least one variant must be measured")]
    NoVariants,

    #[error("algorithm {name:?}: {source}")]
    Algorithm {
        name: String,
        source: ElectionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Simulation, SimulationConfig};
    use herald_election::Algorithm;

    #[test]
    fn bad_algorithm_surfaces_as_config_error() {
        let mut config = SimulationConfig::default();
        config.algorithms[0].algorithm = Algorithm::diameter(0);
        let err = Simulation::new(config).err().unwrap();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Algorithm { source: ElectionError::ZeroDiameterBound, .. })
        ));
    }

    #[test]
    fn missing_file_surfaces_as_config_error() {
        let err = SimulationConfig::from_file(std::path::Path::new("/nonexistent/herald.json"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(matches!(Error::from(err), Error::Config(_)));
    }
}
