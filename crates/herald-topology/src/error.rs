//! Error types for herald-topology.

use thiserror::Error;

use crate::DeviceId;

/// Result type for topology operations.
pub type Result<T> = std::result::Result<T, TopologyError>;

/// Errors raised while building a neighbor graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TopologyError {
    /// An edge references a device outside the graph.
    #[error("edge references unknown device {device} (graph has {size} devices)")]
    UnknownDevice { device: DeviceId, size: usize },

    /// A device cannot be its own neighbor.
    #[error("self-loop on device {0}")]
    SelfLoop(DeviceId),

    /// A position is NaN or infinite.
    #[error("device {0} has a non-finite position")]
    NonFinitePosition(DeviceId),

    /// Radio range must be a positive finite number.
    #[error("invalid radio range {0}")]
    InvalidRange(f64),
}
