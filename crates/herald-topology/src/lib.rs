//! Herald Topology
//!
//! Device identities, planar geometry and neighbor graphs for simulated
//! populations of mobile devices.
//!
//! # Model
//!
//! Devices are numbered densely from zero. A [`DeviceId`] is totally ordered
//! and doubles as the default election value. Devices sit at a [`Point`] in a
//! rectangular arena and hear each other when they are within radio range of one
//! another (the unit-disk model). A [`NeighborGraph`] materialises that
//! relation and answers the structural questions the election benchmarks
//! need: hop diameter, connectivity and components.

mod error;
mod id;
mod neighbors;
mod point;

pub use error::{Result, TopologyError};
pub use id::DeviceId;
pub use neighbors::{within_range, NeighborGraph};
pub use point::Point;

/// Default radio range, in arena units.
pub const DEFAULT_RANGE: f64 = 1.0;
