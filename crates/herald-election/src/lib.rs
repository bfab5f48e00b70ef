//! Self-Stabilising Leader Election
//!
//! Every device runs one small computation per round: it reads the latest
//! outputs of the neighbors it can currently hear, combines them with its own
//! previous output, and publishes a new one. No device ever sees more than
//! one hop, and no round can fail. After any change of topology (devices
//! moving, devices disappearing) the population settles again on one leader
//! per connected group: the device with the smallest id.
//!
//! # Strategies
//!
//! - [`ColorElection`]: builds a spanning forest of parent pointers toward
//!   the leader, repairs it locally when a lineage breaks, and detects
//!   convergence bottom-up through `done` flags and color parity.
//! - [`WaveElection`]: floods numbered heartbeats of the minimum id and
//!   expires beliefs that stop being refreshed.
//! - [`DiameterElection`]: floods the minimum id with a hop counter and drops
//!   values that travelled further than a diameter bound.
//!
//! [`Algorithm`] selects among them at runtime; all share the [`Election`]
//! contract and expose the elected leader as a [`DeviceId`].
//!
//! # Hysteresis
//!
//! A [`Stabiliser`] debounces any per-round output, trading reaction time
//! for fewer spurious leader changes.

mod algorithm;
mod color;
mod diameter;
mod error;
mod fold;
mod hysteresis;
mod key;
mod snapshot;
mod wave;

#[cfg(test)]
mod testing;

pub use algorithm::{Algorithm, Election, ElectionState};
pub use color::{classify, ColorElection, Role, Round, Transition};
pub use diameter::{DiameterElection, DiameterKey};
pub use error::{ElectionError, Result};
pub use fold::{
    all_children_done, best_offer, has_child, has_false_child, has_recruit, has_similar_child,
    BestOffer, Folds,
};
pub use herald_topology::DeviceId;
pub use hysteresis::Stabiliser;
pub use key::CandidateKey;
pub use snapshot::NeighborSnapshot;
pub use wave::{Graduation, WaveElection, WaveKey};
