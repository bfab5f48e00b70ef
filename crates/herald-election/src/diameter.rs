//! Diameter-bounded election.
//!
//! Every device floods `(leader, distance)` pairs and keeps the smallest
//! leader it can hear within `bound` hops. There is no tree bookkeeping:
//! a vanished leader's value keeps circulating with a growing distance
//! until it passes the bound, then the next smallest candidate takes over.

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

use crate::algorithm::Election;
use crate::error::{ElectionError, Result};
use crate::snapshot::NeighborSnapshot;

/// Belief of a diameter-bounded election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiameterKey {
    pub leader: DeviceId,
    pub dist: u32,
}

impl DiameterKey {
    pub const fn root(id: DeviceId) -> Self {
        Self { leader: id, dist: 0 }
    }
}

/// Flood of the minimum id, timed out by hop distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiameterElection {
    /// Upper bound on the network's hop diameter
    pub bound: u32,
}

impl DiameterElection {
    pub fn new(bound: u32) -> Result<Self> {
        let election = Self { bound };
        election.validate()?;
        Ok(election)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bound == 0 {
            return Err(ElectionError::ZeroDiameterBound);
        }
        Ok(())
    }
}

impl Election for DiameterElection {
    type Key = DiameterKey;

    fn initial(&self, id: DeviceId) -> DiameterKey {
        DiameterKey::root(id)
    }

    fn step(&self, id: DeviceId, _old: &DiameterKey, nbrs: &NeighborSnapshot<DiameterKey>) -> DiameterKey {
        nbrs.iter()
            .filter(|(n, _)| *n != id)
            .filter_map(|(_, k)| {
                let dist = k.dist.checked_add(1)?;
                (dist <= self.bound).then_some(DiameterKey { leader: k.leader, dist })
            })
            .fold(DiameterKey::root(id), std::cmp::min)
    }

    fn leader(key: &DiameterKey) -> DeviceId {
        key.leader
    }
}
