//! Candidate keys carried by the colored election.
//!
//! A key is a device's current belief: who leads, how many hops away the
//! leader is, and which neighbor is the next hop toward it. Keys are compared
//! by `(leader, level)` only; color and done are bookkeeping that never
//! influence which key is better.

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

/// A device's belief about the election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateKey {
    /// Parity bit used to detect that a quiescent tree has seen the best value
    pub color: bool,
    /// Value of the believed leader (lower wins)
    pub leader: DeviceId,
    /// Hop count to the believed leader
    pub level: u32,
    /// Next hop toward the leader (self for roots)
    pub parent: DeviceId,
    /// Whether the subtree below this device has converged
    pub done: bool,
}

impl CandidateKey {
    /// The key a device holds when it is a candidate root of its own.
    pub const fn root(id: DeviceId) -> Self {
        Self {
            color: false,
            leader: id,
            level: 0,
            parent: id,
            done: false,
        }
    }

    /// Ordering projection: lower is better.
    pub const fn rank(&self) -> (DeviceId, u32) {
        (self.leader, self.level)
    }

    /// Strictly better than `other`.
    pub fn better(&self, other: &Self) -> bool {
        self.rank() < other.rank()
    }

    /// Same leader and level as `other`.
    pub fn same_rank(&self, other: &Self) -> bool {
        self.rank() == other.rank()
    }

    /// The key a device would adopt by linking under `owner`, whose key this is.
    pub const fn offer(&self, owner: DeviceId) -> Self {
        Self {
            color: false,
            leader: self.leader,
            level: self.level.saturating_add(1),
            parent: owner,
            done: false,
        }
    }

    /// Whether this key is a one-hop extension of `ancestor`'s lineage.
    pub fn is_successor_of(&self, ancestor: &Self) -> bool {
        self.leader == ancestor.leader && self.level == ancestor.level.saturating_add(1)
    }

    /// Whether this key declares `device` as its parent.
    pub fn is_child_of(&self, device: DeviceId) -> bool {
        self.parent == device
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(leader: u64, level: u32, parent: u64) -> CandidateKey {
        CandidateKey {
            color: false,
            leader: DeviceId(leader),
            level,
            parent: DeviceId(parent),
            done: false,
        }
    }

    #[test]
    fn root_key_points_at_itself() {
        let k = CandidateKey::root(DeviceId(4));
        assert_eq!(k.leader, DeviceId(4));
        assert_eq!(k.parent, DeviceId(4));
        assert_eq!(k.level, 0);
        assert!(!k.color && !k.done);
    }

    #[test]
    fn leader_dominates_level() {
        assert!(key(0, 9, 1).better(&key(1, 0, 1)));
        assert!(key(2, 1, 1).better(&key(2, 3, 1)));
        assert!(!key(2, 1, 1).better(&key(2, 1, 7)));
    }

    #[test]
    fn color_and_done_do_not_rank() {
        let a = key(1, 2, 3);
        let b = CandidateKey { color: true, done: true, ..a };
        assert!(a.same_rank(&b));
        assert!(!a.better(&b) && !b.better(&a));
    }

    #[test]
    fn offer_extends_lineage() {
        let parent = key(0, 2, 5);
        let offered = parent.offer(DeviceId(6));
        assert_eq!(offered.parent, DeviceId(6));
        assert!(offered.is_successor_of(&parent));
        assert!(offered.is_child_of(DeviceId(6)));
        assert!(!parent.is_successor_of(&offered));
    }
}
