//! Flood ("wave") election.
//!
//! Every candidate repeatedly emits numbered waves carrying its id. Devices
//! follow the smallest id they hear and refresh whenever a newer wave of
//! that leader reaches them. A follower that goes too long without a refresh
//! expires its belief and stands as a candidate again, remembering which
//! wave it gave up on so that stale copies still in flight cannot pull it
//! back.
//!
//! How long is "too long" grows with hop distance from the leader and is
//! set by a [`Graduation`].

use std::cmp::Reverse;

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

use crate::algorithm::Election;
use crate::error::{ElectionError, Result};
use crate::snapshot::NeighborSnapshot;

/// Rounds a follower tolerates without a refresh, as a function of distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Graduation {
    /// `factor * dist + offset`
    Linear { factor: u32, offset: u32 },
}

impl Graduation {
    pub const fn linear(factor: u32, offset: u32) -> Self {
        Self::Linear { factor, offset }
    }

    /// Tolerated age at hop distance `dist`.
    pub fn patience(&self, dist: u32) -> u32 {
        match *self {
            Self::Linear { factor, offset } => factor.saturating_mul(dist).saturating_add(offset),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Linear { factor: 0, .. } => Err(ElectionError::ZeroGraduationFactor),
            Self::Linear { .. } => Ok(()),
        }
    }
}

impl Default for Graduation {
    fn default() -> Self {
        Self::linear(1, 1)
    }
}

/// Belief of a wave election.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveKey {
    pub leader: DeviceId,
    /// Hops to the leader along the path the wave took
    pub dist: u32,
    /// Leader's round counter when it emitted the wave
    pub wave: u64,
    /// Rounds since the last refresh
    pub age: u32,
    /// This device's own round counter
    pub clock: u64,
    /// Last belief this device gave up on
    pub expired: Option<(DeviceId, u64)>,
}

impl WaveKey {
    fn candidate(id: DeviceId, clock: u64, expired: Option<(DeviceId, u64)>) -> Self {
        Self {
            leader: id,
            dist: 0,
            wave: clock,
            age: 0,
            clock,
            expired,
        }
    }

    pub fn is_candidate(&self, id: DeviceId) -> bool {
        self.leader == id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Offer {
    leader: DeviceId,
    wave: u64,
    dist: u32,
}

impl Offer {
    fn refreshes(&self, old: &WaveKey) -> bool {
        self.leader < old.leader
            || (self.leader == old.leader
                && (self.wave > old.wave || (self.wave == old.wave && self.dist < old.dist)))
    }

    fn adopt(self, clock: u64, expired: Option<(DeviceId, u64)>) -> WaveKey {
        WaveKey {
            leader: self.leader,
            dist: self.dist,
            wave: self.wave,
            age: 0,
            clock,
            expired,
        }
    }
}

/// Smallest leader, newest wave, then shortest path.
fn best_offer(
    id: DeviceId,
    expired: Option<(DeviceId, u64)>,
    nbrs: &NeighborSnapshot<WaveKey>,
) -> Option<Offer> {
    nbrs.iter()
        .filter(|(n, k)| *n != id && k.leader != id)
        .filter(|(_, k)| !matches!(expired, Some((leader, wave)) if k.leader == leader && k.wave <= wave))
        .map(|(_, k)| Offer {
            leader: k.leader,
            wave: k.wave,
            dist: k.dist.saturating_add(1),
        })
        .min_by_key(|o| (o.leader, Reverse(o.wave), o.dist))
}

/// Epidemic minimum-id election with heartbeat expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WaveElection {
    pub graduation: Graduation,
}

impl WaveElection {
    pub fn new(graduation: Graduation) -> Result<Self> {
        graduation.validate()?;
        Ok(Self { graduation })
    }

    pub fn validate(&self) -> Result<()> {
        self.graduation.validate()
    }
}

impl Election for WaveElection {
    type Key = WaveKey;

    fn initial(&self, id: DeviceId) -> WaveKey {
        WaveKey::candidate(id, 0, None)
    }

    fn step(&self, id: DeviceId, old: &WaveKey, nbrs: &NeighborSnapshot<WaveKey>) -> WaveKey {
        let clock = old.clock.saturating_add(1);
        let mut expired = old.expired;
        let mut best = best_offer(id, expired, nbrs);

        if !old.is_candidate(id) {
            if let Some(offer) = best.filter(|o| o.refreshes(old)) {
                return offer.adopt(clock, expired);
            }
            let age = old.age.saturating_add(1);
            if age <= self.graduation.patience(old.dist) {
                return WaveKey { age, clock, ..*old };
            }
            expired = Some((old.leader, old.wave));
            best = best_offer(id, expired, nbrs);
        }

        match best {
            Some(offer) if offer.leader < id => offer.adopt(clock, expired),
            _ => WaveKey::candidate(id, clock, expired),
        }
    }

    fn leader(key: &WaveKey) -> DeviceId {
        key.leader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{run_sync, sync_round};
    use herald_topology::NeighborGraph;

    fn leaders(keys: &[Option<WaveKey>]) -> Vec<Option<u64>> {
        keys.iter().map(|k| k.map(|k| k.leader.0)).collect()
    }

    #[test]
    fn patience_grows_with_distance() {
        assert_eq!(Graduation::linear(1, 1).patience(0), 1);
        assert_eq!(Graduation::linear(2, 1).patience(3), 7);
        assert_eq!(Graduation::linear(3, 1).patience(3), 10);
        assert_eq!(Graduation::linear(u32::MAX, 1).patience(2), u32::MAX);
    }

    #[test]
    fn zero_factor_is_rejected() {
        assert_eq!(
            WaveElection::new(Graduation::linear(0, 4)),
            Err(ElectionError::ZeroGraduationFactor)
        );
    }

    #[test]
    fn candidate_emits_its_clock() {
        let election = WaveElection::default();
        let id = DeviceId(3);
        let mut key = election.initial(id);
        for round in 1..=3 {
            key = election.step(id, &key, &NeighborSnapshot::new());
            assert_eq!(key.wave, round);
            assert!(key.is_candidate(id));
        }
    }

    #[test]
    fn follower_expires_without_refresh() {
        let election = WaveElection::new(Graduation::linear(1, 1)).unwrap();
        let id = DeviceId(4);
        let mut key = WaveKey {
            leader: DeviceId(0),
            dist: 1,
            wave: 10,
            age: 0,
            clock: 10,
            expired: None,
        };
        // an echo of the same wave does not refresh
        let echo: NeighborSnapshot<WaveKey> =
            [(DeviceId(5), WaveKey { dist: 2, ..key })].into_iter().collect();
        for _ in 0..2 {
            key = election.step(id, &key, &echo);
            assert_eq!(key.leader, DeviceId(0));
        }
        key = election.step(id, &key, &echo);
        assert!(key.is_candidate(id));
        assert_eq!(key.expired, Some((DeviceId(0), 10)));

        // the stale wave cannot pull it back
        key = election.step(id, &key, &echo);
        assert!(key.is_candidate(id));
    }

    #[test]
    fn newer_wave_refreshes() {
        let election = WaveElection::default();
        let id = DeviceId(4);
        let old = WaveKey {
            leader: DeviceId(0),
            dist: 2,
            wave: 7,
            age: 1,
            clock: 9,
            expired: None,
        };
        let nbrs: NeighborSnapshot<WaveKey> =
            [(DeviceId(2), WaveKey { dist: 1, wave: 8, ..old })].into_iter().collect();
        let key = election.step(id, &old, &nbrs);
        assert_eq!((key.wave, key.age, key.dist), (8, 0, 2));
    }

    #[test]
    fn line_converges_within_diameter() {
        let graph = NeighborGraph::line(3);
        let keys = run_sync(&WaveElection::default(), &graph, 2);
        assert_eq!(leaders(&keys), vec![Some(0); 3]);
    }

    #[test]
    fn leader_removal_reconverges() {
        for graduation in [Graduation::linear(1, 1), Graduation::linear(2, 1), Graduation::linear(3, 1)] {
            let election = WaveElection { graduation };
            let graph = NeighborGraph::grid(3, 3);
            let mut keys = run_sync(&election, &graph, 20);
            assert!(keys.iter().flatten().all(|k| k.leader == DeviceId(0)));
            keys[0] = None;
            for _ in 0..60 {
                keys = sync_round(&election, &graph, &keys);
            }
            assert!(keys.iter().flatten().all(|k| k.leader == DeviceId(1)));
        }
    }
}
