//! One contract for every election strategy.
//!
//! [`Election`] is the per-round contract: an initial key, a step from the
//! previous key and a neighbor snapshot, and the elected leader read off a
//! key. [`Algorithm`] is the closed set of strategies a simulation can run
//! side by side; [`ElectionState`] is the matching closed set of keys.

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

use crate::color::ColorElection;
use crate::diameter::{DiameterElection, DiameterKey};
use crate::error::Result;
use crate::key::CandidateKey;
use crate::snapshot::NeighborSnapshot;
use crate::wave::{Graduation, WaveElection, WaveKey};

/// A self-stabilising election run once per round on every device.
pub trait Election {
    /// Persisted per-device state, also what neighbors read.
    type Key: Clone;

    /// State of a device that has not run a round yet.
    fn initial(&self, id: DeviceId) -> Self::Key;

    /// New state from the previous one and the neighbors' latest outputs.
    fn step(&self, id: DeviceId, old: &Self::Key, nbrs: &NeighborSnapshot<Self::Key>) -> Self::Key;

    /// Elected leader as seen by the holder of `key`.
    fn leader(key: &Self::Key) -> DeviceId;
}

/// Election strategies that can be compared in one simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Algorithm {
    /// Minimum-id flood bounded by a hop diameter
    Diameter { bound: u32 },
    /// Minimum-id flood with heartbeat expiry
    Wave { graduation: Graduation },
    /// Colored spanning-forest election
    Color,
}

impl Algorithm {
    pub const fn diameter(bound: u32) -> Self {
        Self::Diameter { bound }
    }

    pub const fn wave(factor: u32, offset: u32) -> Self {
        Self::Wave {
            graduation: Graduation::linear(factor, offset),
        }
    }

    /// Reject parameters no round could work with.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Diameter { bound } => DiameterElection { bound }.validate(),
            Self::Wave { graduation } => graduation.validate(),
            Self::Color => Ok(()),
        }
    }

    pub fn initial(&self, id: DeviceId) -> ElectionState {
        match *self {
            Self::Diameter { bound } => ElectionState::Diameter(DiameterElection { bound }.initial(id)),
            Self::Wave { graduation } => ElectionState::Wave(WaveElection { graduation }.initial(id)),
            Self::Color => ElectionState::Color(ColorElection.initial(id)),
        }
    }

    /// Run one round. Neighbor states of another strategy are ignored, and a
    /// mismatched `old` restarts the device from its initial state.
    pub fn step(&self, id: DeviceId, old: &ElectionState, nbrs: &NeighborSnapshot<ElectionState>) -> ElectionState {
        match *self {
            Self::Diameter { bound } => {
                let election = DiameterElection { bound };
                let old = match old {
                    ElectionState::Diameter(k) => *k,
                    _ => election.initial(id),
                };
                let nbrs = nbrs.filter_map(|s| match s {
                    ElectionState::Diameter(k) => Some(*k),
                    _ => None,
                });
                ElectionState::Diameter(election.step(id, &old, &nbrs))
            }
            Self::Wave { graduation } => {
                let election = WaveElection { graduation };
                let old = match old {
                    ElectionState::Wave(k) => *k,
                    _ => election.initial(id),
                };
                let nbrs = nbrs.filter_map(|s| match s {
                    ElectionState::Wave(k) => Some(*k),
                    _ => None,
                });
                ElectionState::Wave(election.step(id, &old, &nbrs))
            }
            Self::Color => {
                let old = match old {
                    ElectionState::Color(k) => *k,
                    _ => ColorElection.initial(id),
                };
                let nbrs = nbrs.filter_map(|s| match s {
                    ElectionState::Color(k) => Some(*k),
                    _ => None,
                });
                ElectionState::Color(ColorElection.step(id, &old, &nbrs))
            }
        }
    }

    /// Short name used in variant labels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Diameter { .. } => "diam",
            Self::Wave { .. } => "wave",
            Self::Color => "colr",
        }
    }
}

impl Election for Algorithm {
    type Key = ElectionState;

    fn initial(&self, id: DeviceId) -> ElectionState {
        Algorithm::initial(self, id)
    }

    fn step(&self, id: DeviceId, old: &ElectionState, nbrs: &NeighborSnapshot<ElectionState>) -> ElectionState {
        Algorithm::step(self, id, old, nbrs)
    }

    fn leader(key: &ElectionState) -> DeviceId {
        key.leader()
    }
}

/// State of one device under one of the [`Algorithm`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "key", rename_all = "snake_case")]
pub enum ElectionState {
    Diameter(DiameterKey),
    Wave(WaveKey),
    Color(CandidateKey),
}

impl ElectionState {
    /// Elected leader.
    pub fn leader(&self) -> DeviceId {
        match self {
            Self::Diameter(k) => k.leader,
            Self::Wave(k) => k.leader,
            Self::Color(k) => k.leader,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ElectionError;
    use crate::testing::{run_sync, sync_round};
    use herald_topology::NeighborGraph;

    fn all() -> Vec<Algorithm> {
        vec![
            Algorithm::diameter(8),
            Algorithm::wave(1, 1),
            Algorithm::wave(2, 1),
            Algorithm::wave(3, 1),
            Algorithm::Color,
        ]
    }

    #[test]
    fn validation() {
        assert_eq!(Algorithm::diameter(0).validate(), Err(ElectionError::ZeroDiameterBound));
        assert_eq!(Algorithm::wave(0, 1).validate(), Err(ElectionError::ZeroGraduationFactor));
        for algorithm in all() {
            assert!(algorithm.validate().is_ok());
        }
    }

    #[test]
    fn serde_shape() {
        let json = serde_json::to_string(&Algorithm::wave(2, 1)).unwrap();
        assert_eq!(json, r#"{"type":"wave","graduation":{"kind":"linear","factor":2,"offset":1}}"#);
        let parsed: Algorithm = serde_json::from_str(r#"{"type":"color"}"#).unwrap();
        assert_eq!(parsed, Algorithm::Color);
        let parsed: Algorithm = serde_json::from_str(r#"{"type":"diameter","bound":5}"#).unwrap();
        assert_eq!(parsed, Algorithm::diameter(5));
    }

    #[test]
    fn foreign_states_are_ignored() {
        let id = DeviceId(2);
        let nbrs: NeighborSnapshot<ElectionState> = [(
            DeviceId(0),
            ElectionState::Diameter(DiameterKey::root(DeviceId(0))),
        )]
        .into_iter()
        .collect();
        let old = Algorithm::Color.initial(id);
        let next = Algorithm::Color.step(id, &old, &nbrs);
        assert_eq!(next.leader(), id);

        let restarted = Algorithm::diameter(3).step(id, &old, &nbrs);
        assert_eq!(restarted, ElectionState::Diameter(DiameterKey { leader: DeviceId(0), dist: 1 }));
    }

    #[test]
    fn every_strategy_elects_minimum_on_three_device_line() {
        let graph = NeighborGraph::line(3);
        let diameter = graph.hop_diameter().unwrap();
        for algorithm in all() {
            let keys = run_sync(&algorithm, &graph, 2 * diameter);
            for key in keys.iter().flatten() {
                assert_eq!(key.leader(), DeviceId(0), "{}", algorithm.label());
            }
        }
    }

    #[test]
    fn every_strategy_reconverges_after_leader_removal() {
        let graph = NeighborGraph::grid(4, 3);
        for algorithm in all() {
            let mut keys = run_sync(&algorithm, &graph, 40);
            keys[0] = None;
            for _ in 0..150 {
                keys = sync_round(&algorithm, &graph, &keys);
            }
            for key in keys.iter().flatten() {
                assert_eq!(key.leader(), DeviceId(1), "{}", algorithm.label());
            }
        }
    }
}
