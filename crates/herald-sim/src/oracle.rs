//! Failure injection and the expected election outcome.

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

/// What a device's elected leader is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundTruth {
    /// The smallest id among live devices.
    #[default]
    ExpectedLeader,
    /// `0` before the perturbation and `1` after, compared numerically with
    /// the elected id.
    PerturbationFlag,
}

impl GroundTruth {
    /// Expected indicator given the live population and the oracle state.
    pub fn expected<I>(&self, live: I, perturbed: bool) -> Option<DeviceId>
    where
        I: IntoIterator<Item = DeviceId>,
    {
        match self {
            Self::ExpectedLeader => live.into_iter().min(),
            Self::PerturbationFlag => Some(DeviceId(u64::from(perturbed))),
        }
    }
}

/// Scripted removal of the natural leader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perturbation {
    fail_time: f64,
    victim: Option<DeviceId>,
}

impl Perturbation {
    pub fn new(fail_time: f64) -> Self {
        Self {
            fail_time,
            victim: None,
        }
    }

    pub fn fail_time(&self) -> f64 {
        self.fail_time
    }

    /// Whether `time` is at or past the failure time.
    pub fn is_due(&self, time: f64) -> bool {
        time >= self.fail_time
    }

    pub fn has_fired(&self) -> bool {
        self.victim.is_some()
    }

    /// Device removed by the perturbation, once it has fired.
    pub fn victim(&self) -> Option<DeviceId> {
        self.victim
    }

    /// Fire at `time`, picking the smallest live id. Fires at most once and
    /// never before the failure time.
    pub fn fire<I>(&mut self, time: f64, live: I) -> Option<DeviceId>
    where
        I: IntoIterator<Item = DeviceId>,
    {
        if self.has_fired() || !self.is_due(time) {
            return None;
        }
        self.victim = live.into_iter().min();
        self.victim
    }
}
