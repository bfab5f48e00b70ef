//! Discrete-event agenda and round timing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use herald_topology::DeviceId;
use rand::Rng;

use crate::config::Schedule;

/// Shortest round period a jittered clock may draw.
pub const MIN_PERIOD: f64 = 0.05;

impl Schedule {
    /// Length of the next round.
    pub fn period<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Schedule::Synchronous => 1.0,
            Schedule::Jittered { deviation } if deviation > 0.0 => {
                let spread = 3f64.sqrt();
                (1.0 + deviation * rng.gen_range(-spread..spread)).max(MIN_PERIOD)
            }
            Schedule::Jittered { .. } => 1.0,
        }
    }

    /// Time of a device's first round.
    pub fn first_round<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Schedule::Synchronous => 1.0,
            Schedule::Jittered { .. } => rng.gen_range(0.0..1.0),
        }
    }
}

/// Something that happens at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Remove the natural leader
    Perturb,
    /// Every live device runs a round in lockstep
    SyncRound,
    /// One device spawns, then runs its first round
    Spawn(DeviceId),
    /// One device runs a round on its own clock
    Round(DeviceId),
    /// Collect metrics
    Log,
}

impl Task {
    /// Tie-break between tasks due at the same instant.
    fn rank(&self) -> u8 {
        match self {
            Task::Perturb => 0,
            Task::Spawn(_) => 1,
            Task::SyncRound | Task::Round(_) => 2,
            Task::Log => 3,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    time: f64,
    seq: u64,
    task: Task,
}

impl Entry {
    fn cmp_key(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then_with(|| self.task.rank().cmp(&other.task.rank()))
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp_key(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // BinaryHeap is a max-heap; reverse so the earliest entry pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.cmp_key(self)
    }
}

/// Time-ordered queue of pending tasks. Equal times pop in task rank order,
/// then in insertion order.
#[derive(Debug, Default)]
pub struct Agenda {
    heap: BinaryHeap<Entry>,
    seq: u64,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f64, task: Task) {
        self.heap.push(Entry {
            time,
            seq: self.seq,
            task,
        });
        self.seq += 1;
    }

    /// Earliest pending task.
    pub fn pop(&mut self) -> Option<(f64, Task)> {
        self.heap.pop().map(|e| (e.time, e.task))
    }

    pub fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|e| e.time)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
