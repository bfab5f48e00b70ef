//! Hysteresis filter for election outputs.
//!
//! A [`Stabiliser`] only lets a new value through once it has been observed
//! for more than `delay` consecutive rounds. The emitted value is the one the
//! filter held before the current observation, so every switch shows up one
//! round after it was decided.

use serde::{Deserialize, Serialize};

/// Debounce state of one filtered stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stabiliser<T> {
    delay: u32,
    state: Option<Debounce<T>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Debounce<T> {
    stable: T,
    last: T,
    count: u32,
}

impl<T: Clone + PartialEq> Stabiliser<T> {
    /// Create a filter that accepts a change after `delay + 1` equal rounds.
    pub fn new(delay: u32) -> Self {
        Self { delay, state: None }
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Feed this round's raw value and return the stabilised output.
    pub fn observe(&mut self, value: T) -> T {
        let mut state = self.state.take().unwrap_or_else(|| Debounce {
            stable: value.clone(),
            last: value.clone(),
            count: 0,
        });
        let output = state.stable.clone();

        if value == state.last {
            state.count = state.count.saturating_add(1);
        } else {
            state.count = 1;
            state.last = value;
        }
        if state.count > self.delay {
            state.stable = state.last.clone();
        }

        self.state = Some(state);
        output
    }

    /// Value currently held, `None` before the first observation.
    pub fn stable(&self) -> Option<&T> {
        self.state.as_ref().map(|s| &s.stable)
    }

    /// Consecutive rounds the latest raw value has been seen.
    pub fn streak(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.count)
    }
}
