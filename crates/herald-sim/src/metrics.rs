//! Comparative metrics.
//!
//! At every logging tick each live device contributes one [`Record`] per
//! variant. The [`Aggregator`] folds them into one [`TickStats`] per variant:
//!
//! - `leaders`: distinct elected ids (ideally 1 per connected group)
//! - `correct`: devices whose output equals the expected indicator
//! - `spurious`: devices whose output exceeds it
//!
//! A [`RunReport`] holds the series of one run; a [`BatchSummary`] merges
//! the reports of several seeds into sums and means per tick.

use std::collections::{BTreeMap, BTreeSet};

use herald_topology::DeviceId;
use serde::{Deserialize, Serialize};

use crate::events::SimEvent;

/// One device's measured output at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub device: DeviceId,
    pub variant: &'a str,
    pub leader: DeviceId,
    pub expected: DeviceId,
}

impl Record<'_> {
    pub fn is_correct(&self) -> bool {
        self.leader == self.expected
    }

    pub fn is_spurious(&self) -> bool {
        self.leader > self.expected
    }
}

/// Metrics of one variant at one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    pub time: f64,
    /// Devices that contributed a record
    pub live: usize,
    pub leaders: usize,
    pub correct: usize,
    pub spurious: usize,
}

impl TickStats {
    fn empty(time: f64) -> Self {
        Self {
            time,
            live: 0,
            leaders: 0,
            correct: 0,
            spurious: 0,
        }
    }

    /// Share of live devices that are correct; 1 for an empty tick.
    pub fn correct_ratio(&self) -> f64 {
        if self.live == 0 {
            1.0
        } else {
            self.correct as f64 / self.live as f64
        }
    }
}

/// Per-tick tallies, one series per variant.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    series: BTreeMap<String, Vec<TickStats>>,
}

impl Aggregator {
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            series: variants.into_iter().map(|v| (v.into(), Vec::new())).collect(),
        }
    }

    /// Fold one tick's records. Every known variant gets a tick, records of
    /// unknown variants are ignored.
    pub fn tally<'a, I>(&mut self, time: f64, records: I)
    where
        I: IntoIterator<Item = Record<'a>>,
    {
        let mut ticks: BTreeMap<&str, (TickStats, BTreeSet<DeviceId>)> = self
            .series
            .keys()
            .map(|v| (v.as_str(), (TickStats::empty(time), BTreeSet::new())))
            .collect();
        for record in records {
            let Some((stats, leaders)) = ticks.get_mut(record.variant) else {
                continue;
            };
            stats.live += 1;
            stats.correct += usize::from(record.is_correct());
            stats.spurious += usize::from(record.is_spurious());
            leaders.insert(record.leader);
        }

        let ticks: Vec<(String, TickStats)> = ticks
            .into_iter()
            .map(|(variant, (mut stats, leaders))| {
                stats.leaders = leaders.len();
                (variant.to_owned(), stats)
            })
            .collect();
        for (variant, stats) in ticks {
            if let Some(series) = self.series.get_mut(&variant) {
                series.push(stats);
            }
        }
    }

    pub fn series(&self, variant: &str) -> Option<&[TickStats]> {
        self.series.get(variant).map(Vec::as_slice)
    }

    pub fn finish(self, seed: u64) -> RunReport {
        RunReport {
            seed,
            series: self.series,
            victim: None,
            perturbed_at: None,
            events: Vec::new(),
        }
    }
}

/// Everything measured in one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub seed: u64,
    pub series: BTreeMap<String, Vec<TickStats>>,
    /// Device removed by the perturbation
    pub victim: Option<DeviceId>,
    pub perturbed_at: Option<f64>,
    /// Timeline, when recording was enabled
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<SimEvent>,
}

impl RunReport {
    pub fn series(&self, variant: &str) -> Option<&[TickStats]> {
        self.series.get(variant).map(Vec::as_slice)
    }

    pub fn last(&self, variant: &str) -> Option<&TickStats> {
        self.series(variant)?.last()
    }

    /// Ticks of `variant` at or after `time`.
    pub fn since<'a>(&'a self, variant: &str, time: f64) -> impl Iterator<Item = &'a TickStats> + 'a {
        self.series(variant)
            .unwrap_or_default()
            .iter()
            .filter(move |t| t.time >= time)
    }
}

/// Sums and means of one variant at one tick across runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub time: f64,
    pub runs: usize,
    pub live: usize,
    pub leaders: usize,
    pub correct: usize,
    pub spurious: usize,
    pub mean_leaders: f64,
    pub mean_correct: f64,
    pub mean_spurious: f64,
}

impl TickSummary {
    fn new(time: f64) -> Self {
        Self {
            time,
            runs: 0,
            live: 0,
            leaders: 0,
            correct: 0,
            spurious: 0,
            mean_leaders: 0.0,
            mean_correct: 0.0,
            mean_spurious: 0.0,
        }
    }

    fn add(&mut self, tick: &TickStats) {
        self.runs += 1;
        self.live += tick.live;
        self.leaders += tick.leaders;
        self.correct += tick.correct;
        self.spurious += tick.spurious;
        let n = self.runs as f64;
        self.mean_leaders = self.leaders as f64 / n;
        self.mean_correct = self.correct as f64 / n;
        self.mean_spurious = self.spurious as f64 / n;
    }
}

/// Merge of several runs of the same configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub seeds: Vec<u64>,
    pub series: BTreeMap<String, Vec<TickSummary>>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one run. Ticks are matched by position; a longer series extends
    /// the summary.
    pub fn merge(&mut self, report: &RunReport) {
        self.runs += 1;
        self.seeds.push(report.seed);
        for (variant, ticks) in &report.series {
            let summary = self.series.entry(variant.clone()).or_default();
            for (i, tick) in ticks.iter().enumerate() {
                if i == summary.len() {
                    summary.push(TickSummary::new(tick.time));
                }
                summary[i].add(tick);
            }
        }
    }

    pub fn series(&self, variant: &str) -> Option<&[TickSummary]> {
        self.series.get(variant).map(Vec::as_slice)
    }
}

impl<'a> FromIterator<&'a RunReport> for BatchSummary {
    fn from_iter<I: IntoIterator<Item = &'a RunReport>>(iter: I) -> Self {
        let mut summary = Self::new();
        for report in iter {
            summary.merge(report);
        }
        summary
    }
}
