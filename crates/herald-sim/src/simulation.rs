//! Discrete-event simulation of a population running several elections.
//!
//! Every device runs all configured algorithms side by side in each of its
//! rounds and publishes one state per algorithm. Measured variants read the
//! elected leader of one algorithm, optionally through a [`Stabiliser`].
//!
//! # Timeline
//!
//! 1. Devices spawn (all at time 0 when synchronous, at a random offset in
//!    `[0, 1)` otherwise) and publish their initial state.
//! 2. Rounds run on the configured [`Schedule`]; mobility is applied
//!    continuously between events.
//! 3. At the failure time the smallest live id is removed.
//! 4. Metrics are collected every `log_interval` up to `end_time`.

use herald_election::{Algorithm, ElectionState, Stabiliser};
use herald_topology::{DeviceId, NeighborGraph, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, trace};

use crate::config::{Layout, Schedule, SimulationConfig};
use crate::error::Result;
use crate::events::SimEvent;
use crate::metrics::{Aggregator, Record, RunReport};
use crate::mobility::{random_point, RectangleWalk};
use crate::oracle::{GroundTruth, Perturbation};
use crate::schedule::{Agenda, Task};
use crate::substrate::Field;

/// Slack when comparing accumulated tick times against the end time.
const TIME_EPSILON: f64 = 1e-9;

/// A measured output stream, resolved against the algorithm list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    /// Index into the algorithm list
    pub slot: usize,
    pub delay: Option<u32>,
}

/// One run of one configuration.
pub struct Simulation {
    config: SimulationConfig,
    algorithms: Vec<Algorithm>,
    variants: Vec<Variant>,
    field: Field,
    rng: StdRng,
    agenda: Agenda,
    time: f64,
    moved_at: f64,
    perturbation: Option<Perturbation>,
    aggregator: Aggregator,
    events: Vec<SimEvent>,
    next_tick: u64,
}

impl Simulation {
    /// Validate `config`, place devices and schedule the run.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;

        let mut rng = StdRng::seed_from_u64(config.seed);
        let (low, high) = config.bounds();
        let positions: Vec<Point> = match &config.layout {
            Layout::Random => (0..config.device_count)
                .map(|_| random_point(&mut rng, &low, &high))
                .collect(),
            Layout::Explicit { positions } => positions.clone(),
        };
        let placements = positions
            .iter()
            .map(|p| (*p, RectangleWalk::new(&mut rng, low, high, config.speed)))
            .collect();
        let field = Field::new(placements, config.range);

        let initial = NeighborGraph::unit_disk(&positions, config.range)?;
        debug!(
            devices = initial.len(),
            links = initial.edge_count(),
            components = initial.components().len(),
            diameter = ?initial.hop_diameter(),
            "initial topology"
        );

        let algorithms: Vec<Algorithm> = config.algorithms.iter().map(|a| a.algorithm).collect();
        let variants = config
            .variants
            .iter()
            .filter_map(|v| {
                let slot = config.algorithms.iter().position(|a| a.name == v.algorithm)?;
                Some(Variant {
                    name: v.name.clone(),
                    slot,
                    delay: v.delay,
                })
            })
            .collect::<Vec<_>>();
        let aggregator = Aggregator::new(variants.iter().map(|v| v.name.clone()));

        let mut agenda = Agenda::new();
        for i in 0..config.device_count {
            let id = DeviceId(i as u64);
            let at = match config.schedule {
                Schedule::Synchronous => 0.0,
                Schedule::Jittered { .. } => config.schedule.first_round(&mut rng),
            };
            agenda.push(at, Task::Spawn(id));
        }
        if config.schedule.is_synchronous() {
            agenda.push(config.schedule.first_round(&mut rng), Task::SyncRound);
        }
        let perturbation = config.fail_time.map(Perturbation::new);
        if let Some(fail_time) = config.fail_time {
            agenda.push(fail_time, Task::Perturb);
        }
        agenda.push(0.0, Task::Log);

        Ok(Self {
            config,
            algorithms,
            variants,
            field,
            rng,
            agenda,
            time: 0.0,
            moved_at: 0.0,
            perturbation,
            aggregator,
            events: Vec::new(),
            next_tick: 1,
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Current simulated time.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Recorded timeline (empty unless `record_events` is set).
    pub fn events(&self) -> &[SimEvent] {
        &self.events
    }

    /// Current unit-disk graph over live devices.
    pub fn graph(&self) -> Result<NeighborGraph> {
        Ok(self.field.graph()?)
    }

    /// Measured output of `device` for the named variant.
    pub fn output(&self, device: DeviceId, variant: &str) -> Option<DeviceId> {
        let v = self.variants.iter().position(|v| v.name == variant)?;
        self.field.get(device)?.outputs.get(v).copied().flatten()
    }

    /// Private state of `device` under the algorithm at `slot`.
    pub fn state(&self, device: DeviceId, slot: usize) -> Option<&ElectionState> {
        self.field.get(device)?.state.get(slot)
    }

    /// Process every task due at or before `until`.
    pub fn run_until(&mut self, until: f64) {
        while let Some(at) = self.agenda.peek_time() {
            if at > until {
                break;
            }
            let Some((at, task)) = self.agenda.pop() else {
                break;
            };
            self.advance_to(at);
            self.handle(task);
        }
    }

    /// Run to the end time and hand back the metrics.
    pub fn run(mut self) -> RunReport {
        info!(
            seed = self.config.seed,
            devices = self.config.device_count,
            variants = self.variants.len(),
            end_time = self.config.end_time,
            "simulation started"
        );
        self.run_until(self.config.end_time + TIME_EPSILON);
        let report = self.into_report();
        info!(seed = report.seed, victim = ?report.victim, "simulation finished");
        report
    }

    /// Metrics collected so far.
    pub fn into_report(self) -> RunReport {
        let mut report = self.aggregator.finish(self.config.seed);
        if let Some(p) = self.perturbation.filter(Perturbation::has_fired) {
            report.victim = p.victim();
            report.perturbed_at = Some(p.fail_time());
        }
        report.events = self.events;
        report
    }

    fn advance_to(&mut self, time: f64) {
        let dt = time - self.moved_at;
        if dt > 0.0 && self.config.speed > 0.0 {
            let rng = &mut self.rng;
            for device in self.field.devices_mut().iter_mut().filter(|d| d.alive) {
                device.position = device.walk.advance(rng, device.position, dt);
            }
        }
        self.moved_at = self.moved_at.max(time);
        self.time = time;
    }

    fn handle(&mut self, task: Task) {
        match task {
            Task::Perturb => self.perturb(),
            Task::Spawn(id) => {
                self.spawn(id);
                if !self.config.schedule.is_synchronous() {
                    self.device_round(id);
                }
            }
            Task::SyncRound => self.sync_round(),
            Task::Round(id) => self.device_round(id),
            Task::Log => self.log_tick(),
        }
    }

    fn record(&mut self, event: SimEvent) {
        if self.config.record_events {
            self.events.push(event);
        }
    }

    fn spawn(&mut self, id: DeviceId) {
        let Some(device) = self.field.get_mut(id) else {
            return;
        };
        device.alive = true;
        device.state = self.algorithms.iter().map(|a| a.initial(id)).collect();
        device.filters = self
            .variants
            .iter()
            .map(|v| v.delay.map(Stabiliser::new))
            .collect();
        device.outputs = self
            .variants
            .iter()
            .map(|v| device.state.get(v.slot).map(ElectionState::leader))
            .collect();
        device.publish();
        let position = device.position;
        self.record(SimEvent::DeviceSpawned {
            device: id,
            position,
            time: self.time,
        });
    }

    fn perturb(&mut self) {
        let time = self.time;
        let Some(perturbation) = self.perturbation.as_mut() else {
            return;
        };
        let Some(victim) = perturbation.fire(time, self.field.live_ids()) else {
            return;
        };
        info!(%victim, time, "perturbation triggered");
        self.record(SimEvent::PerturbationTriggered { victim, time });
        self.remove(victim);
    }

    /// Remove a device; it silently drops out of every snapshot.
    pub fn remove(&mut self, id: DeviceId) {
        if self.field.remove(id) {
            debug!(device = %id, time = self.time, "device removed");
            self.record(SimEvent::DeviceRemoved {
                device: id,
                time: self.time,
            });
        }
    }

    /// New states of `id` from what it hears right now.
    fn compute(&self, id: DeviceId) -> Option<Vec<ElectionState>> {
        let device = self.field.get(id).filter(|d| d.is_live())?;
        let next = self
            .algorithms
            .iter()
            .enumerate()
            .map(|(slot, algorithm)| {
                let old = device.state[slot];
                let nbrs = self.field.snapshot(id, slot);
                let new = algorithm.step(id, &old, &nbrs);
                if let (ElectionState::Color(before), ElectionState::Color(after)) = (old, new) {
                    if before.leader != id && after.leader == id {
                        trace!(device = %id, lost = %before.leader, "lineage reset");
                    }
                }
                new
            })
            .collect();
        Some(next)
    }

    /// Store, publish and measure the states computed for `id`.
    fn apply(&mut self, id: DeviceId, states: Vec<ElectionState>) {
        let time = self.time;
        let Some(device) = self.field.get_mut(id) else {
            return;
        };
        device.state = states;
        device.publish();
        device.rounds += 1;

        let mut changes = Vec::new();
        for (v, variant) in self.variants.iter().enumerate() {
            let Some(raw) = device.state.get(variant.slot).map(ElectionState::leader) else {
                continue;
            };
            let out = match device.filters.get_mut(v) {
                Some(Some(filter)) => filter.observe(raw),
                _ => raw,
            };
            let Some(slot) = device.outputs.get_mut(v) else {
                continue;
            };
            if let Some(from) = slot.filter(|from| *from != out) {
                changes.push(SimEvent::LeaderChanged {
                    device: id,
                    variant: variant.name.clone(),
                    from,
                    to: out,
                    time,
                });
            }
            *slot = Some(out);
        }
        for change in changes {
            self.record(change);
        }
    }

    fn sync_round(&mut self) {
        let ids: Vec<DeviceId> = self.field.live_ids().collect();
        let computed: Vec<(DeviceId, Vec<ElectionState>)> = ids
            .into_iter()
            .filter_map(|id| self.compute(id).map(|s| (id, s)))
            .collect();
        for (id, states) in computed {
            self.apply(id, states);
        }
        let next = self.time + 1.0;
        self.agenda.push(next, Task::SyncRound);
    }

    fn device_round(&mut self, id: DeviceId) {
        let Some(states) = self.compute(id) else {
            return;
        };
        self.apply(id, states);
        let next = self.time + self.config.schedule.period(&mut self.rng);
        self.agenda.push(next, Task::Round(id));
    }

    fn log_tick(&mut self) {
        let time = self.time;
        let perturbed = self.perturbation.is_some_and(|p| p.has_fired());
        let truth: GroundTruth = self.config.ground_truth;

        if let Some(expected) = truth.expected(self.field.live_ids(), perturbed) {
            let records: Vec<Record<'_>> = self
                .field
                .live()
                .flat_map(|device| {
                    self.variants.iter().enumerate().filter_map(move |(v, variant)| {
                        Some(Record {
                            device: device.id,
                            variant: variant.name.as_str(),
                            leader: (*device.outputs.get(v)?)?,
                            expected,
                        })
                    })
                })
                .collect();
            self.aggregator.tally(time, records);
        } else {
            self.aggregator.tally(time, std::iter::empty());
        }
        debug!(time, live = self.field.live_count(), "metrics tick");

        let next = self.next_tick as f64 * self.config.log_interval;
        self.next_tick += 1;
        if next <= self.config.end_time + TIME_EPSILON {
            self.agenda.push(next, Task::Log);
        }
    }
}
