//! Neighbor field: the device arena and what each device can hear.
//!
//! Devices live in a dense arena indexed by [`DeviceId`]. Each device keeps
//! its private election state per algorithm and, separately, the last state
//! it published. Neighbors only ever read published states, so a round can
//! never observe another device's half-finished computation.

use herald_election::{ElectionState, NeighborSnapshot, Stabiliser};
use herald_topology::{within_range, DeviceId, NeighborGraph, Point, TopologyError};

use crate::mobility::RectangleWalk;

/// One simulated device.
#[derive(Debug, Clone)]
pub struct Device {
    pub id: DeviceId,
    pub position: Point,
    pub walk: RectangleWalk,
    /// Spawned and not removed
    pub alive: bool,
    /// Private state, one per algorithm
    pub state: Vec<ElectionState>,
    /// What neighbors read, one per algorithm; `None` until spawned
    pub published: Option<Vec<ElectionState>>,
    /// Debounce filters, one per variant (`None` for raw variants)
    pub filters: Vec<Option<Stabiliser<DeviceId>>>,
    /// Last measured output, one per variant
    pub outputs: Vec<Option<DeviceId>>,
    /// Rounds run so far
    pub rounds: u64,
}

impl Device {
    fn new(id: DeviceId, position: Point, walk: RectangleWalk) -> Self {
        Self {
            id,
            position,
            walk,
            alive: false,
            state: Vec::new(),
            published: None,
            filters: Vec::new(),
            outputs: Vec::new(),
            rounds: 0,
        }
    }

    /// Alive and visible to neighbors.
    pub fn is_live(&self) -> bool {
        self.alive && self.published.is_some()
    }

    /// Make the private state visible.
    pub fn publish(&mut self) {
        self.published = Some(self.state.clone());
    }
}

/// The arena plus the radio model.
#[derive(Debug, Clone)]
pub struct Field {
    devices: Vec<Device>,
    range: f64,
}

impl Field {
    /// Arena of not-yet-spawned devices at the given positions.
    pub fn new(placements: Vec<(Point, RectangleWalk)>, range: f64) -> Self {
        let devices = placements
            .into_iter()
            .enumerate()
            .map(|(i, (position, walk))| Device::new(DeviceId(i as u64), position, walk))
            .collect();
        Self { devices, range }
    }

    pub fn range(&self) -> f64 {
        self.range
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, id: DeviceId) -> Option<&Device> {
        self.devices.get(id.index())
    }

    pub fn get_mut(&mut self, id: DeviceId) -> Option<&mut Device> {
        self.devices.get_mut(id.index())
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    /// Live devices in id order.
    pub fn live(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|d| d.is_live())
    }

    pub fn live_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.live().map(|d| d.id)
    }

    pub fn live_count(&self) -> usize {
        self.live().count()
    }

    /// Stop a device: no more rounds, gone from every snapshot, memory freed.
    /// Returns whether it was alive.
    pub fn remove(&mut self, id: DeviceId) -> bool {
        let Some(device) = self.devices.get_mut(id.index()) else {
            return false;
        };
        let was_alive = device.alive;
        device.alive = false;
        device.published = None;
        device.state.clear();
        device.filters.clear();
        device.outputs.clear();
        was_alive
    }

    /// Published states of algorithm `slot` that `id` can hear right now.
    pub fn snapshot(&self, id: DeviceId, slot: usize) -> NeighborSnapshot<ElectionState> {
        let Some(me) = self.get(id) else {
            return NeighborSnapshot::new();
        };
        self.live()
            .filter(|other| other.id != id && within_range(&me.position, &other.position, self.range))
            .filter_map(|other| {
                let state = other.published.as_ref()?.get(slot)?;
                Some((other.id, *state))
            })
            .collect()
    }

    /// Unit-disk graph over the whole arena; non-live devices are isolated.
    pub fn graph(&self) -> Result<NeighborGraph, TopologyError> {
        let positions: Vec<Point> = self.devices.iter().map(|d| d.position).collect();
        let mut graph = NeighborGraph::unit_disk(&positions, self.range)?;
        for device in self.devices.iter().filter(|d| !d.is_live()) {
            graph.isolate(device.id);
        }
        Ok(graph)
    }
}
