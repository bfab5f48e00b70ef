//! Neighbor graphs over a dense device arena.
//!
//! Devices are numbered `0..len`. Two devices are neighbors when their radio
//! ranges overlap (unit-disk model) or when an explicit edge says so. The
//! relation is symmetric and irreflexive.
//!
//! Adjacency is kept in ordered sets so that every traversal visits devices
//! in ascending id order, which keeps simulations reproducible.

use std::collections::{BTreeSet, VecDeque};

use crate::error::{Result, TopologyError};
use crate::{DeviceId, Point};

/// Check whether two positions are within radio range (inclusive).
pub fn within_range(a: &Point, b: &Point, range: f64) -> bool {
    a.distance(b) <= range
}

/// Symmetric neighbor relation over devices `0..len`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NeighborGraph {
    adjacency: Vec<BTreeSet<DeviceId>>,
}

impl NeighborGraph {
    /// A graph of `len` isolated devices.
    pub fn new(len: usize) -> Self {
        Self {
            adjacency: vec![BTreeSet::new(); len],
        }
    }

    /// Build a graph from an explicit undirected edge list.
    pub fn from_edges(len: usize, edges: &[(u64, u64)]) -> Result<Self> {
        let mut graph = Self::new(len);
        for &(a, b) in edges {
            graph.connect(DeviceId(a), DeviceId(b))?;
        }
        Ok(graph)
    }

    /// Unit-disk graph: devices are linked when within `range` of each other.
    pub fn unit_disk(positions: &[Point], range: f64) -> Result<Self> {
        if !(range.is_finite() && range > 0.0) {
            return Err(TopologyError::InvalidRange(range));
        }
        if let Some(i) = positions.iter().position(|p| !p.is_finite()) {
            return Err(TopologyError::NonFinitePosition(DeviceId(i as u64)));
        }

        let mut graph = Self::new(positions.len());
        for (i, a) in positions.iter().enumerate() {
            for (j, b) in positions.iter().enumerate().skip(i + 1) {
                if within_range(a, b, range) {
                    graph.adjacency[i].insert(DeviceId(j as u64));
                    graph.adjacency[j].insert(DeviceId(i as u64));
                }
            }
        }
        Ok(graph)
    }

    /// A path `0 - 1 - ... - (len-1)`.
    pub fn line(len: usize) -> Self {
        let mut graph = Self::new(len);
        for i in 1..len {
            graph.link(i - 1, i);
        }
        graph
    }

    /// A cycle over `len` devices (a line when `len < 3`).
    pub fn ring(len: usize) -> Self {
        let mut graph = Self::line(len);
        if len >= 3 {
            graph.link(len - 1, 0);
        }
        graph
    }

    /// A `width x height` lattice, row-major ids, 4-neighborhood.
    pub fn grid(width: usize, height: usize) -> Self {
        let mut graph = Self::new(width * height);
        for row in 0..height {
            for col in 0..width {
                let id = row * width + col;
                if col + 1 < width {
                    graph.link(id, id + 1);
                }
                if row + 1 < height {
                    graph.link(id, id + width);
                }
            }
        }
        graph
    }

    fn link(&mut self, a: usize, b: usize) {
        self.adjacency[a].insert(DeviceId(b as u64));
        self.adjacency[b].insert(DeviceId(a as u64));
    }

    /// Add an undirected edge.
    pub fn connect(&mut self, a: DeviceId, b: DeviceId) -> Result<()> {
        let size = self.len();
        for d in [a, b] {
            if d.index() >= size {
                return Err(TopologyError::UnknownDevice { device: d, size });
            }
        }
        if a == b {
            return Err(TopologyError::SelfLoop(a));
        }
        self.link(a.index(), b.index());
        Ok(())
    }

    /// Drop every edge touching `device`; the device stays in the arena, isolated.
    pub fn isolate(&mut self, device: DeviceId) {
        let Some(nbrs) = self.adjacency.get_mut(device.index()) else {
            return;
        };
        let nbrs = std::mem::take(nbrs);
        for n in nbrs {
            self.adjacency[n.index()].remove(&device);
        }
    }

    /// Number of devices.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no devices.
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Neighbors of `device` in ascending id order.
    pub fn neighbors(&self, device: DeviceId) -> impl Iterator<Item = DeviceId> + '_ {
        self.adjacency
            .get(device.index())
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Number of neighbors of `device`.
    pub fn degree(&self, device: DeviceId) -> usize {
        self.adjacency.get(device.index()).map_or(0, BTreeSet::len)
    }

    /// Check if two devices are linked.
    pub fn are_neighbors(&self, a: DeviceId, b: DeviceId) -> bool {
        self.adjacency
            .get(a.index())
            .is_some_and(|set| set.contains(&b))
    }

    /// Hop distance from `from` to every device (`None` when unreachable).
    pub fn hop_distances(&self, from: DeviceId) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.len()];
        if from.index() >= self.len() {
            return dist;
        }
        dist[from.index()] = Some(0);
        let mut queue = VecDeque::from([from]);
        while let Some(u) = queue.pop_front() {
            let next = dist[u.index()].map_or(0, |d| d + 1);
            for v in self.neighbors(u) {
                if dist[v.index()].is_none() {
                    dist[v.index()] = Some(next);
                    queue.push_back(v);
                }
            }
        }
        dist
    }

    /// Longest shortest path in hops, or `None` if the graph is disconnected.
    pub fn hop_diameter(&self) -> Option<usize> {
        let mut diameter = 0;
        for i in 0..self.len() {
            for d in self.hop_distances(DeviceId(i as u64)) {
                diameter = diameter.max(d?);
            }
        }
        Some(diameter)
    }

    /// Whether every device can reach every other device.
    pub fn is_connected(&self) -> bool {
        self.components().len() <= 1
    }

    /// Connected components, each sorted, ordered by their smallest id.
    pub fn components(&self) -> Vec<Vec<DeviceId>> {
        let mut seen = vec![false; self.len()];
        let mut components = Vec::new();
        for start in 0..self.len() {
            if seen[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([DeviceId(start as u64)]);
            seen[start] = true;
            while let Some(u) = queue.pop_front() {
                component.push(u);
                for v in self.neighbors(u) {
                    if !seen[v.index()] {
                        seen[v.index()] = true;
                        queue.push_back(v);
                    }
                }
            }
            component.sort();
            components.push(component);
        }
        components
    }
}
