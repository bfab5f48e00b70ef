//! Read-only view of neighbor outputs for one round.

use std::collections::BTreeMap;

use herald_topology::DeviceId;

/// What a device hears in one round: each reachable neighbor's most recent
/// published output.
///
/// The view may be empty (isolated device) and may be stale by one or more
/// rounds. Iteration is in ascending neighbor id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborSnapshot<K> {
    entries: BTreeMap<DeviceId, K>,
}

impl<K> Default for NeighborSnapshot<K> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<K> NeighborSnapshot<K> {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as the latest output of `neighbor`.
    pub fn insert(&mut self, neighbor: DeviceId, key: K) {
        self.entries.insert(neighbor, key);
    }

    /// Latest output of `neighbor`, if it is reachable.
    pub fn get(&self, neighbor: DeviceId) -> Option<&K> {
        self.entries.get(&neighbor)
    }

    /// Whether `neighbor` is reachable.
    pub fn contains(&self, neighbor: DeviceId) -> bool {
        self.entries.contains_key(&neighbor)
    }

    /// Neighbor outputs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (DeviceId, &K)> {
        self.entries.iter().map(|(id, k)| (*id, k))
    }

    /// Reachable neighbor ids.
    pub fn ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        self.entries.keys().copied()
    }

    /// Number of reachable neighbors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the device is isolated this round.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project every entry, dropping those the projection rejects.
    pub fn filter_map<T, F>(&self, mut f: F) -> NeighborSnapshot<T>
    where
        F: FnMut(&K) -> Option<T>,
    {
        NeighborSnapshot {
            entries: self
                .entries
                .iter()
                .filter_map(|(id, k)| f(k).map(|t| (*id, t)))
                .collect(),
        }
    }
}

impl<K> FromIterator<(DeviceId, K)> for NeighborSnapshot<K> {
    fn from_iter<I: IntoIterator<Item = (DeviceId, K)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iteration_is_ordered() {
        let snap: NeighborSnapshot<u32> =
            [(DeviceId(3), 30), (DeviceId(1), 10), (DeviceId(2), 20)].into_iter().collect();
        let ids: Vec<_> = snap.ids().collect();
        assert_eq!(ids, vec![DeviceId(1), DeviceId(2), DeviceId(3)]);
        assert_eq!(snap.get(DeviceId(2)), Some(&20));
        assert!(!snap.contains(DeviceId(9)));
    }

    #[test]
    fn filter_map_projects() {
        let snap: NeighborSnapshot<i32> = [(DeviceId(0), -1), (DeviceId(1), 4)].into_iter().collect();
        let positive = snap.filter_map(|v| (*v > 0).then_some(*v as u32));
        assert_eq!(positive.len(), 1);
        assert_eq!(positive.get(DeviceId(1)), Some(&4));
    }

    #[test]
    fn empty_snapshot() {
        let snap = NeighborSnapshot::<u8>::new();
        assert!(snap.is_empty());
        assert_eq!(snap.iter().count(), 0);
    }
}
