//! Lockstep driver over a static graph, shared by the unit tests.

use herald_topology::{DeviceId, NeighborGraph};

use crate::algorithm::Election;
use crate::snapshot::NeighborSnapshot;

/// What `id` hears: every live neighbor's key.
pub(crate) fn snapshot<K: Clone>(graph: &NeighborGraph, keys: &[Option<K>], id: DeviceId) -> NeighborSnapshot<K> {
    graph
        .neighbors(id)
        .filter_map(|n| keys[n.index()].clone().map(|k| (n, k)))
        .collect()
}

/// One synchronous round; `None` marks a removed device.
pub(crate) fn sync_round<E: Election>(
    election: &E,
    graph: &NeighborGraph,
    keys: &[Option<E::Key>],
) -> Vec<Option<E::Key>> {
    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            let id = DeviceId(i as u64);
            key.as_ref()
                .map(|old| election.step(id, old, &snapshot(graph, keys, id)))
        })
        .collect()
}

/// `rounds` synchronous rounds from the initial state.
pub(crate) fn run_sync<E: Election>(election: &E, graph: &NeighborGraph, rounds: usize) -> Vec<Option<E::Key>> {
    let mut keys: Vec<_> = (0..graph.len())
        .map(|i| Some(election.initial(DeviceId(i as u64))))
        .collect();
    for _ in 0..rounds {
        keys = sync_round(election, graph, &keys);
    }
    keys
}

/// Run until a round changes nothing, giving up after `max_rounds`.
pub(crate) fn converged_round<E>(
    election: &E,
    graph: &NeighborGraph,
    max_rounds: usize,
) -> (Vec<Option<E::Key>>, Option<usize>)
where
    E: Election,
    E::Key: PartialEq,
{
    let mut keys = run_sync(election, graph, 0);
    for round in 1..=max_rounds {
        let next = sync_round(election, graph, &keys);
        if next == keys {
            return (next, Some(round));
        }
        keys = next;
    }
    (keys, None)
}
