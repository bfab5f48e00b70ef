//! Named reductions over a neighbor snapshot.
//!
//! Every rule of the colored election reads the neighborhood through one of
//! these passes. Each is a plain fold: it starts from a neutral element and
//! combines one neighbor at a time, so an isolated device always gets the
//! neutral answer.
//!
//! Terminology, for a device `u` whose previous key is `old`:
//! - a *child* is a neighbor whose key names `u` as parent;
//! - a *valid child* is a child whose key is a successor of `old`
//!   (same leader, one level deeper);
//! - a *false child* is a child that is not valid: it still relies on a
//!   lineage `u` no longer holds.

use herald_topology::DeviceId;

use crate::key::CandidateKey;
use crate::snapshot::NeighborSnapshot;

/// The best key on offer and who offers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestOffer {
    /// The key `u` would adopt (already one level deeper than the owner's)
    pub key: CandidateKey,
    /// The device offering it (`u` itself when nobody beats the root key)
    pub owner: DeviceId,
}

impl BestOffer {
    /// Whether someone other than `id` holds the best offer.
    pub fn is_foreign(&self, id: DeviceId) -> bool {
        self.owner != id
    }
}

/// Best offer among the root key of `id` and every eligible neighbor offer.
///
/// Neutral element: `(root(id), id)`. Combine: replace the accumulator when
/// the neighbor's offer is strictly better. Ties keep the earlier (lower id)
/// owner, and the device's own root key wins any tie against neighbors.
pub fn best_offer<F>(id: DeviceId, nbrs: &NeighborSnapshot<CandidateKey>, mut eligible: F) -> BestOffer
where
    F: FnMut(DeviceId, &CandidateKey) -> bool,
{
    nbrs.iter()
        .filter(|(n, k)| *n != id && eligible(*n, *k))
        .fold(
            BestOffer {
                key: CandidateKey::root(id),
                owner: id,
            },
            |best, (n, k)| {
                let offered = k.offer(n);
                if offered.better(&best.key) {
                    BestOffer { key: offered, owner: n }
                } else {
                    best
                }
            },
        )
}

/// Some neighbor names `id` as parent. Neutral: `false`. Combine: OR.
pub fn has_child(id: DeviceId, nbrs: &NeighborSnapshot<CandidateKey>) -> bool {
    nbrs.iter().any(|(n, k)| n != id && k.is_child_of(id))
}

/// Some child of `id` is not a successor of `old`. Neutral: `false`. Combine: OR.
pub fn has_false_child(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> bool {
    nbrs.iter()
        .any(|(n, k)| n != id && k.is_child_of(id) && !k.is_successor_of(old))
}

/// Some neighbor's offer strictly beats `old`. Neutral: `false`. Combine: OR.
pub fn has_recruit(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> bool {
    nbrs.iter().any(|(n, k)| n != id && k.offer(n).better(old))
}

/// Some valid child shares `old`'s color. Neutral: `false`. Combine: OR.
pub fn has_similar_child(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> bool {
    nbrs.iter().any(|(n, k)| {
        n != id && k.is_child_of(id) && k.is_successor_of(old) && k.color == old.color
    })
}

/// Every valid child reports done. Neutral: `true`. Combine: AND.
pub fn all_children_done(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> bool {
    nbrs.iter()
        .filter(|(n, k)| *n != id && k.is_child_of(id) && k.is_successor_of(old))
        .all(|(_, k)| k.done)
}

/// All neighborhood reductions for one device and round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Folds {
    pub has_child: bool,
    pub has_false_child: bool,
    pub has_recruit: bool,
    pub has_similar_child: bool,
    pub all_children_done: bool,
}

impl Folds {
    /// Run every reduction for device `id` with previous key `old`.
    pub fn compute(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> Self {
        Self {
            has_child: has_child(id, nbrs),
            has_false_child: has_false_child(id, old, nbrs),
            has_recruit: has_recruit(id, old, nbrs),
            has_similar_child: has_similar_child(id, old, nbrs),
            all_children_done: all_children_done(id, old, nbrs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(leader: u64, level: u32, parent: u64) -> CandidateKey {
        CandidateKey {
            color: false,
            leader: DeviceId(leader),
            level,
            parent: DeviceId(parent),
            done: false,
        }
    }

    fn snap(entries: &[(u64, CandidateKey)]) -> NeighborSnapshot<CandidateKey> {
        entries.iter().map(|(n, k)| (DeviceId(*n), *k)).collect()
    }

    #[test]
    fn isolated_device_gets_neutral_elements() {
        let id = DeviceId(3);
        let old = CandidateKey::root(id);
        let empty = NeighborSnapshot::new();

        let best = best_offer(id, &empty, |_, _| true);
        assert_eq!(best.owner, id);
        assert_eq!(best.key, old);
        assert!(!best.is_foreign(id));

        assert_eq!(
            Folds::compute(id, &old, &empty),
            Folds {
                has_child: false,
                has_false_child: false,
                has_recruit: false,
                has_similar_child: false,
                all_children_done: true,
            }
        );
    }

    #[test]
    fn best_offer_prefers_lower_leader_then_level() {
        let id = DeviceId(5);
        let nbrs = snap(&[(1, key(2, 3, 0)), (2, key(0, 4, 0)), (3, key(0, 2, 0))]);
        let best = best_offer(id, &nbrs, |_, _| true);
        assert_eq!(best.owner, DeviceId(3));
        assert_eq!(best.key, key(0, 3, 3));
    }

    #[test]
    fn best_offer_ties_keep_lowest_owner() {
        let id = DeviceId(9);
        let nbrs = snap(&[(4, key(0, 1, 0)), (2, key(0, 1, 0))]);
        assert_eq!(best_offer(id, &nbrs, |_, _| true).owner, DeviceId(2));
    }

    #[test]
    fn best_offer_respects_eligibility() {
        let id = DeviceId(5);
        let nbrs = snap(&[(1, key(0, 1, 0)), (2, key(3, 0, 2))]);
        let best = best_offer(id, &nbrs, |n, _| n != DeviceId(1));
        assert_eq!(best.owner, DeviceId(2));
        let none = best_offer(id, &nbrs, |_, _| false);
        assert_eq!(none.owner, id);
    }

    #[test]
    fn children_are_classified_against_old() {
        let id = DeviceId(1);
        let old = key(0, 1, 0);
        let valid = CandidateKey { done: true, ..key(0, 2, 1) };
        let stale = key(1, 1, 1);
        let stranger = key(0, 2, 7);

        let nbrs = snap(&[(2, valid), (3, stranger)]);
        let folds = Folds::compute(id, &old, &nbrs);
        assert!(folds.has_child);
        assert!(!folds.has_false_child);
        assert!(folds.all_children_done);
        assert!(folds.has_similar_child);

        let nbrs = snap(&[(2, valid), (4, stale)]);
        let folds = Folds::compute(id, &old, &nbrs);
        assert!(folds.has_false_child);
        // false children do not vote on done
        assert!(folds.all_children_done);
    }

    #[test]
    fn undone_valid_child_blocks_done() {
        let id = DeviceId(1);
        let old = key(0, 1, 0);
        let nbrs = snap(&[(2, key(0, 2, 1)), (3, CandidateKey { done: true, ..key(0, 2, 1) })]);
        assert!(!all_children_done(id, &old, &nbrs));
    }

    #[test]
    fn similar_child_needs_matching_color() {
        let id = DeviceId(1);
        let old = CandidateKey { color: true, ..key(0, 1, 0) };
        let nbrs = snap(&[(2, key(0, 2, 1))]);
        assert!(!has_similar_child(id, &old, &nbrs));
        let nbrs = snap(&[(2, CandidateKey { color: true, ..key(0, 2, 1) })]);
        assert!(has_similar_child(id, &old, &nbrs));
    }

    #[test]
    fn recruit_compares_offers_not_raw_keys() {
        let id = DeviceId(2);
        // parent one level up offers exactly our own rank: not a recruit
        let old = key(0, 2, 1);
        assert!(!has_recruit(id, &old, &snap(&[(1, key(0, 1, 0))])));
        // a shortcut is
        assert!(has_recruit(id, &old, &snap(&[(5, key(0, 0, 5))])));
        // a better leader is
        assert!(has_recruit(DeviceId(7), &CandidateKey::root(DeviceId(7)), &snap(&[(3, key(3, 0, 3))])));
    }
}
