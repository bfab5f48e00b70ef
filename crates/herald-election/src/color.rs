//! Colored self-stabilising election.
//!
//! Each device keeps one [`CandidateKey`] and, once per round, recomputes it
//! from its previous key and the keys its neighbors published last round.
//! The parent pointers of all keys form a spanning forest rooted at the
//! believed leaders; devices repair the forest locally when a lineage breaks
//! (a parent moves away, fails, or changes its own belief).
//!
//! # Round
//!
//! 1. Classify the device against its previous key: [`Role::TrueRoot`],
//!    [`Role::TrueChild`] or [`Role::FalseRoot`].
//! 2. Reduce the neighborhood ([`Folds`]) and find the best eligible offer.
//! 3. Re-link under the best offer when it is foreign, strictly improves on
//!    the old key, and no dependent still relies on a lineage the device no
//!    longer holds. Otherwise a false root resets to its own root key and
//!    everyone else keeps its lineage, recomputing `done` bottom-up.
//! 4. Flip the color bit when the device agrees with its parent, no valid
//!    child shares its color, and it is not a converged root.
//!
//! # Recovery after a lost root
//!
//! A false root only re-links to an offer that strictly improves on its old
//! key; otherwise it resets and lets its dependents drain. Offers of a
//! strictly smaller leader are only taken from settled (`done`) neighbors or
//! from the current parent. Together these keep a vanished leader's value
//! from circulating around cycles of the neighbor graph.
//!
//! Every re-link strictly lowers the device's rank and every kept lineage
//! sits one level below its parent's previous key, so the parent pointers
//! of any single round never close a cycle.

use herald_topology::DeviceId;

use crate::algorithm::Election;
use crate::fold::{best_offer, BestOffer, Folds};
use crate::key::CandidateKey;
use crate::snapshot::NeighborSnapshot;

/// How a device's previous key relates to its neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The device believes it is its own root
    TrueRoot,
    /// The device's lineage is consistent with its parent's current key
    TrueChild,
    /// The lineage is broken and must be repaired or restarted
    FalseRoot,
}

/// What the device did this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Adopted the best offer under a new (or refreshed) parent
    Relink,
    /// Restarted as a candidate root
    Reset,
    /// Kept leader, level and parent
    Keep,
}

/// Full outcome of one round, for callers that want more than the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub key: CandidateKey,
    pub role: Role,
    pub transition: Transition,
    pub folds: Folds,
    pub best: BestOffer,
}

/// Classify device `id` holding `old` against its current neighborhood.
pub fn classify(id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> Role {
    if old.same_rank(&CandidateKey::root(id)) {
        return Role::TrueRoot;
    }
    let consistent = old.leader < id
        && old.parent != id
        && nbrs
            .get(old.parent)
            .is_some_and(|parent| old.is_successor_of(parent));
    if consistent {
        Role::TrueChild
    } else {
        Role::FalseRoot
    }
}

/// The colored election. Stateless: all memory lives in the keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorElection;

impl ColorElection {
    /// Run one round for device `id`.
    pub fn round(&self, id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> Round {
        let role = classify(id, old, nbrs);
        let folds = Folds::compute(id, old, nbrs);

        let best = best_offer(id, nbrs, |owner, key| {
            key.done || key.leader >= old.leader || owner == old.parent
        });
        let improves = best.key.better(old);

        let relink = best.is_foreign(id) && improves && !folds.has_false_child;

        let (mut key, transition) = if relink {
            (best.key, Transition::Relink)
        } else if role == Role::FalseRoot {
            (CandidateKey::root(id), Transition::Reset)
        } else {
            let done = folds.all_children_done && !folds.has_recruit;
            (CandidateKey { done, ..*old }, Transition::Keep)
        };

        let parent_color = if key.parent == id {
            Some(key.color)
        } else {
            nbrs.get(key.parent).map(|parent| parent.color)
        };
        let frozen = role == Role::TrueRoot && key.done;
        if parent_color == Some(key.color)
            && (key.color || !folds.has_recruit)
            && !folds.has_similar_child
            && !frozen
        {
            key.color = !key.color;
        }

        Round {
            key,
            role,
            transition,
            folds,
            best,
        }
    }
}

impl Election for ColorElection {
    type Key = CandidateKey;

    fn initial(&self, id: DeviceId) -> CandidateKey {
        CandidateKey::root(id)
    }

    fn step(&self, id: DeviceId, old: &CandidateKey, nbrs: &NeighborSnapshot<CandidateKey>) -> CandidateKey {
        self.round(id, old, nbrs).key
    }

    fn leader(key: &CandidateKey) -> DeviceId {
        key.leader
    }
}
