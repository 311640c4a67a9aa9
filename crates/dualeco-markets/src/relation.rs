//! Typed edge sets relating agents across a market.
//!
//! A [`Relation`] links each left-hand agent to at most one right-hand
//! counterpart (a worker to its employer, a client to its bank). The
//! forward direction is a dense vector indexed by the left agent's id;
//! the backward direction keeps each counterpart's members in the order
//! they were linked, which is the order markets iterate them in.

use std::collections::BTreeMap;

use dualeco_types::{BankId, FirmId, HouseholdId};

/// An agent id that doubles as a dense population index.
pub trait Indexed: Copy + Eq {
    /// Position in the population vector.
    fn index(self) -> usize;
}

impl Indexed for HouseholdId {
    fn index(self) -> usize {
        Self::index(self)
    }
}

impl Indexed for FirmId {
    fn index(self) -> usize {
        Self::index(self)
    }
}

impl Indexed for BankId {
    fn index(self) -> usize {
        Self::index(self)
    }
}

/// A many-to-one relation from `L` agents to `R` counterparts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation<L, R> {
    forward: Vec<Option<R>>,
    backward: BTreeMap<R, Vec<L>>,
}

impl<L, R> Default for Relation<L, R> {
    fn default() -> Self {
        Self {
            forward: Vec::new(),
            backward: BTreeMap::new(),
        }
    }
}

impl<L: Indexed, R: Copy + Ord> Relation<L, R> {
    /// Create an empty relation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Link `left` to `right`, removing any previous edge of `left` first.
    ///
    /// Returns the previous counterpart. Amortized O(1) for a fresh
    /// `left`; re-linking pays the cost of [`Relation::unlink`].
    pub fn link(&mut self, left: L, right: R) -> Option<R> {
        let previous = self.unlink(left);
        let index = left.index();
        if self.forward.len() <= index {
            self.forward.resize(index.saturating_add(1), None);
        }
        if let Some(slot) = self.forward.get_mut(index) {
            *slot = Some(right);
        }
        self.backward.entry(right).or_default().push(left);
        previous
    }

    /// Remove the edge of `left`, returning its counterpart.
    ///
    /// Runs in time linear in the counterpart's member count: the member
    /// list is scanned so the remaining members keep their link order.
    pub fn unlink(&mut self, left: L) -> Option<R> {
        let previous = self.forward.get_mut(left.index()).and_then(Option::take)?;
        if let Some(members) = self.backward.get_mut(&previous) {
            members.retain(|member| *member != left);
        }
        Some(previous)
    }

    /// Counterpart of `left`, if linked.
    pub fn partner_of(&self, left: L) -> Option<R> {
        self.forward.get(left.index()).copied().flatten()
    }

    /// Members linked to `right`, in link order.
    pub fn members_of(&self, right: R) -> &[L] {
        self.backward.get(&right).map_or(&[][..], Vec::as_slice)
    }

    /// Number of members linked to `right`.
    pub fn count_of(&self, right: R) -> u32 {
        u32::try_from(self.members_of(right).len()).unwrap_or(u32::MAX)
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        self.backward.values().map(Vec::len).sum()
    }

    /// Whether the relation has no edges.
    pub fn is_empty(&self) -> bool {
        self.backward.values().all(Vec::is_empty)
    }

    /// Counterparts with at least one member, in order.
    pub fn counterparts(&self) -> impl Iterator<Item = R> + '_ {
        self.backward
            .iter()
            .filter(|(_, members)| !members.is_empty())
            .map(|(right, _)| *right)
    }
}
