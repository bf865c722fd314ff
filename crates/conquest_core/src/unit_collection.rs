//! Ordered, duplicate-free container of units held by one territory.
//!
//! Mutations hand back a [`CollectionChange`] instead of notifying the
//! holder directly. The holder (see [`crate::territory::Territory`]) checks
//! the change and refreshes whatever it caches about its units.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::unit::{Unit, UnitId, UnitTypeId};

/// What a mutation did to a [`UnitCollection`].
#[must_use = "the holder must refresh its cached state when the collection changed"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    /// Nothing was added or removed.
    Unchanged,
    /// This many units were added.
    Added(usize),
    /// This many units were removed.
    Removed(usize),
}

impl CollectionChange {
    /// Check whether membership changed.
    #[must_use]
    pub const fn is_changed(self) -> bool {
        !matches!(self, Self::Unchanged | Self::Added(0) | Self::Removed(0))
    }
}

/// Units scoped to one holder, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCollection {
    units: Vec<Unit>,
}

impl UnitCollection {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    /// Add a unit unless a unit with the same id is already held.
    pub fn add(&mut self, unit: Unit) -> CollectionChange {
        if self.contains(unit.id) {
            return CollectionChange::Unchanged;
        }
        self.units.push(unit);
        CollectionChange::Added(1)
    }

    /// Add every unit not already held.
    pub fn add_all(&mut self, units: impl IntoIterator<Item = Unit>) -> CollectionChange {
        let mut held: HashSet<UnitId> = self.units.iter().map(|u| u.id).collect();
        let before = self.units.len();
        for unit in units {
            if held.insert(unit.id) {
                self.units.push(unit);
            }
        }
        CollectionChange::Added(self.units.len() - before)
    }

    /// Remove a unit by id, returning it alongside the change.
    pub fn remove(&mut self, id: UnitId) -> (CollectionChange, Option<Unit>) {
        match self.units.iter().position(|u| u.id == id) {
            Some(index) => (CollectionChange::Removed(1), Some(self.units.remove(index))),
            None => (CollectionChange::Unchanged, None),
        }
    }

    /// Remove every unit whose id is listed.
    pub fn remove_all(&mut self, ids: &[UnitId]) -> CollectionChange {
        let doomed: HashSet<UnitId> = ids.iter().copied().collect();
        let before = self.units.len();
        self.units.retain(|u| !doomed.contains(&u.id));
        CollectionChange::Removed(before - self.units.len())
    }

    /// Remove every unit.
    pub fn clear(&mut self) -> CollectionChange {
        let removed = self.units.len();
        self.units.clear();
        CollectionChange::Removed(removed)
    }

    /// Total number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Check if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Check whether a unit is held.
    #[must_use]
    pub fn contains(&self, id: UnitId) -> bool {
        self.units.iter().any(|u| u.id == id)
    }

    /// Check whether every listed unit is held.
    #[must_use]
    pub fn contains_all(&self, ids: &[UnitId]) -> bool {
        // Linear scans get slow once both sides are large.
        if self.units.len() > 500 && ids.len() > 500 {
            let held: HashSet<UnitId> = self.units.iter().map(|u| u.id).collect();
            return ids.iter().all(|id| held.contains(id));
        }
        ids.iter().all(|&id| self.contains(id))
    }

    /// Number of units of a type.
    #[must_use]
    pub fn count_of_type(&self, unit_type: UnitTypeId) -> usize {
        self.count_matches(|u| u.unit_type == unit_type)
    }

    /// Number of units of a type owned by `owner`.
    #[must_use]
    pub fn count_of_type_owned_by(&self, unit_type: UnitTypeId, owner: PlayerId) -> usize {
        self.count_matches(|u| u.unit_type == unit_type && u.owner == owner)
    }

    /// Number of units owned by `owner`.
    #[must_use]
    pub fn count_owned_by(&self, owner: PlayerId) -> usize {
        self.count_matches(|u| u.owner == owner)
    }

    /// Up to `max_units` units of a type, in collection order.
    #[must_use]
    pub fn units_of_type(&self, unit_type: UnitTypeId, max_units: usize) -> Vec<Unit> {
        self.units
            .iter()
            .filter(|u| u.unit_type == unit_type)
            .take(max_units)
            .cloned()
            .collect()
    }

    /// For each requested type, up to the requested number of units.
    #[must_use]
    pub fn units_for_quantities(&self, quantities: &BTreeMap<UnitTypeId, usize>) -> Vec<Unit> {
        quantities
            .iter()
            .flat_map(|(&unit_type, &max)| self.units_of_type(unit_type, max))
            .collect()
    }

    /// Copy of every unit.
    #[must_use]
    pub fn units(&self) -> Vec<Unit> {
        self.units.clone()
    }

    /// Iterate units in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Quantity of each unit type present.
    #[must_use]
    pub fn units_by_type(&self) -> BTreeMap<UnitTypeId, usize> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.unit_type).or_insert(0) += 1;
        }
        counts
    }

    /// Quantity of each unit type owned by `owner`.
    #[must_use]
    pub fn units_by_type_owned_by(&self, owner: PlayerId) -> BTreeMap<UnitTypeId, usize> {
        let mut counts = BTreeMap::new();
        for unit in self.units.iter().filter(|u| u.owner == owner) {
            *counts.entry(unit.unit_type).or_insert(0) += 1;
        }
        counts
    }

    /// Players owning at least one unit here.
    #[must_use]
    pub fn players_with_units(&self) -> BTreeSet<PlayerId> {
        self.units.iter().map(|u| u.owner).collect()
    }

    /// Number of units each player holds here.
    #[must_use]
    pub fn player_unit_counts(&self) -> BTreeMap<PlayerId, usize> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.owner).or_insert(0) += 1;
        }
        counts
    }

    /// Check if more than one player has units here.
    #[must_use]
    pub fn has_units_from_multiple_players(&self) -> bool {
        self.players_with_units().len() > 1
    }

    /// Check a predicate holds for every unit.
    pub fn all_match(&self, predicate: impl Fn(&Unit) -> bool) -> bool {
        self.units.iter().all(predicate)
    }

    /// Check a predicate holds for some unit.
    pub fn any_match(&self, predicate: impl Fn(&Unit) -> bool) -> bool {
        self.units.iter().any(predicate)
    }

    /// Number of units matching a predicate.
    pub fn count_matches(&self, predicate: impl Fn(&Unit) -> bool) -> usize {
        self.units.iter().filter(|u| predicate(u)).count()
    }

    /// Copies of the units matching a predicate.
    pub fn matches(&self, predicate: impl Fn(&Unit) -> bool) -> Vec<Unit> {
        self.units.iter().filter(|u| predicate(u)).cloned().collect()
    }
}

impl<'a> IntoIterator for &'a UnitCollection {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

impl fmt::Display for UnitCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "units:")?;
        for (unit_type, count) in self.units_by_type() {
            write!(f, " <{unit_type},{count}>")?;
        }
        Ok(())
    }
}
