//! Territories of the game map.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::player::PlayerId;
use crate::unit::{Unit, UnitId, UnitTypeId};
use crate::unit_collection::{CollectionChange, UnitCollection};

/// Unique identifier for territories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);

impl TerritoryId {
    /// Create a new territory ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for TerritoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "territory#{}", self.0)
    }
}

/// Ruleset data attached to a territory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryAttachment {
    /// Production value (income and factory output).
    #[serde(default)]
    pub production: i32,
    /// The territory started the game with a factory.
    #[serde(default)]
    pub original_factory: bool,
    /// Player who owned the territory at game start.
    #[serde(default)]
    pub original_owner: Option<PlayerId>,
    /// Counts toward victory conditions.
    #[serde(default)]
    pub victory_city: bool,
    /// No unit may enter.
    #[serde(default)]
    pub impassable: bool,
}

impl TerritoryAttachment {
    /// Attachment with a production value.
    #[must_use]
    pub fn with_production(production: i32) -> Self {
        Self {
            production,
            ..Self::default()
        }
    }

    /// Mark as an original factory site.
    #[must_use]
    pub fn original_factory(mut self) -> Self {
        self.original_factory = true;
        self
    }

    /// Mark as impassable.
    #[must_use]
    pub fn impassable(mut self) -> Self {
        self.impassable = true;
        self
    }
}

/// Serialized shape of a [`Territory`]; the unit tally is rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TerritoryRecord {
    id: TerritoryId,
    name: String,
    is_water: bool,
    #[serde(default)]
    owner: Option<PlayerId>,
    #[serde(default)]
    neighbors: BTreeSet<TerritoryId>,
    #[serde(default)]
    conquered_this_turn: bool,
    #[serde(default)]
    attachment: Option<TerritoryAttachment>,
    #[serde(default)]
    units: UnitCollection,
}

/// A land or sea territory and the units in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TerritoryRecord", into = "TerritoryRecord")]
pub struct Territory {
    /// Unique identifier.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Sea zone rather than land.
    pub is_water: bool,
    /// Current owner (sea zones and neutral land may have none).
    pub owner: Option<PlayerId>,
    /// Adjacent territories.
    pub neighbors: BTreeSet<TerritoryId>,
    /// Changed hands during the current turn.
    pub conquered_this_turn: bool,
    /// Ruleset attachment.
    pub attachment: Option<TerritoryAttachment>,
    units: UnitCollection,
    /// Cached (owner, type) counts, kept in step with `units`.
    tally: BTreeMap<(PlayerId, UnitTypeId), usize>,
}

impl Territory {
    /// Create an unowned, empty land territory.
    #[must_use]
    pub fn land(id: TerritoryId, name: impl Into<String>) -> Self {
        Self::new(id, name, false)
    }

    /// Create an empty sea zone.
    #[must_use]
    pub fn water(id: TerritoryId, name: impl Into<String>) -> Self {
        Self::new(id, name, true)
    }

    fn new(id: TerritoryId, name: impl Into<String>, is_water: bool) -> Self {
        Self {
            id,
            name: name.into(),
            is_water,
            owner: None,
            neighbors: BTreeSet::new(),
            conquered_this_turn: false,
            attachment: None,
            units: UnitCollection::new(),
            tally: BTreeMap::new(),
        }
    }

    /// Set the owner.
    #[must_use]
    pub fn owned_by(mut self, owner: PlayerId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Set the attachment.
    #[must_use]
    pub fn with_attachment(mut self, attachment: TerritoryAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }

    /// Add adjacent territories.
    #[must_use]
    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = TerritoryId>) -> Self {
        self.neighbors.extend(neighbors);
        self
    }

    /// Place starting units.
    #[must_use]
    pub fn with_units(mut self, units: impl IntoIterator<Item = Unit>) -> Self {
        self.add_units(units);
        self
    }

    /// Units present.
    #[must_use]
    pub fn units(&self) -> &UnitCollection {
        &self.units
    }

    /// Add units, ignoring any already present.
    pub fn add_units(&mut self, units: impl IntoIterator<Item = Unit>) {
        let change = self.units.add_all(units);
        self.on_units_changed(change);
    }

    /// Remove units by id.
    pub fn remove_units(&mut self, ids: &[UnitId]) {
        let change = self.units.remove_all(ids);
        self.on_units_changed(change);
    }

    /// Remove every unit.
    pub fn clear_units(&mut self) {
        let change = self.units.clear();
        self.on_units_changed(change);
    }

    fn on_units_changed(&mut self, change: CollectionChange) {
        if change.is_changed() {
            self.tally = tally_units(&self.units);
        }
    }

    /// Units of a type owned by a player, from the cached tally.
    #[must_use]
    pub fn count_owned(&self, owner: PlayerId, unit_type: UnitTypeId) -> usize {
        self.tally.get(&(owner, unit_type)).copied().unwrap_or(0)
    }

    /// Production value from the attachment (0 when absent).
    #[must_use]
    pub fn production(&self) -> i32 {
        self.attachment.as_ref().map_or(0, |a| a.production)
    }

    /// Whether the attachment marks an original factory site.
    #[must_use]
    pub fn is_original_factory(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.original_factory)
    }

    /// Whether the attachment marks the territory impassable.
    #[must_use]
    pub fn is_impassable(&self) -> bool {
        self.attachment.as_ref().is_some_and(|a| a.impassable)
    }

    /// Check if `player` owns this territory.
    #[must_use]
    pub fn is_owned_by(&self, player: PlayerId) -> bool {
        self.owner == Some(player)
    }

    /// Check adjacency.
    #[must_use]
    pub fn is_adjacent_to(&self, other: TerritoryId) -> bool {
        self.neighbors.contains(&other)
    }
}

fn tally_units(units: &UnitCollection) -> BTreeMap<(PlayerId, UnitTypeId), usize> {
    let mut tally = BTreeMap::new();
    for unit in units {
        *tally.entry((unit.owner, unit.unit_type)).or_insert(0) += 1;
    }
    tally
}

impl From<TerritoryRecord> for Territory {
    fn from(record: TerritoryRecord) -> Self {
        let tally = tally_units(&record.units);
        Self {
            id: record.id,
            name: record.name,
            is_water: record.is_water,
            owner: record.owner,
            neighbors: record.neighbors,
            conquered_this_turn: record.conquered_this_turn,
            attachment: record.attachment,
            units: record.units,
            tally,
        }
    }
}

impl From<Territory> for TerritoryRecord {
    fn from(territory: Territory) -> Self {
        Self {
            id: territory.id,
            name: territory.name,
            is_water: territory.is_water,
            owner: territory.owner,
            neighbors: territory.neighbors,
            conquered_this_turn: territory.conquered_this_turn,
            attachment: territory.attachment,
            units: territory.units,
        }
    }
}
