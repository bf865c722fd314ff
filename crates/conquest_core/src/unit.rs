//! Unit types, unit instances and the unit factory.
//!
//! Unit types are data-driven definitions loaded with the ruleset. Units are
//! the individual pieces on the board; each carries its current owner and
//! the player who originally owned it, which factory-bonus rules look at.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::PlayerId;

/// Unique identifier for unit types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitTypeId(pub u32);

impl UnitTypeId {
    /// Create a new unit type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for UnitTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-type#{}", self.0)
    }
}

/// Unique identifier for a unit instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    /// First id handed out to temporary (what-if) units.
    ///
    /// Board units are numbered below this.
    pub const TEMPORARY_BASE: u64 = 1 << 48;

    /// Check whether this id belongs to a temporary unit.
    #[must_use]
    pub const fn is_temporary(self) -> bool {
        self.0 >= Self::TEMPORARY_BASE
    }
}

/// Where a unit type moves and fights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Domain {
    /// Moves over land territories.
    #[default]
    Land,
    /// Moves over water territories.
    Sea,
    /// Flies over both.
    Air,
}

/// Global ceiling on how many units of a type one player may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildLimit {
    /// No ceiling.
    #[default]
    Unlimited,
    /// The type can never be built.
    Forbidden,
    /// At most this many, counting units on the board and queued.
    AtMost(u32),
}

impl BuildLimit {
    /// Convert the ruleset encoding (`-1` unlimited, `0` forbidden).
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Self::Forbidden,
            n if n < 0 => Self::Unlimited,
            n => Self::AtMost(n.unsigned_abs()),
        }
    }
}

/// Definition of a unit type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitType {
    /// Unique identifier for this unit type.
    pub id: UnitTypeId,
    /// Display name of the unit type.
    pub name: String,
    /// Movement domain.
    #[serde(default)]
    pub domain: Domain,
    /// Attack strength.
    #[serde(default)]
    pub attack: i32,
    /// Defence strength.
    #[serde(default)]
    pub defense: i32,
    /// Movement points.
    #[serde(default = "default_movement")]
    pub movement: i32,
    /// Hits the unit absorbs before dying.
    #[serde(default = "default_hit_points")]
    pub hit_points: i32,
    /// Whether the unit is a factory able to produce other units.
    #[serde(default)]
    pub can_produce_units: bool,
    /// Fixed production output, overriding the territory's production value.
    #[serde(default)]
    pub can_produce_x_units: Option<i32>,
    /// Units of cargo this unit can carry.
    #[serde(default)]
    pub transport_capacity: i32,
    /// Whether this sea unit may bombard adjacent land.
    #[serde(default)]
    pub can_bombard: bool,
    /// Ceiling on units of this type per player.
    #[serde(default)]
    pub max_built_per_player: BuildLimit,
    /// Value used when no production rule prices this type.
    #[serde(default)]
    pub value: i32,
}

const fn default_movement() -> i32 {
    1
}

const fn default_hit_points() -> i32 {
    1
}

impl UnitType {
    /// Create a land unit type with combat stats.
    #[must_use]
    pub fn new(id: UnitTypeId, name: impl Into<String>, attack: i32, defense: i32) -> Self {
        Self {
            id,
            name: name.into(),
            domain: Domain::Land,
            attack,
            defense,
            movement: 1,
            hit_points: 1,
            can_produce_units: false,
            can_produce_x_units: None,
            transport_capacity: 0,
            can_bombard: false,
            max_built_per_player: BuildLimit::Unlimited,
            value: 0,
        }
    }

    /// Set the movement domain.
    #[must_use]
    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    /// Set movement points.
    #[must_use]
    pub fn with_movement(mut self, movement: i32) -> Self {
        self.movement = movement;
        self
    }

    /// Mark the type as a factory.
    #[must_use]
    pub fn as_factory(mut self) -> Self {
        self.can_produce_units = true;
        self
    }

    /// Give the factory a fixed output.
    #[must_use]
    pub fn with_fixed_production(mut self, units: i32) -> Self {
        self.can_produce_x_units = Some(units);
        self
    }

    /// Set transport capacity.
    #[must_use]
    pub fn with_transport_capacity(mut self, capacity: i32) -> Self {
        self.transport_capacity = capacity;
        self
    }

    /// Allow shore bombardment.
    #[must_use]
    pub fn with_bombard(mut self) -> Self {
        self.can_bombard = true;
        self
    }

    /// Set the per-player build ceiling.
    #[must_use]
    pub fn with_build_limit(mut self, limit: BuildLimit) -> Self {
        self.max_built_per_player = limit;
        self
    }

    /// Set the fallback value.
    #[must_use]
    pub fn with_value(mut self, value: i32) -> Self {
        self.value = value;
        self
    }

    /// Check if this is a land unit.
    #[must_use]
    pub fn is_land(&self) -> bool {
        self.domain == Domain::Land
    }

    /// Check if this is a sea unit.
    #[must_use]
    pub fn is_sea(&self) -> bool {
        self.domain == Domain::Sea
    }

    /// Check if this is an air unit.
    #[must_use]
    pub fn is_air(&self) -> bool {
        self.domain == Domain::Air
    }
}

/// Registry of every unit type in the ruleset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTypeRegistry {
    types: BTreeMap<UnitTypeId, UnitType>,
}

impl UnitTypeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: BTreeMap::new(),
        }
    }

    /// Register a unit type, replacing any previous one with the same id.
    pub fn register(&mut self, unit_type: UnitType) {
        self.types.insert(unit_type.id, unit_type);
    }

    /// Look up a unit type.
    pub fn get(&self, id: UnitTypeId) -> Result<&UnitType> {
        self.types.get(&id).ok_or(GameError::UnknownUnitType(id))
    }

    /// Check whether a unit type is registered.
    #[must_use]
    pub fn contains(&self, id: UnitTypeId) -> bool {
        self.types.contains_key(&id)
    }

    /// All registered unit types in id order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitType> {
        self.types.values()
    }

    /// Number of registered unit types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<UnitType> for UnitTypeRegistry {
    fn from_iter<T: IntoIterator<Item = UnitType>>(iter: T) -> Self {
        let mut registry = Self::new();
        for unit_type in iter {
            registry.register(unit_type);
        }
        registry
    }
}

/// A single unit on the board (or a temporary one the planner made).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier.
    pub id: UnitId,
    /// The unit's type.
    pub unit_type: UnitTypeId,
    /// Current owner.
    pub owner: PlayerId,
    /// Player who first owned the unit; `None` means the current owner.
    #[serde(default)]
    pub original_owner: Option<PlayerId>,
    /// Transport currently carrying this unit.
    #[serde(default)]
    pub transported_by: Option<UnitId>,
    /// Bombing damage taken (factories lose output).
    #[serde(default)]
    pub damage: i32,
}

impl Unit {
    /// Create an undamaged, untransported unit owned since creation by `owner`.
    #[must_use]
    pub const fn new(id: UnitId, unit_type: UnitTypeId, owner: PlayerId) -> Self {
        Self {
            id,
            unit_type,
            owner,
            original_owner: None,
            transported_by: None,
            damage: 0,
        }
    }

    /// Player who originally owned this unit, independent of conquest.
    #[must_use]
    pub fn original_owner(&self) -> PlayerId {
        self.original_owner.unwrap_or(self.owner)
    }

    /// Check if the unit is aboard a transport.
    #[must_use]
    pub const fn is_transported(&self) -> bool {
        self.transported_by.is_some()
    }

    /// Record a different original owner (e.g. a captured factory).
    #[must_use]
    pub fn with_original_owner(mut self, player: PlayerId) -> Self {
        self.original_owner = Some(player);
        self
    }

    /// Record bombing damage.
    #[must_use]
    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    /// Put the unit aboard a transport.
    #[must_use]
    pub fn carried_by(mut self, transport: UnitId) -> Self {
        self.transported_by = Some(transport);
        self
    }
}

/// Creates unit instances with fresh ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitFactory {
    next_id: u64,
}

impl UnitFactory {
    /// Factory for board units, numbering from `first_id`.
    #[must_use]
    pub const fn starting_at(first_id: u64) -> Self {
        Self { next_id: first_id }
    }

    /// Factory for temporary units whose ids never collide with board units.
    #[must_use]
    pub const fn temporary() -> Self {
        Self {
            next_id: UnitId::TEMPORARY_BASE,
        }
    }

    /// Create `quantity` units of a type for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when `quantity` is zero.
    pub fn create(
        &mut self,
        unit_type: UnitTypeId,
        quantity: u32,
        owner: PlayerId,
    ) -> Result<Vec<Unit>> {
        if quantity == 0 {
            return Err(GameError::InvalidArgument(format!(
                "cannot create zero units of {unit_type}"
            )));
        }
        let units = (0..quantity)
            .map(|_| {
                let id = UnitId(self.next_id);
                self.next_id += 1;
                Unit::new(id, unit_type, owner)
            })
            .collect();
        Ok(units)
    }
}

impl Default for UnitFactory {
    fn default() -> Self {
        Self::starting_at(1)
    }
}
