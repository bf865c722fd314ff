//! Read-only view of the game state handed to the planner.
//!
//! The snapshot owns every territory, player and unit type. Planning only
//! ever borrows it immutably, which is what keeps what-if placement checks
//! from leaking into the real state.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::{Player, PlayerId};
use crate::resources::ResourceId;
use crate::territory::{Territory, TerritoryId};
use crate::unit::{UnitType, UnitTypeId, UnitTypeRegistry};

/// Complete game state at one point of a turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// Current round number.
    #[serde(default)]
    pub round: u32,
    /// Display names of resources.
    #[serde(default)]
    pub resource_names: BTreeMap<ResourceId, String>,
    /// Every unit type in the ruleset.
    #[serde(default)]
    pub unit_types: UnitTypeRegistry,
    /// Players by id.
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Player>,
    /// Territories by id.
    #[serde(default)]
    pub territories: BTreeMap<TerritoryId, Territory>,
    /// Groups of mutually allied players.
    #[serde(default)]
    pub alliances: Vec<BTreeSet<PlayerId>>,
}

impl GameSnapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit type.
    pub fn register_unit_type(&mut self, unit_type: UnitType) {
        self.unit_types.register(unit_type);
    }

    /// Add or replace a player.
    pub fn add_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    /// Add or replace a territory.
    pub fn add_territory(&mut self, territory: Territory) {
        self.territories.insert(territory.id, territory);
    }

    /// Declare an alliance.
    pub fn add_alliance(&mut self, members: impl IntoIterator<Item = PlayerId>) {
        self.alliances.push(members.into_iter().collect());
    }

    /// Look up a territory.
    pub fn territory(&self, id: TerritoryId) -> Result<&Territory> {
        self.territories
            .get(&id)
            .ok_or(GameError::UnknownTerritory(id))
    }

    /// Look up a territory mutably (for setting up or advancing state).
    pub fn territory_mut(&mut self, id: TerritoryId) -> Result<&mut Territory> {
        self.territories
            .get_mut(&id)
            .ok_or(GameError::UnknownTerritory(id))
    }

    /// Look up a player.
    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players.get(&id).ok_or(GameError::UnknownPlayer(id))
    }

    /// Look up a unit type.
    pub fn unit_type(&self, id: UnitTypeId) -> Result<&UnitType> {
        self.unit_types.get(id)
    }

    /// All territories in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// Territories owned by `player`, in id order.
    pub fn territories_owned_by(&self, player: PlayerId) -> impl Iterator<Item = &Territory> {
        self.territories
            .values()
            .filter(move |t| t.is_owned_by(player))
    }

    /// Neighbours of a territory, in id order. Unknown neighbour ids are skipped.
    pub fn neighbors(&self, id: TerritoryId) -> Result<Vec<&Territory>> {
        let territory = self.territory(id)?;
        Ok(territory
            .neighbors
            .iter()
            .filter_map(|n| self.territories.get(n))
            .collect())
    }

    /// Units of a type owned by `player` anywhere on the map.
    #[must_use]
    pub fn count_owned_units(&self, player: PlayerId, unit_type: UnitTypeId) -> usize {
        self.territories
            .values()
            .map(|t| t.count_owned(player, unit_type))
            .sum()
    }

    /// Check whether two players are the same or share an alliance.
    #[must_use]
    pub fn is_allied(&self, a: PlayerId, b: PlayerId) -> bool {
        a == b
            || self
                .alliances
                .iter()
                .any(|group| group.contains(&a) && group.contains(&b))
    }

    /// Check whether a territory is held by a player hostile to `player`.
    #[must_use]
    pub fn is_enemy_territory(&self, territory: &Territory, player: PlayerId) -> bool {
        territory
            .owner
            .is_some_and(|owner| !self.is_allied(owner, player))
    }

    /// Check referential integrity.
    ///
    /// # Errors
    ///
    /// Returns the first dangling reference found: a territory owner or unit
    /// owner that is not a player, a unit type not in the registry, a
    /// neighbour id with no territory, or a frontier rule for an unknown type.
    pub fn validate(&self) -> Result<()> {
        for territory in self.territories.values() {
            if let Some(owner) = territory.owner {
                self.player(owner)?;
            }
            for neighbor in &territory.neighbors {
                self.territory(*neighbor)?;
            }
            for unit in territory.units() {
                self.player(unit.owner)?;
                self.unit_type(unit.unit_type)?;
            }
        }
        for player in self.players.values() {
            for rule in &player.production_frontier {
                for unit_type in rule.results.keys() {
                    self.unit_type(*unit_type)?;
                }
            }
        }
        Ok(())
    }

    /// Load a snapshot from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: "snapshot".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the snapshot to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize snapshot: {}", e)))
    }

    /// Deserialize a snapshot from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            GameError::InvalidState(format!("Failed to deserialize snapshot: {}", e))
        })
    }

    /// Hash of the serialized state, for detecting unintended mutation.
    pub fn state_hash(&self) -> Result<u64> {
        let bytes = self.serialize()?;
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Ok(hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::{Unit, UnitId};

    const RED: PlayerId = PlayerId(1);
    const BLUE: PlayerId = PlayerId(2);
    const GREEN: PlayerId = PlayerId(3);
    const INFANTRY: UnitTypeId = UnitTypeId(1);

    fn small_snapshot() -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        snapshot.register_unit_type(UnitType::new(INFANTRY, "infantry", 1, 2));
        snapshot.add_player(Player::new(RED, "Red"));
        snapshot.add_player(Player::new(BLUE, "Blue"));
        snapshot.add_player(Player::new(GREEN, "Green"));
        snapshot.add_alliance([RED, GREEN]);
        snapshot.add_territory(
            Territory::land(TerritoryId(1), "West")
                .owned_by(RED)
                .with_neighbors([TerritoryId(2)])
                .with_units([
                    Unit::new(UnitId(1), INFANTRY, RED),
                    Unit::new(UnitId(2), INFANTRY, RED),
                ]),
        );
        snapshot.add_territory(
            Territory::land(TerritoryId(2), "East")
                .owned_by(BLUE)
                .with_neighbors([TerritoryId(1)])
                .with_units([Unit::new(UnitId(3), INFANTRY, RED)]),
        );
        snapshot
    }

    #[test]
    fn test_count_owned_units_spans_map() {
        let snapshot = small_snapshot();
        assert_eq!(snapshot.count_owned_units(RED, INFANTRY), 3);
        assert_eq!(snapshot.count_owned_units(BLUE, INFANTRY), 0);
    }

    #[test]
    fn test_alliances() {
        let snapshot = small_snapshot();
        assert!(snapshot.is_allied(RED, RED));
        assert!(snapshot.is_allied(RED, GREEN));
        assert!(!snapshot.is_allied(RED, BLUE));

        let east = snapshot.territory(TerritoryId(2)).unwrap();
        assert!(snapshot.is_enemy_territory(east, RED));
        assert!(!snapshot.is_enemy_territory(east, BLUE));
    }

    #[test]
    fn test_lookups_fail_for_unknown_ids() {
        let snapshot = small_snapshot();
        assert!(matches!(
            snapshot.territory(TerritoryId(9)),
            Err(GameError::UnknownTerritory(TerritoryId(9)))
        ));
        assert!(matches!(
            snapshot.player(PlayerId(9)),
            Err(GameError::UnknownPlayer(PlayerId(9)))
        ));
    }

    #[test]
    fn test_validate_catches_dangling_neighbor() {
        let mut snapshot = small_snapshot();
        assert!(snapshot.validate().is_ok());

        snapshot.add_territory(
            Territory::water(TerritoryId(3), "Sea").with_neighbors([TerritoryId(42)]),
        );
        assert!(matches!(
            snapshot.validate(),
            Err(GameError::UnknownTerritory(TerritoryId(42)))
        ));
    }

    #[test]
    fn test_serialize_roundtrip_preserves_hash() {
        let snapshot = small_snapshot();
        let bytes = snapshot.serialize().unwrap();
        let restored = GameSnapshot::deserialize(&bytes).unwrap();

        assert_eq!(restored, snapshot);
        assert_eq!(restored.state_hash().unwrap(), snapshot.state_hash().unwrap());
        assert_eq!(restored.count_owned_units(RED, INFANTRY), 3);
    }
}
