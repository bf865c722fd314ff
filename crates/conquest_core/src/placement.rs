//! Placement rules engine.
//!
//! [`PlaceTurn`] is a simulated placement step layered over a borrowed
//! [`GameSnapshot`]. Units "placed" in it only exist in the overlay, so
//! what-if checks never touch the real game state and the overlay can be
//! thrown away after each question.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::error::GameError;
use crate::player::PlayerId;
use crate::production::{factory_units, territory_capacity, ProductionCapacity};
use crate::snapshot::GameSnapshot;
use crate::territory::{Territory, TerritoryId};
use crate::unit::{BuildLimit, Unit, UnitTypeId};

/// Why the rules engine refused a placement.
///
/// Every variant except [`PlacementRejection::Game`] is an ordinary "no";
/// `Game` means the question itself referred to something that does not
/// exist.
#[derive(Debug, Error)]
pub enum PlacementRejection {
    /// Nothing to place.
    #[error("No units to place")]
    NoUnits,

    /// A unit belongs to someone else.
    #[error("Unit {unit_type} is not owned by {player}")]
    NotOwned {
        /// Type of the offending unit.
        unit_type: UnitTypeId,
        /// Player attempting the placement.
        player: PlayerId,
    },

    /// Land or air unit offered for a sea zone, or sea unit for land.
    #[error("Unit {unit_type} cannot be placed in {territory}")]
    WrongDomain {
        /// Type of the offending unit.
        unit_type: UnitTypeId,
        /// Target territory.
        territory: TerritoryId,
    },

    /// Land territory owned by someone else.
    #[error("{territory} is not owned by {player}")]
    TerritoryNotOwned {
        /// Target territory.
        territory: TerritoryId,
        /// Player attempting the placement.
        player: PlayerId,
    },

    /// Sea zone with no friendly producing territory next to it.
    #[error("No producing territory adjacent to {territory}")]
    NoAdjacentProducer {
        /// Target sea zone.
        territory: TerritoryId,
    },

    /// Territory changed hands this turn.
    #[error("{territory} was conquered this turn")]
    ConqueredThisTurn {
        /// Target territory.
        territory: TerritoryId,
    },

    /// Player's rules forbid placing here.
    #[error("Placement in {territory} is restricted")]
    Restricted {
        /// Target territory.
        territory: TerritoryId,
    },

    /// Not enough production left.
    #[error("Cannot place {requested} units in {territory}: {placed} placed of {capacity}")]
    CapacityExceeded {
        /// Target territory.
        territory: TerritoryId,
        /// Units offered.
        requested: usize,
        /// Units already placed this turn.
        placed: usize,
        /// Production capacity.
        capacity: ProductionCapacity,
    },

    /// The type can never be built.
    #[error("Unit {unit_type} cannot be built")]
    BuildForbidden {
        /// Forbidden type.
        unit_type: UnitTypeId,
    },

    /// Placing would exceed the per-player ceiling.
    #[error("Unit {unit_type} is limited to {max}: {existing} existing, {requested} requested")]
    BuildLimitReached {
        /// Limited type.
        unit_type: UnitTypeId,
        /// The ceiling.
        max: u32,
        /// Units owned or already placed.
        existing: usize,
        /// Units offered.
        requested: usize,
    },

    /// The question referenced unknown data.
    #[error(transparent)]
    Game(#[from] GameError),
}

impl PlacementRejection {
    /// Split an inconsistency out from an ordinary refusal.
    ///
    /// # Errors
    ///
    /// Returns the inner [`GameError`] for [`PlacementRejection::Game`].
    pub fn into_refusal(self) -> crate::error::Result<Self> {
        match self {
            Self::Game(error) => Err(error),
            refusal => Ok(refusal),
        }
    }
}

/// Result of asking the rules engine about a placement.
pub type PlacementResult = std::result::Result<(), PlacementRejection>;

/// A simulated placement step over a borrowed snapshot.
#[derive(Debug, Clone)]
pub struct PlaceTurn<'a> {
    snapshot: &'a GameSnapshot,
    player: PlayerId,
    placed: BTreeMap<TerritoryId, Vec<Unit>>,
}

impl<'a> PlaceTurn<'a> {
    /// Start an empty placement step for `player`.
    #[must_use]
    pub fn new(snapshot: &'a GameSnapshot, player: PlayerId) -> Self {
        Self {
            snapshot,
            player,
            placed: BTreeMap::new(),
        }
    }

    /// Record units as already placed without checking them.
    #[must_use]
    pub fn with_placed(mut self, territory: TerritoryId, units: &[Unit]) -> Self {
        if !units.is_empty() {
            self.placed
                .entry(territory)
                .or_default()
                .extend_from_slice(units);
        }
        self
    }

    /// Player this step belongs to.
    #[must_use]
    pub const fn player(&self) -> PlayerId {
        self.player
    }

    /// Units placed in a territory during this step.
    #[must_use]
    pub fn placed_in(&self, territory: TerritoryId) -> &[Unit] {
        self.placed.get(&territory).map_or(&[], Vec::as_slice)
    }

    /// Units of a type placed anywhere during this step.
    #[must_use]
    pub fn placed_of_type(&self, unit_type: UnitTypeId) -> usize {
        self.placed
            .values()
            .flatten()
            .filter(|u| u.unit_type == unit_type)
            .count()
    }

    /// Check then record a placement.
    ///
    /// # Errors
    ///
    /// Returns the rejection when the rules refuse the units.
    pub fn place(&mut self, territory: TerritoryId, units: &[Unit]) -> PlacementResult {
        self.can_units_be_placed(territory, units)?;
        self.placed
            .entry(territory)
            .or_default()
            .extend_from_slice(units);
        Ok(())
    }

    /// Ask whether `units` may be placed in `territory` now.
    ///
    /// # Errors
    ///
    /// Returns the first rule the placement breaks.
    pub fn can_units_be_placed(&self, territory_id: TerritoryId, units: &[Unit]) -> PlacementResult {
        if units.is_empty() {
            return Err(PlacementRejection::NoUnits);
        }
        let territory = self.snapshot.territory(territory_id)?;

        for unit in units {
            if unit.owner != self.player {
                return Err(PlacementRejection::NotOwned {
                    unit_type: unit.unit_type,
                    player: self.player,
                });
            }
            let unit_type = self.snapshot.unit_type(unit.unit_type)?;
            if unit_type.is_sea() != territory.is_water {
                return Err(PlacementRejection::WrongDomain {
                    unit_type: unit.unit_type,
                    territory: territory_id,
                });
            }
        }

        let player = self.snapshot.player(self.player)?;
        if territory.conquered_this_turn {
            return Err(PlacementRejection::ConqueredThisTurn {
                territory: territory_id,
            });
        }
        if player.is_placement_restricted(territory_id) {
            return Err(PlacementRejection::Restricted {
                territory: territory_id,
            });
        }

        let (capacity, placed) = if territory.is_water {
            self.sea_zone_capacity(territory)?
        } else {
            if !territory.is_owned_by(self.player) {
                return Err(PlacementRejection::TerritoryNotOwned {
                    territory: territory_id,
                    player: self.player,
                });
            }
            let capacity = territory_capacity(self.snapshot, territory_id, self.player)?;
            (capacity, self.placed_in(territory_id).len())
        };
        let fits = match capacity.limit() {
            Some(limit) => placed + units.len() <= limit as usize,
            None => true,
        };
        if !fits {
            return Err(PlacementRejection::CapacityExceeded {
                territory: territory_id,
                requested: units.len(),
                placed,
                capacity,
            });
        }

        self.check_build_limits(units)
    }

    /// Capacity for a sea zone: the adjacent producer with the most room
    /// left, less what it already fed into itself and its adjacent sea
    /// zones this step.
    ///
    /// Room is never pooled across producers sharing the zone, so a batch
    /// must fit inside one producer's output. An exhausted producer does
    /// not block the zone while another neighbour still has room.
    fn sea_zone_capacity(
        &self,
        zone: &Territory,
    ) -> std::result::Result<(ProductionCapacity, usize), PlacementRejection> {
        let mut best: Option<(ProductionCapacity, usize)> = None;
        for neighbor in self.snapshot.neighbors(zone.id)? {
            if !self.is_producer(neighbor)? {
                continue;
            }
            let capacity = territory_capacity(self.snapshot, neighbor.id, self.player)?;
            let used = self.placed_in(neighbor.id).len()
                + neighbor
                    .neighbors
                    .iter()
                    .filter(|&&id| {
                        self.snapshot
                            .territories
                            .get(&id)
                            .is_some_and(|t| t.is_water)
                    })
                    .map(|&id| self.placed_in(id).len())
                    .sum::<usize>();
            let room = match capacity.limit() {
                Some(limit) => limit as usize,
                None => usize::MAX,
            };
            let better = best.map_or(true, |(c, u)| {
                let best_room = c.limit().map_or(usize::MAX, |l| l as usize);
                room.saturating_sub(used) > best_room.saturating_sub(u)
            });
            if better {
                best = Some((capacity, used));
            }
        }
        best.ok_or(PlacementRejection::NoAdjacentProducer { territory: zone.id })
    }

    /// Owned, unconquered land that can feed an adjacent sea zone.
    fn is_producer(&self, territory: &Territory) -> Result<bool, GameError> {
        if territory.is_water || territory.conquered_this_turn || !territory.is_owned_by(self.player)
        {
            return Ok(false);
        }
        if self.snapshot.player(self.player)?.can_place_anywhere() {
            return Ok(true);
        }
        Ok(!factory_units(self.snapshot, territory, self.player)?.is_empty())
    }

    fn check_build_limits(&self, units: &[Unit]) -> PlacementResult {
        let mut requested: BTreeMap<UnitTypeId, usize> = BTreeMap::new();
        for unit in units {
            *requested.entry(unit.unit_type).or_insert(0) += 1;
        }
        for (unit_type_id, count) in requested {
            match self.snapshot.unit_type(unit_type_id)?.max_built_per_player {
                BuildLimit::Unlimited => {}
                BuildLimit::Forbidden => {
                    return Err(PlacementRejection::BuildForbidden {
                        unit_type: unit_type_id,
                    });
                }
                BuildLimit::AtMost(max) => {
                    let existing = self.snapshot.count_owned_units(self.player, unit_type_id)
                        + self.placed_of_type(unit_type_id);
                    if existing + count > max as usize {
                        return Err(PlacementRejection::BuildLimitReached {
                            unit_type: unit_type_id,
                            max,
                            existing,
                            requested: count,
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Check whether land units of `player` could move into a territory.
pub fn can_move_land_units(
    snapshot: &GameSnapshot,
    territory_id: TerritoryId,
    player: PlayerId,
) -> crate::error::Result<bool> {
    let territory = snapshot.territory(territory_id)?;
    if territory.is_water || territory.is_impassable() {
        return Ok(false);
    }
    if snapshot.player(player)?.is_movement_restricted(territory_id) {
        return Ok(false);
    }
    Ok(territory
        .owner
        .is_some_and(|owner| snapshot.is_allied(owner, player)))
}

/// Check for an unconquered, owned land territory holding one of the
/// player's factories.
pub fn has_owned_land_factory(
    snapshot: &GameSnapshot,
    territory: &Territory,
    player: PlayerId,
) -> crate::error::Result<bool> {
    if territory.is_water || territory.conquered_this_turn || !territory.is_owned_by(player) {
        return Ok(false);
    }
    Ok(!factory_units(snapshot, territory, player)?.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Player, RulesAttachment};
    use crate::territory::TerritoryAttachment;
    use crate::unit::{Domain, UnitId, UnitType};

    const RED: PlayerId = PlayerId(1);
    const BLUE: PlayerId = PlayerId(2);
    const INFANTRY: UnitTypeId = UnitTypeId(1);
    const FACTORY: UnitTypeId = UnitTypeId(2);
    const DESTROYER: UnitTypeId = UnitTypeId(3);
    const BATTLESHIP: UnitTypeId = UnitTypeId(4);
    const HOME: TerritoryId = TerritoryId(1);
    const BORDER: TerritoryId = TerritoryId(2);
    const SEA: TerritoryId = TerritoryId(3);
    const FAR_SEA: TerritoryId = TerritoryId(4);

    fn snapshot() -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        snapshot.register_unit_type(UnitType::new(INFANTRY, "infantry", 1, 2));
        snapshot.register_unit_type(UnitType::new(FACTORY, "factory", 0, 0).as_factory());
        snapshot.register_unit_type(
            UnitType::new(DESTROYER, "destroyer", 2, 2).with_domain(Domain::Sea),
        );
        snapshot.register_unit_type(
            UnitType::new(BATTLESHIP, "battleship", 4, 4)
                .with_domain(Domain::Sea)
                .with_build_limit(BuildLimit::AtMost(1)),
        );
        snapshot.add_player(Player::new(RED, "Red"));
        snapshot.add_player(Player::new(BLUE, "Blue"));
        snapshot.add_territory(
            Territory::land(HOME, "Home")
                .owned_by(RED)
                .with_attachment(TerritoryAttachment::with_production(3))
                .with_neighbors([BORDER, SEA])
                .with_units([Unit::new(UnitId(1), FACTORY, RED)]),
        );
        snapshot.add_territory(
            Territory::land(BORDER, "Border")
                .owned_by(BLUE)
                .with_attachment(TerritoryAttachment::with_production(2))
                .with_neighbors([HOME]),
        );
        snapshot.add_territory(Territory::water(SEA, "Home Sea").with_neighbors([HOME, FAR_SEA]));
        snapshot.add_territory(Territory::water(FAR_SEA, "Far Sea").with_neighbors([SEA]));
        snapshot
    }

    fn units(unit_type: UnitTypeId, count: u64) -> Vec<Unit> {
        (0..count)
            .map(|i| Unit::new(UnitId(UnitId::TEMPORARY_BASE + i), unit_type, RED))
            .collect()
    }

    #[test]
    fn test_accepts_units_within_capacity() {
        let snapshot = snapshot();
        let turn = PlaceTurn::new(&snapshot, RED);
        assert!(turn.can_units_be_placed(HOME, &units(INFANTRY, 3)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(HOME, &units(INFANTRY, 4)),
            Err(PlacementRejection::CapacityExceeded { capacity: ProductionCapacity::Limited(3), .. })
        ));
    }

    #[test]
    fn test_overlay_counts_against_capacity() {
        let snapshot = snapshot();
        let mut turn = PlaceTurn::new(&snapshot, RED);
        assert!(turn.place(HOME, &units(INFANTRY, 2)).is_ok());
        assert_eq!(turn.placed_in(HOME).len(), 2);
        assert!(matches!(
            turn.can_units_be_placed(HOME, &units(INFANTRY, 2)),
            Err(PlacementRejection::CapacityExceeded { placed: 2, .. })
        ));
        assert_eq!(snapshot.territory(HOME).unwrap().units().len(), 1);
    }

    #[test]
    fn test_rejects_wrong_domain_and_owner() {
        let snapshot = snapshot();
        let turn = PlaceTurn::new(&snapshot, RED);
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(INFANTRY, 1)),
            Err(PlacementRejection::WrongDomain { .. })
        ));
        assert!(matches!(
            turn.can_units_be_placed(HOME, &units(DESTROYER, 1)),
            Err(PlacementRejection::WrongDomain { .. })
        ));
        assert!(matches!(
            turn.can_units_be_placed(BORDER, &units(INFANTRY, 1)),
            Err(PlacementRejection::TerritoryNotOwned { .. })
        ));
        let foreign = [Unit::new(UnitId(9), INFANTRY, BLUE)];
        assert!(matches!(
            turn.can_units_be_placed(HOME, &foreign),
            Err(PlacementRejection::NotOwned { .. })
        ));
        assert!(matches!(
            turn.can_units_be_placed(HOME, &[]),
            Err(PlacementRejection::NoUnits)
        ));
    }

    #[test]
    fn test_sea_zone_needs_adjacent_factory() {
        let snapshot = snapshot();
        let mut turn = PlaceTurn::new(&snapshot, RED);
        assert!(turn.can_units_be_placed(SEA, &units(DESTROYER, 2)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(FAR_SEA, &units(DESTROYER, 1)),
            Err(PlacementRejection::NoAdjacentProducer { .. })
        ));

        assert!(turn.place(HOME, &units(INFANTRY, 2)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(DESTROYER, 2)),
            Err(PlacementRejection::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn test_sea_zone_uses_producer_with_most_room() {
        const PORT: TerritoryId = TerritoryId(5);
        let mut snapshot = snapshot();
        snapshot.add_territory(
            Territory::land(PORT, "Port")
                .owned_by(RED)
                .with_attachment(TerritoryAttachment::with_production(2))
                .with_neighbors([SEA])
                .with_units([Unit::new(UnitId(2), FACTORY, RED)]),
        );
        snapshot.add_territory(
            Territory::water(SEA, "Home Sea").with_neighbors([HOME, PORT, FAR_SEA]),
        );
        let mut turn = PlaceTurn::new(&snapshot, RED);

        assert!(turn.can_units_be_placed(SEA, &units(DESTROYER, 3)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(DESTROYER, 4)),
            Err(PlacementRejection::CapacityExceeded { capacity: ProductionCapacity::Limited(3), .. })
        ));

        assert!(turn.place(HOME, &units(INFANTRY, 3)).is_ok());
        assert!(turn.can_units_be_placed(SEA, &units(DESTROYER, 2)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(DESTROYER, 3)),
            Err(PlacementRejection::CapacityExceeded { capacity: ProductionCapacity::Limited(2), .. })
        ));
    }

    #[test]
    fn test_build_limit_counts_overlay() {
        let snapshot = snapshot();
        let turn = PlaceTurn::new(&snapshot, RED);
        assert!(turn.can_units_be_placed(SEA, &units(BATTLESHIP, 1)).is_ok());
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(BATTLESHIP, 2)),
            Err(PlacementRejection::BuildLimitReached { max: 1, .. })
        ));

        let turn = turn.with_placed(SEA, &units(BATTLESHIP, 1));
        assert!(matches!(
            turn.can_units_be_placed(SEA, &units(BATTLESHIP, 1)),
            Err(PlacementRejection::BuildLimitReached { existing: 1, .. })
        ));
    }

    #[test]
    fn test_conquered_and_restricted() {
        let mut snapshot = snapshot();
        snapshot.territory_mut(HOME).unwrap().conquered_this_turn = true;
        let turn = PlaceTurn::new(&snapshot, RED);
        assert!(matches!(
            turn.can_units_be_placed(HOME, &units(INFANTRY, 1)),
            Err(PlacementRejection::ConqueredThisTurn { .. })
        ));

        let mut snapshot = self::snapshot();
        snapshot.add_player(Player::new(RED, "Red").with_rules(RulesAttachment {
            placement_restrictions: [HOME].into_iter().collect(),
            ..RulesAttachment::default()
        }));
        let turn = PlaceTurn::new(&snapshot, RED);
        assert!(matches!(
            turn.can_units_be_placed(HOME, &units(INFANTRY, 1)),
            Err(PlacementRejection::Restricted { .. })
        ));
    }

    #[test]
    fn test_unknown_territory_is_inconsistency() {
        let snapshot = snapshot();
        let turn = PlaceTurn::new(&snapshot, RED);
        let rejection = turn
            .can_units_be_placed(TerritoryId(77), &units(INFANTRY, 1))
            .unwrap_err();
        assert!(rejection.into_refusal().is_err());

        let refusal = turn.can_units_be_placed(BORDER, &units(INFANTRY, 1)).unwrap_err();
        assert!(refusal.into_refusal().is_ok());
    }

    #[test]
    fn test_can_move_land_units() {
        let mut snapshot = snapshot();
        assert!(can_move_land_units(&snapshot, HOME, RED).unwrap());
        assert!(!can_move_land_units(&snapshot, BORDER, RED).unwrap());
        assert!(!can_move_land_units(&snapshot, SEA, RED).unwrap());

        snapshot.add_alliance([RED, BLUE]);
        assert!(can_move_land_units(&snapshot, BORDER, RED).unwrap());

        snapshot.territory_mut(BORDER).unwrap().attachment =
            Some(TerritoryAttachment::with_production(2).impassable());
        assert!(!can_move_land_units(&snapshot, BORDER, RED).unwrap());
    }

    #[test]
    fn test_has_owned_land_factory() {
        let snapshot = snapshot();
        let home = snapshot.territory(HOME).unwrap();
        let border = snapshot.territory(BORDER).unwrap();
        assert!(has_owned_land_factory(&snapshot, home, RED).unwrap());
        assert!(!has_owned_land_factory(&snapshot, home, BLUE).unwrap());
        assert!(!has_owned_land_factory(&snapshot, border, RED).unwrap());
    }
}
