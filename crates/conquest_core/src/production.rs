//! Per-territory production capacity.
//!
//! How many units a territory can produce in one turn depends on the
//! factories in it, who originally owned those factories, whether the
//! territory is an original factory site, and the owning player's
//! placement rules. The resulting [`ProductionCapacity`] bounds every
//! placement the planner queues there.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::{Player, PlayerId};
use crate::snapshot::GameSnapshot;
use crate::territory::{Territory, TerritoryId};
use crate::unit::Unit;
use crate::unit_collection::UnitCollection;

/// Extra output granted by the increased factory production technology.
pub const INCREASED_FACTORY_BONUS: i32 = 2;

/// Territory production value needed before the technology bonus applies.
pub const INCREASED_FACTORY_MIN_PRODUCTION: i32 = 3;

/// How many more units a territory can take this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductionCapacity {
    /// At most this many.
    Limited(u32),
    /// No ceiling.
    Unlimited,
}

impl ProductionCapacity {
    /// Capacity from a possibly negative unit count (negative means none).
    #[must_use]
    pub fn limited(units: i32) -> Self {
        Self::Limited(u32::try_from(units).unwrap_or(0))
    }

    /// Check whether `quantity` more units fit.
    #[must_use]
    pub const fn can_fit(self, quantity: u32) -> bool {
        match self {
            Self::Limited(n) => quantity <= n,
            Self::Unlimited => true,
        }
    }

    /// Use up `quantity` units of capacity.
    ///
    /// Returns `false` and leaves the capacity untouched when they do not fit.
    pub fn consume(&mut self, quantity: u32) -> bool {
        match self {
            Self::Limited(n) if *n >= quantity => {
                *n -= quantity;
                true
            }
            Self::Limited(_) => false,
            Self::Unlimited => true,
        }
    }

    /// The finite limit, if any.
    #[must_use]
    pub const fn limit(self) -> Option<u32> {
        match self {
            Self::Limited(n) => Some(n),
            Self::Unlimited => None,
        }
    }

    /// Check whether nothing more fits.
    #[must_use]
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Self::Limited(0))
    }
}

impl fmt::Display for ProductionCapacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{n}"),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Switches for [`production_potential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotentialOptions {
    /// Subtract bombing damage from each factory's output.
    pub account_for_damage: bool,
    /// Never report a negative potential.
    pub clamp_to_zero: bool,
}

impl PotentialOptions {
    /// Damage counted and result clamped, as the capacity calculation uses it.
    pub const FULL: Self = Self {
        account_for_damage: true,
        clamp_to_zero: true,
    };
}

impl Default for PotentialOptions {
    fn default() -> Self {
        Self::FULL
    }
}

/// Units `player` could produce from the factories among `units`.
///
/// Each factory contributes its fixed output if its type has one, otherwise
/// the territory's production value, less damage and plus the technology
/// bonus. The best factory wins. No factory means zero.
pub fn production_potential(
    snapshot: &GameSnapshot,
    units: &UnitCollection,
    territory: &Territory,
    player: &Player,
    options: PotentialOptions,
) -> Result<i32> {
    let territory_production = territory.production();
    let tech_bonus = if player.techs.increased_factory_production
        && territory_production >= INCREASED_FACTORY_MIN_PRODUCTION
    {
        INCREASED_FACTORY_BONUS
    } else {
        0
    };

    let mut best: Option<i32> = None;
    for unit in units {
        if unit.owner != player.id || unit.is_transported() {
            continue;
        }
        let unit_type = snapshot.unit_type(unit.unit_type)?;
        if !unit_type.can_produce_units {
            continue;
        }
        let mut output = unit_type
            .can_produce_x_units
            .unwrap_or(territory_production);
        if options.account_for_damage {
            output -= unit.damage;
        }
        output += tech_bonus;
        best = Some(best.map_or(output, |b| b.max(output)));
    }

    let potential = best.unwrap_or(0);
    Ok(if options.clamp_to_zero {
        potential.max(0)
    } else {
        potential
    })
}

/// The player's untransported production units in a territory, restricted
/// to units that belong in the territory's domain.
pub fn factory_units<'a>(
    snapshot: &GameSnapshot,
    territory: &'a Territory,
    player: PlayerId,
) -> Result<Vec<&'a Unit>> {
    let mut factories = Vec::new();
    for unit in territory.units() {
        if unit.owner != player || unit.is_transported() {
            continue;
        }
        let unit_type = snapshot.unit_type(unit.unit_type)?;
        let right_domain = if territory.is_water {
            !unit_type.is_land()
        } else {
            !unit_type.is_sea()
        };
        if unit_type.can_produce_units && right_domain {
            factories.push(unit);
        }
    }
    Ok(factories)
}

/// Original owner of a territory's factories.
///
/// Prefers a factory originally owned by `player`; otherwise the first one.
///
/// # Errors
///
/// Returns [`GameError::NoFactory`] when `factories` is empty.
pub fn original_factory_owner(
    territory: TerritoryId,
    factories: &[&Unit],
    player: PlayerId,
) -> Result<PlayerId> {
    factories
        .iter()
        .map(|unit| unit.original_owner())
        .find(|&owner| owner == player)
        .or_else(|| factories.first().map(|unit| unit.original_owner()))
        .ok_or(GameError::NoFactory { territory })
}

/// Maximum units `player` can produce in a territory this turn.
///
/// An original factory site still held by its original owner is unlimited
/// unless the player's rules cap placement per territory. Otherwise a
/// place-anywhere rule makes it unlimited, and failing that the factory
/// potential decides.
pub fn territory_capacity(
    snapshot: &GameSnapshot,
    territory_id: TerritoryId,
    player_id: PlayerId,
) -> Result<ProductionCapacity> {
    let territory = snapshot.territory(territory_id)?;
    let player = snapshot.player(player_id)?;

    let factories = factory_units(snapshot, territory, player_id)?;
    let player_is_original_owner = if factories.is_empty() {
        false
    } else {
        original_factory_owner(territory_id, &factories, player_id)? == player_id
    };

    let capacity = if territory.is_original_factory() && player_is_original_owner {
        match player.max_place_per_territory() {
            Some(cap) => ProductionCapacity::limited(cap),
            None => ProductionCapacity::Unlimited,
        }
    } else if player.can_place_anywhere() {
        ProductionCapacity::Unlimited
    } else {
        ProductionCapacity::limited(production_potential(
            snapshot,
            territory.units(),
            territory,
            player,
            PotentialOptions::FULL,
        )?)
    };

    tracing::trace!(
        territory = %territory_id,
        player = %player_id,
        factories = factories.len(),
        %capacity,
        "territory capacity"
    );
    Ok(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{RulesAttachment, TechAdvances};
    use crate::territory::TerritoryAttachment;
    use crate::unit::{UnitId, UnitType, UnitTypeId};

    const RED: PlayerId = PlayerId(1);
    const BLUE: PlayerId = PlayerId(2);
    const INFANTRY: UnitTypeId = UnitTypeId(1);
    const FACTORY: UnitTypeId = UnitTypeId(2);
    const MINOR_FACTORY: UnitTypeId = UnitTypeId(3);
    const HOME: TerritoryId = TerritoryId(1);

    fn snapshot_with(home: Territory, red: Player) -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        snapshot.register_unit_type(UnitType::new(INFANTRY, "infantry", 1, 2));
        snapshot.register_unit_type(UnitType::new(FACTORY, "factory", 0, 0).as_factory());
        snapshot.register_unit_type(
            UnitType::new(MINOR_FACTORY, "minor_factory", 0, 0)
                .as_factory()
                .with_fixed_production(3),
        );
        snapshot.add_player(red);
        snapshot.add_player(Player::new(BLUE, "Blue"));
        snapshot.add_territory(home);
        snapshot
    }

    fn home(production: i32) -> Territory {
        Territory::land(HOME, "Home")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(production))
    }

    #[test]
    fn test_capacity_consume() {
        let mut capacity = ProductionCapacity::Limited(5);
        assert!(capacity.consume(2));
        assert!(!capacity.consume(4));
        assert_eq!(capacity, ProductionCapacity::Limited(3));
        assert!(capacity.consume(3));
        assert!(capacity.is_exhausted());

        let mut unlimited = ProductionCapacity::Unlimited;
        assert!(unlimited.consume(1_000));
        assert!(unlimited.can_fit(u32::MAX));
        assert_eq!(ProductionCapacity::limited(-4), ProductionCapacity::Limited(0));
    }

    #[test]
    fn test_zero_factories_gives_zero_capacity() {
        let territory = home(8).with_units([Unit::new(UnitId(1), INFANTRY, RED)]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));

        let capacity = territory_capacity(&snapshot, HOME, RED).unwrap();
        assert_eq!(capacity, ProductionCapacity::Limited(0));
    }

    #[test]
    fn test_original_factory_is_unlimited() {
        let territory = Territory::land(HOME, "Capital")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(8).original_factory())
            .with_units([Unit::new(UnitId(1), FACTORY, RED)]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));

        let capacity = territory_capacity(&snapshot, HOME, RED).unwrap();
        assert_eq!(capacity, ProductionCapacity::Unlimited);
    }

    #[test]
    fn test_original_factory_respects_place_cap() {
        let territory = Territory::land(HOME, "Capital")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(8).original_factory())
            .with_units([Unit::new(UnitId(1), FACTORY, RED)]);
        let red = Player::new(RED, "Red").with_rules(RulesAttachment {
            max_place_per_territory: Some(4),
            ..RulesAttachment::default()
        });
        let snapshot = snapshot_with(territory, red);

        let capacity = territory_capacity(&snapshot, HOME, RED).unwrap();
        assert_eq!(capacity, ProductionCapacity::Limited(4));
    }

    #[test]
    fn test_captured_factory_uses_potential() {
        let territory = Territory::land(HOME, "Capital")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(6).original_factory())
            .with_units([Unit::new(UnitId(1), FACTORY, RED).with_original_owner(BLUE)]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));

        let capacity = territory_capacity(&snapshot, HOME, RED).unwrap();
        assert_eq!(capacity, ProductionCapacity::Limited(6));
    }

    #[test]
    fn test_place_anywhere_is_unlimited() {
        let red = Player::new(RED, "Red").with_rules(RulesAttachment {
            placement_any_territory: true,
            ..RulesAttachment::default()
        });
        let snapshot = snapshot_with(home(1), red);

        let capacity = territory_capacity(&snapshot, HOME, RED).unwrap();
        assert_eq!(capacity, ProductionCapacity::Unlimited);
    }

    #[test]
    fn test_potential_takes_best_factory_less_damage() {
        let territory = home(5).with_units([
            Unit::new(UnitId(1), FACTORY, RED).with_damage(4),
            Unit::new(UnitId(2), MINOR_FACTORY, RED),
        ]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));
        let territory = snapshot.territory(HOME).unwrap();
        let player = snapshot.player(RED).unwrap();

        let potential = production_potential(
            &snapshot,
            territory.units(),
            territory,
            player,
            PotentialOptions::FULL,
        )
        .unwrap();
        assert_eq!(potential, 3);

        let undamaged = production_potential(
            &snapshot,
            territory.units(),
            territory,
            player,
            PotentialOptions {
                account_for_damage: false,
                clamp_to_zero: true,
            },
        )
        .unwrap();
        assert_eq!(undamaged, 5);
    }

    #[test]
    fn test_potential_clamps_heavy_damage() {
        let territory = home(2).with_units([Unit::new(UnitId(1), FACTORY, RED).with_damage(5)]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));
        let territory = snapshot.territory(HOME).unwrap();
        let player = snapshot.player(RED).unwrap();

        let clamped =
            production_potential(&snapshot, territory.units(), territory, player, PotentialOptions::FULL)
                .unwrap();
        let raw = production_potential(
            &snapshot,
            territory.units(),
            territory,
            player,
            PotentialOptions {
                account_for_damage: true,
                clamp_to_zero: false,
            },
        )
        .unwrap();
        assert_eq!(clamped, 0);
        assert_eq!(raw, -3);
    }

    #[test]
    fn test_technology_bonus_needs_productive_territory() {
        let techs = TechAdvances {
            increased_factory_production: true,
        };
        let rich = home(3).with_units([Unit::new(UnitId(1), FACTORY, RED)]);
        let snapshot = snapshot_with(rich, Player::new(RED, "Red").with_techs(techs));
        assert_eq!(
            territory_capacity(&snapshot, HOME, RED).unwrap(),
            ProductionCapacity::Limited(5)
        );

        let poor = home(2).with_units([Unit::new(UnitId(1), FACTORY, RED)]);
        let snapshot = snapshot_with(poor, Player::new(RED, "Red").with_techs(techs));
        assert_eq!(
            territory_capacity(&snapshot, HOME, RED).unwrap(),
            ProductionCapacity::Limited(2)
        );
    }

    #[test]
    fn test_transported_and_foreign_factories_ignored() {
        let territory = home(4).with_units([
            Unit::new(UnitId(1), FACTORY, RED).carried_by(UnitId(9)),
            Unit::new(UnitId(2), FACTORY, BLUE),
        ]);
        let snapshot = snapshot_with(territory, Player::new(RED, "Red"));
        let territory = snapshot.territory(HOME).unwrap();

        assert!(factory_units(&snapshot, territory, RED).unwrap().is_empty());
        assert_eq!(
            territory_capacity(&snapshot, HOME, RED).unwrap(),
            ProductionCapacity::Limited(0)
        );
    }

    #[test]
    fn test_original_factory_owner() {
        let own = Unit::new(UnitId(1), FACTORY, RED);
        let captured = Unit::new(UnitId(2), FACTORY, RED).with_original_owner(BLUE);

        assert_eq!(original_factory_owner(HOME, &[&captured, &own], RED).unwrap(), RED);
        assert_eq!(original_factory_owner(HOME, &[&captured], RED).unwrap(), BLUE);
        assert!(matches!(
            original_factory_owner(HOME, &[], RED),
            Err(GameError::NoFactory { territory: HOME })
        ));
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let snapshot = snapshot_with(home(3), Player::new(RED, "Red"));
        assert!(matches!(
            territory_capacity(&snapshot, TerritoryId(99), RED),
            Err(GameError::UnknownTerritory(_))
        ));
        assert!(matches!(
            territory_capacity(&snapshot, HOME, PlayerId(99)),
            Err(GameError::UnknownPlayer(_))
        ));
    }
}
