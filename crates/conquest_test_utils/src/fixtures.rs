//! Test fixtures and helpers.
//!
//! Pre-built snapshots, unit types and production frontiers
//! for consistent testing.
//!
//! The standard map is a two-player strip:
//!
//! ```text
//!  [Red Capital] - [Red Province] - [Blue Province] - [Blue Capital]
//!        \            /                    \              /
//!         [West Sea] ------------------------- [East Sea]
//! ```
//!
//! Both capitals are original factory sites worth 8. The provinces are
//! worth 3 and each holds a factory built later, so their output is
//! limited by production value.

use conquest_core::math::Fixed;
use conquest_core::player::{Player, PlayerId, ProductionRule, RulesAttachment};
use conquest_core::resources::{ResourceCollection, ResourceId};
use conquest_core::snapshot::GameSnapshot;
use conquest_core::territory::{Territory, TerritoryAttachment, TerritoryId};
use conquest_core::unit::{Domain, Unit, UnitId, UnitType, UnitTypeId};

/// Player ids used by the fixtures.
pub mod players {
    use super::PlayerId;

    /// The red side.
    pub const RED: PlayerId = PlayerId(1);
    /// The blue side.
    pub const BLUE: PlayerId = PlayerId(2);
}

/// Unit type ids used by the fixtures.
pub mod unit_types {
    use super::UnitTypeId;

    /// 1/2 land, costs 3.
    pub const INFANTRY: UnitTypeId = UnitTypeId(1);
    /// 2/2 land, costs 4.
    pub const ARTILLERY: UnitTypeId = UnitTypeId(2);
    /// 3/3 land, costs 6.
    pub const TANK: UnitTypeId = UnitTypeId(3);
    /// 3/4 air, costs 10.
    pub const FIGHTER: UnitTypeId = UnitTypeId(4);
    /// 0/1 sea transport, costs 7.
    pub const TRANSPORT: UnitTypeId = UnitTypeId(5);
    /// 2/2 sea, costs 8.
    pub const DESTROYER: UnitTypeId = UnitTypeId(6);
    /// 3/3 sea with bombardment, costs 12.
    pub const CRUISER: UnitTypeId = UnitTypeId(7);
    /// Factory, costs 15.
    pub const FACTORY: UnitTypeId = UnitTypeId(8);
}

/// Territory ids of the standard map.
pub mod territories {
    use super::TerritoryId;

    /// Red's original factory site.
    pub const RED_CAPITAL: TerritoryId = TerritoryId(1);
    /// Red's frontline province.
    pub const RED_PROVINCE: TerritoryId = TerritoryId(2);
    /// Blue's frontline province.
    pub const BLUE_PROVINCE: TerritoryId = TerritoryId(3);
    /// Blue's original factory site.
    pub const BLUE_CAPITAL: TerritoryId = TerritoryId(4);
    /// Sea zone touching both red territories.
    pub const WEST_SEA: TerritoryId = TerritoryId(10);
    /// Sea zone touching both blue territories.
    pub const EAST_SEA: TerritoryId = TerritoryId(11);
}

use players::{BLUE, RED};
use territories::{BLUE_CAPITAL, BLUE_PROVINCE, EAST_SEA, RED_CAPITAL, RED_PROVINCE, WEST_SEA};
use unit_types::{ARTILLERY, CRUISER, DESTROYER, FACTORY, FIGHTER, INFANTRY, TANK, TRANSPORT};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> Fixed {
    Fixed::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Planning code never uses floats; this is only for
/// convenient assertions.
#[must_use]
pub fn fixed_f(n: f64) -> Fixed {
    Fixed::from_num(n)
}

/// An amount of PUs.
#[must_use]
pub fn pus(amount: i32) -> ResourceCollection {
    ResourceCollection::single(ResourceId::PUS, amount)
}

/// Every unit type the fixtures use.
#[must_use]
pub fn standard_unit_types() -> Vec<UnitType> {
    vec![
        UnitType::new(INFANTRY, "infantry", 1, 2).with_value(3),
        UnitType::new(ARTILLERY, "artillery", 2, 2).with_value(4),
        UnitType::new(TANK, "tank", 3, 3)
            .with_movement(2)
            .with_value(6),
        UnitType::new(FIGHTER, "fighter", 3, 4)
            .with_domain(Domain::Air)
            .with_movement(4)
            .with_value(10),
        UnitType::new(TRANSPORT, "transport", 0, 1)
            .with_domain(Domain::Sea)
            .with_movement(2)
            .with_transport_capacity(2)
            .with_value(7),
        UnitType::new(DESTROYER, "destroyer", 2, 2)
            .with_domain(Domain::Sea)
            .with_movement(2)
            .with_value(8),
        UnitType::new(CRUISER, "cruiser", 3, 3)
            .with_domain(Domain::Sea)
            .with_movement(2)
            .with_bombard()
            .with_value(12),
        UnitType::new(FACTORY, "factory", 0, 0)
            .as_factory()
            .with_movement(0)
            .with_value(15),
    ]
}

/// One rule per standard unit type, one unit per purchase.
#[must_use]
pub fn standard_frontier() -> Vec<ProductionRule> {
    [
        ("buyInfantry", INFANTRY, 3),
        ("buyArtillery", ARTILLERY, 4),
        ("buyTank", TANK, 6),
        ("buyFighter", FIGHTER, 10),
        ("buyTransport", TRANSPORT, 7),
        ("buyDestroyer", DESTROYER, 8),
        ("buyCruiser", CRUISER, 12),
        ("buyFactory", FACTORY, 15),
    ]
    .into_iter()
    .map(|(name, unit_type, cost)| ProductionRule::new(name, pus(cost), unit_type, 1))
    .collect()
}

/// The standard two-player map with `budget` PUs for each side.
#[must_use]
pub fn standard_snapshot(budget: i32) -> GameSnapshot {
    let mut snapshot = GameSnapshot::new();
    snapshot.resource_names.insert(ResourceId::PUS, "PUs".to_string());
    for unit_type in standard_unit_types() {
        snapshot.register_unit_type(unit_type);
    }
    for (id, name) in [(RED, "Red"), (BLUE, "Blue")] {
        snapshot.add_player(
            Player::new(id, name)
                .ai()
                .with_resources(pus(budget))
                .with_frontier(standard_frontier()),
        );
    }

    snapshot.add_territory(
        Territory::land(RED_CAPITAL, "Red Capital")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(8).original_factory())
            .with_neighbors([RED_PROVINCE, WEST_SEA])
            .with_units([Unit::new(UnitId(1), FACTORY, RED)]),
    );
    snapshot.add_territory(
        Territory::land(RED_PROVINCE, "Red Province")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(3))
            .with_neighbors([RED_CAPITAL, BLUE_PROVINCE, WEST_SEA])
            .with_units([
                Unit::new(UnitId(2), FACTORY, RED),
                Unit::new(UnitId(3), INFANTRY, RED),
            ]),
    );
    snapshot.add_territory(
        Territory::land(BLUE_PROVINCE, "Blue Province")
            .owned_by(BLUE)
            .with_attachment(TerritoryAttachment::with_production(3))
            .with_neighbors([RED_PROVINCE, BLUE_CAPITAL, EAST_SEA])
            .with_units([
                Unit::new(UnitId(4), FACTORY, BLUE),
                Unit::new(UnitId(5), INFANTRY, BLUE),
            ]),
    );
    snapshot.add_territory(
        Territory::land(BLUE_CAPITAL, "Blue Capital")
            .owned_by(BLUE)
            .with_attachment(TerritoryAttachment::with_production(8).original_factory())
            .with_neighbors([BLUE_PROVINCE, EAST_SEA])
            .with_units([Unit::new(UnitId(6), FACTORY, BLUE)]),
    );
    snapshot.add_territory(
        Territory::water(WEST_SEA, "West Sea").with_neighbors([RED_CAPITAL, RED_PROVINCE, EAST_SEA]),
    );
    snapshot.add_territory(
        Territory::water(EAST_SEA, "East Sea").with_neighbors([
            BLUE_PROVINCE,
            BLUE_CAPITAL,
            WEST_SEA,
        ]),
    );
    snapshot
}

/// The standard map with a per-territory placement cap for both players.
#[must_use]
pub fn capped_snapshot(budget: i32, max_place: i32) -> GameSnapshot {
    let mut snapshot = standard_snapshot(budget);
    for player in snapshot.players.values_mut() {
        player.rules = Some(RulesAttachment {
            max_place_per_territory: Some(max_place),
            ..RulesAttachment::default()
        });
    }
    snapshot
}

/// One factory territory worth `production` next to one sea zone.
///
/// Red is the only player. The frontier sells `rules`; every unit type of
/// [`standard_unit_types`] is registered.
#[must_use]
pub fn single_factory_snapshot(
    production: i32,
    budget: i32,
    rules: Vec<ProductionRule>,
) -> GameSnapshot {
    let mut snapshot = GameSnapshot::new();
    for unit_type in standard_unit_types() {
        snapshot.register_unit_type(unit_type);
    }
    snapshot.add_player(
        Player::new(RED, "Red")
            .ai()
            .with_resources(pus(budget))
            .with_frontier(rules),
    );
    snapshot.add_territory(
        Territory::land(RED_PROVINCE, "Red Province")
            .owned_by(RED)
            .with_attachment(TerritoryAttachment::with_production(production))
            .with_neighbors([WEST_SEA])
            .with_units([Unit::new(UnitId(1), FACTORY, RED)]),
    );
    snapshot.add_territory(Territory::water(WEST_SEA, "West Sea").with_neighbors([RED_PROVINCE]));
    snapshot
}

/// A rule selling `quantity` units of `unit_type` for `cost` PUs.
#[must_use]
pub fn rule(unit_type: UnitTypeId, quantity: u32, cost: i32) -> ProductionRule {
    ProductionRule::new(format!("buy{quantity}x{unit_type}"), pus(cost), unit_type, quantity)
}
