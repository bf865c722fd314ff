//! Asking the rules engine whether a tentative placement is legal.
//!
//! The planner only talks to the rules through [`PlacementOracle`]. The
//! stock [`RulesOracle`] answers each question with a fresh
//! [`PlaceTurn`] over the snapshot, so nothing it is asked can leak into
//! the game state or into the next question.

use crate::ai::purchase_option::PurchaseOption;
use crate::error::Result;
use crate::placement::{PlaceTurn, PlacementResult};
use crate::player::PlayerId;
use crate::snapshot::GameSnapshot;
use crate::territory::TerritoryId;
use crate::unit::{Unit, UnitFactory};

/// Side-effect-free placement legality check.
pub trait PlacementOracle {
    /// Ask whether `player` may place `units` in `territory` given that
    /// `already_placed` is placed there this turn.
    ///
    /// # Errors
    ///
    /// Returns the rules engine's reason for refusing.
    fn check_placement(
        &self,
        territory: TerritoryId,
        units: &[Unit],
        player: PlayerId,
        already_placed: &[Unit],
    ) -> PlacementResult;
}

/// Oracle backed by the placement rules engine.
#[derive(Debug, Clone, Copy)]
pub struct RulesOracle<'a> {
    snapshot: &'a GameSnapshot,
}

impl<'a> RulesOracle<'a> {
    /// Oracle over a snapshot.
    #[must_use]
    pub const fn new(snapshot: &'a GameSnapshot) -> Self {
        Self { snapshot }
    }
}

impl PlacementOracle for RulesOracle<'_> {
    fn check_placement(
        &self,
        territory: TerritoryId,
        units: &[Unit],
        player: PlayerId,
        already_placed: &[Unit],
    ) -> PlacementResult {
        PlaceTurn::new(self.snapshot, player)
            .with_placed(territory, already_placed)
            .can_units_be_placed(territory, units)
    }
}

/// Check whether units may be placed. A refusal is `Ok(false)`.
///
/// # Errors
///
/// Only when the question referenced unknown data.
pub fn can_units_be_placed<O: PlacementOracle + ?Sized>(
    oracle: &O,
    territory: TerritoryId,
    units: &[Unit],
    player: PlayerId,
    already_placed: &[Unit],
) -> Result<bool> {
    match oracle.check_placement(territory, units, player, already_placed) {
        Ok(()) => Ok(true),
        Err(rejection) => {
            let refusal = rejection.into_refusal()?;
            tracing::trace!(%territory, reason = %refusal, "placement refused");
            Ok(false)
        }
    }
}

/// Check whether one batch of an option may be placed in a territory.
pub fn can_territory_use_purchase_option<O: PlacementOracle + ?Sized>(
    oracle: &O,
    factory: &mut UnitFactory,
    option: &PurchaseOption,
    territory: TerritoryId,
    player: PlayerId,
    already_placed: &[Unit],
) -> Result<bool> {
    let units = option.materialize(factory, player)?;
    can_units_be_placed(oracle, territory, &units, player, already_placed)
}

/// Options whose batch may be placed in a territory, in catalog order.
pub fn purchase_options_for_territory<O: PlacementOracle + ?Sized>(
    oracle: &O,
    factory: &mut UnitFactory,
    options: &[PurchaseOption],
    territory: TerritoryId,
    player: PlayerId,
    already_placed: &[Unit],
) -> Result<Vec<PurchaseOption>> {
    let mut usable = Vec::new();
    for option in options {
        if can_territory_use_purchase_option(
            oracle,
            factory,
            option,
            territory,
            player,
            already_placed,
        )? {
            usable.push(option.clone());
        }
    }
    Ok(usable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementRejection;
    use crate::player::{Player, ProductionRule};
    use crate::resources::{ResourceCollection, ResourceId};
    use crate::territory::{Territory, TerritoryAttachment};
    use crate::unit::{Domain, UnitId, UnitType, UnitTypeId};

    const RED: PlayerId = PlayerId(1);
    const INFANTRY: UnitTypeId = UnitTypeId(1);
    const FACTORY: UnitTypeId = UnitTypeId(2);
    const DESTROYER: UnitTypeId = UnitTypeId(3);
    const HOME: TerritoryId = TerritoryId(1);

    fn snapshot() -> GameSnapshot {
        let mut snapshot = GameSnapshot::new();
        snapshot.register_unit_type(UnitType::new(INFANTRY, "infantry", 1, 2));
        snapshot.register_unit_type(UnitType::new(FACTORY, "factory", 0, 0).as_factory());
        snapshot.register_unit_type(
            UnitType::new(DESTROYER, "destroyer", 2, 2).with_domain(Domain::Sea),
        );
        snapshot.add_player(Player::new(RED, "Red"));
        snapshot.add_territory(
            Territory::land(HOME, "Home")
                .owned_by(RED)
                .with_attachment(TerritoryAttachment::with_production(2))
                .with_units([Unit::new(UnitId(1), FACTORY, RED)]),
        );
        snapshot
    }

    fn option(unit_type: &UnitType, quantity: u32) -> PurchaseOption {
        let rule = ProductionRule::new(
            "buy",
            ResourceCollection::single(ResourceId::PUS, 3),
            unit_type.id,
            quantity,
        );
        PurchaseOption::from_rule(&rule, unit_type, ResourceId::PUS)
    }

    #[test]
    fn test_oracle_leaves_snapshot_untouched() {
        let snapshot = snapshot();
        let before = snapshot.state_hash().unwrap();
        let oracle = RulesOracle::new(&snapshot);
        let units = [Unit::new(UnitId(100), INFANTRY, RED)];

        assert!(oracle.check_placement(HOME, &units, RED, &[]).is_ok());
        assert!(matches!(
            oracle.check_placement(HOME, &units, RED, &[units[0].clone(), units[0].clone()]),
            Err(PlacementRejection::CapacityExceeded { .. })
        ));
        assert_eq!(snapshot.state_hash().unwrap(), before);
    }

    #[test]
    fn test_options_for_territory() {
        let snapshot = snapshot();
        let oracle = RulesOracle::new(&snapshot);
        let mut factory = UnitFactory::temporary();
        let registry = &snapshot.unit_types;
        let options = vec![
            option(registry.get(INFANTRY).unwrap(), 1),
            option(registry.get(INFANTRY).unwrap(), 3),
            option(registry.get(DESTROYER).unwrap(), 1),
        ];

        let usable =
            purchase_options_for_territory(&oracle, &mut factory, &options, HOME, RED, &[])
                .unwrap();
        assert_eq!(usable.len(), 1);
        assert_eq!(usable[0].quantity, 1);
    }

    #[test]
    fn test_unknown_territory_propagates() {
        let snapshot = snapshot();
        let oracle = RulesOracle::new(&snapshot);
        let units = [Unit::new(UnitId(100), INFANTRY, RED)];
        assert!(can_units_be_placed(&oracle, TerritoryId(50), &units, RED, &[]).is_err());
        assert!(!can_units_be_placed(&oracle, HOME, &units, PlayerId(1), &[
            units[0].clone(),
            units[0].clone()
        ])
        .unwrap());
    }
}
