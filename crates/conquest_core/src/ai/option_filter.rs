//! Pruning purchase options that cannot be bought right now.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ai::purchase_option::PurchaseOption;
use crate::ai::purchase_territory::PurchaseTerritory;
use crate::ai::resource_tracker::ResourceTracker;
use crate::player::PlayerId;
use crate::production::ProductionCapacity;
use crate::snapshot::GameSnapshot;
use crate::territory::TerritoryId;
use crate::unit::{BuildLimit, Unit, UnitTypeId};

/// Units of each type a player has built or queued during a pass.
///
/// Seeded once from the board and the queues, then bumped as options are
/// accepted, so build ceilings never need a map-wide rescan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTally {
    counts: BTreeMap<UnitTypeId, usize>,
}

impl BuildTally {
    /// Empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count the player's units on the board, in `units_to_place`, and
    /// queued in any place territory.
    #[must_use]
    pub fn from_snapshot(
        snapshot: &GameSnapshot,
        player: PlayerId,
        units_to_place: &[Unit],
        purchase_territories: &BTreeMap<TerritoryId, PurchaseTerritory>,
    ) -> Self {
        let mut tally = Self::new();
        for unit_type in snapshot.unit_types.iter() {
            let on_board = snapshot.count_owned_units(player, unit_type.id);
            if on_board > 0 {
                tally.counts.insert(unit_type.id, on_board);
            }
        }
        let queued = purchase_territories
            .values()
            .flat_map(PurchaseTerritory::queued_units);
        for unit in units_to_place.iter().chain(queued) {
            if unit.owner == player {
                tally.record(unit.unit_type, 1);
            }
        }
        tally
    }

    /// Units of a type built or queued so far.
    #[must_use]
    pub fn currently_built(&self, unit_type: UnitTypeId) -> usize {
        self.counts.get(&unit_type).copied().unwrap_or(0)
    }

    /// Record `quantity` more units of a type.
    pub fn record(&mut self, unit_type: UnitTypeId, quantity: usize) {
        *self.counts.entry(unit_type).or_insert(0) += quantity;
    }

    /// Check the ceiling leaves room for the option's whole batch.
    #[must_use]
    pub fn allows(&self, option: &PurchaseOption) -> bool {
        match option.max_built_per_player {
            BuildLimit::Unlimited => true,
            BuildLimit::Forbidden => false,
            BuildLimit::AtMost(max) => {
                let built = self.currently_built(option.unit_type);
                (max as usize).saturating_sub(built) >= option.quantity as usize
            }
        }
    }
}

/// Drop options that are unaffordable, too big for the remaining
/// production, or over their build ceiling. Order is preserved.
pub fn filter_options(
    options: &mut Vec<PurchaseOption>,
    tracker: &ResourceTracker,
    remaining_production: ProductionCapacity,
    tally: &BuildTally,
) {
    options.retain(|option| {
        if !tracker.has_enough(option) || !remaining_production.can_fit(option.quantity) {
            return false;
        }
        tally.allows(option)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Player, ProductionRule};
    use crate::resources::{ResourceCollection, ResourceId};
    use crate::territory::Territory;
    use crate::unit::{UnitId, UnitType};

    const RED: PlayerId = PlayerId(1);
    const BLUE: PlayerId = PlayerId(2);
    const INFANTRY: UnitTypeId = UnitTypeId(1);
    const ARTILLERY: UnitTypeId = UnitTypeId(2);
    const ELITE: UnitTypeId = UnitTypeId(3);
    const RELIC: UnitTypeId = UnitTypeId(4);
    const HOME: TerritoryId = TerritoryId(1);

    fn option(unit_type: UnitType, cost: i32, quantity: u32) -> PurchaseOption {
        let rule = ProductionRule::new(
            format!("buy{}", unit_type.name),
            ResourceCollection::single(ResourceId::PUS, cost),
            unit_type.id,
            quantity,
        );
        PurchaseOption::from_rule(&rule, &unit_type, ResourceId::PUS)
    }

    fn catalog() -> Vec<PurchaseOption> {
        vec![
            option(UnitType::new(INFANTRY, "Infantry", 1, 2), 3, 1),
            option(UnitType::new(ARTILLERY, "Artillery", 2, 2), 8, 2),
            option(
                UnitType::new(ELITE, "Elite", 3, 3).with_build_limit(BuildLimit::AtMost(3)),
                5,
                2,
            ),
            option(
                UnitType::new(RELIC, "Relic", 9, 9).with_build_limit(BuildLimit::Forbidden),
                1,
                1,
            ),
        ]
    }

    fn kept(options: &[PurchaseOption]) -> Vec<UnitTypeId> {
        options.iter().map(|o| o.unit_type).collect()
    }

    fn tracker(pus: i32) -> ResourceTracker {
        ResourceTracker::new(ResourceCollection::single(ResourceId::PUS, pus))
    }

    #[test]
    fn test_filters_unaffordable_and_oversized() {
        let mut options = catalog();
        filter_options(
            &mut options,
            &tracker(6),
            ProductionCapacity::Limited(5),
            &BuildTally::new(),
        );
        assert_eq!(kept(&options), vec![INFANTRY, ELITE]);

        let mut options = catalog();
        filter_options(
            &mut options,
            &tracker(100),
            ProductionCapacity::Limited(1),
            &BuildTally::new(),
        );
        assert_eq!(kept(&options), vec![INFANTRY]);
    }

    #[test]
    fn test_build_ceiling_counts_whole_batch() {
        let mut tally = BuildTally::new();
        tally.record(ELITE, 1);
        let mut options = catalog();
        filter_options(&mut options, &tracker(100), ProductionCapacity::Unlimited, &tally);
        assert_eq!(kept(&options), vec![INFANTRY, ARTILLERY, ELITE]);

        tally.record(ELITE, 1);
        let mut options = catalog();
        filter_options(&mut options, &tracker(100), ProductionCapacity::Unlimited, &tally);
        assert_eq!(kept(&options), vec![INFANTRY, ARTILLERY]);
    }

    #[test]
    fn test_tally_from_board_and_queues() {
        let mut snapshot = GameSnapshot::new();
        snapshot.register_unit_type(UnitType::new(INFANTRY, "Infantry", 1, 2));
        snapshot.register_unit_type(UnitType::new(ELITE, "Elite", 3, 3));
        snapshot.add_player(Player::new(RED, "Red"));
        snapshot.add_player(Player::new(BLUE, "Blue"));
        snapshot.add_territory(Territory::land(HOME, "Home").owned_by(RED).with_units([
            Unit::new(UnitId(1), ELITE, RED),
            Unit::new(UnitId(2), ELITE, BLUE),
        ]));

        let mut home =
            PurchaseTerritory::new(&snapshot, HOME, ProductionCapacity::Unlimited).unwrap();
        home.queue(HOME, vec![Unit::new(UnitId(10), ELITE, RED)]).unwrap();
        let territories = BTreeMap::from([(HOME, home)]);
        let to_place = [Unit::new(UnitId(11), ELITE, RED), Unit::new(UnitId(12), INFANTRY, RED)];

        let tally = BuildTally::from_snapshot(&snapshot, RED, &to_place, &territories);
        assert_eq!(tally.currently_built(ELITE), 3);
        assert_eq!(tally.currently_built(INFANTRY), 1);
        assert_eq!(tally.currently_built(RELIC), 0);
    }
}
