//! Proptest strategies for planner testing.
//!
//! These strategies generate random but reproducible snapshots and
//! frontiers for property-based testing of planning passes.

use proptest::prelude::*;

use conquest_core::player::ProductionRule;
use conquest_core::snapshot::GameSnapshot;
use conquest_core::unit::{BuildLimit, Unit, UnitId, UnitTypeId};

use crate::fixtures::players::RED;
use crate::fixtures::territories::RED_PROVINCE;
use crate::fixtures::{rule, single_factory_snapshot, standard_snapshot};
use crate::fixtures::unit_types::{
    ARTILLERY, CRUISER, DESTROYER, FIGHTER, INFANTRY, TANK, TRANSPORT,
};

/// Budget in PUs.
///
/// Range: 0 to 120
pub fn arb_budget() -> impl Strategy<Value = i32> {
    0i32..=120
}

/// Territory production value.
///
/// Range: 0 to 12
pub fn arb_production() -> impl Strategy<Value = i32> {
    0i32..=12
}

/// Planner seed.
pub fn arb_seed() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// A buyable unit type of the standard set (never the factory).
pub fn arb_unit_type() -> impl Strategy<Value = UnitTypeId> {
    prop::sample::select(vec![
        INFANTRY, ARTILLERY, TANK, FIGHTER, TRANSPORT, DESTROYER, CRUISER,
    ])
}

/// One production rule: batch of 1 to 3 units costing 1 to 15 PUs.
pub fn arb_rule() -> impl Strategy<Value = ProductionRule> {
    (arb_unit_type(), 1u32..=3, 1i32..=15)
        .prop_map(|(unit_type, quantity, cost)| rule(unit_type, quantity, cost))
}

/// A frontier of 1 to `max_rules` rules.
pub fn arb_frontier(max_rules: usize) -> impl Strategy<Value = Vec<ProductionRule>> {
    proptest::collection::vec(arb_rule(), 1..=max_rules.max(1))
}

/// An optional ceiling on tanks.
pub fn arb_build_limit() -> impl Strategy<Value = BuildLimit> {
    prop_oneof![
        Just(BuildLimit::Unlimited),
        Just(BuildLimit::Forbidden),
        (1u32..=4).prop_map(BuildLimit::AtMost),
    ]
}

/// Inputs of a single-factory planning case.
#[derive(Debug, Clone)]
pub struct PlanningCase {
    /// Factory territory production value.
    pub production: i32,
    /// Red's budget.
    pub budget: i32,
    /// Red's frontier.
    pub frontier: Vec<ProductionRule>,
    /// Ceiling on tanks.
    pub tank_limit: BuildLimit,
    /// Red tanks already on the board.
    pub existing_tanks: u32,
    /// Planner seed.
    pub seed: u64,
}

impl PlanningCase {
    /// Build the snapshot for this case.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let mut snapshot =
            single_factory_snapshot(self.production, self.budget, self.frontier.clone());
        let tank = snapshot
            .unit_type(TANK)
            .cloned()
            .map(|t| t.with_build_limit(self.tank_limit));
        if let Ok(tank) = tank {
            snapshot.register_unit_type(tank);
        }
        if let Ok(province) = snapshot.territory_mut(RED_PROVINCE) {
            province.add_units(
                (0..u64::from(self.existing_tanks)).map(|i| Unit::new(UnitId(100 + i), TANK, RED)),
            );
        }
        snapshot
    }
}

/// A random single-factory planning case.
pub fn arb_planning_case() -> impl Strategy<Value = PlanningCase> {
    (
        arb_production(),
        arb_budget(),
        arb_frontier(6),
        arb_build_limit(),
        0u32..=3,
        arb_seed(),
    )
        .prop_map(
            |(production, budget, frontier, tank_limit, existing_tanks, seed)| PlanningCase {
                production,
                budget,
                frontier,
                tank_limit,
                existing_tanks,
                seed,
            },
        )
}

/// The standard two-player map with a random budget.
pub fn arb_standard_snapshot() -> impl Strategy<Value = GameSnapshot> {
    arb_budget().prop_map(standard_snapshot)
}
