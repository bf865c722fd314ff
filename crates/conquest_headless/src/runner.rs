//! Single planning pass over a scenario.

use conquest_core::ai::{PurchasePlan, PurchasePlanner};
use conquest_core::player::PlayerId;

use crate::scenario::{Scenario, ScenarioError};

/// Plan purchases for one player of a scenario.
///
/// `seed` overrides the scenario's planner seed.
pub fn run_plan(
    scenario: &Scenario,
    player: PlayerId,
    seed: Option<u64>,
) -> Result<PurchasePlan, ScenarioError> {
    let config = scenario.planner_config(seed);
    tracing::info!(scenario = %scenario.name, %player, seed = ?config.seed, "planning");
    let plan = PurchasePlanner::new(&scenario.snapshot, config).plan(player)?;
    Ok(plan)
}

/// Plan and render the plan as pretty JSON.
pub fn plan_to_json(
    scenario: &Scenario,
    player: PlayerId,
    seed: Option<u64>,
) -> Result<String, ScenarioError> {
    let plan = run_plan(scenario, player, seed)?;
    Ok(serde_json::to_string_pretty(&plan)?)
}
