//! Scenario checks run before planning.
//!
//! Referential integrity failures are errors. Computer players that could
//! never buy anything (empty frontier, no producing territory) are reported
//! as warnings.

use serde::{Deserialize, Serialize};

use conquest_core::ai::{PlannerConfig, PurchasePlanner};

use crate::scenario::{Scenario, ScenarioError};

/// Outcome of validating a scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Players in the snapshot.
    pub players: usize,
    /// Territories in the snapshot.
    pub territories: usize,
    /// Registered unit types.
    pub unit_types: usize,
    /// Computer-controlled players.
    pub ai_players: usize,
    /// Problems that do not stop planning.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// No warnings.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Validate a scenario.
///
/// # Errors
///
/// Returns [`ScenarioError::Invalid`] for the first dangling reference.
pub fn validate_scenario(scenario: &Scenario) -> Result<ValidationReport, ScenarioError> {
    let snapshot = &scenario.snapshot;
    snapshot.validate()?;

    let ai_players = scenario.ai_players();
    let mut report = ValidationReport {
        players: snapshot.players.len(),
        territories: snapshot.territories.len(),
        unit_types: snapshot.unit_types.len(),
        ai_players: ai_players.len(),
        warnings: Vec::new(),
    };

    let planner = PurchasePlanner::new(snapshot, PlannerConfig::seeded(0));
    for player_id in ai_players {
        let player = snapshot.player(player_id)?;
        if player.production_frontier.is_empty() {
            report
                .warnings
                .push(format!("{} ({player_id}) has an empty production frontier", player.name));
        }
        if planner.find_purchase_territories(player_id)?.is_empty() {
            report
                .warnings
                .push(format!("{} ({player_id}) has no territory to place units in", player.name));
        }
    }

    for warning in &report.warnings {
        tracing::warn!(scenario = %scenario.name, "{warning}");
    }
    Ok(report)
}
