//! Plan metrics collection for purchase statistics.
//!
//! One [`PlanMetrics`] is recorded per planning pass; [`PlayerSummary`]
//! aggregates them into per-unit-type purchase frequencies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use conquest_core::ai::PurchasePlan;
use conquest_core::resources::ResourceId;
use conquest_core::snapshot::GameSnapshot;

/// Metrics for a single planning pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanMetrics {
    /// Player planned for.
    pub player: u32,
    /// Seed used.
    pub seed: u64,
    /// Units bought, by unit type name.
    pub units: BTreeMap<String, u32>,
    /// PUs spent.
    pub spent: i32,
    /// Purchase territories that received units.
    pub territories_used: usize,
}

impl PlanMetrics {
    /// Collect metrics from a finished plan.
    #[must_use]
    pub fn from_plan(snapshot: &GameSnapshot, plan: &PurchasePlan, seed: u64) -> Self {
        let units = plan
            .purchased
            .iter()
            .map(|(unit_type, count)| {
                let name = snapshot
                    .unit_type(*unit_type)
                    .map_or_else(|_| unit_type.to_string(), |t| t.name.clone());
                (name, *count)
            })
            .collect();
        Self {
            player: plan.player.0,
            seed,
            units,
            spent: plan.spent.get(ResourceId::PUS),
            territories_used: plan
                .purchase_territories
                .values()
                .filter(|pt| pt.queued_count() > 0)
                .count(),
        }
    }

    /// Total units bought.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.units.values().sum()
    }
}

/// Aggregate over many passes for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    /// Passes aggregated.
    pub plans: u32,
    /// Units bought across all passes, by unit type name.
    pub units: BTreeMap<String, u64>,
    /// Share of all bought units, by unit type name.
    pub frequencies: BTreeMap<String, f64>,
    /// Mean PUs spent per pass.
    pub mean_spent: f64,
    /// Mean units bought per pass.
    pub mean_units: f64,
}

impl PlayerSummary {
    /// Aggregate the passes of one player.
    #[must_use]
    pub fn from_plans<'a>(plans: impl IntoIterator<Item = &'a PlanMetrics>) -> Self {
        let mut summary = Self::default();
        let mut spent: i64 = 0;
        for plan in plans {
            summary.plans += 1;
            spent += i64::from(plan.spent);
            for (name, count) in &plan.units {
                *summary.units.entry(name.clone()).or_insert(0) += u64::from(*count);
            }
        }

        let total: u64 = summary.units.values().sum();
        if total > 0 {
            summary.frequencies = summary
                .units
                .iter()
                .map(|(name, count)| (name.clone(), *count as f64 / total as f64))
                .collect();
        }
        if summary.plans > 0 {
            let plans = f64::from(summary.plans);
            summary.mean_spent = spent as f64 / plans;
            summary.mean_units = total as f64 / plans;
        }
        summary
    }
}

/// Summaries for every player in a batch.
#[must_use]
pub fn summarize(plans: &[PlanMetrics]) -> BTreeMap<u32, PlayerSummary> {
    let players: Vec<u32> = {
        let mut ids: Vec<u32> = plans.iter().map(|p| p.player).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    players
        .into_iter()
        .map(|player| {
            let summary = PlayerSummary::from_plans(plans.iter().filter(|p| p.player == player));
            (player, summary)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(player: u32, units: &[(&str, u32)], spent: i32) -> PlanMetrics {
        PlanMetrics {
            player,
            seed: 0,
            units: units.iter().map(|(n, c)| ((*n).to_string(), *c)).collect(),
            spent,
            territories_used: 1,
        }
    }

    #[test]
    fn test_frequencies_sum_to_one() {
        let plans = vec![
            metrics(1, &[("infantry", 3), ("tank", 1)], 15),
            metrics(1, &[("infantry", 1), ("tank", 3)], 21),
        ];
        let summary = PlayerSummary::from_plans(&plans);

        assert_eq!(summary.plans, 2);
        assert_eq!(summary.units["infantry"], 4);
        assert!((summary.frequencies["tank"] - 0.5).abs() < 1e-9);
        let total: f64 = summary.frequencies.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((summary.mean_spent - 18.0).abs() < 1e-9);
        assert!((summary.mean_units - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_summary() {
        let summary = PlayerSummary::from_plans(&[]);
        assert_eq!(summary.plans, 0);
        assert!(summary.frequencies.is_empty());
    }

    #[test]
    fn test_summarize_splits_players() {
        let plans = vec![
            metrics(1, &[("infantry", 2)], 6),
            metrics(2, &[("tank", 1)], 6),
            metrics(1, &[("infantry", 1)], 3),
        ];
        let summaries = summarize(&plans);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[&1].plans, 2);
        assert_eq!(summaries[&2].units["tank"], 1);
    }
}
