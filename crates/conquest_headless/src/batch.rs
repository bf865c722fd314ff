//! Batch planner runs for purchase statistics.
//!
//! Plans every computer player of a scenario for a range of seeds in
//! parallel using rayon, then aggregates what was bought.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use conquest_core::player::PlayerId;

use crate::metrics::{summarize, PlanMetrics, PlayerSummary};
use crate::runner::run_plan;
use crate::scenario::Scenario;

/// Configuration for a batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Passes per player
    pub runs: u32,
    /// Seed of the first pass; pass `i` uses `seed_start + i`
    pub seed_start: u64,
    /// Maximum parallel passes (0 = use rayon default)
    pub parallel: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            runs: 100,
            seed_start: 0,
            parallel: 0,
        }
    }
}

impl BatchConfig {
    /// Config for `runs` passes per player
    pub fn new(runs: u32) -> Self {
        Self {
            runs,
            ..Default::default()
        }
    }

    /// Set seed start
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed_start = seed;
        self
    }
}

/// Error during batch run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchError {
    /// Player planned for
    pub player: u32,
    /// Seed used
    pub seed: u64,
    /// Error message
    pub message: String,
}

/// Results from a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Scenario name
    pub scenario: String,
    /// Configuration used
    pub config: BatchConfig,
    /// Individual pass metrics, by player then seed
    pub plans: Vec<PlanMetrics>,
    /// Per-player aggregates
    pub players: BTreeMap<u32, PlayerSummary>,
    /// Total runtime
    pub duration_seconds: f64,
    /// Errors encountered
    pub errors: Vec<BatchError>,
}

impl BatchResults {
    /// Save results to JSON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from JSON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

/// Run a batch of planning passes over every computer player.
pub fn run_batch(scenario: &Scenario, config: BatchConfig) -> BatchResults {
    let start = Instant::now();
    let players = scenario.ai_players();
    info!(
        scenario = %scenario.name,
        players = players.len(),
        runs = config.runs,
        "starting batch"
    );

    if config.parallel > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let jobs: Vec<(PlayerId, u64)> = players
        .iter()
        .flat_map(|&player| {
            (0..config.runs).map(move |i| (player, config.seed_start.wrapping_add(u64::from(i))))
        })
        .collect();

    let results: Vec<Result<PlanMetrics, BatchError>> = jobs
        .into_par_iter()
        .map(|(player, seed)| match run_plan(scenario, player, Some(seed)) {
            Ok(plan) => Ok(PlanMetrics::from_plan(&scenario.snapshot, &plan, seed)),
            Err(e) => {
                warn!(%player, seed, error = %e, "planning pass failed");
                Err(BatchError {
                    player: player.0,
                    seed,
                    message: e.to_string(),
                })
            }
        })
        .collect();

    let (plans, errors): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let plans: Vec<PlanMetrics> = plans.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = errors.into_iter().filter_map(Result::err).collect();

    let players = summarize(&plans);
    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        passes = plans.len(),
        errors = errors.len(),
        duration_seconds,
        "batch complete"
    );

    BatchResults {
        scenario: scenario.name.clone(),
        config,
        plans,
        players,
        duration_seconds,
        errors,
    }
}
