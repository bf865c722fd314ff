//! Headless planner runner for scenario checks and CI.
//!
//! This crate runs the computer-player purchase planner outside any game
//! client. Scenarios are RON files holding a game snapshot and optional
//! planner settings. This enables:
//!
//! - **Plan inspection**: Print one pass as JSON for a player and seed
//! - **Purchase statistics**: Plan every computer player over many seeds
//! - **CI verification**: Validate scenario files before they ship
//!
//! # Example
//!
//! ```bash
//! # Plan one pass
//! cargo run -p conquest_headless -- plan --scenario scenarios/strip.ron --player 1 --seed 7
//!
//! # Purchase frequencies over 500 seeds
//! cargo run -p conquest_headless -- batch --scenario scenarios/strip.ron --runs 500 --output results/strip.json
//!
//! # Check a scenario
//! cargo run -p conquest_headless -- validate --scenario scenarios/strip.ron
//! ```

pub mod batch;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod validate;

pub use batch::{run_batch, BatchConfig, BatchResults};
pub use metrics::{PlanMetrics, PlayerSummary};
pub use runner::{plan_to_json, run_plan};
pub use scenario::{Scenario, ScenarioError};
pub use validate::{validate_scenario, ValidationReport};
