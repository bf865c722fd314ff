//! Planner configuration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::resources::ResourceId;

/// Default cap on accepted batches per place territory.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1_000;

/// Tunables for one planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Seed for the pass's generator; `None` draws one from the OS.
    pub seed: Option<u64>,
    /// Currency efficiency scores are priced in.
    pub currency: ResourceId,
    /// Choose among options at random by efficiency; otherwise take the best.
    pub randomize: bool,
    /// Safety cap on accepted batches per place territory.
    pub max_iterations: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            seed: None,
            currency: ResourceId::PUS,
            randomize: true,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl PlannerConfig {
    /// Config with a fixed seed.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Always pick the best-scoring option.
    #[must_use]
    pub fn deterministic(mut self) -> Self {
        self.randomize = false;
        self
    }

    /// Parse from RON text. Missing fields take their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| GameError::DataParseError {
            source_name: "planner config".to_string(),
            message: e.to_string(),
        })
    }

    /// Generator for a pass.
    #[must_use]
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
