//! Scenario loading and configuration.
//!
//! A scenario is a RON file holding a complete [`GameSnapshot`] and,
//! optionally, the planner settings to use with it.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use conquest_core::ai::PlannerConfig;
use conquest_core::error::GameError;
use conquest_core::player::PlayerId;
use conquest_core::snapshot::GameSnapshot;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read or write a file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Failed to write RON.
    #[error("Failed to serialize scenario: {0}")]
    SerializeError(#[from] ron::Error),
    /// Failed to encode JSON output.
    #[error("Failed to encode JSON: {0}")]
    JsonError(#[from] serde_json::Error),
    /// The snapshot is inconsistent or planning failed.
    #[error("Scenario is invalid: {0}")]
    Invalid(#[from] GameError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Game state to plan against.
    pub snapshot: GameSnapshot,
    /// Planner settings; defaults apply when absent.
    #[serde(default)]
    pub planner: Option<PlannerConfig>,
}

impl Scenario {
    /// Wrap a snapshot.
    #[must_use]
    pub fn new(name: impl Into<String>, snapshot: GameSnapshot) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            snapshot,
            planner: None,
        }
    }

    /// Set the planner settings.
    #[must_use]
    pub fn with_planner(mut self, config: PlannerConfig) -> Self {
        self.planner = Some(config);
        self
    }

    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario = Self::from_ron_str(&contents)?;
        tracing::debug!(path = %path.display(), name = %scenario.name, "loaded scenario");
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// Write the scenario as pretty RON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ScenarioError> {
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Planner settings, with `seed` overriding the file's seed.
    #[must_use]
    pub fn planner_config(&self, seed: Option<u64>) -> PlannerConfig {
        let mut config = self.planner.clone().unwrap_or_default();
        if seed.is_some() {
            config.seed = seed;
        }
        config
    }

    /// Computer-controlled players, in id order.
    #[must_use]
    pub fn ai_players(&self) -> Vec<PlayerId> {
        self.snapshot
            .players
            .values()
            .filter(|p| p.is_ai)
            .map(|p| p.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_test_utils::fixtures::players::{BLUE, RED};
    use conquest_test_utils::fixtures::standard_snapshot;

    #[test]
    fn test_ron_roundtrip() {
        let scenario = Scenario::new("Strip", standard_snapshot(30))
            .with_planner(PlannerConfig::seeded(4).deterministic());
        let text = ron::ser::to_string(&scenario).unwrap();
        let parsed = Scenario::from_ron_str(&text).unwrap();
        assert_eq!(parsed, scenario);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Scenario::from_ron_str("Scenario(name: 3)"),
            Err(ScenarioError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load("/definitely/not/here.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_seed_override() {
        let scenario =
            Scenario::new("Strip", standard_snapshot(30)).with_planner(PlannerConfig::seeded(4));
        assert_eq!(scenario.planner_config(None).seed, Some(4));
        assert_eq!(scenario.planner_config(Some(9)).seed, Some(9));
        assert!(Scenario::new("Bare", standard_snapshot(30))
            .planner_config(None)
            .randomize);
    }

    #[test]
    fn test_ai_players() {
        let scenario = Scenario::new("Strip", standard_snapshot(30));
        assert_eq!(scenario.ai_players(), vec![RED, BLUE]);
    }
}
