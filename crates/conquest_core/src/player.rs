//! Players, their production frontier and their rule attachments.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::resources::ResourceCollection;
use crate::territory::TerritoryId;
use crate::unit::UnitTypeId;

/// Unique identifier for players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player#{}", self.0)
    }
}

/// One purchasable entry of a production frontier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// Rule name, e.g. `buyInfantry`.
    pub name: String,
    /// Price per purchase.
    pub costs: ResourceCollection,
    /// Units produced per purchase.
    pub results: BTreeMap<UnitTypeId, u32>,
}

impl ProductionRule {
    /// Rule producing `quantity` units of one type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        costs: ResourceCollection,
        unit_type: UnitTypeId,
        quantity: u32,
    ) -> Self {
        Self {
            name: name.into(),
            costs,
            results: BTreeMap::from([(unit_type, quantity)]),
        }
    }

    /// Units of `unit_type` produced per purchase.
    #[must_use]
    pub fn quantity_of(&self, unit_type: UnitTypeId) -> u32 {
        self.results.get(&unit_type).copied().unwrap_or(0)
    }

    /// Total units produced per purchase.
    #[must_use]
    pub fn total_results(&self) -> u32 {
        self.results.values().sum()
    }
}

/// Per-player rule overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesAttachment {
    /// The player may place units in any territory it owns.
    #[serde(default)]
    pub placement_any_territory: bool,
    /// Cap on units placed per territory; `None` means no cap.
    #[serde(default)]
    pub max_place_per_territory: Option<i32>,
    /// Territories where the player may not place units.
    #[serde(default)]
    pub placement_restrictions: BTreeSet<TerritoryId>,
    /// Territories the player's units may not enter.
    #[serde(default)]
    pub movement_restrictions: BTreeSet<TerritoryId>,
}

/// Researched technologies relevant to production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechAdvances {
    /// Factories in territories worth 3+ produce two extra units.
    #[serde(default)]
    pub increased_factory_production: bool,
}

/// A player (human or computer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Controlled by the computer.
    #[serde(default)]
    pub is_ai: bool,
    /// Resources on hand.
    #[serde(default)]
    pub resources: ResourceCollection,
    /// What the player may buy.
    #[serde(default)]
    pub production_frontier: Vec<ProductionRule>,
    /// Rule overrides.
    #[serde(default)]
    pub rules: Option<RulesAttachment>,
    /// Technologies.
    #[serde(default)]
    pub techs: TechAdvances,
}

impl Player {
    /// Create a player with no resources and an empty frontier.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            is_ai: false,
            resources: ResourceCollection::new(),
            production_frontier: Vec::new(),
            rules: None,
            techs: TechAdvances::default(),
        }
    }

    /// Mark as computer-controlled.
    #[must_use]
    pub fn ai(mut self) -> Self {
        self.is_ai = true;
        self
    }

    /// Set resources on hand.
    #[must_use]
    pub fn with_resources(mut self, resources: ResourceCollection) -> Self {
        self.resources = resources;
        self
    }

    /// Set the production frontier.
    #[must_use]
    pub fn with_frontier(mut self, rules: Vec<ProductionRule>) -> Self {
        self.production_frontier = rules;
        self
    }

    /// Set rule overrides.
    #[must_use]
    pub fn with_rules(mut self, rules: RulesAttachment) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Set technologies.
    #[must_use]
    pub fn with_techs(mut self, techs: TechAdvances) -> Self {
        self.techs = techs;
        self
    }

    /// Whether the player may place in any owned territory.
    #[must_use]
    pub fn can_place_anywhere(&self) -> bool {
        self.rules.as_ref().is_some_and(|r| r.placement_any_territory)
    }

    /// Per-territory placement cap, if the rules set one.
    #[must_use]
    pub fn max_place_per_territory(&self) -> Option<i32> {
        self.rules.as_ref().and_then(|r| r.max_place_per_territory)
    }

    /// Whether placement in `territory` is forbidden by the rules.
    #[must_use]
    pub fn is_placement_restricted(&self, territory: TerritoryId) -> bool {
        self.rules
            .as_ref()
            .is_some_and(|r| r.placement_restrictions.contains(&territory))
    }

    /// Whether movement into `territory` is forbidden by the rules.
    #[must_use]
    pub fn is_movement_restricted(&self, territory: TerritoryId) -> bool {
        self.rules
            .as_ref()
            .is_some_and(|r| r.movement_restrictions.contains(&territory))
    }

    /// First frontier rule producing `unit_type`.
    #[must_use]
    pub fn production_rule_for(&self, unit_type: UnitTypeId) -> Option<&ProductionRule> {
        self.production_frontier
            .iter()
            .find(|rule| rule.quantity_of(unit_type) > 0)
    }
}
