//! Purchase options: one buyable batch from a player's production frontier.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::math::{fixed_serde, ratio, Fixed};
use crate::player::{PlayerId, ProductionRule};
use crate::resources::{ResourceCollection, ResourceId};
use crate::snapshot::GameSnapshot;
use crate::unit::{BuildLimit, Domain, Unit, UnitFactory, UnitType, UnitTypeId};

/// Catalog partition an option belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionCategory {
    /// Land combat units.
    Land,
    /// Aircraft.
    Air,
    /// Ships.
    Sea,
    /// Production facilities.
    Factory,
}

/// A batch of one unit type the player can buy.
///
/// Efficiency scores are strength per unit of budget currency spent on the
/// whole batch; a batch that costs nothing scores zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOption {
    /// Production rule this option came from.
    pub rule_name: String,
    /// Unit type bought.
    pub unit_type: UnitTypeId,
    /// Units per batch.
    pub quantity: u32,
    /// Price of one batch in every currency.
    pub costs: ResourceCollection,
    /// Price of one batch in the budget currency.
    pub cost: i32,
    /// Per-player ceiling of the unit type.
    pub max_built_per_player: BuildLimit,
    /// Attack strength per unit of cost.
    #[serde(with = "fixed_serde")]
    pub attack_efficiency: Fixed,
    /// Defence strength per unit of cost.
    #[serde(with = "fixed_serde")]
    pub defense_efficiency: Fixed,
    /// Attack of one unit.
    pub attack: i32,
    /// Defence of one unit.
    pub defense: i32,
    /// Movement of one unit.
    pub movement: i32,
    /// Hit points of one unit.
    pub hit_points: i32,
    /// Movement domain.
    pub domain: Domain,
    /// Whether the units are factories.
    pub is_factory: bool,
    /// Cargo capacity of one unit.
    pub transport_capacity: i32,
    /// Whether the units can bombard.
    pub can_bombard: bool,
}

impl PurchaseOption {
    /// Build an option from a frontier rule.
    ///
    /// `unit_type` must be the type the rule produces; `currency` prices the
    /// efficiency scores.
    #[must_use]
    pub fn from_rule(rule: &ProductionRule, unit_type: &UnitType, currency: ResourceId) -> Self {
        let quantity = rule.quantity_of(unit_type.id);
        let cost = rule.costs.get(currency);
        let batch = i32::try_from(quantity).unwrap_or(i32::MAX);
        let strength = |stat: i32| stat.saturating_mul(unit_type.hit_points).saturating_mul(batch);

        Self {
            rule_name: rule.name.clone(),
            unit_type: unit_type.id,
            quantity,
            costs: rule.costs.clone(),
            cost,
            max_built_per_player: unit_type.max_built_per_player,
            attack_efficiency: ratio(strength(unit_type.attack), cost),
            defense_efficiency: ratio(strength(unit_type.defense), cost),
            attack: unit_type.attack,
            defense: unit_type.defense,
            movement: unit_type.movement,
            hit_points: unit_type.hit_points,
            domain: unit_type.domain,
            is_factory: unit_type.can_produce_units,
            transport_capacity: unit_type.transport_capacity,
            can_bombard: unit_type.can_bombard,
        }
    }

    /// Catalog partition.
    #[must_use]
    pub fn category(&self) -> OptionCategory {
        if self.is_factory {
            return OptionCategory::Factory;
        }
        match self.domain {
            Domain::Land => OptionCategory::Land,
            Domain::Air => OptionCategory::Air,
            Domain::Sea => OptionCategory::Sea,
        }
    }

    /// Create the batch as temporary units.
    pub fn materialize(&self, factory: &mut UnitFactory, owner: PlayerId) -> Result<Vec<Unit>> {
        factory.create(self.unit_type, self.quantity, owner)
    }
}

/// A player's purchase options split by category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOptionMap {
    land: Vec<PurchaseOption>,
    air: Vec<PurchaseOption>,
    sea: Vec<PurchaseOption>,
    factory: Vec<PurchaseOption>,
}

impl PurchaseOptionMap {
    /// Build the catalog from the player's production frontier, in frontier order.
    ///
    /// Rules producing nothing are skipped. A rule producing several types
    /// becomes an option for its first type.
    pub fn from_frontier(
        snapshot: &GameSnapshot,
        player: PlayerId,
        currency: ResourceId,
    ) -> Result<Self> {
        let mut map = Self::default();
        for rule in &snapshot.player(player)?.production_frontier {
            let Some((&unit_type_id, _)) = rule.results.iter().find(|&(_, &n)| n > 0) else {
                tracing::debug!(rule = %rule.name, "skipping rule with no results");
                continue;
            };
            let unit_type = snapshot.unit_type(unit_type_id)?;
            map.insert(PurchaseOption::from_rule(rule, unit_type, currency));
        }
        Ok(map)
    }

    /// Add an option to its category.
    pub fn insert(&mut self, option: PurchaseOption) {
        match option.category() {
            OptionCategory::Land => self.land.push(option),
            OptionCategory::Air => self.air.push(option),
            OptionCategory::Sea => self.sea.push(option),
            OptionCategory::Factory => self.factory.push(option),
        }
    }

    /// Land options.
    #[must_use]
    pub fn land_options(&self) -> &[PurchaseOption] {
        &self.land
    }

    /// Air options.
    #[must_use]
    pub fn air_options(&self) -> &[PurchaseOption] {
        &self.air
    }

    /// Sea options.
    #[must_use]
    pub fn sea_options(&self) -> &[PurchaseOption] {
        &self.sea
    }

    /// Factory options.
    #[must_use]
    pub fn factory_options(&self) -> &[PurchaseOption] {
        &self.factory
    }

    /// Options of one category.
    #[must_use]
    pub fn options(&self, category: OptionCategory) -> &[PurchaseOption] {
        match category {
            OptionCategory::Land => &self.land,
            OptionCategory::Air => &self.air,
            OptionCategory::Sea => &self.sea,
            OptionCategory::Factory => &self.factory,
        }
    }

    /// Every option, land first.
    pub fn iter(&self) -> impl Iterator<Item = &PurchaseOption> {
        self.land
            .iter()
            .chain(&self.air)
            .chain(&self.sea)
            .chain(&self.factory)
    }

    /// Option buying `unit_type`, if any.
    #[must_use]
    pub fn find(&self, unit_type: UnitTypeId) -> Option<&PurchaseOption> {
        self.iter().find(|o| o.unit_type == unit_type)
    }

    /// Total number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.land.len() + self.air.len() + self.sea.len() + self.factory.len()
    }

    /// Check if there is nothing to buy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First frontier rule of `player` that produces `unit_type`.
pub fn production_rule_for<'a>(
    snapshot: &'a GameSnapshot,
    unit_type: UnitTypeId,
    player: PlayerId,
) -> Result<Option<&'a ProductionRule>> {
    snapshot.unit_type(unit_type)?;
    Ok(snapshot.player(player)?.production_rule_for(unit_type))
}

/// Price of one unit of `unit_type` for `player` in `currency`.
///
/// Uses the first rule producing the type, divided by the rule's total
/// output. Falls back to the type's declared value when no rule exists.
pub fn unit_cost(
    snapshot: &GameSnapshot,
    unit_type: UnitTypeId,
    player: PlayerId,
    currency: ResourceId,
) -> Result<Fixed> {
    match production_rule_for(snapshot, unit_type, player)? {
        Some(rule) => {
            let total = i32::try_from(rule.total_results()).map_err(|_| {
                GameError::InvalidState(format!("rule {} produces too many units", rule.name))
            })?;
            Ok(ratio(rule.costs.get(currency), total))
        }
        None => Ok(Fixed::from_num(snapshot.unit_type(unit_type)?.value)),
    }
}

/// Sort units cheapest first, each priced for its owner. Stable.
pub fn sort_by_cost(
    snapshot: &GameSnapshot,
    units: &mut [Unit],
    currency: ResourceId,
) -> Result<()> {
    let mut priced = Vec::with_capacity(units.len());
    for unit in units.iter() {
        priced.push((unit_cost(snapshot, unit.unit_type, unit.owner, currency)?, unit.clone()));
    }
    priced.sort_by(|a, b| a.0.cmp(&b.0));
    for (slot, (_, unit)) in units.iter_mut().zip(priced) {
        *slot = unit;
    }
    Ok(())
}
