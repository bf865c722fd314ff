//! The purchase planner.
//!
//! A planning pass decides what a computer player buys and where the units
//! go, in three steps:
//!
//! 1. **Discovery** - find the territories that can produce and compute
//!    their capacity.
//! 2. **Land phase** - fill each producing territory with land and air
//!    batches, one accepted batch at a time.
//! 3. **Sea phase** - fill the adjacent sea zones with ships from whatever
//!    capacity the land phase left.
//!
//! Every batch is filtered (budget, capacity, build ceilings), checked with
//! the placement oracle, scored by efficiency and chosen with the pass's
//! generator. The snapshot is only ever borrowed immutably, and a pass is a
//! pure function of the snapshot, the player and the seed.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ai::config::PlannerConfig;
use crate::ai::legality::{
    can_units_be_placed, purchase_options_for_territory, PlacementOracle, RulesOracle,
};
use crate::ai::move_options::MoveOptions;
use crate::ai::option_filter::{filter_options, BuildTally};
use crate::ai::purchase_option::{PurchaseOption, PurchaseOptionMap};
use crate::ai::purchase_territory::{place_units_for, PurchaseTerritory};
use crate::ai::resource_tracker::ResourceTracker;
use crate::ai::selector::{select_best, select_weighted};
use crate::error::{GameError, Result};
use crate::math::Fixed;
use crate::placement::{can_move_land_units, has_owned_land_factory};
use crate::player::PlayerId;
use crate::production::territory_capacity;
use crate::resources::ResourceCollection;
use crate::snapshot::GameSnapshot;
use crate::territory::TerritoryId;
use crate::unit::{Unit, UnitFactory, UnitTypeId};

/// Which efficiency score ranks options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Rank by attack per cost.
    Attack,
    /// Rank by defence per cost.
    Defense,
}

impl Role {
    fn efficiency(self, option: &PurchaseOption) -> Fixed {
        match self {
            Self::Attack => option.attack_efficiency,
            Self::Defense => option.defense_efficiency,
        }
    }
}

/// Outcome of a planning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    /// Player the plan is for.
    pub player: PlayerId,
    /// Producing territories with their queued units.
    pub purchase_territories: BTreeMap<TerritoryId, PurchaseTerritory>,
    /// Candidate moves for the queued units.
    pub move_options: MoveOptions,
    /// Units bought per type.
    pub purchased: BTreeMap<UnitTypeId, u32>,
    /// Total spending per currency.
    pub spent: ResourceCollection,
}

impl PurchasePlan {
    /// Total number of units bought.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.purchased.values().sum()
    }

    /// Every queued unit, by purchase territory then place territory.
    pub fn queued_units(&self) -> impl Iterator<Item = &Unit> {
        self.purchase_territories
            .values()
            .flat_map(PurchaseTerritory::queued_units)
    }
}

/// Mutable state private to one pass.
struct PassState {
    player: PlayerId,
    tracker: ResourceTracker,
    tally: BuildTally,
    territories: BTreeMap<TerritoryId, PurchaseTerritory>,
}

/// Plans purchases for computer players.
pub struct PurchasePlanner<'a, O = RulesOracle<'a>, R = StdRng> {
    snapshot: &'a GameSnapshot,
    oracle: O,
    rng: R,
    config: PlannerConfig,
    factory: UnitFactory,
}

impl<'a> PurchasePlanner<'a> {
    /// Planner over the rules engine with the config's generator.
    #[must_use]
    pub fn new(snapshot: &'a GameSnapshot, config: PlannerConfig) -> Self {
        let rng = config.rng();
        Self::with_parts(snapshot, RulesOracle::new(snapshot), rng, config)
    }
}

impl<'a, O: PlacementOracle, R: Rng> PurchasePlanner<'a, O, R> {
    /// Planner with an explicit oracle and generator.
    #[must_use]
    pub fn with_parts(snapshot: &'a GameSnapshot, oracle: O, rng: R, config: PlannerConfig) -> Self {
        Self {
            snapshot,
            oracle,
            rng,
            config,
            factory: UnitFactory::temporary(),
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Territories where `player` can buy units this turn, with capacities.
    ///
    /// With a place-anywhere rule every owned territory is a candidate;
    /// otherwise only unconquered owned land holding one of the player's
    /// factories. Candidates land units cannot move through are dropped.
    pub fn find_purchase_territories(
        &self,
        player: PlayerId,
    ) -> Result<BTreeMap<TerritoryId, PurchaseTerritory>> {
        let place_anywhere = self.snapshot.player(player)?.can_place_anywhere();
        let mut purchase_territories = BTreeMap::new();

        for territory in self.snapshot.territories_owned_by(player) {
            if !place_anywhere && !has_owned_land_factory(self.snapshot, territory, player)? {
                continue;
            }
            if !can_move_land_units(self.snapshot, territory.id, player)? {
                continue;
            }
            let capacity = territory_capacity(self.snapshot, territory.id, player)?;
            tracing::debug!(
                territory = %territory.id,
                name = %territory.name,
                %capacity,
                "purchase territory"
            );
            purchase_territories.insert(
                territory.id,
                PurchaseTerritory::new(self.snapshot, territory.id, capacity)?,
            );
        }
        Ok(purchase_territories)
    }

    /// Fill a territory with the single best defensive land option.
    ///
    /// Only options legal in the territory count. The option with the
    /// highest positive defence efficiency that the player can afford is
    /// bought repeatedly while budget and production allow; the second-best
    /// option is never considered. Returns the temporary units bought,
    /// possibly none.
    pub fn find_max_purchase_defenders(
        &mut self,
        player: PlayerId,
        territory: TerritoryId,
        land_options: &[PurchaseOption],
    ) -> Result<Vec<Unit>> {
        let mut tracker = ResourceTracker::from_player(self.snapshot.player(player)?);
        let mut remaining = territory_capacity(self.snapshot, territory, player)?;
        let options = purchase_options_for_territory(
            &self.oracle,
            &mut self.factory,
            land_options,
            territory,
            player,
            &[],
        )?;

        let mut best: Option<&PurchaseOption> = None;
        let mut best_efficiency = Fixed::ZERO;
        for option in &options {
            if option.defense_efficiency > best_efficiency && tracker.has_enough(option) {
                best = Some(option);
                best_efficiency = option.defense_efficiency;
            }
        }
        let Some(best) = best else {
            tracing::debug!(%territory, %player, "no affordable defender");
            return Ok(Vec::new());
        };

        // A positive defence efficiency implies a positive cost, so the
        // budget always ends the loop.
        let mut units = Vec::new();
        while tracker.has_enough(best) && remaining.consume(best.quantity) {
            tracker.purchase(best)?;
            units.extend(best.materialize(&mut self.factory, player)?);
        }
        tracing::debug!(
            %territory,
            unit_type = %best.unit_type,
            units = units.len(),
            "max purchase defenders"
        );
        Ok(units)
    }

    /// Pick an entry with probability proportional to its efficiency.
    pub fn randomize_purchase_option<'o, K>(&mut self, efficiencies: &'o [(K, Fixed)]) -> Result<&'o K> {
        select_weighted(efficiencies, &mut self.rng)
    }

    /// Run a full planning pass for `player`.
    pub fn plan(&mut self, player: PlayerId) -> Result<PurchasePlan> {
        let catalog = PurchaseOptionMap::from_frontier(self.snapshot, player, self.config.currency)?;
        let territories = self.find_purchase_territories(player)?;
        let mut state = PassState {
            player,
            tracker: ResourceTracker::from_player(self.snapshot.player(player)?),
            tally: BuildTally::from_snapshot(self.snapshot, player, &[], &territories),
            territories,
        };
        tracing::info!(
            %player,
            options = catalog.len(),
            territories = state.territories.len(),
            "planning purchases"
        );

        let land_and_air: Vec<PurchaseOption> = catalog
            .land_options()
            .iter()
            .chain(catalog.air_options())
            .cloned()
            .collect();
        let ids: Vec<TerritoryId> = state.territories.keys().copied().collect();

        for &id in &ids {
            let role = self.role_for(id, player)?;
            self.fill_place_territory(&mut state, id, id, &land_and_air, role)?;
        }

        for &id in &ids {
            let role = self.role_for(id, player)?;
            let sea_zones: Vec<TerritoryId> = state.territories[&id]
                .place_territories
                .iter()
                .filter(|p| p.is_water && p.territory != id)
                .map(|p| p.territory)
                .collect();
            for zone in sea_zones {
                self.fill_place_territory(&mut state, id, zone, catalog.sea_options(), role)?;
            }
        }

        let move_options =
            MoveOptions::from_purchase_territories(self.snapshot, player, &state.territories)?;
        let mut purchased: BTreeMap<UnitTypeId, u32> = BTreeMap::new();
        for unit in state.territories.values().flat_map(PurchaseTerritory::queued_units) {
            *purchased.entry(unit.unit_type).or_insert(0) += 1;
        }

        let plan = PurchasePlan {
            player,
            purchase_territories: state.territories,
            move_options,
            purchased,
            spent: state.tracker.spent().clone(),
        };
        #[cfg(feature = "debug-validation")]
        self.validate_plan(&plan)?;

        tracing::info!(
            %player,
            units = plan.total_units(),
            spent = plan.spent.total(),
            "purchase plan complete"
        );
        Ok(plan)
    }

    /// Frontline territories border enemy land and buy for defence.
    fn role_for(&self, territory: TerritoryId, player: PlayerId) -> Result<Role> {
        let frontline = self
            .snapshot
            .neighbors(territory)?
            .into_iter()
            .any(|n| !n.is_water && self.snapshot.is_enemy_territory(n, player));
        Ok(if frontline { Role::Defense } else { Role::Attack })
    }

    /// Accept batches into one place territory until nothing fits.
    fn fill_place_territory(
        &mut self,
        state: &mut PassState,
        purchase: TerritoryId,
        place: TerritoryId,
        candidates: &[PurchaseOption],
        role: Role,
    ) -> Result<()> {
        for _ in 0..self.config.max_iterations {
            let remaining = state
                .territories
                .get(&purchase)
                .map(|pt| pt.remaining)
                .ok_or(GameError::UnknownTerritory(purchase))?;
            if remaining.is_exhausted() {
                break;
            }

            let mut options = candidates.to_vec();
            filter_options(&mut options, &state.tracker, remaining, &state.tally);
            if options.is_empty() {
                break;
            }

            let already_placed = place_units_for(place, &state.territories);
            let mut legal: Vec<(PurchaseOption, Vec<Unit>)> = Vec::new();
            for option in options {
                let units = option.materialize(&mut self.factory, state.player)?;
                if can_units_be_placed(&self.oracle, place, &units, state.player, &already_placed)? {
                    legal.push((option, units));
                }
            }

            let table: Vec<(usize, Fixed)> = legal
                .iter()
                .enumerate()
                .map(|(index, (option, _))| (index, role.efficiency(option)))
                .filter(|(_, efficiency)| *efficiency > Fixed::ZERO)
                .collect();
            if table.is_empty() {
                break;
            }
            for (index, efficiency) in &table {
                tracing::trace!(
                    unit_type = %legal[*index].0.unit_type,
                    %efficiency,
                    "candidate"
                );
            }

            let chosen = if self.config.randomize {
                *select_weighted(&table, &mut self.rng)?
            } else {
                *select_best(&table)?
            };
            let (option, units) = legal.swap_remove(chosen);

            state.tracker.purchase(&option)?;
            state.tally.record(option.unit_type, units.len());
            state
                .territories
                .get_mut(&purchase)
                .ok_or(GameError::UnknownTerritory(purchase))?
                .queue(place, units)?;
            tracing::debug!(
                %purchase,
                %place,
                unit_type = %option.unit_type,
                quantity = option.quantity,
                ?role,
                "accepted purchase"
            );
        }
        Ok(())
    }

    /// Re-check the pass invariants.
    #[cfg(feature = "debug-validation")]
    fn validate_plan(&self, plan: &PurchasePlan) -> Result<()> {
        let player = self.snapshot.player(plan.player)?;
        if !player.resources.has_enough(&plan.spent) {
            return Err(GameError::InvalidState(format!(
                "plan for {} overspends its budget",
                plan.player
            )));
        }
        for purchase in plan.purchase_territories.values() {
            let queued = u32::try_from(purchase.queued_count()).unwrap_or(u32::MAX);
            if !purchase.capacity.can_fit(queued) {
                return Err(GameError::InvalidState(format!(
                    "{} queued {queued} units over capacity {}",
                    purchase.territory, purchase.capacity
                )));
            }
        }
        Ok(())
    }
}

/// Unused capacity left across the plan, `None` when any territory is unlimited.
#[must_use]
pub fn remaining_capacity(plan: &PurchasePlan) -> Option<u32> {
    plan.purchase_territories
        .values()
        .map(|pt| pt.remaining.limit())
        .sum::<Option<u32>>()
}
