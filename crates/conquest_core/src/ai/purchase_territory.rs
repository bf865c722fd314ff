//! Territories that fund production and the places they can feed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::player::PlayerId;
use crate::production::ProductionCapacity;
use crate::snapshot::GameSnapshot;
use crate::territory::TerritoryId;
use crate::unit::{Unit, UnitTypeId};

/// A territory able to receive units, with what is queued for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceTerritory {
    /// The territory.
    pub territory: TerritoryId,
    /// Sea zone rather than land.
    pub is_water: bool,
    /// Units tentatively placed here.
    pub place_units: Vec<Unit>,
}

impl PlaceTerritory {
    /// Place territory with nothing queued.
    #[must_use]
    pub const fn new(territory: TerritoryId, is_water: bool) -> Self {
        Self {
            territory,
            is_water,
            place_units: Vec::new(),
        }
    }

    /// Queued units of a type owned by `owner`.
    #[must_use]
    pub fn count_of_type(&self, unit_type: UnitTypeId, owner: PlayerId) -> usize {
        self.place_units
            .iter()
            .filter(|u| u.unit_type == unit_type && u.owner == owner)
            .count()
    }
}

/// A territory able to produce, its capacity and where it can place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseTerritory {
    /// The producing territory.
    pub territory: TerritoryId,
    /// Capacity at the start of the pass.
    pub capacity: ProductionCapacity,
    /// Capacity not yet used by queued units.
    pub remaining: ProductionCapacity,
    /// The territory itself first, then adjacent sea zones in id order.
    pub place_territories: Vec<PlaceTerritory>,
}

impl PurchaseTerritory {
    /// Wrap a producing territory with its computed capacity.
    pub fn new(
        snapshot: &GameSnapshot,
        territory_id: TerritoryId,
        capacity: ProductionCapacity,
    ) -> Result<Self> {
        let territory = snapshot.territory(territory_id)?;
        let mut place_territories = vec![PlaceTerritory::new(territory_id, territory.is_water)];
        if !territory.is_water {
            place_territories.extend(
                snapshot
                    .neighbors(territory_id)?
                    .into_iter()
                    .filter(|n| n.is_water)
                    .map(|n| PlaceTerritory::new(n.id, true)),
            );
        }
        Ok(Self {
            territory: territory_id,
            capacity,
            remaining: capacity,
            place_territories,
        })
    }

    /// Place territory entry for `territory`.
    #[must_use]
    pub fn place_territory(&self, territory: TerritoryId) -> Option<&PlaceTerritory> {
        self.place_territories
            .iter()
            .find(|p| p.territory == territory)
    }

    /// Queue units into one of this territory's place territories.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] when `place` is not one of
    /// this territory's place territories or the units exceed the remaining
    /// capacity. Nothing is queued in that case.
    pub fn queue(&mut self, place: TerritoryId, units: Vec<Unit>) -> Result<()> {
        let Some(index) = self
            .place_territories
            .iter()
            .position(|p| p.territory == place)
        else {
            return Err(GameError::InvalidArgument(format!(
                "{place} is not a place territory of {}",
                self.territory
            )));
        };
        let quantity = u32::try_from(units.len())
            .map_err(|_| GameError::InvalidArgument("too many units".to_string()))?;
        if !self.remaining.consume(quantity) {
            return Err(GameError::InvalidArgument(format!(
                "{quantity} units exceed remaining capacity {} of {}",
                self.remaining, self.territory
            )));
        }
        self.place_territories[index].place_units.extend(units);
        Ok(())
    }

    /// Every unit queued across the place territories.
    pub fn queued_units(&self) -> impl Iterator<Item = &Unit> {
        self.place_territories
            .iter()
            .flat_map(|p| p.place_units.iter())
    }

    /// Number of queued units.
    #[must_use]
    pub fn queued_count(&self) -> usize {
        self.place_territories
            .iter()
            .map(|p| p.place_units.len())
            .sum()
    }
}

/// All units queued for `territory` by any purchase territory.
#[must_use]
pub fn place_units_for(
    territory: TerritoryId,
    purchase_territories: &BTreeMap<TerritoryId, PurchaseTerritory>,
) -> Vec<Unit> {
    purchase_territories
        .values()
        .flat_map(|pt| pt.place_territories.iter())
        .filter(|p| p.territory == territory)
        .flat_map(|p| p.place_units.iter().cloned())
        .collect()
}
