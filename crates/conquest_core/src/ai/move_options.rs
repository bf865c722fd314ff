//! Candidate moves for freshly purchased units.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::ai::purchase_territory::PurchaseTerritory;
use crate::error::Result;
use crate::player::PlayerId;
use crate::snapshot::GameSnapshot;
use crate::territory::{Territory, TerritoryId};
use crate::unit::{Domain, UnitId};

/// A transport and the land it could load from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportOption {
    /// The transport.
    pub transport: UnitId,
    /// Sea zone it will be placed in.
    pub sea_zone: TerritoryId,
    /// Friendly land next to the sea zone.
    pub load_from: BTreeSet<TerritoryId>,
}

/// Where purchased units could go after placement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOptions {
    /// Purchase territory records by territory.
    pub territory_map: BTreeMap<TerritoryId, PurchaseTerritory>,
    /// Destinations for each unit.
    pub unit_move_map: BTreeMap<UnitId, BTreeSet<TerritoryId>>,
    /// Destinations for each transport.
    pub transport_move_map: BTreeMap<UnitId, BTreeSet<TerritoryId>>,
    /// Bombard targets for each bombarding ship.
    pub bombard_map: BTreeMap<UnitId, BTreeSet<TerritoryId>>,
    /// Loading options for each transport.
    pub transport_list: Vec<TransportOption>,
}

impl MoveOptions {
    /// No options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build move options for every unit queued by `purchase_territories`.
    pub fn from_purchase_territories(
        snapshot: &GameSnapshot,
        player: PlayerId,
        purchase_territories: &BTreeMap<TerritoryId, PurchaseTerritory>,
    ) -> Result<Self> {
        let mut options = Self {
            territory_map: purchase_territories.clone(),
            ..Self::default()
        };
        for purchase in purchase_territories.values() {
            for place in &purchase.place_territories {
                let territory = snapshot.territory(place.territory)?;
                let neighbors = snapshot.neighbors(place.territory)?;
                for unit in &place.place_units {
                    let unit_type = snapshot.unit_type(unit.unit_type)?;
                    let mut moves: BTreeSet<TerritoryId> = neighbors
                        .iter()
                        .filter(|n| can_enter(n, unit_type.domain))
                        .map(|n| n.id)
                        .collect();
                    moves.insert(place.territory);

                    if unit_type.transport_capacity > 0 && territory.is_water {
                        options.transport_move_map.insert(unit.id, moves.clone());
                        options.transport_list.push(TransportOption {
                            transport: unit.id,
                            sea_zone: place.territory,
                            load_from: neighbors
                                .iter()
                                .filter(|n| {
                                    !n.is_water
                                        && n.owner.is_some_and(|o| snapshot.is_allied(o, player))
                                })
                                .map(|n| n.id)
                                .collect(),
                        });
                    }
                    if unit_type.can_bombard && territory.is_water {
                        let targets: BTreeSet<TerritoryId> = neighbors
                            .iter()
                            .filter(|n| !n.is_water && snapshot.is_enemy_territory(n, player))
                            .map(|n| n.id)
                            .collect();
                        if !targets.is_empty() {
                            options.bombard_map.insert(unit.id, targets);
                        }
                    }
                    options.unit_move_map.insert(unit.id, moves);
                }
            }
        }
        Ok(options)
    }

    /// Number of units with move options.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.unit_move_map.len()
    }
}

fn can_enter(territory: &Territory, domain: Domain) -> bool {
    match domain {
        Domain::Land => !territory.is_water && !territory.is_impassable(),
        Domain::Sea => territory.is_water,
        Domain::Air => !territory.is_impassable(),
    }
}
