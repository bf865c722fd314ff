//! # Conquest Core
//!
//! Game-state model, placement rules and the computer-player purchase
//! planner for a turn-based territorial strategy game.
//!
//! This crate contains **only** decision logic:
//! - No rendering
//! - No IO
//! - No floating-point math (uses fixed-point)
//! - Randomness only through an injected, seedable generator
//!
//! This separation enables:
//! - Planning many players in parallel over one shared snapshot
//! - Bit-identical plans for a given seed on every platform
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`snapshot`] - Read-only game state handed to the planner
//! - [`unit_collection`] - Per-territory unit container
//! - [`production`] - Per-territory production capacity
//! - [`placement`] - Placement rules engine
//! - [`ai`] - Purchase planner
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod ai;
pub mod error;
pub mod math;
pub mod placement;
pub mod player;
pub mod production;
pub mod resources;
pub mod snapshot;
pub mod territory;
pub mod unit;
pub mod unit_collection;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::ai::config::PlannerConfig;
    pub use crate::ai::legality::{PlacementOracle, RulesOracle};
    pub use crate::ai::move_options::MoveOptions;
    pub use crate::ai::option_filter::BuildTally;
    pub use crate::ai::planner::{PurchasePlan, PurchasePlanner, Role};
    pub use crate::ai::purchase_option::{OptionCategory, PurchaseOption, PurchaseOptionMap};
    pub use crate::ai::purchase_territory::{PlaceTerritory, PurchaseTerritory};
    pub use crate::ai::resource_tracker::ResourceTracker;
    pub use crate::error::{GameError, Result};
    pub use crate::math::Fixed;
    pub use crate::placement::{PlaceTurn, PlacementRejection};
    pub use crate::player::{Player, PlayerId, ProductionRule, RulesAttachment, TechAdvances};
    pub use crate::production::{territory_capacity, ProductionCapacity};
    pub use crate::resources::{ResourceCollection, ResourceId};
    pub use crate::snapshot::GameSnapshot;
    pub use crate::territory::{Territory, TerritoryAttachment, TerritoryId};
    pub use crate::unit::{BuildLimit, Domain, Unit, UnitFactory, UnitId, UnitType, UnitTypeId};
    pub use crate::unit_collection::{CollectionChange, UnitCollection};
}
