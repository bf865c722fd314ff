//! Error types for the game model and the purchase planner.

use thiserror::Error;

use crate::player::PlayerId;
use crate::resources::ResourceId;
use crate::territory::TerritoryId;
use crate::unit::UnitTypeId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for the game model and planner.
///
/// Every variant is a contract violation or an inconsistency in the snapshot.
/// A placement the rules engine refuses is not an error; see
/// [`crate::placement::PlacementRejection`].
#[derive(Debug, Error)]
pub enum GameError {
    /// Territory id not present in the snapshot.
    #[error("Unknown territory: {0}")]
    UnknownTerritory(TerritoryId),

    /// Player id not present in the snapshot.
    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// Unit type id not present in the registry.
    #[error("Unknown unit type: {0}")]
    UnknownUnitType(UnitTypeId),

    /// Caller passed an argument outside the operation's contract.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A territory assumed to hold a factory has none.
    #[error("No factory in territory {territory}")]
    NoFactory {
        /// Territory that was expected to contain a factory.
        territory: TerritoryId,
    },

    /// Insufficient resources.
    #[error("Insufficient resources: need {required} of {resource}, have {available}")]
    InsufficientResources {
        /// Resource type.
        resource: ResourceId,
        /// Amount required.
        required: i32,
        /// Amount available.
        available: i32,
    },

    /// Weighted selection over an empty option table.
    #[error("Cannot select from an empty option table")]
    EmptySelection,

    /// Weighted selection over negative or all-zero weights.
    #[error("Invalid selection weights: {0}")]
    InvalidWeights(String),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
