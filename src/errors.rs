use crate::capture::SupplyKind;
use thiserror::Error;

/// Failures of the creature data service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// The requested record does not exist
    #[error("not found: {0}")]
    NotFound(String),
    /// The service could not be reached or answered with an error
    #[error("transport error: {0}")]
    Transport(String),
}

/// Raised when an inventory item is requested but none are left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("no {0} left")]
    OutOfStock(SupplyKind),
}

/// Main error type for a battle. Every variant ends the battle it came from.
#[derive(Debug, Error)]
pub enum BattleError {
    /// The player has no creatures to send out
    #[error("no creatures in your roster")]
    NoRosterAvailable,
    /// A data service lookup failed mid-battle
    #[error(transparent)]
    Data(#[from] DataError),
    /// The prompt could not be read
    #[error("input error: {0}")]
    Input(#[from] std::io::Error),
}

/// Errors from loading or saving a session.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no location available for session files")]
    NoSaveLocation,
}

/// Errors from loading configuration or a local data file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;

/// Type alias for Results using BattleError
pub type BattleResult<T> = Result<T, BattleError>;
