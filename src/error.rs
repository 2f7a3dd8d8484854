//! Error taxonomy
//!
//! Contract violations (bad difficulty index, unknown screen) are programmer errors and are
//! surfaced to the caller. Storage failures are recoverable at load time. Conflicts such as
//! re-engaging an active effect are not errors at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// Difficulty index outside 1..=4
    #[error("invalid difficulty {0}, expected 1..=4")]
    InvalidDifficulty(i64),

    /// Screen id the presentation layer does not know
    #[error("unknown screen id `{0}`")]
    UnknownScreen(String),

    /// Underlying storage could not be read or written
    #[error("progression storage failed: {0}")]
    Storage(#[from] std::io::Error),

    /// Stored record exists but could not be decoded
    #[error("progression record is corrupt: {0}")]
    CorruptRecord(#[from] serde_json::Error),

    /// Balance values that would stall or break the simulation
    #[error("invalid tuning: {0}")]
    InvalidTuning(String),
}

impl GameError {
    /// Contract violations indicate a caller bug and are never recovered
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            GameError::InvalidDifficulty(_) | GameError::UnknownScreen(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
