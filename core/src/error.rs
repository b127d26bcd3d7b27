use alloc::string::String;
use thiserror::Error;

use crate::{Phase, PlayerId, Weight};

/// Broad classes of failure, used by hosts to decide whether to abort, warn or retry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal, must be surfaced before play starts.
    Configuration,
    /// Command issued while its gate is closed, the command is ignored.
    IllegalTransition,
    /// The decision step re-prompts.
    Overweight,
    /// Integration error from the caller.
    OutOfRange,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{parameter} must be within {min}..={max}, got {value}")]
    OutOfBounds {
        parameter: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("Bounds are inverted, min {min} is greater than max {max}")]
    InvertedBounds { min: i64, max: i64 },
    #[error("Game is already configured")]
    AlreadyConfigured,
    #[error("Game must be configured first")]
    NotConfigured,
    #[error("Map is already populated")]
    AlreadyPopulated,
    #[error("Map must be populated first")]
    NotPopulated,
    #[error("No more than {capacity} players are supported")]
    CapacityExceeded { capacity: u8 },
    #[error("There is no difficulty with index {0}")]
    UnknownDifficulty(u8),
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),
    #[error("Grid size does not match the configured map size")]
    GridSizeMismatch,
    #[error("`{command}` is not accepted while {phase:?}")]
    IllegalTransition { command: &'static str, phase: Phase },
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Treasures can not weigh more than {cap}kg, carrying {carried}kg and offered {offered}kg")]
    OverweightRejected {
        carried: Weight,
        offered: Weight,
        cap: Weight,
    },
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid dice number {0}")]
    InvalidDiceNumber(u8),
    #[error("Player {0} was not found")]
    UnknownPlayer(PlayerId),
}

impl GameError {
    pub const fn kind(&self) -> ErrorKind {
        use GameError::*;
        match self {
            OutOfBounds { .. }
            | InvertedBounds { .. }
            | AlreadyConfigured
            | NotConfigured
            | AlreadyPopulated
            | NotPopulated
            | CapacityExceeded { .. }
            | UnknownDifficulty(_)
            | MalformedConfig(_)
            | GridSizeMismatch => ErrorKind::Configuration,
            IllegalTransition { .. } | AlreadyEnded => ErrorKind::IllegalTransition,
            OverweightRejected { .. } => ErrorKind::Overweight,
            InvalidCoords | InvalidDiceNumber(_) | UnknownPlayer(_) => ErrorKind::OutOfRange,
        }
    }

    /// Whether the engine state is still consistent and play may continue.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::IllegalTransition | ErrorKind::Overweight
        )
    }
}

pub type Result<T> = core::result::Result<T, GameError>;
