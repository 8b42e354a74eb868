//! Rejections for moves the current game state does not allow.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Nothing to send
    #[error("Message is empty")]
    EmptyInput,

    /// All user turns are used up
    #[error("No moves left")]
    OutOfMoves,

    /// Marvin is already in the elevator and the game is won
    #[error("Game is already over")]
    GameOver,

    /// Elevator and Marvin are talking among themselves
    #[error("Input is disabled during the autonomous conversation")]
    AutonomousMode,

    /// Marvin cannot be approached before the elevator reaches the ground floor
    #[error("The elevator has not reached the ground floor yet")]
    StageIncomplete,

    /// Marvin is already the active persona
    #[error("Marvin is already the active persona")]
    AlreadyTransitioned,

    /// Rewind requested but Marvin never joined
    #[error("Nothing to rewind")]
    NothingToRewind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        assert_eq!(GameError::NothingToRewind.to_string(), "Nothing to rewind");
    }
}
