//! Session use cases: running games, their autonomous driver and the registry.

mod autonomous;
mod game_session;
mod store;

use thiserror::Error;
use uuid::Uuid;

use sirius_domain::GameError;

pub use autonomous::{
    plan_next_turn, turn_delay, PlannedTurn, AUTONOMOUS_BASE_DELAY_MS,
    AUTONOMOUS_PER_MESSAGE_DELAY_MS, DEFAULT_MAX_AUTONOMOUS_TURNS,
};
pub use game_session::{render_screen, GameSession, OutcomeView, SessionDeps, SessionView};
pub use store::SessionStore;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Another request for this session is still in flight
    #[error("Session is busy with another request")]
    Busy,
    #[error("Session not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Game(#[from] GameError),
}
