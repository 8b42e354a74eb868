//! Sirius domain: the message log and everything derived from it.
//!
//! The game state is a pure fold over an append-only log of messages. No
//! module here performs I/O; the engine crate owns the LLM, timers, and HTTP.

pub mod ascii;
pub mod config;
pub mod error;
pub mod log;
pub mod message;
pub mod narration;
pub mod state;

pub use ascii::{render_elevator, ElevatorView};
pub use config::{GameConfig, CHEAT_MSG, MARVIN_JOINED_MSG, MARVIN_TRANSITION_MSG, WELCOME_MSG};
pub use error::GameError;
pub use log::MessageLog;
pub use message::{Action, Message, Persona, Speaker};
pub use narration::{arrival_line, narrate};
pub use state::{compute_game_state, ConversationMode, GameState, Outcome};
