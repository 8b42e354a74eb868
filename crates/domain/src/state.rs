//! Game state derived from the message log.
//!
//! [`GameState`] is never stored or mutated in place. Every caller recomputes
//! it with [`compute_game_state`], a deterministic left fold over the log.

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, CHEAT_MSG, MARVIN_TRANSITION_MSG};
use crate::message::{Action, Message, Persona, Speaker};

/// Who drives the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationMode {
    /// The user talks to the active persona.
    #[default]
    Interactive,
    /// Elevator and Marvin talk to each other on a timer.
    Autonomous,
}

/// Terminal result of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    OutOfMoves,
}

impl Outcome {
    pub fn title(&self) -> &'static str {
        match self {
            Outcome::Won => "So Long, and Thanks for All the Fish!",
            Outcome::OutOfMoves => "Mostly Harmless",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Outcome::Won => "You've successfully convinced Marvin to join you in the elevator. Time for a Pan Galactic Gargle Blaster?",
            Outcome::OutOfMoves => "You've run out of moves. Time to consult your copy of the Hitchhiker's Guide to the Galaxy!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub current_floor: u8,
    pub moves_left: u32,
    pub current_persona: Persona,
    pub first_stage_complete: bool,
    pub marvin_joined: bool,
    pub has_won: bool,
    pub mode: ConversationMode,
    pub last_speaker: Option<Speaker>,
}

impl GameState {
    /// State of an empty log.
    pub fn initial(config: &GameConfig) -> Self {
        Self {
            current_floor: config.clamp_floor(config.initial_floor),
            moves_left: config.total_moves,
            current_persona: Persona::Elevator,
            first_stage_complete: false,
            marvin_joined: false,
            has_won: false,
            mode: ConversationMode::Interactive,
            last_speaker: None,
        }
    }

    pub fn is_autonomous(&self) -> bool {
        self.mode == ConversationMode::Autonomous
    }

    pub fn outcome(&self) -> Option<Outcome> {
        if self.has_won {
            Some(Outcome::Won)
        } else if self.moves_left == 0 && !self.marvin_joined {
            // The ride after Marvin joins is not limited by the move budget.
            Some(Outcome::OutOfMoves)
        } else {
            None
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Whether the user may type a message right now.
    pub fn accepts_user_input(&self) -> bool {
        !self.is_autonomous() && !self.is_game_over()
    }

    /// Mission banner for the current stage, if one applies.
    pub fn instruction(&self) -> Option<&'static str> {
        match (self.current_persona, self.first_stage_complete, self.marvin_joined) {
            (Persona::Elevator, false, _) => Some(
                "Psst! Your mission: Convince this neurotic elevator to reach the ground floor. Remember your towel!",
            ),
            (Persona::Elevator, true, _) => Some(
                "Congratulations! You've successfully navigated the neurotic elevator to the ground floor. Now, brace yourself for the next challenge: Marvin the Paranoid Android awaits. Convince Marvin to join your mission. Are you ready?",
            ),
            (Persona::Marvin, _, false) => {
                Some("New challenge: Convince Marvin the Paranoid Android to join you in the elevator!")
            }
            _ => None,
        }
    }

    /// Apply one log entry. Used by [`compute_game_state`].
    fn apply(mut self, msg: &Message, config: &GameConfig) -> Self {
        self.last_speaker = Some(msg.speaker);

        if msg.speaker == Speaker::Guide {
            if msg.text == MARVIN_TRANSITION_MSG {
                self.current_persona = Persona::Marvin;
            } else if msg.text == CHEAT_MSG {
                self.current_floor = GameConfig::GROUND_FLOOR;
                self.first_stage_complete = true;
            }
        }

        match msg.action {
            Action::Join => {
                self.mode = ConversationMode::Autonomous;
                self.marvin_joined = true;
            }
            Action::Up => {
                self.current_floor = config.clamp_floor(self.current_floor.saturating_add(1));
                if self.marvin_joined && self.current_floor == config.top_floor() {
                    self.has_won = true;
                }
            }
            Action::Down => {
                self.current_floor = config.clamp_floor(self.current_floor.saturating_sub(1));
                if self.current_floor == GameConfig::GROUND_FLOOR {
                    self.first_stage_complete = true;
                }
            }
            Action::None => {}
        }

        self
    }
}

/// Fold the ordered message log into the current game state.
pub fn compute_game_state(messages: &[Message], config: &GameConfig) -> GameState {
    let user_turns = messages.iter().filter(|m| m.speaker == Speaker::User).count();
    let user_turns = u32::try_from(user_turns).unwrap_or(u32::MAX);

    let initial = GameState {
        moves_left: config.total_moves.saturating_sub(user_turns),
        ..GameState::initial(config)
    };

    messages
        .iter()
        .fold(initial, |state, msg| state.apply(msg, config))
}
