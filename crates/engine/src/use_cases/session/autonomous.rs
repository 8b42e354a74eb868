//! Autonomous elevator/Marvin dialogue.
//!
//! Once Marvin joins, the user stops typing and the two personas talk to each
//! other. Each turn is a one-shot timer planned from the log right after it
//! changes: wait `1000 + 250 * log_len` ms, ask the persona opposite the last
//! speaker, append. Any log change cancels the pending turn and plans a new
//! one, so at most one turn is ever pending per session.

use std::sync::Weak;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sirius_domain::{Action, GameState, Message, MessageLog, Persona, Speaker};

use super::game_session::GameSession;

pub const AUTONOMOUS_BASE_DELAY_MS: u64 = 1000;
pub const AUTONOMOUS_PER_MESSAGE_DELAY_MS: u64 = 250;
pub const DEFAULT_MAX_AUTONOMOUS_TURNS: u32 = 24;

/// Delay before the next autonomous turn for a log of `log_len` messages.
pub fn turn_delay(log_len: usize) -> Duration {
    let per_message = AUTONOMOUS_PER_MESSAGE_DELAY_MS.saturating_mul(log_len as u64);
    Duration::from_millis(AUTONOMOUS_BASE_DELAY_MS.saturating_add(per_message))
}

/// Persona replies spoken since Marvin joined.
pub fn autonomous_turns_taken(messages: &[Message]) -> usize {
    let Some(join) = messages
        .iter()
        .position(|m| m.speaker == Speaker::Marvin && m.action == Action::Join)
    else {
        return 0;
    };

    messages[join + 1..]
        .iter()
        .filter(|m| matches!(m.speaker, Speaker::Elevator | Speaker::Marvin))
        .count()
}

/// A pending autonomous turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedTurn {
    pub persona: Persona,
    pub delay: Duration,
    /// Log generation the turn was planned against
    pub generation: u64,
}

/// The next autonomous turn, or `None` when the dialogue should not continue.
///
/// Nothing is planned outside autonomous mode, once the game is won, or after
/// `max_turns` persona replies. The move budget does not apply here.
pub fn plan_next_turn(
    log: &MessageLog,
    state: &GameState,
    generation: u64,
    max_turns: u32,
) -> Option<PlannedTurn> {
    if !state.is_autonomous() || state.has_won {
        return None;
    }
    if autonomous_turns_taken(log.messages()) >= max_turns as usize {
        return None;
    }
    let last = log.last()?;

    Some(PlannedTurn {
        persona: Persona::autonomous_reply_to(last.speaker),
        delay: turn_delay(log.len()),
        generation,
    })
}

/// Run one planned turn in the background.
///
/// The timer and the fetch race against `token`. The task only holds a
/// strong reference to the session while the fetch is in flight.
pub(super) fn spawn_turn(session: Weak<GameSession>, token: CancellationToken, turn: PlannedTurn) {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!(generation = turn.generation, "Autonomous turn cancelled before it fired");
                return;
            }
            _ = tokio::time::sleep(turn.delay) => {}
        }

        let Some(session) = session.upgrade() else {
            return;
        };

        let reply = tokio::select! {
            _ = token.cancelled() => None,
            reply = session.fetch_autonomous_reply(turn) => reply,
        };

        match reply {
            Some(reply) if !token.is_cancelled() => {
                session.commit_autonomous_reply(reply, turn.generation).await;
            }
            _ => {
                tracing::debug!(
                    session_id = %session.id(),
                    generation = turn.generation,
                    "Discarding stale autonomous turn"
                );
            }
        }
    });
}
