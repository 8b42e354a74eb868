//! One running game.
//!
//! A session owns the message log and everything that appends to it: user
//! input, guide advice, the Marvin transition/rewind switch and the autonomous
//! driver. The game state is always recomputed from the log.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use sirius_domain::{
    compute_game_state, narrate, render_elevator, ElevatorView, GameConfig, GameError, GameState,
    Message, MessageLog, Outcome, Persona, Speaker, CHEAT_MSG, MARVIN_TRANSITION_MSG, WELCOME_MSG,
};

use crate::infrastructure::ports::ClockPort;
use crate::use_cases::persona::PersonaResponder;

use super::autonomous::{plan_next_turn, spawn_turn, PlannedTurn};
use super::SessionError;

/// Shared collaborators every session is built from.
#[derive(Clone)]
pub struct SessionDeps {
    pub config: GameConfig,
    pub responder: Arc<PersonaResponder>,
    pub clock: Arc<dyn ClockPort>,
    pub max_autonomous_turns: u32,
}

/// Terminal banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeView {
    pub kind: Outcome,
    pub title: String,
    pub description: String,
}

impl From<Outcome> for OutcomeView {
    fn from(outcome: Outcome) -> Self {
        Self {
            kind: outcome,
            title: outcome.title().to_string(),
            description: outcome.description().to_string(),
        }
    }
}

/// Everything a client needs to draw the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub state: GameState,
    pub messages: Vec<Message>,
    pub instruction: Option<String>,
    pub outcome: Option<OutcomeView>,
    pub screen: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// ASCII elevator followed by the transcript.
///
/// The legend is drawn until the user has said anything.
pub fn render_screen(messages: &[Message], state: &GameState, config: &GameConfig) -> String {
    let show_legend = !messages.iter().any(|m| m.speaker == Speaker::User);
    let mut screen = render_elevator(ElevatorView::from_state(state, config, show_legend));
    screen.push('\n');
    for message in messages {
        screen.push('\n');
        screen.push_str(&message.transcript_line());
    }
    screen.push('\n');
    screen
}

pub struct GameSession {
    id: Uuid,
    me: Weak<GameSession>,
    config: GameConfig,
    log: RwLock<MessageLog>,
    /// Bumped on every log change; stale autonomous turns compare against it
    generation: AtomicU64,
    /// Held for the duration of a user-initiated request
    turn: Mutex<()>,
    responder: Arc<PersonaResponder>,
    clock: Arc<dyn ClockPort>,
    max_autonomous_turns: u32,
    created_at: DateTime<Utc>,
    last_activity_ms: AtomicI64,
    shutdown: CancellationToken,
    pending_turn: StdMutex<PendingTurn>,
}

/// The autonomous turn currently armed, and the log generation it belongs to.
#[derive(Default)]
struct PendingTurn {
    generation: u64,
    token: Option<CancellationToken>,
}

impl GameSession {
    /// New game, seeded with the welcome line.
    pub fn new(id: Uuid, deps: SessionDeps) -> Arc<Self> {
        let now = deps.clock.now();
        let mut log = MessageLog::new();
        log.append(Message::guide(WELCOME_MSG));

        Arc::new_cyclic(|me| Self {
            id,
            me: me.clone(),
            config: deps.config,
            log: RwLock::new(log),
            generation: AtomicU64::new(0),
            turn: Mutex::new(()),
            responder: deps.responder,
            clock: deps.clock,
            max_autonomous_turns: deps.max_autonomous_turns,
            created_at: now,
            last_activity_ms: AtomicI64::new(now.timestamp_millis()),
            shutdown: CancellationToken::new(),
            pending_turn: StdMutex::new(PendingTurn::default()),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.last_activity_ms.load(Ordering::SeqCst))
            .unwrap_or(self.created_at)
    }

    fn touch(&self) {
        self.last_activity_ms
            .store(self.clock.now().timestamp_millis(), Ordering::SeqCst);
    }

    pub async fn state(&self) -> GameState {
        let log = self.log.read().await;
        compute_game_state(log.messages(), &self.config)
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.log.read().await.messages().to_vec()
    }

    pub async fn snapshot(&self) -> SessionView {
        let log = self.log.read().await;
        let state = compute_game_state(log.messages(), &self.config);

        SessionView {
            id: self.id,
            instruction: state.instruction().map(str::to_string),
            outcome: state.outcome().map(OutcomeView::from),
            screen: render_screen(log.messages(), &state, &self.config),
            messages: log.messages().to_vec(),
            state,
            created_at: self.created_at,
            last_activity: self.last_activity(),
        }
    }

    /// Plain-text screen: elevator drawing plus transcript.
    pub async fn screen(&self) -> String {
        let log = self.log.read().await;
        let state = compute_game_state(log.messages(), &self.config);
        render_screen(log.messages(), &state, &self.config)
    }

    /// Stop the autonomous driver for good.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    fn begin_turn(&self) -> Result<tokio::sync::MutexGuard<'_, ()>, SessionError> {
        self.turn.try_lock().map_err(|_| SessionError::Busy)
    }

    /// Send user input to the active persona and append its reply.
    ///
    /// The cheat code skips the elevator stage without consuming a move.
    pub async fn send_user_message(&self, text: &str) -> Result<SessionView, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::EmptyInput.into());
        }

        let _turn = self.begin_turn()?;
        let state = self.state().await;
        if state.has_won {
            return Err(GameError::GameOver.into());
        }
        if state.is_autonomous() {
            return Err(GameError::AutonomousMode.into());
        }
        if state.moves_left == 0 {
            return Err(GameError::OutOfMoves.into());
        }

        let cheat_applies = state.current_persona == Persona::Elevator
            && !state.first_stage_complete
            && self.config.is_cheat_code(text);
        if cheat_applies {
            tracing::info!(session_id = %self.id, "Cheat code entered");
            self.commit(Message::guide(CHEAT_MSG)).await;
            return Ok(self.snapshot().await);
        }

        self.commit(Message::user(text)).await;

        let (state, history) = self.state_and_history().await;
        let persona = state.current_persona;
        tracing::debug!(session_id = %self.id, persona = %persona, moves_left = state.moves_left, "Fetching persona reply");

        let reply = self
            .responder
            .respond(persona, &state, &history, &self.config)
            .await;
        self.commit(reply).await;

        Ok(self.snapshot().await)
    }

    /// "Don't Panic!": ask the guide for a hint.
    pub async fn guide_advice(&self) -> Result<SessionView, SessionError> {
        let _turn = self.begin_turn()?;
        let (state, history) = self.state_and_history().await;

        let advice = self
            .responder
            .respond(Persona::Guide, &state, &history, &self.config)
            .await;
        self.commit(advice).await;

        Ok(self.snapshot().await)
    }

    /// Hand over to Marvin, or replay the Marvin stage once he has joined.
    pub async fn switch_persona(&self) -> Result<SessionView, SessionError> {
        let _turn = self.begin_turn()?;
        let state = self.state().await;

        if state.is_autonomous() {
            self.rewind().await?;
        } else if state.current_persona == Persona::Marvin {
            return Err(GameError::AlreadyTransitioned.into());
        } else if !state.first_stage_complete {
            return Err(GameError::StageIncomplete.into());
        } else {
            self.commit(Message::guide(MARVIN_TRANSITION_MSG)).await;
        }

        Ok(self.snapshot().await)
    }

    async fn rewind(&self) -> Result<(), GameError> {
        {
            let mut log = self.log.write().await;
            if !log.rewind_to_marvin_join() {
                return Err(GameError::NothingToRewind);
            }
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!(session_id = %self.id, log_len = log.len(), "Rewound to before Marvin joined");
            self.schedule(generation, self.plan(&log, generation));
        }

        self.touch();
        Ok(())
    }

    async fn state_and_history(&self) -> (GameState, Vec<Message>) {
        let log = self.log.read().await;
        (
            compute_game_state(log.messages(), &self.config),
            log.messages().to_vec(),
        )
    }

    /// Append `message` plus the guide narration it triggers.
    ///
    /// Returns `false` when the message was a consecutive duplicate.
    async fn commit(&self, message: Message) -> bool {
        {
            let mut log = self.log.write().await;
            let Some(generation) = self.append_with_narration(&mut log, message) else {
                return false;
            };
            self.schedule(generation, self.plan(&log, generation));
        }

        self.touch();
        true
    }

    /// Append under the write lock. Returns the new generation if the log grew.
    fn append_with_narration(&self, log: &mut MessageLog, message: Message) -> Option<u64> {
        let before = compute_game_state(log.messages(), &self.config);
        if !log.append(message.clone()) {
            tracing::debug!(session_id = %self.id, speaker = %message.speaker, "Dropped duplicate message");
            return None;
        }

        let after = compute_game_state(log.messages(), &self.config);
        for line in narrate(&before, &after, &message, &self.config) {
            log.append(line);
        }

        if after.has_won && !before.has_won {
            tracing::info!(session_id = %self.id, floor = after.current_floor, "Game won");
        }

        Some(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn plan(&self, log: &MessageLog, generation: u64) -> Option<PlannedTurn> {
        let state = compute_game_state(log.messages(), &self.config);
        plan_next_turn(log, &state, generation, self.max_autonomous_turns)
    }

    /// Replace the pending autonomous turn with `next`, planned at `generation`.
    ///
    /// Called with the log write lock held. A plan older than the armed one is
    /// ignored so it can never cancel its successor.
    fn schedule(&self, generation: u64, next: Option<PlannedTurn>) {
        let mut pending = match self.pending_turn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if generation < pending.generation {
            tracing::debug!(
                session_id = %self.id,
                generation,
                armed = pending.generation,
                "Ignoring outdated autonomous plan"
            );
            return;
        }
        pending.generation = generation;
        if let Some(previous) = pending.token.take() {
            previous.cancel();
        }

        if let Some(turn) = next {
            if self.shutdown.is_cancelled() {
                return;
            }
            let token = self.shutdown.child_token();
            tracing::debug!(
                session_id = %self.id,
                persona = %turn.persona,
                delay_ms = turn.delay.as_millis() as u64,
                "Scheduling autonomous turn"
            );
            spawn_turn(self.me.clone(), token.clone(), turn);
            pending.token = Some(token);
        }
    }

    /// Reply for a planned turn, or `None` if the log moved on already.
    pub(super) async fn fetch_autonomous_reply(&self, turn: PlannedTurn) -> Option<Message> {
        let (state, history) = {
            let log = self.log.read().await;
            if self.generation.load(Ordering::SeqCst) != turn.generation {
                return None;
            }
            (
                compute_game_state(log.messages(), &self.config),
                log.messages().to_vec(),
            )
        };

        Some(
            self.responder
                .respond(turn.persona, &state, &history, &self.config)
                .await,
        )
    }

    /// Append an autonomous reply if no other change landed while it was fetched.
    pub(super) async fn commit_autonomous_reply(&self, reply: Message, generation: u64) -> bool {
        {
            let mut log = self.log.write().await;
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let Some(generation) = self.append_with_narration(&mut log, reply) else {
                return false;
            };
            self.schedule(generation, self.plan(&log, generation));
        }

        self.touch();
        true
    }
}

impl Drop for GameSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
