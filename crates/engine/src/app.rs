//! Application state and composition.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::infrastructure::{
    ports::{ClockPort, LlmPort, RandomPort},
    resilient_llm::ResilientLlmClient,
};
use crate::use_cases::persona::PersonaResponder;
use crate::use_cases::session::{SessionDeps, SessionStore};

/// A year; longer TTLs are clamped.
const MAX_SESSION_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub sessions: Arc<SessionStore>,
    pub clock: Arc<dyn ClockPort>,
    pub config: AppConfig,
}

impl App {
    /// Wire the session store on top of a raw LLM transport.
    ///
    /// `llm` is wrapped with the configured retry policy here.
    pub fn new(
        config: AppConfig,
        llm: Arc<dyn LlmPort>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        let resilient = Arc::new(ResilientLlmClient::new(llm, config.retry.clone()));
        tracing::info!(
            max_attempts = config.retry.max_attempts,
            base_delay_ms = config.retry.base_delay_ms,
            "LLM client configured with retry"
        );

        let responder = Arc::new(PersonaResponder::new(
            resilient,
            random,
            config.prompts.clone(),
            config.llm.temperature,
        ));

        let sessions = Arc::new(SessionStore::new(SessionDeps {
            config: config.game.clone(),
            responder,
            clock: clock.clone(),
            max_autonomous_turns: config.sessions.max_autonomous_turns,
        }));

        Self {
            sessions,
            clock,
            config,
        }
    }

    /// Drop idle sessions according to the configured TTL.
    pub fn prune_idle_sessions(&self) -> usize {
        let secs = i64::try_from(self.config.sessions.ttl_secs)
            .unwrap_or(MAX_SESSION_TTL_SECS)
            .min(MAX_SESSION_TTL_SECS);
        let ttl = chrono::Duration::seconds(secs);
        self.sessions.prune_idle(self.clock.now(), ttl)
    }
}
