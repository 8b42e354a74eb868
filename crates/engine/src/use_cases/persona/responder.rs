//! Fetch the next line from a persona.
//!
//! The responder selects the persona's system prompt for the current game
//! state, reshapes the log into role-tagged chat turns, and asks the LLM for a
//! `{message, action}` reply. The round trip and the reply decode are retried
//! together; once the attempts run out the persona apologises in character.

use serde::Serialize;
use std::sync::Arc;

use sirius_domain::{Action, GameConfig, GameState, Message, Persona, Speaker};

use crate::infrastructure::ports::{ChatMessage, LlmRequest, RandomPort};
use crate::infrastructure::resilient_llm::ResilientLlmClient;
use crate::prompts::PromptTemplates;

use super::reply_parser::parse_persona_reply;

/// Line spoken when every attempt failed.
pub const FALLBACK_MESSAGE: &str = "Apologies, I'm experiencing some difficulties.";

pub struct PersonaResponder {
    llm: Arc<ResilientLlmClient>,
    random: Arc<dyn RandomPort>,
    prompts: PromptTemplates,
    temperature: Option<f32>,
}

impl PersonaResponder {
    pub fn new(
        llm: Arc<ResilientLlmClient>,
        random: Arc<dyn RandomPort>,
        prompts: PromptTemplates,
        temperature: Option<f32>,
    ) -> Self {
        Self {
            llm,
            random,
            prompts,
            temperature,
        }
    }

    /// Next message from `persona`, given the log so far.
    ///
    /// Never fails: exhaustion yields [`FALLBACK_MESSAGE`] with `Action::None`.
    /// Actions the persona may not emit are dropped to `Action::None`.
    pub async fn respond(
        &self,
        persona: Persona,
        state: &GameState,
        history: &[Message],
        config: &GameConfig,
    ) -> Message {
        let request = LlmRequest::new(build_history(history))
            .with_system_prompt(self.prompts.render(persona, state, config))
            .with_temperature(self.temperature)
            .with_seed(self.random.gen_seed());

        let operation = format!("persona_reply:{persona}");
        match self
            .llm
            .generate_parsed(&operation, request, |response| {
                parse_persona_reply(&response.content)
            })
            .await
        {
            Ok(reply) => {
                let action = persona.sanitize(reply.action);
                if action != reply.action {
                    tracing::debug!(
                        persona = %persona,
                        requested = %reply.action,
                        "Dropping action the persona may not emit"
                    );
                }
                Message::from_persona(persona, reply.message, action)
            }
            Err(e) => {
                tracing::warn!(persona = %persona, error = %e, "Falling back to apology line");
                Message::from_persona(persona, FALLBACK_MESSAGE, Action::None)
            }
        }
    }
}

#[derive(Serialize)]
struct ReplyPayload<'a> {
    message: &'a str,
    action: Action,
}

/// Reshape the log into chat turns: the user speaks as `user`, everyone
/// else as a named `assistant`.
fn build_history(history: &[Message]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|msg| {
            let content = serde_json::to_string(&ReplyPayload {
                message: &msg.text,
                action: msg.action,
            })
            .unwrap_or_else(|_| msg.text.clone());

            match msg.speaker {
                Speaker::User => ChatMessage::user(content),
                speaker => ChatMessage::assistant(content).with_name(speaker.as_str()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::ports::{LlmError, LlmResponse, MessageRole, MockLlmPort};
    use crate::infrastructure::resilient_llm::RetryConfig;
    use sirius_domain::compute_game_state;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
            jitter_factor: 0.0,
        }
    }

    fn responder(mock: MockLlmPort) -> PersonaResponder {
        let llm = Arc::new(ResilientLlmClient::new(Arc::new(mock), fast_retry()));
        PersonaResponder::new(
            llm,
            Arc::new(FixedRandom(4242)),
            PromptTemplates::default(),
            Some(0.7),
        )
    }

    /// Mock that fails `failures` times with `error`, then replies with `content`.
    fn flaky_mock(failures: u32, error: LlmError, content: &'static str) -> (MockLlmPort, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockLlmPort::new();
        mock.expect_generate().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) < failures {
                Err(error.clone())
            } else {
                Ok(LlmResponse::stop(content))
            }
        });
        (mock, calls)
    }

    #[tokio::test]
    async fn returns_payload_after_transient_failures() {
        let (mock, calls) = flaky_mock(
            2,
            LlmError::RequestFailed("HTTP error 502".into()),
            r#"{"message":"Oh, all right. Down we go.","action":"down"}"#,
        );
        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);

        let reply = responder(mock)
            .respond(Persona::Elevator, &state, &[Message::user("please")], &config)
            .await;

        assert_eq!(reply, Message::from_persona(Persona::Elevator, "Oh, all right. Down we go.", Action::Down));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn malformed_json_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut mock = MockLlmPort::new();
        mock.expect_generate().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(LlmResponse::stop("I am not JSON"))
            } else {
                Ok(LlmResponse::stop(r#"{"message":"Fine.","action":"none"}"#))
            }
        });
        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);

        let reply = responder(mock).respond(Persona::Elevator, &state, &[], &config).await;

        assert_eq!(reply.text, "Fine.");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn falls_back_when_every_attempt_fails() {
        let (mock, calls) = flaky_mock(10, LlmError::EmptyResponse, "unused");
        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);

        let reply = responder(mock).respond(Persona::Marvin, &state, &[], &config).await;

        assert_eq!(reply, Message::from_persona(Persona::Marvin, FALLBACK_MESSAGE, Action::None));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn forbidden_action_is_dropped() {
        let (mock, _) = flaky_mock(
            0,
            LlmError::EmptyResponse,
            r#"{"message":"I shall go down instead.","action":"down"}"#,
        );
        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);

        let reply = responder(mock).respond(Persona::Marvin, &state, &[], &config).await;

        assert_eq!(reply.action, Action::None);
        assert_eq!(reply.speaker, Speaker::Marvin);
    }

    #[tokio::test]
    async fn request_carries_prompt_seed_and_named_history() {
        let mut mock = MockLlmPort::new();
        mock.expect_generate()
            .withf(|req: &LlmRequest| {
                req.seed == Some(4242)
                    && req.temperature == Some(0.7)
                    && req
                        .system_prompt
                        .as_deref()
                        .is_some_and(|p| p.contains("Happy Vertical People Transporter"))
                    && req.messages.len() == 2
                    && req.messages[0].role == MessageRole::Assistant
                    && req.messages[0].name.as_deref() == Some("guide")
                    && req.messages[1].role == MessageRole::User
                    && req.messages[1].name.is_none()
                    && req.messages[1].content == r#"{"message":"hello","action":"none"}"#
            })
            .times(1)
            .returning(|_| Ok(LlmResponse::stop(r#"{"message":"Hi.","action":"none"}"#)));

        let config = GameConfig::default();
        let history = vec![Message::guide("Welcome"), Message::user("hello")];
        let state = compute_game_state(&history, &config);

        let reply = responder(mock).respond(Persona::Elevator, &state, &history, &config).await;
        assert_eq!(reply.text, "Hi.");
    }
}
