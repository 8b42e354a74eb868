//! Engine configuration from the environment.
//!
//! Every value has a default; unparseable values fall back to it with a
//! warning so a typo in `.env` never stops the server from starting.

use std::str::FromStr;

use sirius_domain::GameConfig;

use crate::infrastructure::pollinations::{DEFAULT_POLLINATIONS_ENDPOINT, DEFAULT_POLLINATIONS_MODEL};
use crate::infrastructure::resilient_llm::RetryConfig;
use crate::prompts::PromptTemplates;
use crate::use_cases::session::DEFAULT_MAX_AUTONOMOUS_TURNS;

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
const DEFAULT_SERVER_PORT: u16 = 3000;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 60;
const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60;
const DEFAULT_PRUNE_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    /// Sampling temperature; the endpoint default when unset
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Comma-separated origins, or `*`. CORS is disabled when unset.
    pub cors_allowed_origins: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Idle sessions older than this are pruned
    pub ttl_secs: u64,
    pub prune_interval_secs: u64,
    pub max_autonomous_turns: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    pub server: ServerConfig,
    pub sessions: SessionConfig,
    pub game: GameConfig,
    pub prompts: PromptTemplates,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let retry_defaults = RetryConfig::default();
        let game_defaults = GameConfig::default();

        Self {
            llm: LlmConfig {
                endpoint: get("HVPT_LLM_ENDPOINT")
                    .unwrap_or_else(|| DEFAULT_POLLINATIONS_ENDPOINT.to_string()),
                model: get("HVPT_LLM_MODEL").unwrap_or_else(|| DEFAULT_POLLINATIONS_MODEL.to_string()),
                timeout_secs: parse_or(&get, "HVPT_LLM_TIMEOUT_SECS", DEFAULT_LLM_TIMEOUT_SECS),
                temperature: parse_opt(&get, "HVPT_LLM_TEMPERATURE"),
            },
            retry: RetryConfig {
                max_attempts: parse_or(&get, "HVPT_RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts),
                base_delay_ms: parse_or(&get, "HVPT_RETRY_BASE_DELAY_MS", retry_defaults.base_delay_ms),
                ..retry_defaults
            },
            server: ServerConfig {
                host: get("HVPT_SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
                port: parse_opt(&get, "HVPT_SERVER_PORT")
                    .or_else(|| parse_opt(&get, "PORT"))
                    .unwrap_or(DEFAULT_SERVER_PORT),
                cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
            },
            sessions: SessionConfig {
                ttl_secs: parse_or(&get, "HVPT_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS),
                prune_interval_secs: parse_or(
                    &get,
                    "HVPT_SESSION_PRUNE_INTERVAL_SECS",
                    DEFAULT_PRUNE_INTERVAL_SECS,
                ),
                max_autonomous_turns: parse_or(
                    &get,
                    "HVPT_MAX_AUTONOMOUS_TURNS",
                    DEFAULT_MAX_AUTONOMOUS_TURNS,
                ),
            },
            game: GameConfig {
                total_moves: parse_or(&get, "HVPT_TOTAL_MOVES", game_defaults.total_moves),
                cheat_code: get("HVPT_CHEAT_CODE").unwrap_or(game_defaults.cheat_code.clone()),
                ..game_defaults
            },
            prompts: PromptTemplates::from_lookup(&get),
        }
    }
}

fn parse_opt<T, G>(get: &G, key: &str) -> Option<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> T
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    parse_opt(get, key).unwrap_or(default)
}
