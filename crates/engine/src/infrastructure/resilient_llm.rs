//! Retrying decorator for [`LlmPort`].
//!
//! A persona reply has no partial success: a dropped connection, a 5xx, a body
//! that is not JSON and a reply with no message all cost one attempt. Attempts
//! are spaced by a doubling backoff and capped by [`RetryConfig`].

use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{LlmError, LlmPort, LlmRequest, LlmResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Attempts per request, the first included. Zero behaves like one.
    pub max_attempts: u32,
    /// Pause after the first failure; doubles after each further one
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of the pause that may be added or removed at random
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 30_000,
            jitter_factor: 0.0,
        }
    }
}

impl RetryConfig {
    /// Pause taken after `failures` consecutive failed attempts (1-based).
    pub fn backoff(&self, failures: u32) -> Duration {
        let doublings = failures.saturating_sub(1).min(63);
        let nominal = self
            .base_delay_ms
            .saturating_mul(1u64 << doublings)
            .min(self.max_delay_ms);

        let spread = (nominal as f64 * self.jitter_factor.clamp(0.0, 1.0)) as u64;
        let millis = if spread == 0 {
            nominal
        } else {
            let low = nominal.saturating_sub(spread);
            rand::thread_rng().gen_range(low..=nominal.saturating_add(spread))
        };
        Duration::from_millis(millis)
    }
}

/// Drive `attempt` until it yields `Ok` or the attempt budget runs out.
///
/// The error of the final attempt is returned; no pause follows it.
pub async fn execute_with_retry<T, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    attempt: F,
) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let budget = config.max_attempts.max(1);
    let mut failures = 0;

    loop {
        let error = match attempt().await {
            Ok(value) => {
                if failures > 0 {
                    tracing::info!(operation, failures, "LLM call recovered");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        failures += 1;
        if failures >= budget {
            tracing::error!(operation, attempts = budget, %error, "LLM call gave up");
            return Err(error);
        }

        let pause = config.backoff(failures);
        tracing::warn!(
            operation,
            attempt = failures,
            of = budget,
            pause_ms = pause.as_millis() as u64,
            %error,
            "LLM call failed; backing off"
        );
        tokio::time::sleep(pause).await;
    }
}

/// An [`LlmPort`] behind a [`RetryConfig`].
pub struct ResilientLlmClient {
    inner: Arc<dyn LlmPort>,
    config: RetryConfig,
}

impl ResilientLlmClient {
    pub fn new(inner: Arc<dyn LlmPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// One attempt is a round trip plus `decode`; a decode failure retries both.
    pub async fn generate_parsed<T, D>(
        &self,
        operation: &str,
        request: LlmRequest,
        decode: D,
    ) -> Result<T, LlmError>
    where
        D: Fn(&LlmResponse) -> Result<T, LlmError>,
    {
        let decode = &decode;
        let request = &request;
        execute_with_retry(&self.config, operation, || async move {
            let response = self.inner.generate(request.clone()).await?;
            decode(&response)
        })
        .await
    }
}

#[async_trait]
impl LlmPort for ResilientLlmClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        self.generate_parsed("generate", request, |response| Ok(response.clone()))
            .await
    }
}
