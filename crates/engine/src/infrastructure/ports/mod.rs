//! Boundaries the engine reaches through a trait.
//!
//! Only the LLM transport and the environment (time, seeds) sit behind ports.
//! Sessions, prompts and the HTTP layer are concrete.

mod environment;
mod error;
mod llm;

pub use environment::{ClockPort, RandomPort};
pub use error::LlmError;
pub use llm::{ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole};

#[cfg(test)]
pub use environment::MockClockPort;
#[cfg(test)]
pub use llm::MockLlmPort;
