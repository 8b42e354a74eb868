//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod pollinations;
pub mod ports;
pub mod resilient_llm;
