//! Use cases - User story orchestration.
//!
//! `persona` asks an LLM persona for its next line; `session` owns running
//! games and decides when each persona speaks.

pub mod persona;
pub mod session;
