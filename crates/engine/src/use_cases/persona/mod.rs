//! Persona use cases: asking the elevator, Marvin or the guide for their next line.

mod reply_parser;
mod responder;

pub use reply_parser::{parse_persona_reply, PersonaReply};
pub use responder::{PersonaResponder, FALLBACK_MESSAGE};
