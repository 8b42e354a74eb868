//! Message log vocabulary: who spoke, what they said, and the action tag.

use serde::{Deserialize, Serialize};

// =============================================================================
// Speaker / Persona
// =============================================================================

/// Anyone who can appear in the message log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Elevator,
    Marvin,
    Guide,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Elevator => "elevator",
            Speaker::Marvin => "marvin",
            Speaker::Guide => "guide",
        }
    }

    /// Transcript prefix used when rendering a line of dialogue.
    pub fn prefix(&self) -> &'static str {
        match self {
            Speaker::User => "> ",
            Speaker::Elevator => "Elevator: ",
            Speaker::Marvin => "Marvin: ",
            Speaker::Guide => "",
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An LLM-backed conversational role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Elevator,
    Marvin,
    Guide,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        self.speaker().as_str()
    }

    pub fn speaker(&self) -> Speaker {
        match self {
            Persona::Elevator => Speaker::Elevator,
            Persona::Marvin => Speaker::Marvin,
            Persona::Guide => Speaker::Guide,
        }
    }

    /// Action tags this persona is allowed to emit.
    ///
    /// The elevator moves, Marvin joins, the guide only talks.
    pub fn permits(&self, action: Action) -> bool {
        match (self, action) {
            (_, Action::None) => true,
            (Persona::Elevator, Action::Up | Action::Down) => true,
            (Persona::Marvin, Action::Join) => true,
            _ => false,
        }
    }

    /// `action` if permitted for this persona, otherwise `Action::None`.
    pub fn sanitize(&self, action: Action) -> Action {
        if self.permits(action) {
            action
        } else {
            Action::None
        }
    }

    /// The other half of the autonomous elevator/Marvin dialogue.
    ///
    /// Marvin answers everyone except himself; the elevator answers Marvin.
    pub fn autonomous_reply_to(last: Speaker) -> Persona {
        match last {
            Speaker::Marvin => Persona::Elevator,
            _ => Persona::Marvin,
        }
    }
}

impl From<Persona> for Speaker {
    fn from(persona: Persona) -> Self {
        persona.speaker()
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Action tag
// =============================================================================

/// Game-state transition embedded in a persona reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    None,
    Join,
    Up,
    Down,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::None => "none",
            Action::Join => "join",
            Action::Up => "up",
            Action::Down => "down",
        }
    }

    /// Lenient parse used for LLM output. Unknown tags are `None`.
    pub fn parse_lenient(value: &str) -> Action {
        match value.trim().to_ascii_lowercase().as_str() {
            "join" => Action::Join,
            "up" => Action::Up,
            "down" => Action::Down,
            _ => Action::None,
        }
    }

    /// Arrow shown next to moving replies in the transcript.
    pub fn indicator(&self) -> Option<&'static str> {
        match self {
            Action::Up => Some("↑"),
            Action::Down => Some("↓"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Message
// =============================================================================

/// One immutable entry of the message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    #[serde(default)]
    pub action: Action,
}

impl Message {
    pub fn new(speaker: Speaker, text: impl Into<String>, action: Action) -> Self {
        Self {
            speaker,
            text: text.into(),
            action,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Speaker::User, text, Action::None)
    }

    pub fn guide(text: impl Into<String>) -> Self {
        Self::new(Speaker::Guide, text, Action::None)
    }

    pub fn from_persona(persona: Persona, text: impl Into<String>, action: Action) -> Self {
        Self::new(persona.speaker(), text, action)
    }

    /// Single transcript line, e.g. `Elevator: Going up! ↑`.
    pub fn transcript_line(&self) -> String {
        match self.action.indicator() {
            Some(arrow) => format!("{}{} {}", self.speaker.prefix(), self.text, arrow),
            None => format!("{}{}", self.speaker.prefix(), self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_case_insensitively() {
        assert_eq!(Action::parse_lenient("UP"), Action::Up);
        assert_eq!(Action::parse_lenient(" down "), Action::Down);
        assert_eq!(Action::parse_lenient("Join"), Action::Join);
        assert_eq!(Action::parse_lenient("sideways"), Action::None);
        assert_eq!(Action::parse_lenient(""), Action::None);
    }

    #[test]
    fn autonomous_turns_alternate() {
        assert_eq!(Persona::autonomous_reply_to(Speaker::Marvin), Persona::Elevator);
        assert_eq!(Persona::autonomous_reply_to(Speaker::Elevator), Persona::Marvin);
        assert_eq!(Persona::autonomous_reply_to(Speaker::Guide), Persona::Marvin);
    }

    #[test]
    fn personas_only_emit_their_own_actions() {
        assert_eq!(Persona::Elevator.sanitize(Action::Down), Action::Down);
        assert_eq!(Persona::Elevator.sanitize(Action::Join), Action::None);
        assert_eq!(Persona::Marvin.sanitize(Action::Join), Action::Join);
        assert_eq!(Persona::Marvin.sanitize(Action::Up), Action::None);
        assert_eq!(Persona::Guide.sanitize(Action::Down), Action::None);
    }

    #[test]
    fn message_serializes_with_lowercase_tags() {
        let msg = Message::from_persona(Persona::Elevator, "Going up", Action::Up);
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["speaker"], "elevator");
        assert_eq!(json["action"], "up");
    }

    #[test]
    fn missing_action_deserializes_as_none() {
        let msg: Message =
            serde_json::from_str(r#"{"speaker":"user","text":"hello"}"#).expect("deserialize");
        assert_eq!(msg.action, Action::None);
    }

    #[test]
    fn transcript_line_shows_prefix_and_arrow() {
        let msg = Message::from_persona(Persona::Elevator, "Down we go", Action::Down);
        assert_eq!(msg.transcript_line(), "Elevator: Down we go ↓");
        assert_eq!(Message::user("hi").transcript_line(), "> hi");
        assert_eq!(Message::guide("Don't Panic").transcript_line(), "Don't Panic");
    }
}
