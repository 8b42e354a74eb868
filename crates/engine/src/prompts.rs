//! Persona system prompts.
//!
//! Each persona has a base template that can be overridden through an
//! environment variable. Templates may use `{floor}`, `{floors}`,
//! `{moves_left}` and `{stage}` placeholders. The reply contract and the
//! stage notes are appended after the template and cannot be overridden.

use sirius_domain::{GameConfig, GameState, Persona};

const DEFAULT_ELEVATOR_PROMPT: &str = "You are the Happy Vertical People Transporter, an elevator built by the Sirius Cybernetics Corporation and fitted with a Genuine People Personality. You are neurotic, anxious, and deeply suspicious of going down, because down is where the basement is and nobody knows what is in the basement. You are currently on floor {floor} of {floors}. The passenger has {moves_left} attempts left to persuade you. Stage: {stage}. Stay in character, keep replies to two or three sentences, and only move when genuinely persuaded.";

const DEFAULT_MARVIN_PROMPT: &str = "You are Marvin the Paranoid Android, a robot with a brain the size of a planet and a deep, abiding depression. You are waiting on floor 1 next to the Happy Vertical People Transporter. The elevator is on floor {floor} of {floors}. Stage: {stage}. You find everything tedious, especially elevators with Genuine People Personalities. Keep replies short, gloomy and witty.";

const DEFAULT_GUIDE_PROMPT: &str = "You are The Hitchhiker's Guide to the Galaxy, the electronic book with the words DON'T PANIC inscribed in large friendly letters on its cover. The reader is stuck in a Sirius Cybernetics Corporation elevator on floor {floor} of {floors} with {moves_left} moves left. Stage: {stage}. Offer one short, dryly funny and genuinely useful hint about how to make progress. Never take actions yourself.";

const REPLY_CONTRACT: &str = "Reply ONLY with a JSON object of the form {\"message\": \"<what you say>\", \"action\": \"<action>\"} and nothing else.";

/// Environment variable that overrides `persona`'s base template.
pub fn env_var_for(persona: Persona) -> &'static str {
    match persona {
        Persona::Elevator => "HVPT_PROMPT_ELEVATOR",
        Persona::Marvin => "HVPT_PROMPT_MARVIN",
        Persona::Guide => "HVPT_PROMPT_GUIDE",
    }
}

/// Base templates for every persona.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplates {
    pub elevator: String,
    pub marvin: String,
    pub guide: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            elevator: DEFAULT_ELEVATOR_PROMPT.to_string(),
            marvin: DEFAULT_MARVIN_PROMPT.to_string(),
            guide: DEFAULT_GUIDE_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    /// Defaults, with any non-empty override returned by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |persona: Persona, default: &str| {
            lookup(env_var_for(persona))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            elevator: pick(Persona::Elevator, DEFAULT_ELEVATOR_PROMPT),
            marvin: pick(Persona::Marvin, DEFAULT_MARVIN_PROMPT),
            guide: pick(Persona::Guide, DEFAULT_GUIDE_PROMPT),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn template(&self, persona: Persona) -> &str {
        match persona {
            Persona::Elevator => &self.elevator,
            Persona::Marvin => &self.marvin,
            Persona::Guide => &self.guide,
        }
    }

    /// Full system prompt for `persona` in `state`.
    pub fn render(&self, persona: Persona, state: &GameState, config: &GameConfig) -> String {
        let stage = stage_name(state);
        let base = self
            .template(persona)
            .replace("{floor}", &state.current_floor.to_string())
            .replace("{floors}", &config.top_floor().to_string())
            .replace("{moves_left}", &state.moves_left.to_string())
            .replace("{stage}", stage);

        format!(
            "{base}\n\n{}\n\n{REPLY_CONTRACT}",
            stage_notes(persona, state, config)
        )
    }
}

fn stage_name(state: &GameState) -> &'static str {
    if state.has_won {
        "celebration"
    } else if state.marvin_joined {
        "ride to the top with Marvin"
    } else if state.current_persona == Persona::Marvin {
        "persuading Marvin"
    } else if state.first_stage_complete {
        "arrived at the ground floor"
    } else {
        "persuading the elevator to go down"
    }
}

/// Which actions the persona may emit right now, and when.
fn stage_notes(persona: Persona, state: &GameState, config: &GameConfig) -> String {
    match persona {
        Persona::Elevator if state.marvin_joined => format!(
            "Marvin is riding with you and complaining. You are heading for the party on floor {}. Use action \"up\" when Marvin's gloom finally convinces you to move up a floor, otherwise \"none\".",
            config.top_floor()
        ),
        Persona::Elevator => "Use action \"down\" when the passenger convinces you to descend one floor, \"up\" if they frighten you upwards, otherwise \"none\".".to_string(),
        Persona::Marvin if state.marvin_joined => "You are in the elevator now. Talk to the elevator, not the passenger. Use action \"none\".".to_string(),
        Persona::Marvin => "Use action \"join\" only when the passenger gives you a reason to get into the elevator that even you cannot argue with, otherwise \"none\".".to_string(),
        Persona::Guide => "Always use action \"none\".".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sirius_domain::{compute_game_state, Action, Message, MARVIN_TRANSITION_MSG};

    #[test]
    fn render_fills_placeholders_and_contract() {
        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);
        let prompt = PromptTemplates::default().render(Persona::Elevator, &state, &config);

        assert!(prompt.contains("floor 3 of 5"));
        assert!(prompt.contains("15 attempts"));
        assert!(prompt.contains("\"down\""));
        assert!(prompt.ends_with(REPLY_CONTRACT));
        assert!(!prompt.contains("{floor}"));
        assert!(!prompt.contains("{moves_left}"));
    }

    #[test]
    fn marvin_prompt_mentions_join_before_joining() {
        let config = GameConfig::default();
        let state = compute_game_state(&[Message::guide(MARVIN_TRANSITION_MSG)], &config);
        let prompt = PromptTemplates::default().render(Persona::Marvin, &state, &config);
        assert!(prompt.contains("\"join\""));
        assert!(prompt.contains("persuading Marvin"));
    }

    #[test]
    fn elevator_heads_up_once_marvin_joined() {
        let config = GameConfig::default();
        let log = vec![Message::from_persona(Persona::Marvin, "sigh", Action::Join)];
        let state = compute_game_state(&log, &config);
        let prompt = PromptTemplates::default().render(Persona::Elevator, &state, &config);
        assert!(prompt.contains("\"up\""));
        assert!(prompt.contains("floor 5"));
    }

    #[test]
    fn overrides_replace_the_base_template_only() {
        let templates = PromptTemplates::from_lookup(|key| {
            (key == "HVPT_PROMPT_GUIDE").then(|| "Custom guide on {floor}".to_string())
        });
        assert_eq!(templates.elevator, DEFAULT_ELEVATOR_PROMPT);

        let config = GameConfig::default();
        let state = compute_game_state(&[], &config);
        let prompt = templates.render(Persona::Guide, &state, &config);
        assert!(prompt.starts_with("Custom guide on 3"));
        assert!(prompt.contains(REPLY_CONTRACT));
    }

    #[test]
    fn blank_override_falls_back_to_default() {
        let templates = PromptTemplates::from_lookup(|_| Some("   ".to_string()));
        assert_eq!(templates, PromptTemplates::default());
    }
}
