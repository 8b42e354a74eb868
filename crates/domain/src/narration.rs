//! Guide narration triggered by state transitions.

use crate::config::{GameConfig, MARVIN_JOINED_MSG};
use crate::message::{Action, Message};
use crate::state::GameState;

/// Arrival announcement for `floor`.
pub fn arrival_line(floor: u8, marvin_joined: bool, config: &GameConfig) -> String {
    if floor != config.top_floor() {
        return format!("Now arriving at floor {floor}...");
    }
    if marvin_joined {
        "Pan Galactic Gargle Blasters are being prepared for your enjoyment. Even Marvin will enjoy one!".to_string()
    } else {
        format!(
            "Now arriving at floor {floor}... The Pan Galactic Gargle Blasters are being prepared, but they're only served to a minimum of two people. Perhaps Marvin would enjoy one? (Though he'd probably just complain about it...)"
        )
    }
}

/// Guide messages to append after `appended` moved the game from `before` to `after`.
///
/// The join announcement comes before the arrival announcement.
pub fn narrate(
    before: &GameState,
    after: &GameState,
    appended: &Message,
    config: &GameConfig,
) -> Vec<Message> {
    let mut lines = Vec::new();

    if appended.action == Action::Join && !before.marvin_joined {
        lines.push(Message::guide(MARVIN_JOINED_MSG));
    }

    if after.current_floor != before.current_floor {
        lines.push(Message::guide(arrival_line(
            after.current_floor,
            after.marvin_joined,
            config,
        )));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Persona;
    use crate::state::compute_game_state;

    fn transition(log: &[Message], next: Message) -> Vec<Message> {
        let config = GameConfig::default();
        let before = compute_game_state(log, &config);
        let mut extended = log.to_vec();
        extended.push(next.clone());
        let after = compute_game_state(&extended, &config);
        narrate(&before, &after, &next, &config)
    }

    #[test]
    fn floor_change_announces_arrival() {
        let lines = transition(&[], Message::from_persona(Persona::Elevator, "ok", Action::Down));
        assert_eq!(lines, vec![Message::guide("Now arriving at floor 2...")]);
    }

    #[test]
    fn clamped_move_is_silent() {
        let log: Vec<_> = (0..2)
            .map(|_| Message::from_persona(Persona::Elevator, "up", Action::Up))
            .collect();
        let lines = transition(&log, Message::from_persona(Persona::Elevator, "more", Action::Up));
        assert!(lines.is_empty());
    }

    #[test]
    fn top_floor_without_marvin_hints_at_him() {
        let log = vec![Message::from_persona(Persona::Elevator, "up", Action::Up)];
        let lines = transition(&log, Message::from_persona(Persona::Elevator, "up!", Action::Up));
        assert_eq!(lines.len(), 1);
        assert!(lines[0].text.contains("Perhaps Marvin would enjoy one?"));
    }

    #[test]
    fn join_then_arrival_at_top() {
        let log = vec![Message::from_persona(Persona::Marvin, "fine", Action::Join)];
        let lines = transition(&log, Message::from_persona(Persona::Elevator, "up", Action::Up));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Now arriving at floor 4...");

        let joined = transition(&[], Message::from_persona(Persona::Marvin, "fine", Action::Join));
        assert_eq!(joined, vec![Message::guide(MARVIN_JOINED_MSG)]);
    }

    #[test]
    fn arrival_at_top_with_marvin_serves_drinks() {
        let config = GameConfig::default();
        assert!(arrival_line(5, true, &config).contains("Even Marvin will enjoy one!"));
    }
}
