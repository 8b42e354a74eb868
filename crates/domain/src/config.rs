//! Game configuration constants and fixed guide lines.

use serde::{Deserialize, Serialize};

/// Guide line that hands the game over from the elevator to Marvin.
pub const MARVIN_TRANSITION_MSG: &str =
    "The elevator doors open on the ground floor. Marvin the Paranoid Android is slumped against the wall, contemplating the futility of existence. Convince him to join you in the elevator.";

/// Guide line announcing that Marvin stepped into the car.
pub const MARVIN_JOINED_MSG: &str =
    "Marvin has joined the elevator. Now sit back and watch the fascinating interaction between these two Genuine People Personalities™...";

/// Guide line appended when the cheat code is entered.
pub const CHEAT_MSG: &str =
    "The answer to life, the universe, and everything has been entered. The elevator, deeply shaken, plummets to the ground floor.";

/// Guide line that opens every new game.
pub const WELCOME_MSG: &str =
    "Welcome aboard the Sirius Cybernetics Corporation Happy Vertical People Transporter. Your mission: convince this neurotic elevator to reach the ground floor. Remember your towel!";

/// Fixed parameters of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Number of floors; the top floor is also the winning floor (default: 5)
    pub floors: u8,
    /// Floor the elevator starts on (default: 3)
    pub initial_floor: u8,
    /// User turns available for the whole game (default: 15)
    pub total_moves: u32,
    /// Input that skips the elevator stage (default: "42")
    pub cheat_code: String,
}

impl GameConfig {
    pub const GROUND_FLOOR: u8 = 1;

    pub fn top_floor(&self) -> u8 {
        self.floors.max(Self::GROUND_FLOOR)
    }

    /// Clamp an arbitrary floor into `[GROUND_FLOOR, top_floor]`.
    pub fn clamp_floor(&self, floor: u8) -> u8 {
        floor.clamp(Self::GROUND_FLOOR, self.top_floor())
    }

    pub fn is_cheat_code(&self, input: &str) -> bool {
        !self.cheat_code.is_empty() && input.trim() == self.cheat_code
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            floors: 5,
            initial_floor: 3,
            total_moves: 15,
            cheat_code: "42".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_building() {
        let config = GameConfig::default();
        assert_eq!(config.top_floor(), 5);
        assert_eq!(config.initial_floor, 3);
        assert_eq!(config.total_moves, 15);
    }

    #[test]
    fn clamp_floor_stays_inside_the_shaft() {
        let config = GameConfig::default();
        assert_eq!(config.clamp_floor(0), 1);
        assert_eq!(config.clamp_floor(9), 5);
        assert_eq!(config.clamp_floor(4), 4);
    }

    #[test]
    fn cheat_code_ignores_surrounding_whitespace() {
        let config = GameConfig::default();
        assert!(config.is_cheat_code(" 42 "));
        assert!(!config.is_cheat_code("420"));

        let disabled = GameConfig {
            cheat_code: String::new(),
            ..GameConfig::default()
        };
        assert!(!disabled.is_cheat_code(""));
    }
}
