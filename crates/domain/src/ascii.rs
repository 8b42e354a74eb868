//! ASCII rendering of the elevator shaft.

use crate::config::GameConfig;
use crate::state::GameState;

const SHAFT: &str = "   |  |   ";
const CAR: &str = "  [|##|]  ";
const MARVIN_IN_CAR: &str = "  [|MA|]  ";
const MARVIN_WAITING: &str = "  MA     ";

const LEGEND_SHAFT: &str = "                   |  |                   ";
const LEGEND_TOP: &str = "                   |  |  <- Floor 5       ";
const LEGEND_GOAL: &str = "                   |  |  <- Floor 1 (Goal)";
const LEGEND_MARVIN: &str = "     Marvin -> MA  |  |  <- Floor 1       ";
const LEGEND_CAR: &str = "      Elevator -> [|##|]                  ";

/// What the shaft drawing needs to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElevatorView {
    pub floor: u8,
    pub floors: u8,
    pub show_legend: bool,
    pub marvin_mode: bool,
    pub marvin_joined: bool,
}

impl ElevatorView {
    pub fn from_state(state: &GameState, config: &GameConfig, show_legend: bool) -> Self {
        Self {
            floor: state.current_floor,
            floors: config.top_floor(),
            show_legend,
            marvin_mode: state.current_persona == crate::message::Persona::Marvin,
            marvin_joined: state.marvin_joined,
        }
    }
}

/// Draw the shaft with the top floor on the first line.
pub fn render_elevator(view: ElevatorView) -> String {
    let floors = usize::from(view.floors.max(1));
    let car = usize::from(view.floor.clamp(1, view.floors.max(1))) - 1;

    let mut rows = vec![SHAFT; floors];
    rows[car] = CAR;
    if view.marvin_mode {
        rows[0] = if view.marvin_joined { MARVIN_IN_CAR } else { MARVIN_WAITING };
    }

    if view.show_legend {
        rows = vec![LEGEND_SHAFT; floors];
        rows[floors - 1] = LEGEND_TOP;
        rows[0] = LEGEND_GOAL;
        if view.marvin_mode {
            rows[0] = LEGEND_MARVIN;
        } else {
            rows[car] = LEGEND_CAR;
        }
    }

    rows.iter().rev().copied().collect::<Vec<_>>().join("\n")
}
