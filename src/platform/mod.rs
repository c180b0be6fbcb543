//! Platform input mapping
//!
//! Browser events land in `InputState` as `KeyboardEvent.code` strings.
//! Movement keys are level-triggered (held); start, back and player count
//! are edge-triggered so a held Space does not restart a finished round.

use std::collections::HashSet;

use crate::sim::{ActorInput, TickInput};

/// Keys and clicks seen by the host since the last frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<String>,
    pressed: Vec<String>,
    clicked: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        // Auto-repeat arrives as repeated keydowns; only the first one counts
        if self.held.insert(code.to_string()) {
            self.pressed.push(code.to_string());
        }
    }

    pub fn key_up(&mut self, code: &str) {
        self.held.remove(code);
    }

    pub fn click(&mut self) {
        self.clicked = true;
    }

    /// Focus lost: drop everything held
    pub fn release_all(&mut self) {
        self.held.clear();
    }

    pub fn is_held(&self, code: &str) -> bool {
        self.held.contains(code)
    }

    fn was_pressed(&self, code: &str) -> bool {
        self.pressed.iter().any(|c| c == code)
    }

    /// Build this frame's tick input and clear the edge-triggered state
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = self.tick_input();
        self.pressed.clear();
        self.clicked = false;
        input
    }

    /// Arrows + Space drive the primary actor, WASD + X the secondary
    pub fn tick_input(&self) -> TickInput {
        let select_players = if self.was_pressed("Digit1") || self.was_pressed("Numpad1") {
            Some(1)
        } else if self.was_pressed("Digit2") || self.was_pressed("Numpad2") {
            Some(2)
        } else {
            None
        };

        TickInput {
            primary: ActorInput {
                up: self.is_held("ArrowUp"),
                down: self.is_held("ArrowDown"),
                left: self.is_held("ArrowLeft"),
                right: self.is_held("ArrowRight"),
                action: self.is_held("Space"),
            },
            secondary: ActorInput {
                up: self.is_held("KeyW"),
                down: self.is_held("KeyS"),
                left: self.is_held("KeyA"),
                right: self.is_held("KeyD"),
                action: self.is_held("KeyX"),
            },
            start: self.was_pressed("Space") || self.clicked,
            back: self.was_pressed("Escape"),
            select_players,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_held_keys_map_to_actors() {
        let mut state = InputState::new();
        state.key_down("ArrowLeft");
        state.key_down("KeyW");
        state.key_down("KeyX");
        let input = state.take_tick_input();
        assert!(input.primary.left);
        assert!(!input.primary.right);
        assert!(input.secondary.up);
        assert!(input.secondary.action);

        // Still held next frame
        let input = state.take_tick_input();
        assert!(input.primary.left);
        state.key_up("ArrowLeft");
        assert!(!state.take_tick_input().primary.left);
    }

    #[test]
    fn test_start_is_edge_triggered() {
        let mut state = InputState::new();
        state.key_down("Space");
        let first = state.take_tick_input();
        assert!(first.start);
        assert!(first.primary.action);

        // Repeat keydown while held
        state.key_down("Space");
        let second = state.take_tick_input();
        assert!(!second.start);
        assert!(second.primary.action);
    }

    #[test]
    fn test_click_starts_and_player_select() {
        let mut state = InputState::new();
        state.click();
        state.key_down("Digit2");
        let input = state.take_tick_input();
        assert!(input.start);
        assert_eq!(input.select_players, Some(2));
        assert_eq!(state.take_tick_input().select_players, None);
    }

    #[test]
    fn test_release_all_on_blur() {
        let mut state = InputState::new();
        state.key_down("ArrowUp");
        state.key_down("Escape");
        state.release_all();
        let input = state.take_tick_input();
        assert!(!input.primary.up);
        assert!(input.back);
    }
}
