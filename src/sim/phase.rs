//! Menu / Playing / GameOver state machine

use serde::{Deserialize, Serialize};

/// Current phase of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, player count selectable
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Round ended, waiting for restart or back
    GameOver,
}

/// Something that may move the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// Space or click
    Start,
    /// Escape
    Back,
    /// An actor ran out of lives
    LivesDepleted,
    /// Round timer hit zero
    TimerExpired,
    /// Chaser caught the runner
    Tagged,
}

/// The transition table. `None` means the event is ignored in that phase.
pub fn transition(from: GamePhase, event: PhaseEvent) -> Option<GamePhase> {
    use GamePhase::*;
    use PhaseEvent::*;
    match (from, event) {
        (Menu, Start) | (GameOver, Start) => Some(Playing),
        (GameOver, Back) | (Playing, Back) => Some(Menu),
        (Playing, LivesDepleted) | (Playing, TimerExpired) | (Playing, Tagged) => Some(GameOver),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHASES: [GamePhase; 3] = [GamePhase::Menu, GamePhase::Playing, GamePhase::GameOver];
    const EVENTS: [PhaseEvent; 5] = [
        PhaseEvent::Start,
        PhaseEvent::Back,
        PhaseEvent::LivesDepleted,
        PhaseEvent::TimerExpired,
        PhaseEvent::Tagged,
    ];

    #[test]
    fn test_listed_transitions() {
        assert_eq!(transition(GamePhase::Menu, PhaseEvent::Start), Some(GamePhase::Playing));
        assert_eq!(transition(GamePhase::GameOver, PhaseEvent::Start), Some(GamePhase::Playing));
        assert_eq!(transition(GamePhase::GameOver, PhaseEvent::Back), Some(GamePhase::Menu));
        assert_eq!(transition(GamePhase::Playing, PhaseEvent::Back), Some(GamePhase::Menu));
        assert_eq!(
            transition(GamePhase::Playing, PhaseEvent::LivesDepleted),
            Some(GamePhase::GameOver)
        );
        assert_eq!(
            transition(GamePhase::Playing, PhaseEvent::TimerExpired),
            Some(GamePhase::GameOver)
        );
        assert_eq!(transition(GamePhase::Playing, PhaseEvent::Tagged), Some(GamePhase::GameOver));
    }

    #[test]
    fn test_unlisted_pairs_are_rejected() {
        let mut accepted = 0;
        for from in PHASES {
            for event in EVENTS {
                if transition(from, event).is_some() {
                    accepted += 1;
                }
            }
        }
        assert_eq!(accepted, 7);
        assert_eq!(transition(GamePhase::Menu, PhaseEvent::Back), None);
        assert_eq!(transition(GamePhase::Playing, PhaseEvent::Start), None);
        assert_eq!(transition(GamePhase::Menu, PhaseEvent::LivesDepleted), None);
        assert_eq!(transition(GamePhase::GameOver, PhaseEvent::Tagged), None);
    }

    #[test]
    fn test_initial_phase_is_menu() {
        assert_eq!(GamePhase::default(), GamePhase::Menu);
    }
}
