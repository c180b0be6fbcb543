//! Session state and core simulation types
//!
//! Everything one running game owns lives in `GameSession`: actors, lanes,
//! progression, the phase machine and the seeded RNG. Nothing is global.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorRole, starting_lineup};
use super::arena::Arena;
use super::difficulty::Difficulty;
use super::entity::{Lane, LaneId, MonsterKind, PowerUpKind};
use super::phase::{GamePhase, PhaseEvent, transition};
use super::spawn::IdAllocator;
use crate::tuning::{ScoreRule, ScoreTuning, Tuning, Variant};

/// Who won a tag round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Chaser,
    Runner,
}

/// Things that happened during a tick, for audio and HUD consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    Jumped { role: ActorRole },
    BulletFired { role: ActorRole },
    CartGrabbed { role: ActorRole },
    ActorHit { role: ActorRole, lives: u8 },
    StarCollected { role: ActorRole, points: u64 },
    HeartCollected { role: ActorRole, lives: u8, gained: bool },
    PowerUpCollected { role: ActorRole, kind: PowerUpKind },
    MonsterHit { kind: MonsterKind },
    MonsterDestroyed { kind: MonsterKind, points: u64 },
    DropSpawned { lane: LaneId },
    SharksIncoming { count: usize },
    DifficultyRaised { level: u32 },
    Tagged,
    TimeUp,
    GameOver { final_score: u64, winner: Option<Winner> },
}

/// Score, distance, timers and difficulty for the current round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progression {
    /// Never decreases within a round
    pub score: u64,
    pub distance: f32,
    pub elapsed_ticks: u64,
    /// Countdown for timed variants
    pub time_left_ticks: Option<u32>,
    pub difficulty: Difficulty,
}

impl Progression {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            distance: 0.0,
            elapsed_ticks: 0,
            time_left_ticks: tuning.round_ticks,
            difficulty: Difficulty::new(&tuning.difficulty),
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Per-tick score and distance accrual
    pub fn accrue(&mut self, rule: ScoreRule) {
        match rule {
            ScoreRule::PerTick => self.add_score(1),
            ScoreRule::Distance => {
                let pace = self.difficulty.pace.max(0.0);
                self.distance += pace;
                self.add_score(pace.floor() as u64);
            }
            ScoreRule::None => {}
        }
    }

    /// The number compared against the best score
    pub fn final_score(&self, scoring: &ScoreTuning) -> u64 {
        let divisor = scoring.final_divisor.max(1);
        match scoring.rule {
            ScoreRule::PerTick => self.score / divisor,
            ScoreRule::Distance => (self.distance.max(0.0) as u64) / divisor,
            ScoreRule::None => 0,
        }
    }

    /// Whole seconds left on the round timer
    pub fn seconds_left(&self) -> Option<u32> {
        self.time_left_ticks.map(|t| t.div_ceil(crate::consts::SIM_HZ))
    }
}

/// One running game (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub tuning: Tuning,
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) ids: IdAllocator,
    pub phase: GamePhase,
    /// 1 or 2 (tag always runs two actors)
    pub players: u8,
    pub actors: Vec<Actor>,
    /// In collision scan order
    pub lanes: Vec<Lane>,
    pub arena: Arena,
    pub progression: Progression,
    /// Set when a tag round ends
    pub winner: Option<Winner>,
    /// Rounds started in this session
    pub rounds: u32,
    /// Events raised since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        let players = 1;
        let arena = match tuning.variant {
            Variant::SupermarketTag => Arena::supermarket(),
            Variant::PixelEscape | Variant::SpaceRunner => Arena::empty(),
        };
        Self {
            actors: starting_lineup(tuning.variant, players, &tuning.actor),
            lanes: tuning.lanes.iter().map(Lane::from_tuning).collect(),
            progression: Progression::new(&tuning),
            rng: Pcg32::seed_from_u64(seed),
            ids: IdAllocator::default(),
            phase: GamePhase::Menu,
            players,
            arena,
            winner: None,
            rounds: 0,
            events: Vec::new(),
            seed,
            tuning,
        }
    }

    pub fn variant(&self) -> Variant {
        self.tuning.variant
    }

    /// Restore every round scalar to its starting value
    pub fn reset(&mut self) {
        self.actors = starting_lineup(self.tuning.variant, self.players, &self.tuning.actor);
        self.lanes = self.tuning.lanes.iter().map(Lane::from_tuning).collect();
        self.arena.reset();
        self.progression = Progression::new(&self.tuning);
        self.winner = None;
    }

    /// Choose 1 or 2 players; only honored on the menu
    pub fn set_players(&mut self, players: u8) -> bool {
        if self.phase != GamePhase::Menu || !(1..=2).contains(&players) {
            return false;
        }
        if players == 2 && !self.tuning.variant.supports_two_players() {
            return false;
        }
        if self.players != players {
            log::info!("{}: {} player mode", self.tuning.variant.as_str(), players);
            self.players = players;
            self.actors = starting_lineup(self.tuning.variant, players, &self.tuning.actor);
        }
        true
    }

    /// Feed an event to the phase machine; returns whether the phase changed
    pub fn handle(&mut self, event: PhaseEvent) -> bool {
        let from = self.phase;
        let Some(to) = transition(from, event) else {
            log::debug!("Ignored {:?} in {:?}", event, from);
            return false;
        };

        if to == GamePhase::Playing {
            self.reset();
            self.rounds += 1;
            log::info!(
                "{} round {} started ({} player{})",
                self.tuning.variant.as_str(),
                self.rounds,
                self.players,
                if self.players == 1 { "" } else { "s" }
            );
        }
        self.phase = to;
        self.events.push(GameEvent::PhaseChanged { from, to });

        if to == GamePhase::GameOver {
            let final_score = self.final_score();
            log::info!(
                "{} over after {} ticks: final score {}, winner {:?}",
                self.tuning.variant.as_str(),
                self.progression.elapsed_ticks,
                final_score,
                self.winner
            );
            self.events.push(GameEvent::GameOver { final_score, winner: self.winner });
        }
        true
    }

    pub fn final_score(&self) -> u64 {
        self.progression.final_score(&self.tuning.scoring)
    }

    pub fn lane(&self, id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|l| l.id == id)
    }

    pub fn lane_mut(&mut self, id: LaneId) -> Option<&mut Lane> {
        self.lanes.iter_mut().find(|l| l.id == id)
    }

    pub fn actor(&self, role: ActorRole) -> Option<&Actor> {
        self.actors.iter().find(|a| a.role == role)
    }

    pub fn actor_mut(&mut self, role: ActorRole) -> Option<&mut Actor> {
        self.actors.iter_mut().find(|a| a.role == role)
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        self.ids.next_id()
    }

    /// Take every event raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{CollectibleKind, Entity, EntityKind, StarColor};
    use glam::Vec2;

    fn session(variant: Variant) -> GameSession {
        GameSession::new(Tuning::for_variant(variant), 42)
    }

    #[test]
    fn test_new_session_starts_in_menu() {
        let s = session(Variant::SpaceRunner);
        assert_eq!(s.phase, GamePhase::Menu);
        assert_eq!(s.actors.len(), 1);
        assert_eq!(s.lanes.len(), 6);
        assert_eq!(s.progression.score, 0);
    }

    #[test]
    fn test_reset_restores_initial_scalars() {
        let mut s = session(Variant::PixelEscape);
        s.handle(PhaseEvent::Start);
        s.progression.score = 1234;
        s.progression.elapsed_ticks = 999;
        s.progression.difficulty.speed = 7.5;
        s.actors[0].lives = 1;
        s.actors[0].effects.giant_ticks = 50;
        let star = Entity::new(
            1,
            Vec2::ZERO,
            30.0,
            EntityKind::Collectible(CollectibleKind::Star(StarColor::Yellow)),
        );
        s.lane_mut(LaneId::Stars).unwrap().push(star);
        s.actors[0].lives = 0;
        s.handle(PhaseEvent::LivesDepleted);
        assert_eq!(s.phase, GamePhase::GameOver);

        s.handle(PhaseEvent::Start);
        let fresh = session(Variant::PixelEscape);
        assert_eq!(s.phase, GamePhase::Playing);
        assert_eq!(s.progression, fresh.progression);
        assert_eq!(s.actors[0].lives, 3);
        assert_eq!(s.actors[0].effects, fresh.actors[0].effects);
        assert!(s.lanes.iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_player_count_only_on_menu() {
        let mut s = session(Variant::SpaceRunner);
        assert!(s.set_players(2));
        assert_eq!(s.actors.len(), 2);
        s.handle(PhaseEvent::Start);
        assert_eq!(s.actors.len(), 2);
        assert!(!s.set_players(1));
        assert_eq!(s.players, 2);

        let mut tag = session(Variant::SupermarketTag);
        assert!(!tag.set_players(2));
        assert_eq!(tag.actors.len(), 2);
    }

    #[test]
    fn test_game_over_event_carries_final_score() {
        let mut s = session(Variant::SpaceRunner);
        s.handle(PhaseEvent::Start);
        s.progression.distance = 1234.0;
        s.handle(PhaseEvent::LivesDepleted);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::GameOver { final_score: 123, winner: None }));
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_ignored_event_leaves_phase() {
        let mut s = session(Variant::PixelEscape);
        assert!(!s.handle(PhaseEvent::Back));
        assert!(!s.handle(PhaseEvent::Tagged));
        assert_eq!(s.phase, GamePhase::Menu);
        assert!(s.drain_events().is_empty());
    }

    #[test]
    fn test_final_score_rules() {
        let tuning = Tuning::for_variant(Variant::PixelEscape);
        let mut p = Progression::new(&tuning);
        for _ in 0..95 {
            p.accrue(tuning.scoring.rule);
        }
        assert_eq!(p.score, 95);
        assert_eq!(p.final_score(&tuning.scoring), 9);

        let tag = Tuning::for_variant(Variant::SupermarketTag);
        let p = Progression::new(&tag);
        assert_eq!(p.seconds_left(), Some(60));
        assert_eq!(p.final_score(&tag.scoring), 0);
    }
}
