//! Frame driver
//!
//! `Arcade` owns one game session plus everything around it: settings, the
//! best score, the key/value store and the audio queue. Hosts call `frame`
//! once per display frame.

use crate::audio::{AudioQueue, PlayRequest, SoundEffect};
use crate::highscores::BestScore;
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameSession, TickInput, tick};
use crate::tuning::Tuning;

/// HUD values for the host to display
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub title: &'static str,
    pub phase: GamePhase,
    pub players: u8,
    pub score: u64,
    pub final_score: u64,
    pub best: u64,
    /// Lives per actor, in lineup order
    pub lives: Vec<u8>,
    pub level: u32,
    pub seconds_left: Option<u32>,
    pub new_best: bool,
}

pub struct Arcade {
    pub session: GameSession,
    pub settings: Settings,
    pub best: BestScore,
    pub audio: AudioQueue,
    store: Box<dyn KeyValueStore>,
    /// Set when the last finished round beat the best score
    new_best: bool,
}

impl Arcade {
    /// Load settings and best score from the store and open a session on the menu
    pub fn new(tuning: Tuning, seed: u64, store: Box<dyn KeyValueStore>) -> Self {
        let settings = Settings::load(store.as_ref());
        let best = BestScore::load(tuning.variant, store.as_ref());
        let mut session = GameSession::new(tuning, seed);
        session.set_players(settings.players);
        log::info!(
            "{} ready (seed {}, best {})",
            session.variant().as_str(),
            seed,
            best.value
        );
        Self {
            session,
            settings,
            best,
            audio: AudioQueue::new(),
            store,
            new_best: false,
        }
    }

    /// Advance one frame; returns the events it raised
    pub fn frame(&mut self, input: &TickInput) -> Vec<GameEvent> {
        let players_before = self.session.players;
        tick(&mut self.session, input);
        let events = self.session.drain_events();

        if self.session.players != players_before {
            self.settings.players = self.session.players;
            self.save_settings();
        }

        for event in &events {
            match event {
                GameEvent::PhaseChanged { to: GamePhase::Playing, .. } => self.new_best = false,
                GameEvent::GameOver { final_score, .. } => self.record(*final_score),
                _ => {}
            }
        }
        self.audio.push_events(&events);
        if self.new_best && events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })) {
            self.audio.push(PlayRequest::Effect(SoundEffect::NewBest));
        }
        events
    }

    fn record(&mut self, final_score: u64) {
        if !self.best.submit(final_score) {
            return;
        }
        self.new_best = true;
        if let Err(err) = self.best.save(self.store.as_mut()) {
            log::warn!("Best score not saved: {}", err);
        }
    }

    pub fn save_settings(&mut self) {
        if let Err(err) = self.settings.save(self.store.as_mut()) {
            log::warn!("Settings not saved: {}", err);
        }
    }

    /// Hand the store back (used when reopening a variant)
    pub fn into_store(self) -> Box<dyn KeyValueStore> {
        self.store
    }

    pub fn hud(&self) -> Hud {
        let progression = &self.session.progression;
        Hud {
            title: self.session.variant().as_str(),
            phase: self.session.phase,
            players: self.session.players,
            score: progression.score,
            final_score: self.session.final_score(),
            best: self.best.value,
            lives: self.session.actors.iter().map(|a| a.lives).collect(),
            level: progression.difficulty.level,
            seconds_left: progression.seconds_left(),
            new_best: self.new_best,
        }
    }
}
