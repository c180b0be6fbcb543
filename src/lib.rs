//! Pixel Arcade - three single-screen arcade games on one simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, stepping, collisions, game state)
//! - `tuning`: Data-driven game balance per variant
//! - `arcade`: Frame driver tying a session to storage and audio
//! - `platform`: Keyboard/mouse mapping into tick input
//! - `persistence`: Key/value storage (LocalStorage on web)
//! - `audio`: Queued sound/music requests and the Web Audio sink

pub mod arcade;
pub mod audio;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use arcade::Arcade;
pub use highscores::BestScore;
pub use settings::Settings;
pub use tuning::{Tuning, Variant};

/// Game configuration constants
pub mod consts {
    /// Simulation ticks per second (one tick per frame)
    pub const SIM_HZ: u32 = 60;
    /// Seconds per tick, for hosts that run their own clock
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Maximum ticks a host should run in one frame to catch up
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Canvas dimensions in pixels (y grows downward)
    pub const CANVAS_WIDTH: f32 = 1400.0;
    pub const CANVAS_HEIGHT: f32 = 900.0;
}
