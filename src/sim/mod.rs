//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed step per frame
//! - Seeded RNG only
//! - Stable iteration order (list order within each lane)
//! - No rendering, audio or platform dependencies

pub mod actor;
pub mod arena;
pub mod collision;
pub mod difficulty;
pub mod entity;
pub mod phase;
pub mod spawn;
pub mod state;
pub mod step;
pub mod tick;

pub use actor::{Actor, ActorInput, ActorRole, StatusEffects};
pub use arena::{Arena, Cart, Rect};
pub use collision::{boxes_overlap, circle_hits_rect, circles_overlap, scan_actor};
pub use difficulty::Difficulty;
pub use entity::{Edge, Entity, EntityKind, Lane, LaneId, RockShape};
pub use phase::{GamePhase, PhaseEvent, transition};
pub use spawn::SpawnTimer;
pub use state::{GameEvent, GameSession, Progression, Winner};
pub use step::{cull_lane, step_lanes};
pub use tick::{TickInput, tick};
