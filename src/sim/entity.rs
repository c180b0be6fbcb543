//! Spawned entities and the per-kind lanes that hold them
//!
//! Entity kinds are a closed tagged union so the collision scanner can
//! dispatch exhaustively on them.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actor::ActorRole;
use super::spawn::SpawnTimer;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::tuning::{LaneTuning, Motion};

/// Identifies one per-kind entity list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneId {
    /// Falling rocks (PixelEscape)
    Rocks,
    /// Asteroids, lasers, mines... (SpaceRunner)
    Obstacles,
    Stars,
    Hearts,
    /// Shield (space) or hotdog (pixel)
    PowerUps,
    Monsters,
    Sharks,
    Bullets,
    Candies,
}

/// Canvas edge an entity leaves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
    /// Never culled by position (lifetime-limited instead)
    None,
}

impl Edge {
    /// True once `pos` is beyond this edge by more than `size`
    pub fn is_past(&self, pos: Vec2, size: f32) -> bool {
        match self {
            Edge::Left => pos.x < -size,
            Edge::Right => pos.x > CANVAS_WIDTH + size,
            Edge::Top => pos.y < -size,
            Edge::Bottom => pos.y > CANVAS_HEIGHT + size,
            Edge::None => false,
        }
    }
}

/// Unit-scale polygon outline of a rock
///
/// Deserialized outlines pass through `sanitized`, so a restored session
/// never carries a degenerate polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RockOutline")]
pub struct RockShape {
    pub vertices: Vec<Vec2>,
}

/// Wire form of `RockShape`, before validation
#[derive(Deserialize)]
struct RockOutline {
    #[serde(default)]
    vertices: Vec<Vec2>,
}

impl From<RockOutline> for RockShape {
    fn from(outline: RockOutline) -> Self {
        Self::sanitized(outline.vertices)
    }
}

impl RockShape {
    /// Irregular 5-7 sided outline
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let count = rng.random_range(5..8);
        let vertices = (0..count)
            .map(|i| {
                let angle = std::f32::consts::TAU / count as f32 * i as f32
                    + rng.random_range(-0.3..0.3);
                let radius = rng.random_range(0.8..1.2);
                Vec2::new(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        Self { vertices }
    }

    /// Accept an outline, replacing degenerate or non-finite ones with the fallback
    pub fn sanitized(vertices: Vec<Vec2>) -> Self {
        if vertices.len() < 3 || vertices.iter().any(|v| !v.is_finite()) {
            log::debug!("Malformed rock outline ({} vertices), using fallback", vertices.len());
            return Self::fallback();
        }
        Self { vertices }
    }

    /// Regular hexagon
    pub fn fallback() -> Self {
        let vertices = (0..6)
            .map(|i| {
                let angle = std::f32::consts::TAU / 6.0 * i as f32;
                Vec2::new(angle.cos(), angle.sin())
            })
            .collect();
        Self { vertices }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock(RockShape),
    Asteroid,
    Laser,
    Debris,
    Mine,
    Plasma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarColor {
    Yellow,
    Cyan,
    Magenta,
    Green,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectibleKind {
    Star(StarColor),
    Heart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandyKind {
    Lollipop,
    Chocolate,
    Gummy,
    HardCandy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Blocks hazard hits for a while
    Shield,
    /// Hotdog: giant size and invincibility
    Giant,
    /// Tag runner immunity
    Candy(CandyKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MonsterKind {
    Octopus,
    Robot,
    Bug,
    EnemyShip,
    Giant,
}

impl MonsterKind {
    pub const ALL: [MonsterKind; 5] = [
        MonsterKind::Octopus,
        MonsterKind::Robot,
        MonsterKind::Bug,
        MonsterKind::EnemyShip,
        MonsterKind::Giant,
    ];

    pub fn size(&self) -> f32 {
        match self {
            MonsterKind::Giant => 80.0,
            MonsterKind::Robot => 50.0,
            _ => 40.0,
        }
    }

    pub fn hp(&self) -> u8 {
        match self {
            MonsterKind::Giant => 5,
            MonsterKind::EnemyShip => 3,
            MonsterKind::Robot => 2,
            MonsterKind::Octopus | MonsterKind::Bug => 1,
        }
    }

    pub fn points(&self) -> u64 {
        match self {
            MonsterKind::Giant => 200,
            MonsterKind::EnemyShip => 100,
            MonsterKind::Robot => 75,
            MonsterKind::Octopus => 50,
            MonsterKind::Bug => 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub kind: MonsterKind,
    pub hp: u8,
}

/// Shark lifecycle: telegraphed, then lunging, then gone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SharkPhase {
    Warning,
    Attacking,
    Expired,
}

/// Ticks a shark telegraphs before attacking
pub const SHARK_WARNING_TICKS: u32 = 120;
/// Ticks a shark attacks before expiring
pub const SHARK_ATTACK_TICKS: u32 = 120;
/// Sharks spawn in schools of this size
pub const SHARK_SCHOOL_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shark {
    pub phase: SharkPhase,
    /// Ticks spent in the current phase
    pub timer: u32,
    pub base_speed: f32,
    pub target: Vec2,
    /// Sharks from the same spawn share a school id
    pub school: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardKind {
    Monster(Monster),
    Shark(Shark),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Obstacle(ObstacleKind),
    Collectible(CollectibleKind),
    PowerUp(PowerUpKind),
    Hazard(HazardKind),
    Projectile { owner: ActorRole },
}

/// A short-lived, non-controllable object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub pos: Vec2,
    /// Diameter (circle tests) or edge length (box tests)
    pub size: f32,
    pub kind: EntityKind,
    pub rotation: f32,
    /// Rotation per tick
    pub spin: f32,
    /// Animation accumulator (pulse, swim, wobble)
    pub phase: f32,
    /// Remaining lifetime in ticks
    #[serde(default)]
    pub ttl: Option<u32>,
}

impl Entity {
    pub fn new(id: u32, pos: Vec2, size: f32, kind: EntityKind) -> Self {
        Self {
            id,
            pos,
            size,
            kind,
            rotation: 0.0,
            spin: 0.0,
            phase: 0.0,
            ttl: None,
        }
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_ttl(mut self, ttl: Option<u32>) -> Self {
        self.ttl = ttl;
        self
    }

    /// True for entities whose touch costs a life
    pub fn is_harmful(&self) -> bool {
        match &self.kind {
            EntityKind::Obstacle(_) => true,
            EntityKind::Hazard(HazardKind::Shark(shark)) => shark.phase == SharkPhase::Attacking,
            EntityKind::Hazard(HazardKind::Monster(_)) => true,
            EntityKind::Collectible(_) | EntityKind::PowerUp(_) | EntityKind::Projectile { .. } => {
                false
            }
        }
    }
}

/// One per-kind entity list with its capacity, motion and spawner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    pub capacity: usize,
    pub motion: Motion,
    pub exit: Edge,
    pub timer: Option<SpawnTimer>,
    pub entities: Vec<Entity>,
}

impl Lane {
    pub fn from_tuning(tuning: &LaneTuning) -> Self {
        Self {
            id: tuning.id,
            capacity: tuning.capacity,
            motion: tuning.motion,
            exit: tuning.exit,
            timer: tuning.spawn.map(SpawnTimer::new),
            entities: Vec::with_capacity(tuning.capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Whether `count` more entities fit under the capacity
    pub fn has_room(&self, count: usize) -> bool {
        self.entities.len() + count <= self.capacity
    }

    /// Append if under capacity; returns whether the entity was kept
    pub fn push(&mut self, entity: Entity) -> bool {
        if !self.has_room(1) {
            return false;
        }
        self.entities.push(entity);
        true
    }

    /// Index of the first entity matching `pred`, in list order
    pub fn position(&self, pred: impl FnMut(&Entity) -> bool) -> Option<usize> {
        self.entities.iter().position(pred)
    }

    /// Take out the entity at `index` (order of the rest is preserved)
    pub fn take(&mut self, index: usize) -> Entity {
        self.entities.remove(index)
    }

    /// Keep entities matching `keep`; returns how many were dropped
    pub fn retain(&mut self, keep: impl FnMut(&Entity) -> bool) -> usize {
        let before = self.entities.len();
        self.entities.retain(keep);
        before - self.entities.len()
    }
}
