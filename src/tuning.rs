//! Data-driven game balance
//!
//! Every number the simulation uses lives here, with built-in defaults per
//! game variant. Overrides can be layered on top from JSON.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::TuningError;
use crate::sim::entity::{Edge, LaneId};

/// Which of the three games a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Falling-rock dodger with jumping players
    PixelEscape,
    /// Side-scrolling space shooter
    SpaceRunner,
    /// Chaser vs runner on a round timer
    SupermarketTag,
}

impl Variant {
    pub const ALL: [Variant; 3] = [
        Variant::PixelEscape,
        Variant::SpaceRunner,
        Variant::SupermarketTag,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::PixelEscape => "Pixel Escape",
            Variant::SpaceRunner => "Space Runner",
            Variant::SupermarketTag => "Supermarket Tag",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "pixelescape" | "pixel" => Some(Variant::PixelEscape),
            "spacerunner" | "space" => Some(Variant::SpaceRunner),
            "supermarkettag" | "tag" => Some(Variant::SupermarketTag),
            _ => None,
        }
    }

    /// Storage key for the persisted best score (None = variant keeps no score)
    pub fn best_score_key(&self) -> Option<&'static str> {
        match self {
            Variant::PixelEscape => Some("pixelEscapeHighScore"),
            Variant::SpaceRunner => Some("spaceRunnerHighScore"),
            Variant::SupermarketTag => None,
        }
    }

    /// Whether the menu offers a 1/2 player choice
    pub fn supports_two_players(&self) -> bool {
        !matches!(self, Variant::SupermarketTag)
    }
}

/// How a lane's per-tick velocity is computed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Constant per-tick velocity
    Fixed(Vec2),
    /// `direction * factor * difficulty speed * pace`
    Scaled { direction: Vec2, factor: f32 },
}

/// When a lane's spawner fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnRate {
    /// Fixed number of ticks between attempts
    Every(u32),
    /// Interval owned by the difficulty controller
    Difficulty,
}

/// Per-kind entity list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneTuning {
    pub id: LaneId,
    /// Hard upper bound on live entities in the lane
    pub capacity: usize,
    /// None = lane is filled by other means (bullets, drops)
    pub spawn: Option<SpawnRate>,
    pub motion: Motion,
    /// Edge past which entities are culled
    pub exit: Edge,
    pub size_min: f32,
    pub size_max: f32,
    /// Entities expire after this many ticks
    #[serde(default)]
    pub ttl_ticks: Option<u32>,
    /// Rotation added per tick (spawners may randomize around it)
    #[serde(default)]
    pub spin: f32,
    /// Animation phase added per tick
    #[serde(default)]
    pub phase_step: f32,
}

/// Actor movement and life settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorTuning {
    pub size: f32,
    pub lives: u8,
    pub max_lives: u8,
    /// Velocity added per tick while a direction key is held
    pub accel: f32,
    /// Velocity multiplier applied every tick
    pub friction: f32,
    pub max_speed_x: f32,
    pub max_speed_y: f32,
    /// Direct horizontal speed for ground runners (PixelEscape)
    #[serde(default)]
    pub walk_speed: f32,
    #[serde(default)]
    pub gravity: f32,
    #[serde(default)]
    pub jump_power: f32,
    /// Ground line for jumping actors
    #[serde(default)]
    pub ground_y: f32,
    /// Chaser top speed when it differs from `max_speed_x` (tag)
    #[serde(default)]
    pub chaser_speed: Option<f32>,
}

/// Timed status effect settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectTuning {
    pub shield_ticks: u32,
    pub giant_ticks: u32,
    pub giant_multiplier: f32,
    pub immunity_ticks: u32,
    pub cart_ticks: u32,
    pub cart_boost: f32,
    pub cart_grab_radius: f32,
    pub cart_release_radius: f32,
}

impl Default for EffectTuning {
    fn default() -> Self {
        Self {
            shield_ticks: 300,
            giant_ticks: 300,
            giant_multiplier: 6.0,
            immunity_ticks: 300,
            cart_ticks: 180,
            cart_boost: 1.5,
            cart_grab_radius: 50.0,
            cart_release_radius: 100.0,
        }
    }
}

/// How score accrues outside of pickups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRule {
    /// +1 every playing tick; final score = score / divisor
    PerTick,
    /// +floor(pace) every tick, distance += pace; final = distance / divisor
    Distance,
    /// No score (tag)
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreTuning {
    pub rule: ScoreRule,
    pub star_value: u64,
    pub final_divisor: u64,
    /// Scale on summed radii for hazard circle tests (< 1 is forgiving)
    pub hit_scale: f32,
    /// Chance a destroyed monster drops something
    pub drop_chance: f64,
    /// Given a drop, chance it is a star (else a heart)
    pub drop_star_chance: f64,
}

/// Periodic difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DifficultyTuning {
    /// Ticks between ramps (0 = disabled)
    pub interval_ticks: u32,
    pub speed_start: f32,
    pub speed_step: f32,
    pub speed_max: f32,
    pub spawn_start: u32,
    pub spawn_step: u32,
    pub spawn_min: u32,
    pub pace_start: f32,
    pub pace_step: f32,
    pub pace_max: f32,
}

impl DifficultyTuning {
    pub fn disabled() -> Self {
        Self {
            interval_ticks: 0,
            speed_start: 0.0,
            speed_step: 0.0,
            speed_max: 0.0,
            spawn_start: 1,
            spawn_step: 0,
            spawn_min: 1,
            pace_start: 1.0,
            pace_step: 0.0,
            pace_max: 1.0,
        }
    }
}

/// Complete balance sheet for one variant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub variant: Variant,
    pub actor: ActorTuning,
    #[serde(default)]
    pub effects: EffectTuning,
    /// Lanes in collision scan order
    pub lanes: Vec<LaneTuning>,
    pub difficulty: DifficultyTuning,
    pub scoring: ScoreTuning,
    /// Round length for timed variants
    #[serde(default)]
    pub round_ticks: Option<u32>,
}

impl Tuning {
    /// Built-in defaults for a variant
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::PixelEscape => pixel_escape(),
            Variant::SpaceRunner => space_runner(),
            Variant::SupermarketTag => supermarket_tag(),
        }
    }

    /// Defaults for `variant` with a JSON object merged on top.
    ///
    /// Objects merge key by key; arrays and scalars replace wholesale.
    pub fn with_overrides(variant: Variant, json: &str) -> Result<Self, TuningError> {
        let mut base = serde_json::to_value(Self::for_variant(variant))?;
        let overrides: serde_json::Value = serde_json::from_str(json)?;
        merge_json(&mut base, overrides);
        let tuning: Tuning = serde_json::from_value(base)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.actor.lives == 0 || self.actor.lives > self.actor.max_lives {
            return Err(TuningError::Invalid(format!(
                "lives {} must be in 1..={}",
                self.actor.lives, self.actor.max_lives
            )));
        }
        for lane in &self.lanes {
            if lane.capacity == 0 {
                return Err(TuningError::Invalid(format!("lane {:?} has zero capacity", lane.id)));
            }
            if lane.size_min > lane.size_max {
                return Err(TuningError::Invalid(format!("lane {:?} size range inverted", lane.id)));
            }
            if lane.spawn == Some(SpawnRate::Every(0)) {
                return Err(TuningError::Invalid(format!("lane {:?} spawns every 0 ticks", lane.id)));
            }
        }
        let d = &self.difficulty;
        if d.spawn_min == 0 || d.spawn_start < d.spawn_min {
            return Err(TuningError::Invalid("difficulty spawn interval below 1".into()));
        }
        if d.speed_start > d.speed_max || d.pace_start > d.pace_max {
            return Err(TuningError::Invalid("difficulty starts above its ceiling".into()));
        }
        let s = &self.scoring;
        for (name, p) in [("drop_chance", s.drop_chance), ("drop_star_chance", s.drop_star_chance)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(TuningError::Invalid(format!("{} {} must be in 0..=1", name, p)));
            }
        }
        Ok(())
    }

    pub fn lane(&self, id: LaneId) -> Option<&LaneTuning> {
        self.lanes.iter().find(|l| l.id == id)
    }
}

fn merge_json(base: &mut serde_json::Value, overrides: serde_json::Value) {
    match (base, overrides) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

const LEFT: Vec2 = Vec2::new(-1.0, 0.0);
const DOWN: Vec2 = Vec2::new(0.0, 1.0);

fn pixel_escape() -> Tuning {
    Tuning {
        variant: Variant::PixelEscape,
        actor: ActorTuning {
            size: 30.0,
            lives: 3,
            max_lives: 5,
            accel: 0.0,
            friction: 1.0,
            max_speed_x: 5.0,
            max_speed_y: 30.0,
            walk_speed: 5.0,
            gravity: 0.8,
            jump_power: -15.0,
            ground_y: crate::consts::CANVAS_HEIGHT - 40.0,
            chaser_speed: None,
        },
        effects: EffectTuning::default(),
        lanes: vec![
            LaneTuning {
                id: LaneId::Rocks,
                capacity: 15,
                spawn: Some(SpawnRate::Difficulty),
                motion: Motion::Scaled { direction: DOWN, factor: 1.0 },
                exit: Edge::Bottom,
                size_min: 15.0,
                size_max: 30.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.0,
            },
            LaneTuning {
                id: LaneId::Sharks,
                capacity: 15,
                spawn: Some(SpawnRate::Every(240)),
                motion: Motion::Fixed(Vec2::ZERO),
                exit: Edge::Top,
                size_min: 30.0,
                size_max: 50.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.15,
            },
            LaneTuning {
                id: LaneId::Stars,
                capacity: 8,
                spawn: Some(SpawnRate::Every(240)),
                motion: Motion::Fixed(Vec2::new(0.0, 1.5)),
                exit: Edge::Bottom,
                size_min: 30.0,
                size_max: 30.0,
                ttl_ticks: None,
                spin: 0.05,
                phase_step: 0.0,
            },
            LaneTuning {
                id: LaneId::Hearts,
                capacity: 3,
                spawn: Some(SpawnRate::Every(960)),
                motion: Motion::Fixed(Vec2::new(0.0, 1.2)),
                exit: Edge::Bottom,
                size_min: 30.0,
                size_max: 30.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.1,
            },
            LaneTuning {
                id: LaneId::PowerUps,
                capacity: 2,
                spawn: Some(SpawnRate::Every(600)),
                motion: Motion::Fixed(Vec2::new(0.0, 1.0)),
                exit: Edge::Bottom,
                size_min: 35.0,
                size_max: 35.0,
                ttl_ticks: None,
                spin: 0.02,
                phase_step: 0.0,
            },
        ],
        difficulty: DifficultyTuning {
            interval_ticks: 300,
            speed_start: 2.0,
            speed_step: 0.3,
            speed_max: 8.0,
            spawn_start: 60,
            spawn_step: 3,
            spawn_min: 20,
            pace_start: 1.0,
            pace_step: 0.0,
            pace_max: 1.0,
        },
        scoring: ScoreTuning {
            rule: ScoreRule::PerTick,
            star_value: 100,
            final_divisor: 10,
            hit_scale: 1.0,
            drop_chance: 0.0,
            drop_star_chance: 0.0,
        },
        round_ticks: None,
    }
}

fn space_runner() -> Tuning {
    Tuning {
        variant: Variant::SpaceRunner,
        actor: ActorTuning {
            size: 40.0,
            lives: 3,
            max_lives: 5,
            accel: 0.8,
            friction: 0.95,
            max_speed_x: 6.0,
            max_speed_y: 8.0,
            walk_speed: 0.0,
            gravity: 0.0,
            jump_power: 0.0,
            ground_y: 0.0,
            chaser_speed: None,
        },
        effects: EffectTuning::default(),
        lanes: vec![
            LaneTuning {
                id: LaneId::Obstacles,
                capacity: 35,
                spawn: Some(SpawnRate::Difficulty),
                motion: Motion::Scaled { direction: LEFT, factor: 1.0 },
                exit: Edge::Left,
                size_min: 40.0,
                size_max: 80.0,
                ttl_ticks: None,
                spin: 0.08,
                phase_step: 0.0,
            },
            LaneTuning {
                id: LaneId::Stars,
                capacity: 12,
                spawn: Some(SpawnRate::Every(150)),
                motion: Motion::Scaled { direction: LEFT, factor: 0.7 },
                exit: Edge::Left,
                size_min: 25.0,
                size_max: 25.0,
                ttl_ticks: None,
                spin: 0.05,
                phase_step: 0.1,
            },
            LaneTuning {
                id: LaneId::PowerUps,
                capacity: 3,
                spawn: Some(SpawnRate::Every(480)),
                motion: Motion::Scaled { direction: LEFT, factor: 0.8 },
                exit: Edge::Left,
                size_min: 30.0,
                size_max: 30.0,
                ttl_ticks: None,
                spin: 0.03,
                phase_step: 0.08,
            },
            LaneTuning {
                id: LaneId::Hearts,
                capacity: 4,
                spawn: Some(SpawnRate::Every(900)),
                motion: Motion::Scaled { direction: LEFT, factor: 0.6 },
                exit: Edge::Left,
                size_min: 28.0,
                size_max: 28.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.12,
            },
            LaneTuning {
                id: LaneId::Monsters,
                capacity: 15,
                spawn: Some(SpawnRate::Every(120)),
                motion: Motion::Scaled { direction: LEFT, factor: 0.9 },
                exit: Edge::Left,
                size_min: 40.0,
                size_max: 80.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.1,
            },
            LaneTuning {
                id: LaneId::Bullets,
                capacity: 20,
                spawn: None,
                motion: Motion::Fixed(Vec2::new(12.0, 0.0)),
                exit: Edge::Right,
                size_min: 8.0,
                size_max: 8.0,
                ttl_ticks: None,
                spin: 0.0,
                phase_step: 0.0,
            },
        ],
        difficulty: DifficultyTuning {
            interval_ticks: 600,
            speed_start: 4.0,
            speed_step: 0.2,
            speed_max: 7.0,
            spawn_start: 60,
            spawn_step: 2,
            spawn_min: 30,
            pace_start: 1.0,
            pace_step: 0.05,
            pace_max: 3.0,
        },
        scoring: ScoreTuning {
            rule: ScoreRule::Distance,
            star_value: 10,
            final_divisor: 10,
            hit_scale: 0.8,
            drop_chance: 0.3,
            drop_star_chance: 0.7,
        },
        round_ticks: None,
    }
}

fn supermarket_tag() -> Tuning {
    Tuning {
        variant: Variant::SupermarketTag,
        actor: ActorTuning {
            size: 40.0,
            lives: 1,
            max_lives: 1,
            accel: 0.8,
            friction: 0.85,
            max_speed_x: 4.0,
            max_speed_y: 4.0,
            walk_speed: 0.0,
            gravity: 0.0,
            jump_power: 0.0,
            ground_y: 0.0,
            chaser_speed: Some(4.5),
        },
        effects: EffectTuning::default(),
        lanes: vec![LaneTuning {
            id: LaneId::Candies,
            capacity: 3,
            spawn: Some(SpawnRate::Every(300)),
            motion: Motion::Fixed(Vec2::ZERO),
            exit: Edge::None,
            size_min: 20.0,
            size_max: 20.0,
            ttl_ticks: Some(20 * 60),
            spin: 0.0,
            phase_step: 0.1,
        }],
        difficulty: DifficultyTuning::disabled(),
        scoring: ScoreTuning {
            rule: ScoreRule::None,
            star_value: 0,
            final_divisor: 1,
            hit_scale: 1.0,
            drop_chance: 0.0,
            drop_star_chance: 0.0,
        },
        round_ticks: Some(60 * 60),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        for variant in Variant::ALL {
            let tuning = Tuning::for_variant(variant);
            assert!(tuning.validate().is_ok(), "{:?} defaults invalid", variant);
            assert_eq!(tuning.variant, variant);
        }
    }

    #[test]
    fn test_variant_from_str() {
        assert_eq!(Variant::from_str("space-runner"), Some(Variant::SpaceRunner));
        assert_eq!(Variant::from_str("Pixel Escape"), Some(Variant::PixelEscape));
        assert_eq!(Variant::from_str("tag"), Some(Variant::SupermarketTag));
        assert_eq!(Variant::from_str("pong"), None);
    }

    #[test]
    fn test_overrides_merge_nested_fields() {
        let json = r#"{ "actor": { "lives": 4 }, "difficulty": { "interval_ticks": 120 } }"#;
        let tuning = Tuning::with_overrides(Variant::SpaceRunner, json).unwrap();
        assert_eq!(tuning.actor.lives, 4);
        // Untouched siblings keep their defaults
        assert_eq!(tuning.actor.max_lives, 5);
        assert_eq!(tuning.difficulty.interval_ticks, 120);
        assert_eq!(tuning.difficulty.speed_start, 4.0);
        assert_eq!(tuning.lanes.len(), 6);
    }

    #[test]
    fn test_overrides_reject_invalid_values() {
        let json = r#"{ "actor": { "lives": 9 } }"#;
        assert!(matches!(
            Tuning::with_overrides(Variant::PixelEscape, json),
            Err(TuningError::Invalid(_))
        ));
        assert!(matches!(
            Tuning::with_overrides(Variant::PixelEscape, "{ not json"),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_drop_chances_must_be_probabilities() {
        let json = r#"{ "scoring": { "drop_chance": 1.5 } }"#;
        assert!(matches!(
            Tuning::with_overrides(Variant::SpaceRunner, json),
            Err(TuningError::Invalid(_))
        ));

        let mut tuning = Tuning::for_variant(Variant::SpaceRunner);
        assert!(tuning.validate().is_ok());
        tuning.scoring.drop_star_chance = f64::NAN;
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
        tuning.scoring.drop_star_chance = 0.0;
        tuning.scoring.drop_chance = -0.1;
        assert!(matches!(tuning.validate(), Err(TuningError::Invalid(_))));
        tuning.scoring.drop_chance = 1.0;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_lane_lookup() {
        let tuning = Tuning::for_variant(Variant::PixelEscape);
        assert_eq!(tuning.lane(LaneId::Hearts).map(|l| l.capacity), Some(3));
        assert!(tuning.lane(LaneId::Bullets).is_none());
    }
}
