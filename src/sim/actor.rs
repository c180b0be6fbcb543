//! Player-controlled actors and their per-variant movement

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::arena::Arena;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::tuning::{ActorTuning, EffectTuning, Variant};

/// Who an actor is; also selects its key bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorRole {
    Player1,
    Player2,
    /// Tag: tries to catch the runner
    Chaser,
    /// Tag: survives the timer
    Runner,
}

impl ActorRole {
    pub fn label(&self) -> &'static str {
        match self {
            ActorRole::Player1 => "Player 1",
            ActorRole::Player2 => "Player 2",
            ActorRole::Chaser => "Chaser",
            ActorRole::Runner => "Runner",
        }
    }
}

/// Held direction/action keys for one actor on one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Fire (ships) or grab a cart (tag)
    pub action: bool,
}

/// Timed status effects, counted down once per playing tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub shield_ticks: u32,
    /// Giant size and invincibility (hotdog)
    pub giant_ticks: u32,
    /// Cannot be tagged or hurt (candy)
    pub immunity_ticks: u32,
    pub cart_ticks: u32,
}

impl StatusEffects {
    /// Count every effect down by one tick
    pub fn tick(&mut self) {
        self.shield_ticks = self.shield_ticks.saturating_sub(1);
        self.giant_ticks = self.giant_ticks.saturating_sub(1);
        self.immunity_ticks = self.immunity_ticks.saturating_sub(1);
        self.cart_ticks = self.cart_ticks.saturating_sub(1);
    }

    pub fn shielded(&self) -> bool {
        self.shield_ticks > 0
    }

    pub fn invincible(&self) -> bool {
        self.giant_ticks > 0
    }

    pub fn immune(&self) -> bool {
        self.immunity_ticks > 0
    }

    pub fn has_cart(&self) -> bool {
        self.cart_ticks > 0
    }

    /// Any effect that turns a hazard hit into a no-op
    pub fn protected(&self) -> bool {
        self.shielded() || self.invincible() || self.immune()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub role: ActorRole,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Base size before power-up scaling
    pub size: f32,
    pub lives: u8,
    pub max_lives: u8,
    /// Top speed on either axis before cart boost
    pub max_speed: f32,
    pub effects: StatusEffects,
    /// Where the actor starts and respawns
    pub spawn: Vec2,
    /// Jumping actors only
    pub on_ground: bool,
    /// Cosmetic spin while airborne
    pub rotation: f32,
}

impl Actor {
    pub fn new(role: ActorRole, spawn: Vec2, tuning: &ActorTuning) -> Self {
        let max_speed = match role {
            ActorRole::Chaser => tuning.chaser_speed.unwrap_or(tuning.max_speed_x),
            _ => tuning.max_speed_x,
        };
        Self {
            role,
            pos: spawn,
            vel: Vec2::ZERO,
            size: tuning.size,
            lives: tuning.lives.min(tuning.max_lives),
            max_lives: tuning.max_lives,
            max_speed,
            effects: StatusEffects::default(),
            spawn,
            on_ground: true,
            rotation: 0.0,
        }
    }

    /// Size used for every overlap test
    pub fn effective_size(&self, effects: &EffectTuning) -> f32 {
        if self.effects.invincible() {
            self.size * effects.giant_multiplier
        } else {
            self.size
        }
    }

    /// Remove one life; returns the lives left
    pub fn lose_life(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Add one life up to the maximum; returns whether it changed
    pub fn gain_life(&mut self) -> bool {
        if self.lives < self.max_lives {
            self.lives += 1;
            true
        } else {
            false
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Back to the spawn point at rest (lives and effects are kept)
    pub fn respawn(&mut self) {
        self.pos = self.spawn;
        self.vel = Vec2::ZERO;
        self.on_ground = true;
        self.rotation = 0.0;
    }

    fn clamp_to_canvas(&self, pos: Vec2) -> Vec2 {
        let half = self.size / 2.0;
        Vec2::new(
            pos.x.clamp(half, CANVAS_WIDTH - half),
            pos.y.clamp(half, CANVAS_HEIGHT - half),
        )
    }
}

/// Runner start; the mid-height spot on the left wall sits inside a rack
const RUNNER_SPAWN: Vec2 = Vec2::new(100.0, 400.0);

/// Starting roles and positions for a variant and player count
pub fn starting_lineup(variant: Variant, players: u8, tuning: &ActorTuning) -> Vec<Actor> {
    let two = players >= 2 && variant.supports_two_players();
    let slots: Vec<(ActorRole, Vec2)> = match variant {
        Variant::PixelEscape => {
            let y = tuning.ground_y;
            if two {
                vec![
                    (ActorRole::Player1, Vec2::new(CANVAS_WIDTH / 3.0, y)),
                    (ActorRole::Player2, Vec2::new(CANVAS_WIDTH * 2.0 / 3.0, y)),
                ]
            } else {
                vec![(ActorRole::Player1, Vec2::new(CANVAS_WIDTH / 2.0, y))]
            }
        }
        Variant::SpaceRunner => {
            if two {
                vec![
                    (ActorRole::Player1, Vec2::new(100.0, CANVAS_HEIGHT / 2.0 - 50.0)),
                    (ActorRole::Player2, Vec2::new(100.0, CANVAS_HEIGHT / 2.0 + 50.0)),
                ]
            } else {
                vec![(ActorRole::Player1, Vec2::new(100.0, CANVAS_HEIGHT / 2.0))]
            }
        }
        Variant::SupermarketTag => vec![
            (ActorRole::Chaser, Vec2::new(CANVAS_WIDTH - 100.0, CANVAS_HEIGHT / 2.0)),
            (ActorRole::Runner, RUNNER_SPAWN),
        ],
    };
    slots
        .into_iter()
        .map(|(role, spawn)| Actor::new(role, spawn, tuning))
        .collect()
}

/// Ground runner: walk left/right, jump while grounded, gravity pulls down
pub fn move_jumper(actor: &mut Actor, input: &ActorInput, tuning: &ActorTuning) {
    if input.up && actor.on_ground {
        actor.vel.y = tuning.jump_power;
        actor.on_ground = false;
    }

    actor.vel.y = (actor.vel.y + tuning.gravity).min(tuning.max_speed_y);
    actor.pos.y += actor.vel.y;

    if actor.on_ground {
        actor.rotation *= 0.8;
        if actor.rotation.abs() < 0.1 {
            actor.rotation = 0.0;
        }
    } else {
        actor.rotation += 0.2;
    }

    if actor.pos.y >= tuning.ground_y {
        actor.pos.y = tuning.ground_y;
        actor.vel.y = 0.0;
        actor.on_ground = true;
    }

    let half = actor.size / 2.0;
    if input.left && actor.pos.x > half {
        actor.pos.x -= tuning.walk_speed;
    }
    if input.right && actor.pos.x < CANVAS_WIDTH - half {
        actor.pos.x += tuning.walk_speed;
    }
}

/// Velocity change from held direction keys
fn thrust(input: &ActorInput, accel: f32) -> Vec2 {
    let mut dv = Vec2::ZERO;
    if input.up {
        dv.y -= accel;
    }
    if input.down {
        dv.y += accel;
    }
    if input.left {
        dv.x -= accel;
    }
    if input.right {
        dv.x += accel;
    }
    dv
}

/// Ship: thrust, friction, per-axis speed clamp, stay on screen
pub fn move_ship(actor: &mut Actor, input: &ActorInput, tuning: &ActorTuning) {
    actor.vel += thrust(input, tuning.accel);
    actor.vel *= tuning.friction;
    actor.vel.x = actor.vel.x.clamp(-tuning.max_speed_x, tuning.max_speed_x);
    actor.vel.y = actor.vel.y.clamp(-tuning.max_speed_y, tuning.max_speed_y);
    actor.pos = actor.clamp_to_canvas(actor.pos + actor.vel);
}

/// Tag walker: like a ship, but shelves stop movement and carts boost speed
pub fn move_walker(
    actor: &mut Actor,
    input: &ActorInput,
    tuning: &ActorTuning,
    effects: &EffectTuning,
    arena: &Arena,
) {
    actor.vel += thrust(input, tuning.accel);
    actor.vel *= tuning.friction;

    let mut limit = actor.max_speed;
    if actor.effects.has_cart() {
        limit *= effects.cart_boost;
    }
    actor.vel = actor.vel.clamp(Vec2::splat(-limit), Vec2::splat(limit));

    let next = actor.clamp_to_canvas(actor.pos + actor.vel);
    if arena.blocks(next, actor.size / 2.0) {
        actor.vel *= 0.1;
    } else {
        actor.pos = next;
    }
}
