//! Overlap tests and the per-actor collision scan
//!
//! Each actor walks the lanes in scan order and resolves at most one
//! entity per lane: the first overlapping one in list order. Entities
//! consumed by an outcome are removed from their lane on the spot.

use glam::Vec2;
use rand::Rng;

use super::actor::{Actor, ActorRole};
use super::arena::Rect;
use super::entity::{
    CollectibleKind, Entity, EntityKind, HazardKind, Lane, LaneId, ObstacleKind, PowerUpKind,
};
use super::spawn::IdAllocator;
use super::state::{GameEvent, Progression};
use crate::tuning::{Tuning, Variant};

/// Tag needs a little overlap before the catch counts
const CATCH_SLACK: f32 = 5.0;

/// Circle test on sizes as diameters; `scale` < 1 shrinks the hit distance
#[inline]
pub fn circles_overlap(a: Vec2, a_size: f32, b: Vec2, b_size: f32, scale: f32) -> bool {
    a.distance(b) < (a_size / 2.0 + b_size / 2.0) * scale
}

/// Centered box test on half extents (touching edges do not overlap)
#[inline]
pub fn boxes_overlap(a: Vec2, a_half: f32, b: Vec2, b_half: f32) -> bool {
    a.x + a_half > b.x - b_half
        && a.x - a_half < b.x + b_half
        && a.y + a_half > b.y - b_half
        && a.y - a_half < b.y + b_half
}

/// Circle vs top-left anchored rectangle, via the closest point on the rect
#[inline]
pub fn circle_hits_rect(center: Vec2, radius: f32, rect: &Rect) -> bool {
    let closest = Vec2::new(
        center.x.clamp(rect.x, rect.x + rect.w),
        center.y.clamp(rect.y, rect.y + rect.h),
    );
    center.distance(closest) < radius
}

/// The shape test a variant uses between an actor and an entity
fn touches(variant: Variant, actor_pos: Vec2, actor_size: f32, entity: &Entity, hit_scale: f32) -> bool {
    match variant {
        Variant::PixelEscape => match &entity.kind {
            // Rocks use their size as a half extent and only count once on screen
            EntityKind::Obstacle(ObstacleKind::Rock(_)) => {
                entity.pos.y > 0.0
                    && boxes_overlap(actor_pos, actor_size / 2.0, entity.pos, entity.size)
            }
            EntityKind::Hazard(HazardKind::Shark(_)) => {
                circles_overlap(actor_pos, actor_size, entity.pos, entity.size, 1.0)
            }
            _ => boxes_overlap(actor_pos, actor_size / 2.0, entity.pos, entity.size / 2.0),
        },
        Variant::SpaceRunner => {
            let scale = if entity.is_harmful() { hit_scale } else { 1.0 };
            circles_overlap(actor_pos, actor_size, entity.pos, entity.size, scale)
        }
        Variant::SupermarketTag => {
            circles_overlap(actor_pos, actor_size, entity.pos, entity.size, 1.0)
        }
    }
}

/// Whether an actor interacts with an entity at all
fn relevant(actor: &Actor, entity: &Entity) -> bool {
    match &entity.kind {
        EntityKind::Obstacle(_) | EntityKind::Hazard(_) => entity.is_harmful(),
        EntityKind::Collectible(_) => true,
        EntityKind::PowerUp(PowerUpKind::Candy(_)) => actor.role == ActorRole::Runner,
        EntityKind::PowerUp(_) => true,
        EntityKind::Projectile { .. } => false,
    }
}

/// Resolve one actor against every lane; returns true if the actor lost a life
pub fn scan_actor(
    actor: &mut Actor,
    lanes: &mut [Lane],
    tuning: &Tuning,
    progression: &mut Progression,
    events: &mut Vec<GameEvent>,
) -> bool {
    let size = actor.effective_size(&tuning.effects);
    let hit_scale = tuning.scoring.hit_scale;

    for lane in lanes.iter_mut() {
        let Some(index) = lane.position(|e| {
            relevant(actor, e) && touches(tuning.variant, actor.pos, size, e, hit_scale)
        }) else {
            continue;
        };

        if lane.entities[index].is_harmful() {
            if actor.effects.protected() {
                log::debug!("{} shrugged off a {:?} hit", actor.role.label(), lane.id);
                continue;
            }
            lane.take(index);
            let lives = actor.lose_life();
            log::debug!("{} hit by {:?}, {} lives left", actor.role.label(), lane.id, lives);
            events.push(GameEvent::ActorHit { role: actor.role, lives });
            if tuning.variant == Variant::PixelEscape && lives > 0 {
                actor.respawn();
            }
            return true;
        }

        let entity = lane.take(index);
        match entity.kind {
            EntityKind::Collectible(CollectibleKind::Star(_)) => {
                progression.add_score(tuning.scoring.star_value);
                events.push(GameEvent::StarCollected {
                    role: actor.role,
                    points: tuning.scoring.star_value,
                });
            }
            EntityKind::Collectible(CollectibleKind::Heart) => {
                let gained = actor.gain_life();
                events.push(GameEvent::HeartCollected {
                    role: actor.role,
                    lives: actor.lives,
                    gained,
                });
            }
            EntityKind::PowerUp(kind) => {
                let fx = &tuning.effects;
                match kind {
                    PowerUpKind::Shield => actor.effects.shield_ticks = fx.shield_ticks,
                    PowerUpKind::Giant => actor.effects.giant_ticks = fx.giant_ticks,
                    PowerUpKind::Candy(_) => actor.effects.immunity_ticks = fx.immunity_ticks,
                }
                log::debug!("{} picked up {:?}", actor.role.label(), kind);
                events.push(GameEvent::PowerUpCollected { role: actor.role, kind });
            }
            EntityKind::Obstacle(_) | EntityKind::Hazard(_) | EntityKind::Projectile { .. } => {}
        }
    }
    false
}

/// Bullets against monsters: each bullet damages the first monster it touches.
///
/// Destroyed monsters award their points and may drop a star or heart at
/// their position, if the drop lane has room.
pub fn resolve_bullets<R: Rng>(
    lanes: &mut [Lane],
    tuning: &Tuning,
    rng: &mut R,
    ids: &mut IdAllocator,
    progression: &mut Progression,
    events: &mut Vec<GameEvent>,
) {
    let bullet_lane = lanes.iter().position(|l| l.id == LaneId::Bullets);
    let monster_lane = lanes.iter().position(|l| l.id == LaneId::Monsters);
    let (Some(bi), Some(mi)) = (bullet_lane, monster_lane) else {
        return;
    };

    let shots: Vec<(u32, Vec2, f32)> =
        lanes[bi].entities.iter().map(|b| (b.id, b.pos, b.size)).collect();
    let mut spent = Vec::new();
    let mut wrecks = Vec::new();

    for (id, pos, size) in shots {
        let monsters = &mut lanes[mi];
        let Some(j) = monsters.position(|m| circles_overlap(pos, size, m.pos, m.size, 1.0)) else {
            continue;
        };

        let EntityKind::Hazard(HazardKind::Monster(monster)) = &mut monsters.entities[j].kind
        else {
            continue;
        };
        spent.push(id);
        monster.hp = monster.hp.saturating_sub(1);
        let kind = monster.kind;
        if monster.hp > 0 {
            events.push(GameEvent::MonsterHit { kind });
            continue;
        }

        let wreck = monsters.take(j);
        progression.add_score(kind.points());
        events.push(GameEvent::MonsterDestroyed { kind, points: kind.points() });
        wrecks.push(wreck.pos);
    }
    lanes[bi].retain(|b| !spent.contains(&b.id));

    for pos in wrecks {
        if !roll(rng, tuning.scoring.drop_chance) {
            continue;
        }
        let (lane_id, kind) = if roll(rng, tuning.scoring.drop_star_chance) {
            (LaneId::Stars, CollectibleKind::Star(super::entity::StarColor::Yellow))
        } else {
            (LaneId::Hearts, CollectibleKind::Heart)
        };
        let size = tuning.lane(lane_id).map(|l| l.size_min).unwrap_or(25.0);
        let Some(lane) = lanes.iter_mut().find(|l| l.id == lane_id) else {
            continue;
        };
        let drop = Entity::new(ids.next_id(), pos, size, EntityKind::Collectible(kind));
        if lane.push(drop) {
            events.push(GameEvent::DropSpawned { lane: lane_id });
        } else {
            log::debug!("{:?} lane full, monster drop discarded", lane_id);
        }
    }
}

/// Bernoulli roll; NaN counts as never
fn roll<R: Rng>(rng: &mut R, p: f64) -> bool {
    if p.is_nan() {
        return false;
    }
    rng.random_bool(p.clamp(0.0, 1.0))
}

/// Chaser catches runner when they overlap past the slack and the runner is not immune
pub fn runner_caught(chaser: &Actor, runner: &Actor) -> bool {
    let catch_distance = (chaser.size + runner.size) / 2.0 - CATCH_SLACK;
    chaser.pos.distance(runner.pos) < catch_distance && !runner.effects.immune()
}
