//! Entity motion and culling

use glam::Vec2;

use super::entity::{
    Entity, EntityKind, HazardKind, Lane, MonsterKind, SHARK_ATTACK_TICKS, SHARK_WARNING_TICKS,
    Shark, SharkPhase,
};
use super::difficulty::Difficulty;
use crate::tuning::{LaneTuning, Motion};

/// Sharks stop steering once this close to their target
const SHARK_ARRIVE_DISTANCE: f32 = 5.0;
/// Per-tick speed gain of an attacking shark
const SHARK_ACCEL: f32 = 0.02;

/// Per-tick velocity of a lane at the current difficulty
pub fn lane_velocity(motion: &Motion, difficulty: &Difficulty) -> Vec2 {
    match motion {
        Motion::Fixed(v) => *v,
        Motion::Scaled { direction, factor } => {
            *direction * *factor * difficulty.speed * difficulty.pace
        }
    }
}

/// Move and animate every lane, then cull. Returns the number of entities removed.
pub fn step_lanes(lanes: &mut [Lane], tunings: &[LaneTuning], difficulty: &Difficulty) -> usize {
    let mut culled = 0;
    for (lane, tuning) in lanes.iter_mut().zip(tunings) {
        let vel = lane_velocity(&lane.motion, difficulty);
        for entity in &mut lane.entities {
            advance(entity, vel, tuning.phase_step);
        }
        culled += cull_lane(lane);
    }
    culled
}

fn advance(entity: &mut Entity, vel: Vec2, phase_step: f32) {
    entity.pos += vel;
    entity.rotation += entity.spin;
    entity.phase += phase_step;
    if let Some(ttl) = &mut entity.ttl {
        *ttl = ttl.saturating_sub(1);
    }

    match &mut entity.kind {
        EntityKind::Hazard(HazardKind::Monster(monster)) => match monster.kind {
            MonsterKind::Octopus => entity.pos.y += entity.phase.sin() * 2.0,
            MonsterKind::Bug => {
                entity.pos.y += (entity.phase * 2.0).sin() * 1.5;
                entity.pos.x += entity.phase.cos();
            }
            MonsterKind::Robot | MonsterKind::EnemyShip | MonsterKind::Giant => {}
        },
        EntityKind::Hazard(HazardKind::Shark(shark)) => {
            if let Some(heading) = advance_shark(shark, &mut entity.pos) {
                entity.rotation = heading;
            }
        }
        _ => {}
    }
}

/// Warning countdown, then pursuit of the target; returns a new heading while steering
fn advance_shark(shark: &mut Shark, pos: &mut Vec2) -> Option<f32> {
    shark.timer += 1;
    match shark.phase {
        SharkPhase::Warning => {
            if shark.timer >= SHARK_WARNING_TICKS {
                shark.phase = SharkPhase::Attacking;
                shark.timer = 0;
            }
            None
        }
        SharkPhase::Attacking => {
            if shark.timer >= SHARK_ATTACK_TICKS {
                shark.phase = SharkPhase::Expired;
                return None;
            }
            let speed = shark.base_speed + shark.timer as f32 * SHARK_ACCEL;
            let delta = shark.target - *pos;
            let distance = delta.length();
            if distance > SHARK_ARRIVE_DISTANCE {
                *pos += delta / distance * speed;
                Some(delta.y.atan2(delta.x))
            } else {
                pos.y -= speed * 2.0;
                None
            }
        }
        SharkPhase::Expired => None,
    }
}

fn is_spent(entity: &Entity) -> bool {
    match &entity.kind {
        EntityKind::Hazard(HazardKind::Shark(shark)) => shark.phase == SharkPhase::Expired,
        _ => entity.ttl == Some(0),
    }
}

/// Drop entities past the lane's exit edge, expired sharks and timed-out entities
pub fn cull_lane(lane: &mut Lane) -> usize {
    let exit = lane.exit;
    lane.retain(|e| !exit.is_past(e.pos, e.size) && !is_spent(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CANVAS_HEIGHT;
    use crate::sim::entity::{CollectibleKind, LaneId, ObstacleKind, StarColor};
    use crate::tuning::{Tuning, Variant};

    fn lanes_for(variant: Variant) -> (Tuning, Vec<Lane>, Difficulty) {
        let tuning = Tuning::for_variant(variant);
        let lanes = tuning.lanes.iter().map(Lane::from_tuning).collect();
        let difficulty = Difficulty::new(&tuning.difficulty);
        (tuning, lanes, difficulty)
    }

    fn shark(phase: SharkPhase, target: Vec2) -> Shark {
        Shark { phase, timer: 0, base_speed: 1.5, target, school: 0 }
    }

    #[test]
    fn test_scaled_motion_uses_speed_and_pace() {
        let (tuning, _, mut difficulty) = lanes_for(Variant::SpaceRunner);
        difficulty.pace = 2.0;
        let stars = tuning.lane(LaneId::Stars).unwrap();
        let vel = lane_velocity(&stars.motion, &difficulty);
        assert!((vel.x - (-0.7 * 4.0 * 2.0)).abs() < 1e-5);
        assert_eq!(vel.y, 0.0);
    }

    #[test]
    fn test_rock_culled_once_past_bottom_by_its_size() {
        let (tuning, mut lanes, difficulty) = lanes_for(Variant::PixelEscape);
        let rock = Entity::new(
            1,
            Vec2::new(300.0, CANVAS_HEIGHT + 19.0),
            20.0,
            EntityKind::Obstacle(ObstacleKind::Asteroid),
        );
        lanes[0].push(rock);
        // speed 2: 919 -> 921, past 900 + 20
        assert_eq!(step_lanes(&mut lanes, &tuning.lanes, &difficulty), 1);
        assert!(lanes[0].is_empty());
    }

    #[test]
    fn test_ttl_expiry_removes_entity() {
        let (tuning, mut lanes, difficulty) = lanes_for(Variant::SupermarketTag);
        let candy = Entity::new(
            1,
            Vec2::new(200.0, 200.0),
            20.0,
            EntityKind::Collectible(CollectibleKind::Star(StarColor::Green)),
        )
        .with_ttl(Some(3));
        lanes[0].push(candy);
        step_lanes(&mut lanes, &tuning.lanes, &difficulty);
        step_lanes(&mut lanes, &tuning.lanes, &difficulty);
        assert_eq!(lanes[0].len(), 1);
        step_lanes(&mut lanes, &tuning.lanes, &difficulty);
        assert!(lanes[0].is_empty());
    }

    #[test]
    fn test_shark_lifecycle() {
        let mut s = shark(SharkPhase::Warning, Vec2::new(500.0, 700.0));
        let mut pos = Vec2::new(400.0, 870.0);
        for _ in 0..SHARK_WARNING_TICKS {
            assert_eq!(advance_shark(&mut s, &mut pos), None);
        }
        assert_eq!(s.phase, SharkPhase::Attacking);
        assert_eq!(pos, Vec2::new(400.0, 870.0));

        let start = pos;
        assert!(advance_shark(&mut s, &mut pos).is_some());
        assert!(pos.distance(s.target) < start.distance(s.target));

        for _ in 1..SHARK_ATTACK_TICKS {
            advance_shark(&mut s, &mut pos);
        }
        assert_eq!(s.phase, SharkPhase::Expired);
    }

    #[test]
    fn test_shark_at_target_swims_up() {
        let target = Vec2::new(500.0, 700.0);
        let mut s = shark(SharkPhase::Attacking, target);
        let mut pos = target;
        advance_shark(&mut s, &mut pos);
        assert!(pos.y < target.y);
        assert_eq!(pos.x, target.x);
    }

    #[test]
    fn test_expired_sharks_are_culled() {
        let (tuning, mut lanes, difficulty) = lanes_for(Variant::PixelEscape);
        let sharks = lanes.iter_mut().find(|l| l.id == LaneId::Sharks).unwrap();
        let mut s = shark(SharkPhase::Attacking, Vec2::new(500.0, 700.0));
        s.timer = SHARK_ATTACK_TICKS - 1;
        sharks.push(Entity::new(
            1,
            Vec2::new(500.0, 800.0),
            40.0,
            EntityKind::Hazard(HazardKind::Shark(s)),
        ));
        step_lanes(&mut lanes, &tuning.lanes, &difficulty);
        assert!(lanes.iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_octopus_wobbles_vertically() {
        let (tuning, mut lanes, difficulty) = lanes_for(Variant::SpaceRunner);
        let monsters = lanes.iter_mut().find(|l| l.id == LaneId::Monsters).unwrap();
        let octopus = crate::sim::entity::Monster { kind: MonsterKind::Octopus, hp: 1 };
        monsters.push(
            Entity::new(1, Vec2::new(700.0, 400.0), 40.0, EntityKind::Hazard(HazardKind::Monster(octopus)))
                .with_phase(std::f32::consts::FRAC_PI_2 - 0.1),
        );
        step_lanes(&mut lanes, &tuning.lanes, &difficulty);
        let monsters = lanes.iter().find(|l| l.id == LaneId::Monsters).unwrap();
        let e = &monsters.entities[0];
        assert!((e.pos.y - 402.0).abs() < 1e-3);
        assert!((e.pos.x - (700.0 - 0.9 * 4.0)).abs() < 1e-3);
    }
}
