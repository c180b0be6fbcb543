//! Timed spawners
//!
//! Each lane with a spawn rate owns a `SpawnTimer`. When it elapses, one
//! attempt is made to append a randomized entity; the timer resets whether
//! or not the lane had room.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::entity::{
    CandyKind, CollectibleKind, Edge, Entity, EntityKind, HazardKind, Lane, LaneId, Monster,
    MonsterKind, ObstacleKind, PowerUpKind, RockShape, SHARK_SCHOOL_SIZE, Shark, SharkPhase,
    StarColor,
};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::tuning::{LaneTuning, SpawnRate, Variant};

/// Distance outside the canvas where entities enter
const ENTRY_MARGIN: f32 = 50.0;
/// Keep random coordinates this far from the canvas border
const BORDER_MARGIN: f32 = 50.0;

/// Candy spawn zones near the shelves (x, y, w, h)
const CANDY_AREAS: [(f32, f32, f32, f32); 5] = [
    (165.0, 100.0, 200.0, 150.0),
    (165.0, 600.0, 200.0, 150.0),
    (500.0, 300.0, 150.0, 100.0),
    (800.0, 150.0, 100.0, 200.0),
    (300.0, 400.0, 150.0, 100.0),
];

/// Per-lane spawn countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnTimer {
    pub rate: SpawnRate,
    /// Ticks since the last attempt
    pub elapsed: u32,
}

impl SpawnTimer {
    pub fn new(rate: SpawnRate) -> Self {
        Self { rate, elapsed: 0 }
    }

    /// Current interval, resolving difficulty-driven rates
    pub fn interval(&self, difficulty_interval: u32) -> u32 {
        match self.rate {
            SpawnRate::Every(ticks) => ticks,
            SpawnRate::Difficulty => difficulty_interval,
        }
    }

    /// Advance one tick. Returns true (and resets) when an attempt is due.
    pub fn tick(&mut self, difficulty_interval: u32) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval(difficulty_interval).max(1) {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// Monotonic entity id source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Shared inputs for one spawn pass
pub struct SpawnContext<'a, R: Rng> {
    pub variant: Variant,
    pub rng: &'a mut R,
    pub ids: &'a mut IdAllocator,
    pub difficulty_interval: u32,
    /// Current tick, used to tag shark schools
    pub tick: u64,
}

/// Advance every lane timer and make the due attempts.
///
/// `lanes` and `tunings` are parallel (lanes are built from the tuning list).
/// Returns the number of entities appended.
pub fn run_spawners<R: Rng>(
    lanes: &mut [Lane],
    tunings: &[LaneTuning],
    ctx: &mut SpawnContext<'_, R>,
) -> usize {
    let mut spawned = 0;
    for (lane, tuning) in lanes.iter_mut().zip(tunings) {
        let due = match &mut lane.timer {
            Some(timer) => timer.tick(ctx.difficulty_interval),
            None => false,
        };
        if due {
            spawned += spawn_attempt(lane, tuning, ctx);
        }
    }
    spawned
}

/// One spawn attempt on a lane; returns how many entities were appended
pub fn spawn_attempt<R: Rng>(
    lane: &mut Lane,
    tuning: &LaneTuning,
    ctx: &mut SpawnContext<'_, R>,
) -> usize {
    if lane.id == LaneId::Sharks {
        return spawn_shark_school(lane, tuning, ctx);
    }
    if !lane.has_room(1) {
        log::debug!("{:?} lane full ({}), spawn skipped", lane.id, lane.capacity);
        return 0;
    }
    let Some(entity) = make_entity(lane.id, tuning, ctx) else {
        return 0;
    };
    usize::from(lane.push(entity))
}

fn random_size<R: Rng>(rng: &mut R, tuning: &LaneTuning) -> f32 {
    if tuning.size_max > tuning.size_min {
        rng.random_range(tuning.size_min..tuning.size_max)
    } else {
        tuning.size_min
    }
}

/// Where an entity leaving through `exit` should appear
fn entry_point<R: Rng>(exit: Edge, rng: &mut R) -> Vec2 {
    let random_x = |rng: &mut R| rng.random_range(BORDER_MARGIN..CANVAS_WIDTH - BORDER_MARGIN);
    let random_y = |rng: &mut R| rng.random_range(BORDER_MARGIN..CANVAS_HEIGHT - BORDER_MARGIN);
    match exit {
        Edge::Left => Vec2::new(CANVAS_WIDTH + ENTRY_MARGIN, random_y(rng)),
        Edge::Right => Vec2::new(-ENTRY_MARGIN, random_y(rng)),
        Edge::Bottom => Vec2::new(random_x(rng), -30.0),
        Edge::Top => Vec2::new(random_x(rng), CANVAS_HEIGHT + 30.0),
        Edge::None => Vec2::new(random_x(rng), random_y(rng)),
    }
}

fn make_entity<R: Rng>(
    lane: LaneId,
    tuning: &LaneTuning,
    ctx: &mut SpawnContext<'_, R>,
) -> Option<Entity> {
    let rng = &mut *ctx.rng;
    let entity = match lane {
        LaneId::Rocks => {
            let pos = entry_point(tuning.exit, rng);
            let size = random_size(rng, tuning);
            let shape = RockShape::random(rng);
            Entity::new(ctx.ids.next_id(), pos, size, EntityKind::Obstacle(ObstacleKind::Rock(shape)))
        }
        LaneId::Obstacles => {
            let pos = entry_point(tuning.exit, rng);
            let size = random_size(rng, tuning);
            let kind = [
                ObstacleKind::Asteroid,
                ObstacleKind::Laser,
                ObstacleKind::Debris,
                ObstacleKind::Mine,
                ObstacleKind::Plasma,
            ]
            .choose(rng)
            .cloned()
            .unwrap_or(ObstacleKind::Asteroid);
            let spin = if tuning.spin > 0.0 {
                rng.random_range(-tuning.spin..tuning.spin)
            } else {
                0.0
            };
            let phase = rng.random_range(0.0..std::f32::consts::TAU);
            Entity::new(ctx.ids.next_id(), pos, size, EntityKind::Obstacle(kind))
                .with_spin(spin)
                .with_phase(phase)
        }
        LaneId::Stars => {
            let pos = entry_point(tuning.exit, rng);
            let color = *[StarColor::Yellow, StarColor::Cyan, StarColor::Magenta, StarColor::Green]
                .choose(rng)
                .unwrap_or(&StarColor::Yellow);
            Entity::new(
                ctx.ids.next_id(),
                pos,
                random_size(rng, tuning),
                EntityKind::Collectible(CollectibleKind::Star(color)),
            )
            .with_spin(tuning.spin)
        }
        LaneId::Hearts => {
            let pos = entry_point(tuning.exit, rng);
            Entity::new(
                ctx.ids.next_id(),
                pos,
                random_size(rng, tuning),
                EntityKind::Collectible(CollectibleKind::Heart),
            )
        }
        LaneId::PowerUps => {
            let kind = match ctx.variant {
                Variant::PixelEscape => PowerUpKind::Giant,
                Variant::SpaceRunner | Variant::SupermarketTag => PowerUpKind::Shield,
            };
            let pos = entry_point(tuning.exit, rng);
            Entity::new(ctx.ids.next_id(), pos, random_size(rng, tuning), EntityKind::PowerUp(kind))
                .with_spin(tuning.spin)
        }
        LaneId::Monsters => {
            let kind = *MonsterKind::ALL.choose(rng).unwrap_or(&MonsterKind::Bug);
            let pos = entry_point(tuning.exit, rng);
            let monster = Monster { kind, hp: kind.hp() };
            Entity::new(
                ctx.ids.next_id(),
                pos,
                kind.size(),
                EntityKind::Hazard(HazardKind::Monster(monster)),
            )
        }
        LaneId::Candies => {
            let (x, y, w, h) = *CANDY_AREAS.choose(rng).unwrap_or(&CANDY_AREAS[0]);
            let pos = Vec2::new(x + rng.random_range(0.0..w), y + rng.random_range(0.0..h));
            let kind = *[
                CandyKind::Lollipop,
                CandyKind::Chocolate,
                CandyKind::Gummy,
                CandyKind::HardCandy,
            ]
            .choose(rng)
            .unwrap_or(&CandyKind::Lollipop);
            Entity::new(
                ctx.ids.next_id(),
                pos,
                random_size(rng, tuning),
                EntityKind::PowerUp(PowerUpKind::Candy(kind)),
            )
            .with_ttl(tuning.ttl_ticks)
        }
        // Sharks spawn as schools; bullets are fired, never timed
        LaneId::Sharks | LaneId::Bullets => return None,
    };
    Some(entity)
}

/// Five sharks around a shared center, all aimed near a shared target
fn spawn_shark_school<R: Rng>(
    lane: &mut Lane,
    tuning: &LaneTuning,
    ctx: &mut SpawnContext<'_, R>,
) -> usize {
    if !lane.has_room(SHARK_SCHOOL_SIZE) {
        log::debug!("Shark lane cannot fit a school ({}/{})", lane.len(), lane.capacity);
        return 0;
    }
    let rng = &mut *ctx.rng;
    let center = Vec2::new(
        rng.random_range(150.0..CANVAS_WIDTH - 150.0),
        CANVAS_HEIGHT - 30.0,
    );
    let school_target = Vec2::new(
        rng.random_range(250.0..CANVAS_WIDTH - 250.0),
        CANVAS_HEIGHT - rng.random_range(120.0..180.0),
    );
    let school = ctx.tick as u32;

    for _ in 0..SHARK_SCHOOL_SIZE {
        let pos = center + Vec2::new(rng.random_range(-40.0..40.0), rng.random_range(-15.0..15.0));
        let target = school_target
            + Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-30.0..30.0));
        let shark = Shark {
            phase: SharkPhase::Warning,
            timer: 0,
            base_speed: rng.random_range(1.2..2.0),
            target,
            school,
        };
        let to_target = target - pos;
        let mut entity = Entity::new(
            ctx.ids.next_id(),
            pos,
            random_size(rng, tuning),
            EntityKind::Hazard(HazardKind::Shark(shark)),
        )
        .with_phase(rng.random_range(0.0..std::f32::consts::TAU));
        entity.rotation = to_target.y.atan2(to_target.x);
        lane.push(entity);
    }
    SHARK_SCHOOL_SIZE
}

/// Fire a bullet from the front of a ship; false if the bullet lane is full
pub fn fire_bullet(lane: &mut Lane, tuning: &LaneTuning, actor: &Actor, ids: &mut IdAllocator) -> bool {
    if !lane.has_room(1) {
        return false;
    }
    let pos = actor.pos + Vec2::new(actor.size / 2.0, 0.0);
    lane.push(Entity::new(
        ids.next_id(),
        pos,
        tuning.size_min,
        EntityKind::Projectile { owner: actor.role },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn lane_for(variant: Variant, id: LaneId) -> (Lane, LaneTuning) {
        let tuning = Tuning::for_variant(variant);
        let lane_tuning = tuning.lane(id).cloned().unwrap();
        (Lane::from_tuning(&lane_tuning), lane_tuning)
    }

    #[test]
    fn test_spawn_timer_fires_on_interval_and_resets() {
        let mut timer = SpawnTimer::new(SpawnRate::Every(3));
        assert!(!timer.tick(60));
        assert!(!timer.tick(60));
        assert!(timer.tick(60));
        assert_eq!(timer.elapsed, 0);
        assert!(!timer.tick(60));
    }

    #[test]
    fn test_spawn_timer_follows_difficulty_interval() {
        let mut timer = SpawnTimer::new(SpawnRate::Difficulty);
        assert_eq!(timer.interval(42), 42);
        for _ in 0..9 {
            assert!(!timer.tick(10));
        }
        assert!(timer.tick(10));
    }

    #[test]
    fn test_full_lane_skips_spawn() {
        let (mut lane, tuning) = lane_for(Variant::SpaceRunner, LaneId::Stars);
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = IdAllocator::default();
        let mut ctx = SpawnContext {
            variant: Variant::SpaceRunner,
            rng: &mut rng,
            ids: &mut ids,
            difficulty_interval: 60,
            tick: 0,
        };
        for _ in 0..tuning.capacity {
            assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 1);
        }
        assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 0);
        assert_eq!(lane.len(), tuning.capacity);
    }

    #[test]
    fn test_space_entities_enter_from_right() {
        let (mut lane, tuning) = lane_for(Variant::SpaceRunner, LaneId::Obstacles);
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ids = IdAllocator::default();
        let mut ctx = SpawnContext {
            variant: Variant::SpaceRunner,
            rng: &mut rng,
            ids: &mut ids,
            difficulty_interval: 60,
            tick: 0,
        };
        for _ in 0..10 {
            spawn_attempt(&mut lane, &tuning, &mut ctx);
        }
        for e in &lane.entities {
            assert_eq!(e.pos.x, CANVAS_WIDTH + ENTRY_MARGIN);
            assert!((50.0..CANVAS_HEIGHT - 50.0).contains(&e.pos.y));
            assert!((40.0..80.0).contains(&e.size));
            assert!(e.spin.abs() <= 0.08);
        }
    }

    #[test]
    fn test_shark_school_spawns_whole_or_not_at_all() {
        let (mut lane, tuning) = lane_for(Variant::PixelEscape, LaneId::Sharks);
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ids = IdAllocator::default();
        let mut ctx = SpawnContext {
            variant: Variant::PixelEscape,
            rng: &mut rng,
            ids: &mut ids,
            difficulty_interval: 60,
            tick: 77,
        };
        assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 5);
        assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 5);
        assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 5);
        // Capacity 15 reached: no partial school
        assert_eq!(spawn_attempt(&mut lane, &tuning, &mut ctx), 0);
        assert_eq!(lane.len(), 15);
        assert!(lane.entities.iter().all(|e| matches!(
            e.kind,
            EntityKind::Hazard(HazardKind::Shark(Shark { phase: SharkPhase::Warning, school: 77, .. }))
        )));
    }

    #[test]
    fn test_candies_carry_lifetime() {
        let (mut lane, tuning) = lane_for(Variant::SupermarketTag, LaneId::Candies);
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ids = IdAllocator::default();
        let mut ctx = SpawnContext {
            variant: Variant::SupermarketTag,
            rng: &mut rng,
            ids: &mut ids,
            difficulty_interval: 1,
            tick: 0,
        };
        spawn_attempt(&mut lane, &tuning, &mut ctx);
        assert_eq!(lane.entities[0].ttl, Some(1200));
    }

    #[test]
    fn test_run_spawners_only_fires_due_lanes() {
        let tuning = Tuning::for_variant(Variant::SpaceRunner);
        let mut lanes: Vec<Lane> = tuning.lanes.iter().map(Lane::from_tuning).collect();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ids = IdAllocator::default();
        let mut ctx = SpawnContext {
            variant: Variant::SpaceRunner,
            rng: &mut rng,
            ids: &mut ids,
            difficulty_interval: 60,
            tick: 0,
        };
        for _ in 0..59 {
            assert_eq!(run_spawners(&mut lanes, &tuning.lanes, &mut ctx), 0);
        }
        // Obstacles (difficulty interval 60) fire on tick 60, nothing else does
        assert_eq!(run_spawners(&mut lanes, &tuning.lanes, &mut ctx), 1);
        assert_eq!(lanes[0].len(), 1);
        assert!(lanes[5].is_empty(), "bullets never spawn on a timer");
    }
}
