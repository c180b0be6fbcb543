//! Fixed-step simulation tick
//!
//! One call advances a session by one frame: input -> phase events ->
//! actors -> spawn -> step -> collide -> score -> difficulty.

use super::actor::{ActorInput, ActorRole, move_jumper, move_ship, move_walker};
use super::collision::{resolve_bullets, runner_caught, scan_actor};
use super::entity::LaneId;
use super::phase::{GamePhase, PhaseEvent};
use super::spawn::{SpawnContext, fire_bullet, run_spawners};
use super::state::{GameEvent, GameSession, Winner};
use super::step::step_lanes;
use crate::tuning::Variant;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Arrow keys (+ Space): Player 1 or the chaser
    pub primary: ActorInput,
    /// WASD (+ X): Player 2 or the runner
    pub secondary: ActorInput,
    /// Start or restart (Space, click)
    pub start: bool,
    /// Back to menu (Escape)
    pub back: bool,
    /// 1/2 pressed on the menu
    pub select_players: Option<u8>,
}

/// Advance the session by one frame
pub fn tick(session: &mut GameSession, input: &TickInput) {
    if let Some(players) = input.select_players {
        session.set_players(players);
    }
    // At most one input-driven transition per frame
    if input.start && session.handle(PhaseEvent::Start) {
        return;
    }
    if input.back && session.handle(PhaseEvent::Back) {
        return;
    }
    if session.phase != GamePhase::Playing {
        return;
    }

    if let Some(left) = &mut session.progression.time_left_ticks {
        *left = left.saturating_sub(1);
        if *left == 0 {
            session.winner = Some(Winner::Runner);
            session.events.push(GameEvent::TimeUp);
            session.handle(PhaseEvent::TimerExpired);
            return;
        }
    }

    move_actors(session, input);
    for actor in &mut session.actors {
        actor.effects.tick();
    }

    spawn(session);
    step_lanes(
        &mut session.lanes,
        &session.tuning.lanes,
        &session.progression.difficulty,
    );

    if let Some(event) = collide(session) {
        session.handle(event);
        return;
    }

    session.progression.accrue(session.tuning.scoring.rule);
    if session.progression.difficulty.tick(&session.tuning.difficulty) {
        let level = session.progression.difficulty.level;
        session.events.push(GameEvent::DifficultyRaised { level });
    }
    session.progression.elapsed_ticks += 1;
}

fn move_actors(session: &mut GameSession, input: &TickInput) {
    let GameSession { tuning, actors, lanes, arena, ids, events, .. } = session;

    for (slot, actor) in actors.iter_mut().enumerate() {
        let keys = if slot == 0 { &input.primary } else { &input.secondary };
        match tuning.variant {
            Variant::PixelEscape => {
                let grounded = actor.on_ground;
                move_jumper(actor, keys, &tuning.actor);
                if grounded && !actor.on_ground {
                    events.push(GameEvent::Jumped { role: actor.role });
                }
            }
            Variant::SpaceRunner => {
                move_ship(actor, keys, &tuning.actor);
                if keys.action {
                    let lane = lanes.iter_mut().find(|l| l.id == LaneId::Bullets);
                    if let (Some(lane), Some(lane_tuning)) = (lane, tuning.lane(LaneId::Bullets)) {
                        if fire_bullet(lane, lane_tuning, actor, ids) {
                            events.push(GameEvent::BulletFired { role: actor.role });
                        }
                    }
                }
            }
            Variant::SupermarketTag => {
                let fx = &tuning.effects;
                if keys.action
                    && !actor.effects.has_cart()
                    && arena.grab_cart(actor.pos, fx.cart_grab_radius)
                {
                    actor.effects.cart_ticks = fx.cart_ticks;
                    log::debug!("{} grabbed a cart", actor.role.label());
                    events.push(GameEvent::CartGrabbed { role: actor.role });
                }
                move_walker(actor, keys, &tuning.actor, fx, arena);
            }
        }
    }
}

fn spawn(session: &mut GameSession) {
    let GameSession { tuning, lanes, rng, ids, progression, events, .. } = session;
    let sharks = |lanes: &[super::entity::Lane]| {
        lanes
            .iter()
            .find(|l| l.id == LaneId::Sharks)
            .map_or(0, |l| l.len())
    };
    let sharks_before = sharks(lanes.as_slice());

    let mut ctx = SpawnContext {
        variant: tuning.variant,
        rng,
        ids,
        difficulty_interval: progression.difficulty.spawn_interval,
        tick: progression.elapsed_ticks,
    };
    run_spawners(lanes, &tuning.lanes, &mut ctx);

    let sharks_after = sharks(lanes.as_slice());
    if sharks_after > sharks_before {
        events.push(GameEvent::SharksIncoming { count: sharks_after - sharks_before });
    }
}

/// Run every collision check; returns the phase event that ends the round, if any
fn collide(session: &mut GameSession) -> Option<PhaseEvent> {
    let GameSession { tuning, actors, lanes, arena, rng, ids, progression, events, winner, .. } =
        session;

    if tuning.variant == Variant::SupermarketTag {
        let chaser = actors.iter().find(|a| a.role == ActorRole::Chaser);
        let runner = actors.iter().find(|a| a.role == ActorRole::Runner);
        if let (Some(chaser), Some(runner)) = (chaser, runner) {
            if runner_caught(chaser, runner) {
                *winner = Some(Winner::Chaser);
                events.push(GameEvent::Tagged);
                return Some(PhaseEvent::Tagged);
            }
        }
    }

    for actor in actors.iter_mut() {
        let hit = scan_actor(actor, lanes, tuning, progression, events);
        // A hit ends the jump-game scan for this frame
        if hit && tuning.variant == Variant::PixelEscape {
            break;
        }
    }
    resolve_bullets(lanes, tuning, rng, ids, progression, events);

    if tuning.variant == Variant::SupermarketTag {
        arena.release_carts(actors, tuning.effects.cart_release_radius);
    }

    if let Some(out) = actors.iter().find(|a| !a.is_alive()) {
        log::info!("{} is out of lives", out.role.label());
        return Some(PhaseEvent::LivesDepleted);
    }
    None
}
