//! Static supermarket geometry: shelves that block movement and shopping carts

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::Actor;
use super::collision::circle_hits_rect;
use crate::consts::CANVAS_HEIGHT;

/// Axis-aligned rectangle, top-left anchored
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub pos: Vec2,
    pub available: bool,
}

const CART_SPOTS: [Vec2; 4] = [
    Vec2::new(120.0, 200.0),
    Vec2::new(800.0, 400.0),
    Vec2::new(600.0, 700.0),
    Vec2::new(1200.0, 300.0),
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Arena {
    pub shelves: Vec<Rect>,
    pub carts: Vec<Cart>,
}

impl Arena {
    /// Open floor (PixelEscape, SpaceRunner)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aisles, horizontal racks, checkout counters and four carts
    pub fn supermarket() -> Self {
        let shelf_width = 30.0;
        let shelf_height = 200.0;
        let aisle_width = 120.0;
        let mut shelves = Vec::new();

        for i in 0..8 {
            let x = 150.0 + i as f32 * (shelf_width + aisle_width);
            let top = if i % 2 == 0 { shelf_height } else { shelf_height * 0.7 };
            shelves.push(Rect::new(x, 50.0, shelf_width, top));
            let bottom = if i % 3 == 0 { shelf_height * 0.8 } else { shelf_height };
            shelves.push(Rect::new(x, CANVAS_HEIGHT - bottom - 50.0, shelf_width, bottom));
        }
        for i in 0..3 {
            shelves.push(Rect::new(80.0, 300.0 + i as f32 * 150.0, 400.0, shelf_width));
        }
        for i in 0..5 {
            shelves.push(Rect::new(200.0 + i as f32 * 100.0, CANVAS_HEIGHT - 100.0, 80.0, 25.0));
        }
        log::debug!("Supermarket arena: {} shelves", shelves.len());

        let carts = CART_SPOTS
            .iter()
            .map(|&pos| Cart { pos, available: true })
            .collect();
        Self { shelves, carts }
    }

    /// Whether a circle at `pos` would touch any shelf
    pub fn blocks(&self, pos: Vec2, radius: f32) -> bool {
        self.shelves.iter().any(|r| circle_hits_rect(pos, radius, r))
    }

    /// Claim the first free cart within `radius` of `pos`
    pub fn grab_cart(&mut self, pos: Vec2, radius: f32) -> bool {
        match self
            .carts
            .iter_mut()
            .find(|c| c.available && c.pos.distance(pos) < radius)
        {
            Some(cart) => {
                cart.available = false;
                true
            }
            None => false,
        }
    }

    /// Free taken carts once no cart-holding actor is within `radius`
    pub fn release_carts(&mut self, actors: &[Actor], radius: f32) {
        for cart in self.carts.iter_mut().filter(|c| !c.available) {
            let held_nearby = actors
                .iter()
                .any(|a| a.effects.has_cart() && a.pos.distance(cart.pos) < radius);
            if !held_nearby {
                cart.available = true;
            }
        }
    }

    pub fn reset(&mut self) {
        for cart in &mut self.carts {
            cart.available = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{ActorRole, starting_lineup};
    use crate::tuning::{Tuning, Variant};

    #[test]
    fn test_supermarket_layout() {
        let arena = Arena::supermarket();
        assert_eq!(arena.shelves.len(), 16 + 3 + 5);
        assert_eq!(arena.carts.len(), 4);
        // Odd aisles have the shorter top shelf
        assert_eq!(arena.shelves[2].h, 140.0);
        // Every third bottom shelf is shorter
        assert_eq!(arena.shelves[1].h, 160.0);
        assert_eq!(arena.shelves[1].y, CANVAS_HEIGHT - 160.0 - 50.0);
    }

    #[test]
    fn test_spawn_points_are_clear_of_shelves() {
        let arena = Arena::supermarket();
        let tuning = Tuning::for_variant(Variant::SupermarketTag);
        for actor in starting_lineup(Variant::SupermarketTag, 2, &tuning.actor) {
            assert!(!arena.blocks(actor.pos, actor.size / 2.0), "{:?} spawns inside a shelf", actor.role);
        }
    }

    #[test]
    fn test_cart_grab_and_release() {
        let mut arena = Arena::supermarket();
        assert!(!arena.grab_cart(Vec2::new(700.0, 700.0), 50.0));
        assert!(arena.grab_cart(Vec2::new(130.0, 210.0), 50.0));
        assert!(!arena.carts[0].available);
        // Same spot: the only nearby cart is taken
        assert!(!arena.grab_cart(Vec2::new(130.0, 210.0), 50.0));

        let tuning = Tuning::for_variant(Variant::SupermarketTag);
        let mut actors = starting_lineup(Variant::SupermarketTag, 2, &tuning.actor);
        let runner = actors.iter_mut().find(|a| a.role == ActorRole::Runner).unwrap();
        runner.pos = Vec2::new(130.0, 210.0);
        runner.effects.cart_ticks = 10;

        arena.release_carts(&actors, 100.0);
        assert!(!arena.carts[0].available);

        actors[1].pos = Vec2::new(600.0, 450.0);
        arena.release_carts(&actors, 100.0);
        assert!(arena.carts[0].available);
    }
}
