//! Periodic difficulty ramp

use serde::{Deserialize, Serialize};

use crate::tuning::DifficultyTuning;

/// Global speed and spawn-rate scalars for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    /// Speed multiplier for `Motion::Scaled` lanes
    pub speed: f32,
    /// Ticks between attempts for difficulty-driven spawners
    pub spawn_interval: u32,
    /// Scroll pace (distance per tick)
    pub pace: f32,
    /// Ramps applied so far
    pub level: u32,
    timer: u32,
}

impl Difficulty {
    pub fn new(tuning: &DifficultyTuning) -> Self {
        Self {
            speed: tuning.speed_start,
            spawn_interval: tuning.spawn_start,
            pace: tuning.pace_start,
            level: 0,
            timer: 0,
        }
    }

    /// Advance one playing tick; returns true when a ramp was applied
    pub fn tick(&mut self, tuning: &DifficultyTuning) -> bool {
        if tuning.interval_ticks == 0 {
            return false;
        }
        self.timer += 1;
        if self.timer < tuning.interval_ticks {
            return false;
        }
        self.timer = 0;
        self.ramp(tuning);
        true
    }

    fn ramp(&mut self, tuning: &DifficultyTuning) {
        self.speed = (self.speed + tuning.speed_step).min(tuning.speed_max);
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(tuning.spawn_step)
            .max(tuning.spawn_min);
        self.pace = (self.pace + tuning.pace_step).min(tuning.pace_max);
        self.level += 1;
        log::debug!(
            "Difficulty {}: speed {:.2}, spawn every {} ticks, pace {:.2}",
            self.level,
            self.speed,
            self.spawn_interval,
            self.pace
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{Tuning, Variant};

    #[test]
    fn test_exactly_one_step_per_interval() {
        let tuning = Tuning::for_variant(Variant::PixelEscape).difficulty;
        let mut difficulty = Difficulty::new(&tuning);
        for _ in 0..tuning.interval_ticks - 1 {
            assert!(!difficulty.tick(&tuning));
        }
        assert!(difficulty.tick(&tuning));
        assert!((difficulty.speed - (tuning.speed_start + tuning.speed_step)).abs() < 1e-6);
        assert_eq!(difficulty.spawn_interval, tuning.spawn_start - tuning.spawn_step);
        assert_eq!(difficulty.level, 1);
    }

    #[test]
    fn test_ramp_stops_at_limits() {
        let tuning = Tuning::for_variant(Variant::SpaceRunner).difficulty;
        let mut difficulty = Difficulty::new(&tuning);
        for _ in 0..tuning.interval_ticks * 200 {
            difficulty.tick(&tuning);
        }
        assert_eq!(difficulty.speed, tuning.speed_max);
        assert_eq!(difficulty.spawn_interval, tuning.spawn_min);
        assert_eq!(difficulty.pace, tuning.pace_max);
    }

    #[test]
    fn test_disabled_never_ramps() {
        let tuning = Tuning::for_variant(Variant::SupermarketTag).difficulty;
        let mut difficulty = Difficulty::new(&tuning);
        let before = difficulty.clone();
        for _ in 0..10_000 {
            assert!(!difficulty.tick(&tuning));
        }
        assert_eq!(difficulty, before);
    }
}
