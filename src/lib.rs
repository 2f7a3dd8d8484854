//! Farm Runner - a top-down survival game simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (match controller, pursuit, avatar, status effects)
//! - `progression`: Persisted high scores and difficulty unlocks
//! - `persistence`: Storage contract for the progression record
//! - `presentation`: Boundary towards whatever draws the game
//! - `tuning`: Data-driven game balance
//! - `game`: Composition root and fixed-step driver

pub mod error;
pub mod game;
pub mod persistence;
pub mod presentation;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::GameError;
pub use game::Game;
pub use progression::{Difficulty, ProgressionRecord, ProgressionStore};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;
use rand::Rng;

/// Game configuration constants
///
/// Ground-plane positions are `Vec2` where `x` is world X and `y` is world Z.
pub mod consts {
    /// Frame tick (per-frame logic: movement, bounds, HUD)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Physics step (steering and target recomputation)
    pub const PHYSICS_DT: f32 = 1.0 / 50.0;
    /// Maximum physics substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta accepted before time scaling
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena bounds
    pub const ARENA_MIN_X: f32 = -45.0;
    pub const ARENA_MAX_X: f32 = -5.0;
    pub const ARENA_MIN_Z: f32 = -11.0;
    pub const ARENA_MAX_Z: f32 = 11.0;

    /// Time remaining once a match has ended
    pub const TIME_SENTINEL: f32 = f32::MAX;
    /// Time remaining before the first match starts
    pub const IDLE_TIME_REMAINING: f32 = 99.0;
}

/// Clamp a ground-plane position into the arena
#[inline]
pub fn clamp_to_arena(pos: Vec2) -> Vec2 {
    use consts::*;
    Vec2::new(
        pos.x.clamp(ARENA_MIN_X, ARENA_MAX_X),
        pos.y.clamp(ARENA_MIN_Z, ARENA_MAX_Z),
    )
}

/// Whether a position lies inside the arena (inclusive)
#[inline]
pub fn in_arena(pos: Vec2) -> bool {
    clamp_to_arena(pos) == pos
}

/// Uniformly random position inside the arena
pub fn random_arena_point<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    use consts::*;
    Vec2::new(
        rng.random_range(ARENA_MIN_X..=ARENA_MAX_X),
        rng.random_range(ARENA_MIN_Z..=ARENA_MAX_Z),
    )
}

/// Unit forward vector for a heading (radians, 0 = +Z, clockwise seen from above)
#[inline]
pub fn forward_vector(heading: f32) -> Vec2 {
    Vec2::new(heading.sin(), heading.cos())
}

/// Heading that faces from `from` towards `to`
#[inline]
pub fn heading_towards(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.x.atan2(d.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_clamp_to_arena() {
        assert_eq!(clamp_to_arena(Vec2::new(0.0, 20.0)), Vec2::new(-5.0, 11.0));
        assert_eq!(clamp_to_arena(Vec2::new(-60.0, -20.0)), Vec2::new(-45.0, -11.0));
        let inside = Vec2::new(-20.0, 3.0);
        assert_eq!(clamp_to_arena(inside), inside);
    }

    #[test]
    fn test_random_arena_point_in_bounds() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..500 {
            assert!(in_arena(random_arena_point(&mut rng)));
        }
    }

    #[test]
    fn test_heading_round_trip() {
        let from = Vec2::new(-20.0, 0.0);
        let to = Vec2::new(-10.0, 10.0);
        let dir = forward_vector(heading_towards(from, to));
        assert!((dir - (to - from).normalize()).length() < 1e-5);
    }
}
