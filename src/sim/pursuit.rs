//! Enemy pursuit behavior
//!
//! Each pursuer draws its speed and a behavior seed once at spawn. The seed picks a flank:
//! the pursuer aims two units beside the player on one axis (or straight at the player),
//! so a pack spreads around its target instead of stacking. Path-finding is delegated to a
//! [`Navigator`]; this module only decides where to go and how fast.

use glam::Vec2;
use rand::Rng;

use super::state::{CollisionEvent, CollisionTag, EntityId};
use crate::clamp_to_arena;
use crate::tuning::Tuning;

/// Behavior seeds are drawn from [SEED_MIN, SEED_MAX)
pub const SEED_MIN: f32 = 1.0;
pub const SEED_MAX: f32 = 200.0;

/// Which side of the player a pursuer aims for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flank {
    PosX,
    PosZ,
    /// Dead zone: straight at the player
    Direct,
    NegZ,
    NegX,
}

impl Flank {
    /// Bucket a behavior seed; bucket upper bounds are inclusive at multiples of 25
    pub fn from_seed(seed: f32) -> Self {
        let offset = flank_offset(seed, 1.0);
        match (offset.x, offset.y) {
            (x, _) if x > 0.0 => Flank::PosX,
            (x, _) if x < 0.0 => Flank::NegX,
            (_, z) if z > 0.0 => Flank::PosZ,
            (_, z) if z < 0.0 => Flank::NegZ,
            _ => Flank::Direct,
        }
    }
}

/// Offset from the player for a behavior seed
///
/// Conditions are applied in the order +X, -X, +Z, -Z; each one only overrides its own axis.
pub fn flank_offset(seed: f32, distance: f32) -> Vec2 {
    let mut offset = Vec2::ZERO;
    if (1.0..=25.0).contains(&seed) {
        offset.x = distance;
    }
    if seed > 100.0 {
        offset.x = -distance;
    }
    if seed > 25.0 && seed <= 50.0 {
        offset.y = distance;
    }
    if seed > 75.0 && seed <= 100.0 {
        offset.y = -distance;
    }
    offset
}

/// Movement collaborator: turns "go to this point" into actual motion
pub trait Navigator {
    /// New position after moving from `pos` toward `destination` for `dt` seconds
    fn step(&mut self, pos: Vec2, destination: Vec2, speed: f32, dt: f32) -> Vec2;
}

/// Walks straight at the destination, no obstacle avoidance
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineNavigator;

impl Navigator for StraightLineNavigator {
    fn step(&mut self, pos: Vec2, destination: Vec2, speed: f32, dt: f32) -> Vec2 {
        let to_target = destination - pos;
        let dist = to_target.length();
        let travel = (speed * dt).max(0.0);
        if dist <= travel || dist <= f32::EPSILON {
            destination
        } else {
            pos + to_target / dist * travel
        }
    }
}

/// What a pursuer may read about the player
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    /// Slow-time powerup running: enemies move at half speed
    pub slow_time: bool,
}

/// Spawn grace: stand still for a moment, then chase for good
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraceState {
    Grounding { remaining: f32 },
    Active,
}

/// Why a pursuer removed itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    MatchEnded,
    LeftArena,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pursuer {
    pub id: EntityId,
    pub pos: Vec2,
    pub base_speed: f32,
    pub behavior_seed: f32,
    pub grace: GraceState,
    /// Effective speed after grace and slow-time
    pub speed: f32,
    /// Last move-toward request
    pub destination: Option<Vec2>,
    flank_distance: f32,
}

impl Pursuer {
    pub fn spawn<R: Rng + ?Sized>(id: EntityId, pos: Vec2, rng: &mut R, tuning: &Tuning) -> Self {
        let base_speed = rng.random_range(tuning.enemy_min_speed..tuning.enemy_max_speed);
        let behavior_seed = rng.random_range(SEED_MIN..SEED_MAX);
        Self::with_traits(id, pos, base_speed, behavior_seed, tuning)
    }

    /// Spawn with fixed traits instead of random draws
    pub fn with_traits(
        id: EntityId,
        pos: Vec2,
        base_speed: f32,
        behavior_seed: f32,
        tuning: &Tuning,
    ) -> Self {
        Self {
            id,
            pos: clamp_to_arena(pos),
            base_speed,
            behavior_seed,
            grace: GraceState::Grounding {
                remaining: tuning.enemy_grace_period,
            },
            speed: 0.0,
            destination: None,
            flank_distance: tuning.flank_offset,
        }
    }

    pub fn flank(&self) -> Flank {
        Flank::from_seed(self.behavior_seed)
    }

    pub fn is_grounded(&self) -> bool {
        matches!(self.grace, GraceState::Grounding { .. })
    }

    /// Per-frame update; `Err` means the pursuer removed itself
    pub fn tick(
        &mut self,
        dt: f32,
        match_active: bool,
        player: Option<&PlayerView>,
        collisions: &[CollisionEvent],
        navigator: &mut dyn Navigator,
    ) -> Result<(), Departure> {
        if !match_active {
            return Err(Departure::MatchEnded);
        }
        if collisions
            .iter()
            .any(|c| c.tag == CollisionTag::ArenaBoundary)
        {
            return Err(Departure::LeftArena);
        }

        if let GraceState::Grounding { remaining } = self.grace {
            let left = remaining - dt;
            self.grace = if left <= 0.0 {
                GraceState::Active
            } else {
                GraceState::Grounding { remaining: left }
            };
        }

        self.pos = clamp_to_arena(self.pos);
        let slow = player.is_some_and(|p| p.slow_time);
        self.speed = self.effective_speed(slow);

        if let Some(dest) = self.destination {
            self.pos = clamp_to_arena(navigator.step(self.pos, dest, self.speed, dt));
        }
        Ok(())
    }

    /// Fixed-step update: recompute the target beside the player
    pub fn physics_step(&mut self, player: Option<&PlayerView>) {
        self.pos = clamp_to_arena(self.pos);
        if let Some(player) = player {
            self.destination = Some(player.pos + flank_offset(self.behavior_seed, self.flank_distance));
        }
    }

    fn effective_speed(&self, slow_time: bool) -> f32 {
        match self.grace {
            GraceState::Grounding { .. } => 0.0,
            GraceState::Active if slow_time => self.base_speed / 2.0,
            GraceState::Active => self.base_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::in_arena;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pursuer_at(pos: Vec2, seed: f32) -> Pursuer {
        Pursuer::with_traits(EntityId(1), pos, 8.0, seed, &Tuning::default())
    }

    fn view(pos: Vec2) -> PlayerView {
        PlayerView {
            pos,
            slow_time: false,
        }
    }

    #[test]
    fn test_flank_buckets() {
        assert_eq!(flank_offset(10.0, 2.0), Vec2::new(2.0, 0.0));
        assert_eq!(flank_offset(40.0, 2.0), Vec2::new(0.0, 2.0));
        assert_eq!(flank_offset(60.0, 2.0), Vec2::ZERO);
        assert_eq!(flank_offset(90.0, 2.0), Vec2::new(0.0, -2.0));
        assert_eq!(flank_offset(160.0, 2.0), Vec2::new(-2.0, 0.0));
        // Shared boundary belongs to the lower bucket
        assert_eq!(flank_offset(25.0, 2.0), Vec2::new(2.0, 0.0));
        assert_eq!(Flank::from_seed(25.0), Flank::PosX);
        assert_eq!(Flank::from_seed(50.0), Flank::PosZ);
        assert_eq!(Flank::from_seed(75.0), Flank::Direct);
        assert_eq!(Flank::from_seed(100.0), Flank::NegZ);
        assert_eq!(Flank::from_seed(199.9), Flank::NegX);
    }

    #[test]
    fn test_spawn_draws_within_ranges() {
        let mut rng = Pcg32::seed_from_u64(3);
        let tuning = Tuning::default();
        for i in 0..200 {
            let p = Pursuer::spawn(EntityId(i), Vec2::new(-100.0, 30.0), &mut rng, &tuning);
            assert!((7.0..9.0).contains(&p.base_speed));
            assert!((SEED_MIN..SEED_MAX).contains(&p.behavior_seed));
            assert!(in_arena(p.pos));
            assert!(p.is_grounded());
        }
    }

    #[test]
    fn test_same_seed_same_traits() {
        let tuning = Tuning::default();
        let a = Pursuer::spawn(EntityId(1), Vec2::new(-20.0, 0.0), &mut Pcg32::seed_from_u64(9), &tuning);
        let b = Pursuer::spawn(EntityId(1), Vec2::new(-20.0, 0.0), &mut Pcg32::seed_from_u64(9), &tuning);
        assert_eq!(a, b);
    }

    #[test]
    fn test_grace_period_then_active() {
        let mut nav = StraightLineNavigator;
        let mut p = pursuer_at(Vec2::new(-40.0, 0.0), 60.0);
        let player = view(Vec2::new(-10.0, 0.0));
        p.physics_step(Some(&player));

        p.tick(0.25, true, Some(&player), &[], &mut nav).expect("alive");
        assert_eq!(p.speed, 0.0);
        assert_eq!(p.pos, Vec2::new(-40.0, 0.0));

        p.tick(0.25, true, Some(&player), &[], &mut nav).expect("alive");
        assert_eq!(p.grace, GraceState::Active);
        assert_eq!(p.speed, 8.0);
        assert!((p.pos.x - -38.0).abs() < 1e-4);

        p.tick(0.5, true, Some(&player), &[], &mut nav).expect("alive");
        assert!((p.pos.x - -34.0).abs() < 1e-4);
        // Never grounded again
        assert!(!p.is_grounded());
    }

    #[test]
    fn test_slow_time_halves_speed() {
        let mut nav = StraightLineNavigator;
        let mut p = pursuer_at(Vec2::new(-40.0, 0.0), 60.0);
        p.grace = GraceState::Active;
        let slowed = PlayerView {
            pos: Vec2::new(-10.0, 0.0),
            slow_time: true,
        };
        p.tick(0.1, true, Some(&slowed), &[], &mut nav).expect("alive");
        assert_eq!(p.speed, 4.0);
        p.tick(0.1, true, Some(&view(slowed.pos)), &[], &mut nav).expect("alive");
        assert_eq!(p.speed, 8.0);
    }

    #[test]
    fn test_targets_flank_of_player() {
        let mut p = pursuer_at(Vec2::new(-40.0, 0.0), 90.0);
        p.physics_step(Some(&view(Vec2::new(-20.0, 5.0))));
        assert_eq!(p.destination, Some(Vec2::new(-20.0, 3.0)));
    }

    #[test]
    fn test_self_removal() {
        let mut nav = StraightLineNavigator;
        let mut p = pursuer_at(Vec2::new(-40.0, 0.0), 10.0);
        assert_eq!(
            p.tick(0.1, false, None, &[], &mut nav),
            Err(Departure::MatchEnded)
        );
        let boundary = CollisionEvent::new(CollisionTag::ArenaBoundary, EntityId(99));
        assert_eq!(
            p.tick(0.1, true, None, &[boundary], &mut nav),
            Err(Departure::LeftArena)
        );
        let hostile = CollisionEvent::new(CollisionTag::Hostile, EntityId(99));
        assert!(p.tick(0.1, true, None, &[hostile], &mut nav).is_ok());
    }

    #[test]
    fn test_position_clamped_every_tick() {
        let mut nav = StraightLineNavigator;
        let mut p = pursuer_at(Vec2::new(-40.0, 0.0), 10.0);
        p.pos = Vec2::new(3.0, -50.0);
        p.tick(0.1, true, None, &[], &mut nav).expect("alive");
        assert_eq!(p.pos, Vec2::new(-5.0, -11.0));
    }

    proptest! {
        #[test]
        fn prop_offset_is_single_axis(seed in SEED_MIN..SEED_MAX) {
            let offset = flank_offset(seed, 2.0);
            let nonzero = [offset.x, offset.y].iter().filter(|v| **v != 0.0).count();
            prop_assert!(nonzero <= 1);
            prop_assert!(offset.length() == 0.0 || (offset.length() - 2.0).abs() < 1e-6);
        }
    }
}
