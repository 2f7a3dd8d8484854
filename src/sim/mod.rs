//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied time steps only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod avatar;
pub mod contact;
pub mod controller;
pub mod effect;
pub mod pursuit;
pub mod state;
pub mod task;

pub use avatar::{AvatarExit, PickupOutcome, PlayerAvatar, PlayerInput, pointer_speed};
pub use contact::{Contact, detect, dispatch};
pub use controller::{MatchController, MatchTask};
pub use effect::StatusEffect;
pub use pursuit::{Flank, Navigator, PlayerView, Pursuer, StraightLineNavigator, flank_offset};
pub use state::{
    CollisionEvent, CollisionTag, EntityId, GameEvent, MatchState, Obstacle, Powerup, PowerupKind,
};
pub use task::{Scope, TaskId, TaskSet, Wakeup};
