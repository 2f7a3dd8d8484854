//! Match state and the passive entities of the arena

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::IDLE_TIME_REMAINING;
use crate::presentation::{EffectCue, Indicator, Screen};
use crate::progression::Difficulty;

/// Stable entity handle, unique for the lifetime of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

/// Mutable state of the current match, owned by the match controller
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub active: bool,
    pub difficulty: Difficulty,
    pub score: u32,
    pub time_remaining: f32,
    pub enemy_count: u32,
    pub max_enemy_count: u32,
    pub bonus_phase_active: bool,
    /// Seconds between enemy spawns
    pub spawn_interval: f32,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            active: false,
            difficulty: Difficulty::Easy,
            score: 0,
            time_remaining: IDLE_TIME_REMAINING,
            enemy_count: 0,
            max_enemy_count: 0,
            bonus_phase_active: false,
            spawn_interval: 0.0,
        }
    }
}

impl MatchState {
    /// Every enemy for this match has been spawned
    pub fn at_enemy_cap(&self) -> bool {
        self.enemy_count == self.max_enemy_count
    }
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerupKind {
    /// Temporary movement speed bonus
    Speed,
    /// Enemies move at half speed for a while
    SlowTime,
}

impl PowerupKind {
    pub fn collision_tag(self) -> CollisionTag {
        match self {
            PowerupKind::Speed => CollisionTag::SpeedPowerup,
            PowerupKind::SlowTime => CollisionTag::SlowTimePowerup,
        }
    }

    pub fn indicator(self) -> Indicator {
        match self {
            PowerupKind::Speed => Indicator::Speed,
            PowerupKind::SlowTime => Indicator::SlowTime,
        }
    }
}

/// A static obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Vec2,
    /// Yaw in radians
    pub rotation: f32,
}

/// A powerup waiting to be collected
#[derive(Debug, Clone, PartialEq)]
pub struct Powerup {
    pub id: EntityId,
    pub kind: PowerupKind,
    pub pos: Vec2,
}

/// Tags carried by collision notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionTag {
    Hostile,
    SpeedPowerup,
    SlowTimePowerup,
    ArenaBoundary,
}

impl CollisionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionTag::Hostile => "hostile",
            CollisionTag::SpeedPowerup => "speed-powerup",
            CollisionTag::SlowTimePowerup => "slow-time-powerup",
            CollisionTag::ArenaBoundary => "arena-boundary",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "hostile" => Some(CollisionTag::Hostile),
            "speed-powerup" => Some(CollisionTag::SpeedPowerup),
            "slow-time-powerup" => Some(CollisionTag::SlowTimePowerup),
            "arena-boundary" => Some(CollisionTag::ArenaBoundary),
            _ => None,
        }
    }

    pub fn powerup_kind(self) -> Option<PowerupKind> {
        match self {
            CollisionTag::SpeedPowerup => Some(PowerupKind::Speed),
            CollisionTag::SlowTimePowerup => Some(PowerupKind::SlowTime),
            _ => None,
        }
    }
}

/// Collision notification delivered to one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    pub tag: CollisionTag,
    pub other: EntityId,
}

impl CollisionEvent {
    pub fn new(tag: CollisionTag, other: EntityId) -> Self {
        Self { tag, other }
    }

    /// Build from a raw tag; unrecognised tags are dropped
    pub fn parse(tag: &str, other: EntityId) -> Option<Self> {
        match CollisionTag::from_str(tag) {
            Some(tag) => Some(Self { tag, other }),
            None => {
                log::debug!("ignoring collision tag `{tag}` from {other:?}");
                None
            }
        }
    }
}

/// Outbound notifications produced while ticking, routed by `Game`
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    ScreenRequested(Screen),
    IndicatorChanged(Indicator, bool),
    Effect(EffectCue),
    /// Avatar was caught; the match is over without completion
    PlayerCaught,
    /// Countdown finished; the difficulty counts as beaten
    MatchCompleted {
        difficulty: Difficulty,
        final_score: u32,
    },
}
