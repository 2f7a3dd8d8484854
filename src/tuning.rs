//! Data-driven game balance
//!
//! Defaults reproduce the shipped game. A JSON file may override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::sim::state::PowerupKind;

/// What happens to a powerup touched while another one is still running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HeldPickupPolicy {
    /// Leave the pickup in the arena untouched
    #[default]
    Ignore,
    /// Remove the pickup without granting its effect
    Discard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Scoring ===
    pub score_per_enemy: u32,
    pub score_per_second: u32,
    /// Seconds between bonus payouts
    pub bonus_interval: f32,
    /// Match ends when the countdown reaches this value
    pub terminal_time: f32,

    // === Difficulty scaling ===
    pub enemies_per_difficulty: u32,
    pub seconds_per_difficulty: f32,
    /// Enemy spawn interval is this divided by the difficulty level
    pub enemy_spawn_base_interval: f32,

    // === Spawning ===
    pub obstacle_interval: f32,
    pub powerup_interval: f32,
    /// Half extents of the random offset (x, z) applied around the player
    pub enemy_spawn_jitter: [f32; 2],
    pub powerup_kinds: Vec<PowerupKind>,

    // === Enemies ===
    pub enemy_min_speed: f32,
    pub enemy_max_speed: f32,
    pub enemy_grace_period: f32,
    /// Distance enemies aim beside the player
    pub flank_offset: f32,

    // === Player ===
    pub player_max_speed: f32,
    /// Degrees per second
    pub player_turning_speed: f32,
    pub speed_powerup_duration: f32,
    pub speed_powerup_bonus: f32,
    pub slow_time_powerup_duration: f32,
    pub pointer_too_close: f32,
    pub pointer_stop: f32,
    pub pointer_approach: f32,
    pub held_pickup_policy: HeldPickupPolicy,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            score_per_enemy: 2,
            score_per_second: 5,
            bonus_interval: 1.0,
            terminal_time: 1.0,

            enemies_per_difficulty: 5,
            seconds_per_difficulty: 25.0,
            enemy_spawn_base_interval: 8.0,

            obstacle_interval: 10.0,
            powerup_interval: 25.0,
            enemy_spawn_jitter: [16.0, 7.0],
            powerup_kinds: vec![PowerupKind::Speed, PowerupKind::SlowTime],

            enemy_min_speed: 7.0,
            enemy_max_speed: 9.0,
            enemy_grace_period: 0.5,
            flank_offset: 2.0,

            player_max_speed: 10.0,
            player_turning_speed: 250.0,
            speed_powerup_duration: 5.0,
            speed_powerup_bonus: 5.0,
            slow_time_powerup_duration: 2.5,
            pointer_too_close: 2.0,
            pointer_stop: 3.0,
            pointer_approach: 4.0,
            held_pickup_policy: HeldPickupPolicy::Ignore,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning override
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Tuning = serde_json::from_str(json)
            .map_err(|e| GameError::InvalidTuning(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall task loops or produce empty random ranges
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bonus_interval", self.bonus_interval),
            ("enemy_spawn_base_interval", self.enemy_spawn_base_interval),
            ("obstacle_interval", self.obstacle_interval),
            ("powerup_interval", self.powerup_interval),
            ("speed_powerup_duration", self.speed_powerup_duration),
            ("slow_time_powerup_duration", self.slow_time_powerup_duration),
            ("seconds_per_difficulty", self.seconds_per_difficulty),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(GameError::InvalidTuning(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if !(self.enemy_min_speed < self.enemy_max_speed) {
            return Err(GameError::InvalidTuning(format!(
                "enemy speed range [{}, {}) is empty",
                self.enemy_min_speed, self.enemy_max_speed
            )));
        }
        if self.enemy_spawn_jitter.iter().any(|j| *j < 0.0) {
            return Err(GameError::InvalidTuning(
                "enemy_spawn_jitter must not be negative".to_string(),
            ));
        }
        if !(self.pointer_too_close <= self.pointer_stop
            && self.pointer_stop <= self.pointer_approach)
        {
            return Err(GameError::InvalidTuning(
                "pointer thresholds must be ordered too_close <= stop <= approach".to_string(),
            ));
        }
        Ok(())
    }

    /// Seconds between enemy spawns for a difficulty level
    pub fn enemy_spawn_interval(&self, level: u8) -> f32 {
        self.enemy_spawn_base_interval / f32::from(level.max(1))
    }

    /// Human-readable rules, built from the live scoring constants
    pub fn tutorial_text(&self) -> String {
        format!(
            "- Goal: Avoid getting caught.\n\
             - Scoring: +{} per new enemy spawned, +{} per second survived after last wave.\n\
             - Controls: WASD or Arrow keys for movement. Alternatively, use mouse control. \
             Space to restart, ESC to pause.\n\
             - Have Fun!",
            self.score_per_enemy, self.score_per_second
        )
    }
}
