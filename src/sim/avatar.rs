//! Player avatar: movement modes, powerups and collision handling

use glam::Vec2;

use super::effect::StatusEffect;
use super::state::{CollisionEvent, CollisionTag, EntityId, GameEvent, PowerupKind};
use crate::presentation::{EffectCue, Indicator};
use crate::settings::ControlMode;
use crate::tuning::{HeldPickupPolicy, Tuning};
use crate::{clamp_to_arena, forward_vector, heading_towards};

/// Input sampled for one frame
#[derive(Debug, Clone, Default)]
pub struct PlayerInput {
    /// -1 back, 0 idle, 1 forward (direct mode)
    pub forward: i8,
    /// -1 left, 0 straight, 1 right (direct mode)
    pub turn: i8,
    /// Ground point under the pointer, if any (pointer mode)
    pub pointer: Option<Vec2>,
}

/// Stats the powerup effects modify
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AvatarStatus {
    pub speed_bonus: f32,
    pub slow_time: bool,
    /// Indicator toggles not yet forwarded
    indicators: Vec<(Indicator, bool)>,
}

/// Why the avatar removed itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarExit {
    MatchEnded,
    Caught,
}

/// What happened to a powerup the avatar touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    /// Effect engaged, pickup used up
    Consumed(EntityId, PowerupKind),
    /// Another powerup was running; pickup removed without effect
    Discarded(EntityId),
}

/// The player-controlled entity
///
/// Owners must take every removal path through [`PlayerAvatar::release_effects`] (or a
/// `tick` that returns `Err`, which does it); dropping the avatar with a powerup running
/// skips the expiry and leaves its indicator on.
#[derive(Debug)]
pub struct PlayerAvatar {
    pub id: EntityId,
    pub pos: Vec2,
    /// Radians, 0 = +Z
    pub heading: f32,
    /// Signed speed used this frame
    pub speed: f32,
    status: AvatarStatus,
    powerup: StatusEffect<AvatarStatus>,
}

impl PlayerAvatar {
    pub fn spawn(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos: clamp_to_arena(pos),
            heading: 0.0,
            speed: 0.0,
            status: AvatarStatus::default(),
            powerup: StatusEffect::new(),
        }
    }

    /// Slow-time status read by the pursuers
    pub fn slow_time(&self) -> bool {
        self.status.slow_time
    }

    pub fn speed_bonus(&self) -> f32 {
        self.status.speed_bonus
    }

    /// A powerup effect is running
    pub fn has_powerup(&self) -> bool {
        self.powerup.is_engaged()
    }

    /// Per-frame update
    ///
    /// Returns the pickups touched this frame, or why the avatar removed itself. Every exit
    /// path expires the running powerup first so its indicator is switched off.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        dt: f32,
        match_active: bool,
        mode: ControlMode,
        input: &PlayerInput,
        collisions: &[CollisionEvent],
        tuning: &Tuning,
        events: &mut Vec<GameEvent>,
    ) -> Result<Vec<PickupOutcome>, AvatarExit> {
        if !match_active {
            self.release_effects(events);
            return Err(AvatarExit::MatchEnded);
        }

        let mut pickups = Vec::new();
        for collision in collisions {
            match collision.tag {
                CollisionTag::Hostile => {
                    events.push(GameEvent::Effect(EffectCue::DeathBurst { pos: self.pos }));
                    events.push(GameEvent::Effect(EffectCue::DeathSound));
                    self.release_effects(events);
                    events.push(GameEvent::PlayerCaught);
                    return Err(AvatarExit::Caught);
                }
                tag => {
                    if let Some(kind) = tag.powerup_kind() {
                        if let Some(outcome) = self.touch_powerup(collision.other, kind, tuning) {
                            pickups.push(outcome);
                        }
                    }
                }
            }
        }

        self.powerup.advance(&mut self.status, dt);

        self.pos = clamp_to_arena(self.pos);
        match mode {
            ControlMode::Direct => self.drive_direct(input, dt, tuning),
            ControlMode::Pointer => self.drive_pointer(input, dt, tuning),
        }
        self.pos = clamp_to_arena(self.pos);

        self.flush_indicators(events);
        Ok(pickups)
    }

    /// Expire any running powerup now (avatar leaving the arena)
    pub fn release_effects(&mut self, events: &mut Vec<GameEvent>) {
        self.powerup.release(&mut self.status);
        self.flush_indicators(events);
    }

    fn touch_powerup(
        &mut self,
        pickup: EntityId,
        kind: PowerupKind,
        tuning: &Tuning,
    ) -> Option<PickupOutcome> {
        if self.powerup.is_engaged() {
            return match tuning.held_pickup_policy {
                HeldPickupPolicy::Ignore => None,
                HeldPickupPolicy::Discard => Some(PickupOutcome::Discarded(pickup)),
            };
        }

        match kind {
            PowerupKind::Speed => {
                let bonus = tuning.speed_powerup_bonus;
                self.powerup.engage(
                    &mut self.status,
                    tuning.speed_powerup_duration,
                    |s| {
                        s.speed_bonus += bonus;
                        s.indicators.push((Indicator::Speed, true));
                    },
                    move |s| {
                        s.speed_bonus -= bonus;
                        s.indicators.push((Indicator::Speed, false));
                    },
                );
            }
            PowerupKind::SlowTime => {
                self.powerup.engage(
                    &mut self.status,
                    tuning.slow_time_powerup_duration,
                    |s| {
                        s.slow_time = true;
                        s.indicators.push((Indicator::SlowTime, true));
                    },
                    |s| {
                        s.slow_time = false;
                        s.indicators.push((Indicator::SlowTime, false));
                    },
                );
            }
        }
        log::debug!("powerup {kind:?} engaged");
        Some(PickupOutcome::Consumed(pickup, kind))
    }

    fn top_speed(&self, tuning: &Tuning) -> f32 {
        tuning.player_max_speed + self.status.speed_bonus
    }

    fn drive_direct(&mut self, input: &PlayerInput, dt: f32, tuning: &Tuning) {
        let forward = f32::from(input.forward.signum());
        let turn = f32::from(input.turn.signum());
        self.speed = self.top_speed(tuning) * forward;
        self.pos += forward_vector(self.heading) * self.speed * dt;
        self.heading += tuning.player_turning_speed.to_radians() * turn * dt;
    }

    /// Always moving forward; speed steps down as the pointer gets close
    fn drive_pointer(&mut self, input: &PlayerInput, dt: f32, tuning: &Tuning) {
        let top = self.top_speed(tuning);
        if let Some(target) = input.pointer {
            let distance = self.pos.distance(target);
            if distance > f32::EPSILON {
                self.heading = heading_towards(self.pos, target);
            }
            self.speed = pointer_speed(distance, top, tuning);
        }
        self.pos += forward_vector(self.heading) * self.speed * dt;
    }

    fn flush_indicators(&mut self, events: &mut Vec<GameEvent>) {
        events.extend(
            self.status
                .indicators
                .drain(..)
                .map(|(indicator, on)| GameEvent::IndicatorChanged(indicator, on)),
        );
    }
}

/// Speed step function for pointer mode
pub fn pointer_speed(distance: f32, top_speed: f32, tuning: &Tuning) -> f32 {
    if distance < tuning.pointer_too_close {
        -top_speed
    } else if distance < tuning.pointer_stop {
        0.0
    } else if distance < tuning.pointer_approach {
        top_speed / 2.0
    } else {
        top_speed
    }
}
