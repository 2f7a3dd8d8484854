//! Match controller
//!
//! Owns the match lifecycle: difficulty-scaled parameters, the three spawn loops, scoring,
//! the countdown with its bonus phase, and the entities living in the arena. Work that other
//! systems must react to (screens, indicators, completion) is queued as [`GameEvent`]s.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::avatar::{AvatarExit, PickupOutcome, PlayerAvatar, PlayerInput};
use super::pursuit::{Navigator, PlayerView, Pursuer, StraightLineNavigator};
use super::state::{CollisionEvent, EntityId, GameEvent, MatchState, Obstacle, Powerup};
use super::task::{TaskSet, Wakeup};
use crate::consts::TIME_SENTINEL;
use crate::error::Result;
use crate::presentation::{EffectCue, Screen};
use crate::progression::Difficulty;
use crate::settings::ControlMode;
use crate::random_arena_point;
use crate::tuning::Tuning;

/// Timed loops started for every match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTask {
    EnemySpawn,
    ObstacleSpawn,
    PowerupSpawn,
    TimeBonus,
}

pub struct MatchController {
    state: MatchState,
    tuning: Tuning,
    rng: Pcg32,
    tasks: TaskSet<MatchTask>,
    navigator: Box<dyn Navigator>,
    player: Option<PlayerAvatar>,
    enemies: Vec<Pursuer>,
    obstacles: Vec<Obstacle>,
    powerups: Vec<Powerup>,
    /// Collision notifications waiting for their entity's next tick
    inbox: HashMap<EntityId, Vec<CollisionEvent>>,
    events: Vec<GameEvent>,
    next_id: u32,
}

impl std::fmt::Debug for MatchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchController")
            .field("state", &self.state)
            .field("tasks", &self.tasks.len())
            .field("enemies", &self.enemies.len())
            .field("obstacles", &self.obstacles.len())
            .field("powerups", &self.powerups.len())
            .finish()
    }
}

impl MatchController {
    /// Controller with a seeded RNG and straight-line navigation
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self> {
        Self::with_navigator(tuning, seed, Box::new(StraightLineNavigator))
    }

    pub fn with_navigator(tuning: Tuning, seed: u64, navigator: Box<dyn Navigator>) -> Result<Self> {
        tuning.validate()?;
        Ok(Self {
            state: MatchState::default(),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            tasks: TaskSet::new(),
            navigator,
            player: None,
            enemies: Vec::new(),
            obstacles: Vec::new(),
            powerups: Vec::new(),
            inbox: HashMap::new(),
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    // === Lifecycle ===

    /// Reset to the difficulty's parameters, spawn the player and start the spawn loops
    pub fn start_game(&mut self, difficulty: Difficulty) {
        self.clear_arena();

        let level = difficulty.level();
        self.state = MatchState {
            active: false,
            difficulty,
            score: 0,
            time_remaining: self.tuning.seconds_per_difficulty * f32::from(level),
            enemy_count: 0,
            max_enemy_count: self.tuning.enemies_per_difficulty * u32::from(level),
            bonus_phase_active: false,
            spawn_interval: self.tuning.enemy_spawn_interval(level),
        };

        self.events.push(GameEvent::ScreenRequested(Screen::Game));

        let id = self.next_entity_id();
        let pos = random_arena_point(&mut self.rng);
        self.player = Some(PlayerAvatar::spawn(id, pos));

        self.state.active = true;
        self.tasks.open_scope();
        let t = &self.tuning;
        let enemy = self.state.spawn_interval;
        let (obstacle, powerup) = (t.obstacle_interval, t.powerup_interval);
        self.tasks.spawn(MatchTask::EnemySpawn, enemy, enemy);
        self.tasks.spawn(MatchTask::ObstacleSpawn, obstacle, obstacle);
        self.tasks.spawn(MatchTask::PowerupSpawn, powerup, powerup);

        log::info!(
            "Match started: {} ({} enemies, {:.0}s, spawn every {:.2}s)",
            difficulty.as_str(),
            self.state.max_enemy_count,
            self.state.time_remaining,
            self.state.spawn_interval
        );
    }

    /// Countdown finished: the difficulty counts as beaten
    ///
    /// Returns false if no match was running.
    pub fn end_game(&mut self) -> bool {
        if !self.state.active {
            return false;
        }
        self.events.push(GameEvent::ScreenRequested(Screen::GameOver));
        self.events.push(GameEvent::MatchCompleted {
            difficulty: self.state.difficulty,
            final_score: self.state.score,
        });
        self.state.time_remaining = TIME_SENTINEL;
        self.deactivate();
        log::info!(
            "Match completed: {} with score {}",
            self.state.difficulty.as_str(),
            self.state.score
        );
        true
    }

    /// Force the active flag; going inactive cancels every running loop
    pub fn set_game_state(&mut self, active: bool) {
        if active {
            self.state.active = true;
        } else {
            self.deactivate();
        }
    }

    pub fn restart_game(&mut self) {
        self.set_game_state(false);
        self.start_game(self.state.difficulty);
    }

    fn deactivate(&mut self) {
        self.state.active = false;
        self.tasks.cancel_all();
    }

    /// Remove every entity now, expiring the avatar's powerup
    fn clear_arena(&mut self) {
        if let Some(mut player) = self.player.take() {
            player.release_effects(&mut self.events);
        }
        self.enemies.clear();
        self.obstacles.clear();
        self.powerups.clear();
        self.inbox.clear();
    }

    // === Ticking ===

    /// Queue a collision for `target`'s next tick
    pub fn deliver_collision(&mut self, target: EntityId, event: CollisionEvent) {
        self.inbox.entry(target).or_default().push(event);
    }

    /// Per-frame update: entities first, then spawn loops and the countdown
    pub fn frame(&mut self, dt: f32, mode: ControlMode, input: &PlayerInput) {
        self.tick_entities(dt, mode, input);

        if !self.state.active {
            return;
        }
        for wakeup in self.tasks.advance(dt) {
            self.on_wakeup(wakeup);
        }
        self.countdown(dt);
    }

    /// Fixed-step update: pursuers pick their targets
    pub fn physics_step(&mut self) {
        let view = self.player_view();
        for enemy in &mut self.enemies {
            enemy.physics_step(view.as_ref());
        }
    }

    fn tick_entities(&mut self, dt: f32, mode: ControlMode, input: &PlayerInput) {
        let active = self.state.active;

        if let Some(player) = self.player.as_mut() {
            let collisions = self.inbox.remove(&player.id).unwrap_or_default();
            match player.tick(dt, active, mode, input, &collisions, &self.tuning, &mut self.events) {
                Ok(pickups) => {
                    for pickup in pickups {
                        self.collect_pickup(pickup);
                    }
                }
                Err(exit) => {
                    log::debug!("player removed: {exit:?}");
                    self.player = None;
                    if exit == AvatarExit::Caught {
                        self.on_player_caught();
                    }
                }
            }
        }

        let active = self.state.active;
        let view = self.player_view();
        let navigator = self.navigator.as_mut();
        let inbox = &mut self.inbox;
        self.enemies.retain_mut(|enemy| {
            let collisions = inbox.remove(&enemy.id).unwrap_or_default();
            match enemy.tick(dt, active, view.as_ref(), &collisions, &mut *navigator) {
                Ok(()) => true,
                Err(departure) => {
                    log::debug!("enemy {:?} removed: {departure:?}", enemy.id);
                    false
                }
            }
        });

        if !active {
            self.obstacles.clear();
            self.powerups.clear();
            self.inbox.clear();
        }
    }

    fn player_view(&self) -> Option<PlayerView> {
        self.player.as_ref().map(|p| PlayerView {
            pos: p.pos,
            slow_time: p.slow_time(),
        })
    }

    fn collect_pickup(&mut self, outcome: PickupOutcome) {
        let id = match outcome {
            PickupOutcome::Consumed(id, _) => id,
            PickupOutcome::Discarded(id) => id,
        };
        if let Some(index) = self.powerups.iter().position(|p| p.id == id) {
            let powerup = self.powerups.remove(index);
            if let PickupOutcome::Consumed(..) = outcome {
                self.events
                    .push(GameEvent::Effect(EffectCue::PickupBurst { pos: powerup.pos }));
            }
        }
    }

    /// Caught: game over without completion
    fn on_player_caught(&mut self) {
        self.events.push(GameEvent::ScreenRequested(Screen::GameOver));
        self.deactivate();
        log::info!("Player caught with score {}", self.state.score);
    }

    fn on_wakeup(&mut self, wakeup: Wakeup<MatchTask>) {
        // Cancelled or finished while waiting
        if !self.state.active || !self.tasks.is_live(&wakeup) {
            return;
        }
        match wakeup.kind {
            MatchTask::EnemySpawn => self.spawn_enemy(),
            MatchTask::ObstacleSpawn => self.spawn_obstacle(),
            MatchTask::PowerupSpawn => self.spawn_powerup(),
            MatchTask::TimeBonus => {
                if self.state.time_remaining > self.tuning.terminal_time {
                    self.state.score += self.tuning.score_per_second;
                } else {
                    self.tasks.finish(wakeup.id);
                }
            }
        }
    }

    fn countdown(&mut self, dt: f32) {
        if !self.state.active {
            return;
        }
        let terminal = self.tuning.terminal_time;
        if self.state.at_enemy_cap() && self.state.time_remaining > terminal {
            self.state.time_remaining -= dt;
            if !self.state.bonus_phase_active {
                self.state.bonus_phase_active = true;
                self.tasks
                    .spawn(MatchTask::TimeBonus, 0.0, self.tuning.bonus_interval);
                log::debug!("bonus phase started");
            }
        }
        if self.state.time_remaining <= terminal {
            self.end_game();
        }
    }

    // === Spawning ===

    fn spawn_enemy(&mut self) {
        if self.state.enemy_count >= self.state.max_enemy_count {
            return;
        }
        let [jx, jz] = self.tuning.enemy_spawn_jitter;
        let anchor = match &self.player {
            Some(player) => player.pos,
            None => random_arena_point(&mut self.rng),
        };
        let jitter = Vec2::new(
            self.rng.random_range(-jx..=jx),
            self.rng.random_range(-jz..=jz),
        );
        let id = self.next_entity_id();
        let enemy = Pursuer::spawn(id, anchor + jitter, &mut self.rng, &self.tuning);
        self.events
            .push(GameEvent::Effect(EffectCue::SpawnBurst { pos: enemy.pos }));
        log::debug!("enemy {:?} spawned at {:?} ({:?})", id, enemy.pos, enemy.flank());
        self.enemies.push(enemy);

        self.state.enemy_count += 1;
        self.state.score += self.tuning.score_per_enemy;
    }

    fn spawn_obstacle(&mut self) {
        let id = self.next_entity_id();
        let pos = random_arena_point(&mut self.rng);
        let rotation = self.rng.random_range(0.0..std::f32::consts::TAU);
        self.events.push(GameEvent::Effect(EffectCue::SpawnBurst { pos }));
        self.obstacles.push(Obstacle { id, pos, rotation });
    }

    fn spawn_powerup(&mut self) {
        if self.tuning.powerup_kinds.is_empty() {
            return;
        }
        let index = self.rng.random_range(0..self.tuning.powerup_kinds.len());
        let kind = self.tuning.powerup_kinds[index];
        let id = self.next_entity_id();
        let pos = random_arena_point(&mut self.rng);
        self.events.push(GameEvent::Effect(EffectCue::SpawnBurst { pos }));
        self.powerups.push(Powerup { id, kind, pos });
    }

    // === Accessors ===

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn score(&self) -> u32 {
        self.state.score
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.difficulty
    }

    pub fn time_remaining(&self) -> f32 {
        self.state.time_remaining
    }

    pub fn enemy_count(&self) -> u32 {
        self.state.enemy_count
    }

    pub fn max_enemy_count(&self) -> u32 {
        self.state.max_enemy_count
    }

    pub fn player(&self) -> Option<&PlayerAvatar> {
        self.player.as_ref()
    }

    pub fn enemies(&self) -> &[Pursuer] {
        &self.enemies
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn powerups(&self) -> &[Powerup] {
        &self.powerups
    }

    /// Loops still scheduled for this match
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    pub fn has_task(&self, task: MatchTask) -> bool {
        self.tasks.contains(task)
    }

    /// Take the queued notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
