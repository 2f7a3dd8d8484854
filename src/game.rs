//! Composition root and fixed-step driver
//!
//! `Game` wires the progression store, the match controller and a presentation together,
//! exposes the commands a menu layer issues, and turns wall-clock frame deltas into frame
//! ticks plus fixed physics substeps.

use crate::consts::{FRAME_DT, MAX_FRAME_DT, MAX_SUBSTEPS, PHYSICS_DT};
use crate::error::Result;
use crate::presentation::{Hud, Presentation, Screen};
use crate::progression::{Difficulty, ProgressionStore};
use crate::settings::{ControlMode, Settings};
use crate::sim::{GameEvent, MatchController, PlayerInput, contact};
use crate::tuning::Tuning;

/// Steps due within this many seconds of the clock count as due
const STEP_EPSILON: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Physics,
    Frame,
}

/// Frame ticks and physics steps on one timeline
///
/// Steps run in due-time order no matter how wall-clock time is sliced, so the same elapsed
/// time always yields the same sequence of steps.
#[derive(Debug, Clone, Copy, Default)]
struct StepClock {
    elapsed: f64,
    frames: u64,
    physics: u64,
}

impl StepClock {
    fn next_frame(&self) -> f64 {
        (self.frames + 1) as f64 * f64::from(FRAME_DT)
    }

    fn next_physics(&self) -> f64 {
        (self.physics + 1) as f64 * f64::from(PHYSICS_DT)
    }

    /// Earliest step that is due; physics wins ties
    fn next_due(&self) -> Option<Step> {
        let limit = self.elapsed + STEP_EPSILON;
        let (physics, frame) = (self.next_physics(), self.next_frame());
        if physics <= frame && physics <= limit {
            Some(Step::Physics)
        } else if frame <= limit {
            Some(Step::Frame)
        } else {
            None
        }
    }

    /// Forget steps we could not catch up on
    fn skip_backlog(&mut self) {
        self.frames = (self.elapsed / f64::from(FRAME_DT)) as u64;
        self.physics = (self.elapsed / f64::from(PHYSICS_DT)) as u64;
    }
}

pub struct Game<P: Presentation> {
    progression: ProgressionStore,
    controller: MatchController,
    presentation: P,
    settings: Settings,
    input: PlayerInput,
    /// 0 while paused, 1 otherwise
    time_scale: f32,
    clock: StepClock,
    contact_detection: bool,
}

impl<P: Presentation> Game<P> {
    /// Build the game from its collaborators and show the title screen
    pub fn new(
        progression: ProgressionStore,
        presentation: P,
        settings: Settings,
        tuning: Tuning,
        seed: u64,
    ) -> Result<Self> {
        let controller = MatchController::new(tuning, seed)?;
        let mut game = Self {
            progression,
            controller,
            presentation,
            settings,
            input: PlayerInput::default(),
            time_scale: 1.0,
            clock: StepClock::default(),
            contact_detection: true,
        };
        game.presentation.show_screen(Screen::Title);
        Ok(game)
    }

    // === Commands ===

    /// Start a match; levels outside 1..=4 are rejected
    pub fn start_game(&mut self, level: i64) -> Result<()> {
        let difficulty = Difficulty::from_level(level)?;
        self.time_scale = 1.0;
        self.clock = StepClock::default();
        self.controller.start_game(difficulty);
        self.route_events();
        Ok(())
    }

    /// Start a match only if the tier is unlocked
    pub fn select_difficulty(&mut self, level: i64) -> Result<bool> {
        if !self.progression.is_unlocked_level(level)? {
            log::info!("difficulty {level} is locked");
            return Ok(false);
        }
        self.start_game(level)?;
        Ok(true)
    }

    pub fn selectable_difficulties(&self) -> Vec<Difficulty> {
        self.progression.unlocked()
    }

    pub fn restart_game(&mut self) {
        self.time_scale = 1.0;
        self.clock = StepClock::default();
        self.controller.restart_game();
        self.route_events();
    }

    pub fn set_game_state(&mut self, active: bool) {
        self.controller.set_game_state(active);
    }

    /// Freeze time and show the pause menu
    pub fn pause(&mut self) {
        self.time_scale = 0.0;
        self.presentation.show_screen(Screen::Pause);
    }

    pub fn resume(&mut self) {
        self.time_scale = 1.0;
        self.presentation.show_screen(Screen::Game);
    }

    pub fn adjust_volume(&mut self, volume: f32) {
        self.settings.set_music_volume(volume);
    }

    pub fn set_control_mode(&mut self, mode: ControlMode) {
        self.settings.control_mode = mode;
    }

    pub fn reset_progression(&mut self) -> Result<()> {
        self.progression.reset()
    }

    /// Show a screen by id; unknown ids are an error
    pub fn show_screen(&mut self, id: &str) -> Result<()> {
        let screen = Screen::from_id(id)?;
        self.presentation.show_screen(screen);
        Ok(())
    }

    /// Leave the match for the title screen
    pub fn show_main_menu(&mut self) {
        self.controller.set_game_state(false);
        self.time_scale = 1.0;
        self.presentation.show_screen(Screen::Title);
    }

    /// Show the tutorial screen and return its text
    pub fn show_tutorial(&mut self) -> String {
        self.presentation.show_screen(Screen::Tutorial);
        self.controller.tuning().tutorial_text()
    }

    /// Final save before shutdown
    pub fn quit(&mut self) -> Result<()> {
        self.controller.set_game_state(false);
        self.progression.persist()?;
        log::info!("Progression saved, quitting");
        Ok(())
    }

    /// Input used by the following frames
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    /// Run built-in proximity detection before each physics step (on by default)
    pub fn set_contact_detection(&mut self, enabled: bool) {
        self.contact_detection = enabled;
    }

    // === Driver ===

    /// Advance by one rendered frame of `dt` wall-clock seconds
    ///
    /// The time is fed to a fixed-step clock: frame ticks run at `FRAME_DT` and physics steps
    /// at `PHYSICS_DT`, interleaved by due time, at most `MAX_SUBSTEPS` of each per call.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT) * self.time_scale;
        self.clock.elapsed += f64::from(dt);

        let (mut physics, mut frames) = (0, 0);
        while let Some(step) = self.clock.next_due() {
            match step {
                Step::Physics if physics < MAX_SUBSTEPS => {
                    self.physics_step();
                    self.clock.physics += 1;
                    physics += 1;
                }
                Step::Frame if frames < MAX_SUBSTEPS => {
                    self.frame_tick();
                    self.clock.frames += 1;
                    frames += 1;
                }
                _ => {
                    self.clock.skip_backlog();
                    break;
                }
            }
        }
    }

    fn physics_step(&mut self) {
        if self.contact_detection {
            contact::dispatch(&mut self.controller);
        }
        self.controller.physics_step();
    }

    fn frame_tick(&mut self) {
        self.controller
            .frame(FRAME_DT, self.settings.control_mode, &self.input);
        self.route_events();

        if self.controller.is_active() {
            self.save_high_score();
        }
    }

    fn route_events(&mut self) {
        for event in self.controller.drain_events() {
            match event {
                GameEvent::ScreenRequested(screen) => self.presentation.show_screen(screen),
                GameEvent::IndicatorChanged(indicator, on) => {
                    self.presentation.set_indicator(indicator, on)
                }
                GameEvent::Effect(cue) => self.presentation.play_effect(cue),
                GameEvent::PlayerCaught => {
                    self.save_high_score();
                    self.show_summary();
                }
                GameEvent::MatchCompleted {
                    difficulty,
                    final_score,
                } => {
                    self.progression.update_completion(difficulty);
                    self.progression.update_high_score(difficulty, final_score);
                    self.persist();
                    self.show_summary();
                }
            }
        }
    }

    fn save_high_score(&mut self) {
        let state = self.controller.state();
        self.progression
            .update_high_score(state.difficulty, state.score);
        self.persist();
    }

    fn persist(&mut self) {
        if let Err(e) = self.progression.persist() {
            log::warn!("Failed to save progression: {e}");
        }
    }

    fn show_summary(&mut self) {
        let state = self.controller.state();
        let high = self.progression.high_score(state.difficulty);
        self.presentation.show_summary(state.score, high);
    }

    // === Accessors ===

    pub fn hud(&self) -> Hud {
        Hud::from_state(self.controller.state())
    }

    /// Score line for the pause menu
    pub fn pause_score_text(&self) -> String {
        self.hud().score_text()
    }

    pub fn progression(&self) -> &ProgressionStore {
        &self.progression
    }

    pub fn controller(&self) -> &MatchController {
        &self.controller
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.time_scale == 0.0
    }
}

impl<P: Presentation> std::fmt::Debug for Game<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("controller", &self.controller)
            .field("progression", &self.progression)
            .field("time_scale", &self.time_scale)
            .finish()
    }
}
