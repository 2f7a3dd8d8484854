//! Boundary towards the presentation layer
//!
//! The simulation never draws anything. It asks for screen changes, indicator toggles and
//! one-shot effects through [`Presentation`], and exposes HUD text through [`Hud`].

use glam::Vec2;

use crate::error::{GameError, Result};
use crate::sim::state::MatchState;

/// Screens the facade can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Title,
    Game,
    GameOver,
    Options,
    Tutorial,
    Reset,
    Pause,
}

impl Screen {
    pub const ALL: [Screen; 7] = [
        Screen::Title,
        Screen::Game,
        Screen::GameOver,
        Screen::Options,
        Screen::Tutorial,
        Screen::Reset,
        Screen::Pause,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Title => "title",
            Screen::Game => "game",
            Screen::GameOver => "game-over",
            Screen::Options => "options",
            Screen::Tutorial => "tutorial",
            Screen::Reset => "reset",
            Screen::Pause => "pause",
        }
    }

    /// Resolve a screen id; unknown ids are a contract violation
    pub fn from_id(id: &str) -> Result<Self> {
        Screen::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(id))
            .ok_or_else(|| GameError::UnknownScreen(id.to_string()))
    }
}

/// Powerup indicators shown while an effect runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Speed,
    SlowTime,
}

/// One-shot visual/audio effects requested by the simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectCue {
    /// Player caught
    DeathBurst { pos: Vec2 },
    /// Powerup collected
    PickupBurst { pos: Vec2 },
    /// Something appeared in the arena
    SpawnBurst { pos: Vec2 },
    DeathSound,
}

pub trait Presentation {
    fn show_screen(&mut self, screen: Screen);
    fn set_indicator(&mut self, indicator: Indicator, on: bool);
    fn play_effect(&mut self, _cue: EffectCue) {}
    /// Final numbers for the game-over screen
    fn show_summary(&mut self, _final_score: u32, _high_score: u32) {}
}

/// Presentation that only records what it was asked to do
#[derive(Debug, Clone, Default)]
pub struct ScreenLog {
    pub screens: Vec<Screen>,
    pub indicators: Vec<(Indicator, bool)>,
    pub effects: Vec<EffectCue>,
    pub summaries: Vec<(u32, u32)>,
}

impl ScreenLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_screen(&self) -> Option<Screen> {
        self.screens.last().copied()
    }

    /// Latest state of an indicator (off if never touched)
    pub fn indicator_on(&self, indicator: Indicator) -> bool {
        self.indicators
            .iter()
            .rev()
            .find(|(i, _)| *i == indicator)
            .map(|(_, on)| *on)
            .unwrap_or(false)
    }

    pub fn count_screen(&self, screen: Screen) -> usize {
        self.screens.iter().filter(|s| **s == screen).count()
    }
}

impl Presentation for ScreenLog {
    fn show_screen(&mut self, screen: Screen) {
        log::debug!("screen -> {}", screen.as_str());
        self.screens.push(screen);
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        self.indicators.push((indicator, on));
    }

    fn play_effect(&mut self, cue: EffectCue) {
        self.effects.push(cue);
    }

    fn show_summary(&mut self, final_score: u32, high_score: u32) {
        self.summaries.push((final_score, high_score));
    }
}

/// HUD text derived from the match state
#[derive(Debug, Clone, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub enemy_count: u32,
    pub max_enemy_count: u32,
    pub time_remaining: f32,
}

impl Hud {
    pub fn from_state(state: &MatchState) -> Self {
        Self {
            score: state.score,
            enemy_count: state.enemy_count,
            max_enemy_count: state.max_enemy_count,
            time_remaining: state.time_remaining,
        }
    }

    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }

    /// Enemy progress until the cap is reached, then the countdown
    pub fn info_text(&self) -> String {
        if self.enemy_count != self.max_enemy_count {
            format!("{}/{}", self.enemy_count, self.max_enemy_count)
        } else {
            format!("Time Left: {}", self.time_remaining.floor())
        }
    }
}
