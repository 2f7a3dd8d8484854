//! Farm Runner headless runner
//!
//! Plays one match with a simple flee-the-pack autopilot, saving progression the same way
//! an interactive front end would, and prints the outcome.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::Vec2;

use farm_runner::consts::FRAME_DT;
use farm_runner::persistence::FileStorage;
use farm_runner::presentation::{EffectCue, Indicator, Presentation, Screen};
use farm_runner::settings::ControlMode;
use farm_runner::sim::{MatchController, PlayerInput};
use farm_runner::{Game, ProgressionStore, Settings, Tuning, clamp_to_arena, heading_towards};

#[derive(Debug, Parser)]
#[command(name = "farm-runner", about = "Run a Farm Runner match without a window")]
struct Cli {
    /// Difficulty level, 1 (Easy) to 4 (Insane)
    #[arg(short, long, default_value_t = 1)]
    difficulty: i64,

    /// RNG seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Save file (defaults to the per-user data directory)
    #[arg(long)]
    save: Option<PathBuf>,

    /// JSON file overriding balance values
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Give up after this many simulated seconds
    #[arg(long, default_value_t = 600.0)]
    seconds: f32,

    /// Steering mode: direct or pointer
    #[arg(long, default_value = "direct")]
    control: String,

    /// Start even if the difficulty is still locked
    #[arg(long)]
    any_difficulty: bool,
}

/// Prints what a window would show
#[derive(Debug, Default)]
struct ConsolePresentation {
    last_summary: Option<(u32, u32)>,
}

impl Presentation for ConsolePresentation {
    fn show_screen(&mut self, screen: Screen) {
        log::info!("[screen] {}", screen.as_str());
    }

    fn set_indicator(&mut self, indicator: Indicator, on: bool) {
        log::info!("[indicator] {indicator:?} {}", if on { "on" } else { "off" });
    }

    fn play_effect(&mut self, cue: EffectCue) {
        log::debug!("[effect] {cue:?}");
    }

    fn show_summary(&mut self, final_score: u32, high_score: u32) {
        self.last_summary = Some((final_score, high_score));
    }
}

/// Run away from the nearest pursuer, or idle when none are near
fn autopilot(controller: &MatchController, mode: ControlMode) -> PlayerInput {
    let Some(player) = controller.player() else {
        return PlayerInput::default();
    };
    let nearest = controller
        .enemies()
        .iter()
        .map(|e| e.pos)
        .min_by(|a, b| a.distance_squared(player.pos).total_cmp(&b.distance_squared(player.pos)));
    let Some(threat) = nearest else {
        return PlayerInput::default();
    };

    let away = (player.pos - threat).normalize_or(Vec2::X);
    let target = clamp_to_arena(player.pos + away * 6.0);

    match mode {
        ControlMode::Pointer => PlayerInput {
            pointer: Some(target),
            ..Default::default()
        },
        ControlMode::Direct => {
            let wanted = heading_towards(player.pos, target);
            let diff = (wanted - player.heading + std::f32::consts::PI)
                .rem_euclid(std::f32::consts::TAU)
                - std::f32::consts::PI;
            PlayerInput {
                forward: 1,
                turn: if diff.abs() < 0.1 { 0 } else { diff.signum() as i8 },
                pointer: None,
            }
        }
    }
}

fn main() -> Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let tuning = match &cli.tuning {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading tuning file {}", path.display()))?;
            Tuning::from_json(&json)
                .with_context(|| format!("parsing tuning file {}", path.display()))?
        }
        None => Tuning::default(),
    };

    let storage = match cli.save {
        Some(path) => FileStorage::new(path),
        None => FileStorage::default_location(),
    };
    log::info!("Saving progression to {}", storage.path().display());
    let progression = ProgressionStore::load(Box::new(storage));

    let Some(mode) = ControlMode::from_str(&cli.control) else {
        bail!("unknown control mode {:?} (expected direct or pointer)", cli.control);
    };
    log::info!("{} control", mode.as_str());
    let settings = Settings {
        control_mode: mode,
        ..Settings::default()
    };

    let seed = cli.seed.unwrap_or_else(rand::random);
    log::info!("Seed {seed}");

    let mut game = Game::new(
        progression,
        ConsolePresentation::default(),
        settings,
        tuning,
        seed,
    )
    .context("building game")?;

    if cli.any_difficulty {
        game.start_game(cli.difficulty)?;
    } else if !game.select_difficulty(cli.difficulty)? {
        let open: Vec<_> = game
            .selectable_difficulties()
            .iter()
            .map(|d| d.as_str())
            .collect();
        bail!(
            "difficulty {} is locked (unlocked: {})",
            cli.difficulty,
            open.join(", ")
        );
    }

    let max_frames = (cli.seconds.max(0.0) / FRAME_DT).ceil() as u64;
    let mut frame = 0;
    while game.controller().is_active() && frame < max_frames {
        game.set_input(autopilot(game.controller(), mode));
        game.advance(FRAME_DT);
        frame += 1;
        if frame % 300 == 0 {
            let hud = game.hud();
            log::info!("{} | {}", hud.score_text(), hud.info_text());
        }
    }
    if game.controller().is_active() {
        log::info!("Out of time after {:.0}s", cli.seconds);
    }

    let summary = game.presentation().last_summary;
    game.quit().context("saving progression")?;

    let difficulty = game.controller().difficulty();
    match summary {
        Some((score, high)) => println!(
            "{}: final score {score}, high score {high}",
            difficulty.as_str()
        ),
        None => println!(
            "{}: match abandoned at score {}",
            difficulty.as_str(),
            game.controller().score()
        ),
    }
    let unlocked: Vec<_> = game
        .selectable_difficulties()
        .iter()
        .map(|d| d.as_str())
        .collect();
    println!("Unlocked: {}", unlocked.join(", "));
    Ok(())
}
