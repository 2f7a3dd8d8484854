//! Full match flow through the public API: start, survive the countdown, unlock the next tier

use farm_runner::consts::{FRAME_DT, TIME_SENTINEL};
use farm_runner::persistence::{FileStorage, MemoryStorage};
use farm_runner::presentation::{Screen, ScreenLog};
use farm_runner::{Difficulty, Game, ProgressionRecord, ProgressionStore, Settings, Tuning};

fn new_game(storage: &MemoryStorage, seed: u64) -> Game<ScreenLog> {
    let store = ProgressionStore::load(Box::new(storage.clone()));
    let mut game = Game::new(
        store,
        ScreenLog::new(),
        Settings::default(),
        Tuning::default(),
        seed,
    )
    .expect("default tuning is valid");
    // Nothing can reach the player
    game.set_contact_detection(false);
    game
}

/// Advance until the match ends; returns whether the enemy cap was reached on the way
fn play_out(game: &mut Game<ScreenLog>, max_seconds: f32) -> bool {
    let mut reached_cap = false;
    let frames = (max_seconds / FRAME_DT) as u32;
    for _ in 0..frames {
        game.advance(FRAME_DT);
        let state = game.controller().state();
        if state.active && state.enemy_count == state.max_enemy_count {
            reached_cap = true;
        }
        if !game.controller().is_active() {
            break;
        }
    }
    reached_cap
}

#[test]
fn medium_completion_unlocks_hard() {
    let storage = MemoryStorage::new();
    let mut game = new_game(&storage, 2024);
    assert!(!game.progression().is_unlocked(Difficulty::Hard));

    game.start_game(2).expect("valid level");
    assert_eq!(game.controller().max_enemy_count(), 10);
    assert_eq!(game.controller().time_remaining(), 50.0);

    let reached_cap = play_out(&mut game, 200.0);
    assert!(reached_cap);
    assert!(!game.controller().is_active());
    assert_eq!(game.controller().time_remaining(), TIME_SENTINEL);

    // The match ended exactly once
    let log = game.presentation();
    assert_eq!(log.count_screen(Screen::GameOver), 1);
    assert_eq!(log.summaries.len(), 1);

    let final_score = game.controller().score();
    // 10 enemies plus at least 45 seconds of bonus
    assert!(final_score >= 20 + 45 * 5);
    assert_eq!(log.summaries[0], (final_score, final_score));

    let progression = game.progression();
    assert!(progression.is_unlocked(Difficulty::Hard));
    assert!(!progression.is_unlocked(Difficulty::Insane));
    assert_eq!(progression.high_score(Difficulty::Medium), final_score);
    assert_eq!(progression.high_score(Difficulty::Easy), 0);

    // Nothing moves once the match is over
    for _ in 0..300 {
        game.advance(FRAME_DT);
    }
    assert_eq!(game.controller().score(), final_score);
    assert!(game.controller().enemies().is_empty());
    assert!(game.controller().player().is_none());
    assert_eq!(game.presentation().summaries.len(), 1);
}

#[test]
fn saved_record_survives_reload() {
    let storage = MemoryStorage::new();
    let mut game = new_game(&storage, 7);
    game.start_game(1).expect("valid level");
    play_out(&mut game, 120.0);
    let record = game.progression().record().clone();
    assert!(record.is_unlocked(Difficulty::Medium));
    drop(game);

    let saved = storage.contents().expect("record written");
    assert_eq!(ProgressionRecord::from_json(&saved).expect("valid record"), record);

    let reloaded = new_game(&storage, 8);
    assert_eq!(reloaded.progression().record(), &record);
    assert_eq!(
        reloaded.selectable_difficulties(),
        vec![Difficulty::Easy, Difficulty::Medium]
    );
}

#[test]
fn restart_mid_match_starts_clean() {
    let storage = MemoryStorage::new();
    let mut game = new_game(&storage, 99);
    game.start_game(1).expect("valid level");
    for _ in 0..(60 * 20) {
        game.advance(FRAME_DT);
    }
    assert!(game.controller().enemy_count() >= 2);

    game.restart_game();
    assert_eq!(game.controller().enemy_count(), 0);
    assert_eq!(game.controller().score(), 0);
    assert_eq!(game.controller().time_remaining(), 25.0);
    assert_eq!(game.presentation().current_screen(), Some(Screen::Game));

    play_out(&mut game, 120.0);
    assert_eq!(game.presentation().summaries.len(), 1);
    assert!(game.progression().is_unlocked(Difficulty::Medium));
}

#[test]
fn file_storage_round_trip() {
    let dir = std::env::temp_dir().join(format!("farm-runner-scenario-{}", std::process::id()));
    let path = dir.join("FarmRunnerPlayerData.save");

    {
        let store = ProgressionStore::load(Box::new(FileStorage::new(&path)));
        assert_eq!(store.record(), &ProgressionRecord::default());
    }
    assert!(path.exists());

    let mut store = ProgressionStore::load(Box::new(FileStorage::new(&path)));
    store.update_high_score(Difficulty::Insane, 321);
    store.update_completion(Difficulty::Easy);
    store.persist().expect("write save file");

    let reloaded = ProgressionStore::load(Box::new(FileStorage::new(&path)));
    assert_eq!(reloaded.record(), store.record());
    assert_eq!(reloaded.high_score(Difficulty::Insane), 321);
    assert!(reloaded.is_unlocked(Difficulty::Medium));

    let _ = std::fs::remove_dir_all(&dir);
}
