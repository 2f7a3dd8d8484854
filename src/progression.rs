//! Persisted progression: per-difficulty high scores and unlocks
//!
//! One record per process. Loaded at startup (defaults are written out if nothing is stored),
//! ratcheted every tick while a match runs and on match completion.

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::persistence::SaveStorage;

/// Difficulty tiers, numbered 1..=4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Easy = 1,
    Medium = 2,
    Hard = 3,
    Insane = 4,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    /// Checked conversion from a raw level; anything outside 1..=4 is a contract violation
    pub fn from_level(level: i64) -> Result<Self> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            4 => Ok(Difficulty::Insane),
            other => Err(GameError::InvalidDifficulty(other)),
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Insane => "Insane",
        }
    }

    /// The tier unlocked by beating this one
    pub fn next(self) -> Option<Self> {
        match self {
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => Some(Difficulty::Insane),
            Difficulty::Insane => None,
        }
    }

    fn index(self) -> usize {
        self as usize - 1
    }
}

/// High scores and unlock flags, indexed by difficulty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionRecord {
    high_scores: [u32; 4],
    unlocked: [bool; 4],
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            high_scores: [0; 4],
            unlocked: [true, false, false, false],
        }
    }
}

impl ProgressionRecord {
    pub fn high_score(&self, difficulty: Difficulty) -> u32 {
        self.high_scores[difficulty.index()]
    }

    pub fn is_unlocked(&self, difficulty: Difficulty) -> bool {
        self.unlocked[difficulty.index()]
    }

    /// Encode as the on-disk JSON layout
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&RecordFile::from(self))?)
    }

    /// Decode the on-disk JSON layout; every field must be present
    pub fn from_json(json: &str) -> Result<Self> {
        let file: RecordFile = serde_json::from_str(json)?;
        Ok(Self::from(file))
    }
}

/// Field-for-field image of the save file
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RecordFile {
    easy_high_score: u32,
    medium_high_score: u32,
    hard_high_score: u32,
    insane_high_score: u32,
    easy_unlocked: bool,
    medium_unlocked: bool,
    hard_unlocked: bool,
    insane_unlocked: bool,
}

impl From<&ProgressionRecord> for RecordFile {
    fn from(r: &ProgressionRecord) -> Self {
        Self {
            easy_high_score: r.high_scores[0],
            medium_high_score: r.high_scores[1],
            hard_high_score: r.high_scores[2],
            insane_high_score: r.high_scores[3],
            easy_unlocked: r.unlocked[0],
            medium_unlocked: r.unlocked[1],
            hard_unlocked: r.unlocked[2],
            insane_unlocked: r.unlocked[3],
        }
    }
}

impl From<RecordFile> for ProgressionRecord {
    fn from(f: RecordFile) -> Self {
        Self {
            high_scores: [
                f.easy_high_score,
                f.medium_high_score,
                f.hard_high_score,
                f.insane_high_score,
            ],
            // Easy is always playable
            unlocked: [true, f.medium_unlocked, f.hard_unlocked, f.insane_unlocked],
        }
    }
}

/// Owner of the progression record and its storage
pub struct ProgressionStore {
    record: ProgressionRecord,
    storage: Box<dyn SaveStorage>,
}

impl std::fmt::Debug for ProgressionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionStore")
            .field("record", &self.record)
            .field("storage", &self.storage.describe())
            .finish()
    }
}

impl ProgressionStore {
    /// Load from storage, falling back to defaults
    ///
    /// Nothing stored: defaults are written out immediately. Unreadable or corrupt record:
    /// logged, defaults are used for this session and the next save replaces the file.
    pub fn load(storage: Box<dyn SaveStorage>) -> Self {
        let mut store = Self {
            record: ProgressionRecord::default(),
            storage,
        };

        match store.read_record() {
            Ok(Some(record)) => {
                log::info!("Loaded progression from {}", store.storage.describe());
                store.record = record;
            }
            Ok(None) => {
                log::info!(
                    "No progression at {}, creating defaults",
                    store.storage.describe()
                );
                if let Err(e) = store.persist() {
                    log::warn!("Could not write default progression: {e}");
                }
            }
            Err(e) => {
                log::warn!(
                    "Progression at {} unusable, using defaults: {e}",
                    store.storage.describe()
                );
            }
        }

        store
    }

    fn read_record(&self) -> Result<Option<ProgressionRecord>> {
        match self.storage.read()? {
            Some(json) => Ok(Some(ProgressionRecord::from_json(&json)?)),
            None => Ok(None),
        }
    }

    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    /// Ratchet the stored high score; returns true if it changed
    pub fn update_high_score(&mut self, difficulty: Difficulty, score: u32) -> bool {
        let slot = &mut self.record.high_scores[difficulty.index()];
        if score > *slot {
            *slot = score;
            true
        } else {
            false
        }
    }

    /// Unlock the tier after `beaten`; beating the top tier changes nothing
    pub fn update_completion(&mut self, beaten: Difficulty) {
        if let Some(next) = beaten.next() {
            let slot = &mut self.record.unlocked[next.index()];
            if !*slot {
                log::info!("{} unlocked", next.as_str());
                *slot = true;
            }
        }
    }

    pub fn is_unlocked(&self, difficulty: Difficulty) -> bool {
        self.record.is_unlocked(difficulty)
    }

    pub fn high_score(&self, difficulty: Difficulty) -> u32 {
        self.record.high_score(difficulty)
    }

    /// Checked lookups for raw level numbers coming from outside the crate
    pub fn is_unlocked_level(&self, level: i64) -> Result<bool> {
        Ok(self.is_unlocked(Difficulty::from_level(level)?))
    }

    pub fn high_score_level(&self, level: i64) -> Result<u32> {
        Ok(self.high_score(Difficulty::from_level(level)?))
    }

    pub fn update_high_score_level(&mut self, level: i64, score: u32) -> Result<bool> {
        Ok(self.update_high_score(Difficulty::from_level(level)?, score))
    }

    pub fn update_completion_level(&mut self, level: i64) -> Result<()> {
        self.update_completion(Difficulty::from_level(level)?);
        Ok(())
    }

    /// Unlocked tiers, lowest first
    pub fn unlocked(&self) -> Vec<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .filter(|d| self.is_unlocked(*d))
            .collect()
    }

    /// Write the whole record to storage
    pub fn persist(&mut self) -> Result<()> {
        let json = self.record.to_json()?;
        self.storage.write(&json)?;
        Ok(())
    }

    /// Back to defaults, persisted immediately
    pub fn reset(&mut self) -> Result<()> {
        self.record = ProgressionRecord::default();
        self.persist()?;
        log::warn!("Progression reset at {}", self.storage.describe());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use proptest::prelude::*;

    fn fresh() -> (ProgressionStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        (ProgressionStore::load(Box::new(storage.clone())), storage)
    }

    #[test]
    fn test_load_absent_writes_defaults() {
        let (store, storage) = fresh();
        assert_eq!(store.record(), &ProgressionRecord::default());
        assert_eq!(storage.write_count(), 1);
        let written = storage.contents().expect("defaults persisted");
        assert!(written.contains("\"easyUnlocked\":true"));
        assert!(written.contains("\"insaneHighScore\":0"));
    }

    #[test]
    fn test_load_corrupt_falls_back() {
        let storage = MemoryStorage::with_contents("{ not json");
        let store = ProgressionStore::load(Box::new(storage.clone()));
        assert_eq!(store.record(), &ProgressionRecord::default());
        // Corrupt file is left alone until the next save
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn test_load_missing_field_falls_back() {
        let storage = MemoryStorage::with_contents(r#"{"easyHighScore":5}"#);
        let store = ProgressionStore::load(Box::new(storage));
        assert_eq!(store.high_score(Difficulty::Easy), 0);
    }

    #[test]
    fn test_persist_then_load_round_trip() {
        let (mut store, storage) = fresh();
        store.update_high_score(Difficulty::Hard, 420);
        store.update_high_score(Difficulty::Easy, 12);
        store.update_completion(Difficulty::Easy);
        store.update_completion(Difficulty::Medium);
        store.persist().expect("persist");

        let reloaded = ProgressionStore::load(Box::new(storage));
        assert_eq!(reloaded.record(), store.record());
    }

    #[test]
    fn test_completion_ratchet_idempotent() {
        let (mut store, _) = fresh();
        store.update_completion(Difficulty::Easy);
        store.update_completion(Difficulty::Easy);
        assert!(store.is_unlocked(Difficulty::Easy));
        assert!(store.is_unlocked(Difficulty::Medium));
        assert!(!store.is_unlocked(Difficulty::Hard));
        assert!(!store.is_unlocked(Difficulty::Insane));
    }

    #[test]
    fn test_completion_top_tier_noop() {
        let (mut store, _) = fresh();
        let before = store.record().clone();
        store.update_completion(Difficulty::Insane);
        assert_eq!(store.record(), &before);
    }

    #[test]
    fn test_invalid_level_is_contract_violation() {
        let (store, _) = fresh();
        for level in [0, 5, -1] {
            let err = store.high_score_level(level).unwrap_err();
            assert!(err.is_contract_violation());
            assert!(store.is_unlocked_level(level).is_err());
        }
        assert_eq!(store.high_score_level(1).expect("valid"), 0);
    }

    #[test]
    fn test_level_updates_reject_out_of_range() {
        let (mut store, _) = fresh();
        let before = store.record().clone();
        for level in [0, 5] {
            let err = store.update_high_score_level(level, 99).unwrap_err();
            assert!(matches!(err, GameError::InvalidDifficulty(l) if l == level));
            assert!(err.is_contract_violation());
            let err = store.update_completion_level(level).unwrap_err();
            assert!(matches!(err, GameError::InvalidDifficulty(l) if l == level));
        }
        assert_eq!(store.record(), &before);

        assert!(store.update_high_score_level(3, 40).expect("valid"));
        assert!(!store.update_high_score_level(3, 10).expect("valid"));
        assert_eq!(store.high_score(Difficulty::Hard), 40);
        store.update_completion_level(1).expect("valid");
        assert!(store.is_unlocked(Difficulty::Medium));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let (mut store, storage) = fresh();
        store.update_high_score(Difficulty::Medium, 90);
        store.update_completion(Difficulty::Hard);
        store.reset().expect("reset");
        assert_eq!(store.record(), &ProgressionRecord::default());
        assert_eq!(storage.write_count(), 2);
        assert_eq!(store.unlocked(), vec![Difficulty::Easy]);
    }

    #[test]
    fn test_easy_forced_unlocked_on_load() {
        let json = r#"{"easyHighScore":1,"mediumHighScore":2,"hardHighScore":3,"insaneHighScore":4,
            "easyUnlocked":false,"mediumUnlocked":true,"hardUnlocked":false,"insaneUnlocked":false}"#;
        let store = ProgressionStore::load(Box::new(MemoryStorage::with_contents(json)));
        assert!(store.is_unlocked(Difficulty::Easy));
        assert!(store.is_unlocked(Difficulty::Medium));
        assert_eq!(store.high_score(Difficulty::Insane), 4);
    }

    proptest! {
        #[test]
        fn prop_high_score_is_max(prev in 0u32..10_000, a in 0u32..10_000, b in 0u32..10_000) {
            let (mut store, _) = fresh();
            store.update_high_score(Difficulty::Medium, prev);
            store.update_high_score(Difficulty::Medium, a);
            store.update_high_score(Difficulty::Medium, b);
            prop_assert_eq!(store.high_score(Difficulty::Medium), prev.max(a).max(b));
            prop_assert_eq!(store.high_score(Difficulty::Easy), 0);
        }
    }
}
