//! Durable storage for the progression record
//!
//! The store only needs a read/write contract over a small text blob:
//! - `read` returns `None` when nothing has been saved yet
//! - `write` replaces the whole record

use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Directory (under the per-user data dir) holding the save file
pub const SAVE_DIRECTORY: &str = "PlayerSaveData";
/// Save file name
pub const SAVE_FILE: &str = "FarmRunnerPlayerData.save";

pub trait SaveStorage {
    /// Read the stored record, `Ok(None)` if none exists
    fn read(&self) -> io::Result<Option<String>>;
    /// Replace the stored record
    fn write(&mut self, data: &str) -> io::Result<()>;
    /// Where the record lives, for log messages
    fn describe(&self) -> String;
}

/// Plain file on disk
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Save file under the per-user persistent data directory
    ///
    /// Uses `$XDG_DATA_HOME`, then `$HOME/.local/share`, then the working directory.
    pub fn default_location() -> Self {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share"))
            })
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join("farm-runner").join(SAVE_DIRECTORY).join(SAVE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SaveStorage for FileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        // Write to a sibling then rename so a crash never leaves half a record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory storage; clones share the same slot so tests can inspect what was written
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    writes: Rc<RefCell<u32>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds `data`
    pub fn with_contents(data: &str) -> Self {
        let storage = Self::new();
        *storage.slot.borrow_mut() = Some(data.to_string());
        storage
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> u32 {
        *self.writes.borrow()
    }
}

impl SaveStorage for MemoryStorage {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }

    fn write(&mut self, data: &str) -> io::Result<()> {
        *self.slot.borrow_mut() = Some(data.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
