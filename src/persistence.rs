//! High-score persistence
//!
//! The high score lives in a plain text file holding a single non-negative
//! integer. Every I/O problem is a soft failure: loading falls back to 0 and
//! a failed save is logged, so a broken file never stops the game.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default file name, relative to the working directory
pub const DEFAULT_HIGH_SCORE_FILE: &str = "high_score.txt";

/// Reads and writes the persisted high score
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored high score; missing or malformed files read as 0
    pub fn load(&self) -> u32 {
        match self.try_load() {
            Ok(Some(score)) => {
                debug!(score, path = ?self.path, "loaded high score");
                score
            }
            Ok(None) => 0,
            Err(err) => {
                warn!(path = ?self.path, "ignoring high score file: {err:#}");
                0
            }
        }
    }

    fn try_load(&self) -> Result<Option<u32>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        let score = contents
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Malformed high score {:?}", contents.trim()))?;

        Ok(Some(score))
    }

    /// Write `score` to the file. Returns false if it could not be saved.
    pub fn save(&self, score: u32) -> bool {
        match self.try_save(score) {
            Ok(()) => {
                info!(score, path = ?self.path, "saved high score");
                true
            }
            Err(err) => {
                warn!(score, "could not save high score: {err:#}");
                false
            }
        }
    }

    fn try_save(&self, score: u32) -> Result<()> {
        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        std::fs::write(&self.path, score.to_string())
            .with_context(|| format!("Failed to write high score to {:?}", self.path))
    }
}

impl Default for HighScoreStore {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_SCORE_FILE)
    }
}
