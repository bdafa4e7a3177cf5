//! File-backed collaborator stores: levels by id, best time, preset book.
//!
//! These are the thin persistence wrappers the grid engine treats as
//! external collaborators. Each one reads or writes a single small JSON
//! file and surfaces failures through `anyhow` with context.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use maze_escape_core::layout::LevelData;
use maze_escape_world::Preset;

/// Loads `level-<id>.json` files from a directory.
pub(crate) struct LevelDir {
    root: PathBuf,
}

impl LevelDir {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub(crate) fn load(&self, id: i64) -> Result<LevelData> {
        let path = self.root.join(format!("level-{id}.json"));
        read_level(&path)
    }
}

/// Reads one level file.
pub(crate) fn read_level(path: &Path) -> Result<LevelData> {
    let payload = fs::read_to_string(path)
        .with_context(|| format!("could not read level file {}", path.display()))?;
    serde_json::from_str(&payload)
        .with_context(|| format!("could not parse level file {}", path.display()))
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BestTimeRecord {
    best_seconds: f64,
}

/// Get/set store for the single best simulated time.
pub(crate) struct BestTimeStore {
    path: PathBuf,
}

impl BestTimeStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn get(&self) -> Result<f64> {
        if !self.path.exists() {
            return Ok(0.0);
        }
        let payload = fs::read_to_string(&self.path)
            .with_context(|| format!("could not read {}", self.path.display()))?;
        let record: BestTimeRecord = serde_json::from_str(&payload)
            .with_context(|| format!("could not parse {}", self.path.display()))?;
        Ok(record.best_seconds)
    }

    pub(crate) fn set(&self, best_seconds: f64) -> Result<()> {
        let payload = serde_json::to_string_pretty(&BestTimeRecord { best_seconds })
            .context("could not serialize the best time")?;
        fs::write(&self.path, payload)
            .with_context(|| format!("could not write {}", self.path.display()))
    }
}

/// Named-preset collection persisted as one JSON file.
pub(crate) struct PresetBook {
    path: PathBuf,
}

impl PresetBook {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn load(&self) -> Result<Vec<Preset>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let payload = fs::read_to_string(&self.path)
            .with_context(|| format!("could not read preset book {}", self.path.display()))?;
        serde_json::from_str(&payload)
            .with_context(|| format!("could not parse preset book {}", self.path.display()))
    }

    pub(crate) fn save(&self, presets: &[Preset]) -> Result<()> {
        let payload =
            serde_json::to_string_pretty(presets).context("could not serialize presets")?;
        fs::write(&self.path, payload)
            .with_context(|| format!("could not write preset book {}", self.path.display()))
    }

    pub(crate) fn find(&self, name: &str) -> Result<Preset> {
        let presets = self.load()?;
        match presets.into_iter().find(|preset| preset.name == name) {
            Some(preset) => Ok(preset),
            None => bail!("no preset named '{name}' in {}", self.path.display()),
        }
    }
}
