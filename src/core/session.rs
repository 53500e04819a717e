//! Per-run bookkeeping: the clock, the shared random source, and the
//! persisted session counter.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

use super::events::RunResult;
use crate::world::DataLoadError;

pub const SESSION_COUNT_PATH: &str = "save/session_count.txt";

/// Random source for every simulation draw.
#[derive(Resource)]
pub struct GameRng(pub StdRng);

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Fixed seed for the next run. `None` seeds from entropy.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct SessionSeed(pub Option<u64>);

/// Elapsed time and score for the current run.
#[derive(Resource, Default, Debug, Clone)]
pub struct RunClock {
    pub elapsed: f32,
    pub kills: u32,
    /// Time since the last spawn-rate ramp.
    pub difficulty_timer: f32,
}

impl RunClock {
    pub fn score(&self) -> u32 {
        self.kills * 100
    }

    pub fn result(&self) -> RunResult {
        RunResult {
            score: self.score(),
            time: self.elapsed,
            enemies_killed: self.kills,
        }
    }
}

/// How many runs have been started on this machine.
#[derive(Resource, Debug, Clone)]
pub struct SessionCounter {
    pub count: u32,
    /// Where the count is stored; `None` keeps it in memory only.
    pub path: Option<PathBuf>,
}

impl Default for SessionCounter {
    fn default() -> Self {
        Self {
            count: 0,
            path: Some(PathBuf::from(SESSION_COUNT_PATH)),
        }
    }
}

impl SessionCounter {
    pub fn in_memory() -> Self {
        Self { count: 0, path: None }
    }
}

/// Read the stored count. The file holds a bare integer.
pub fn read_session_count(path: &Path) -> Result<u32, DataLoadError> {
    let display = path.display().to_string();
    if !path.exists() {
        return Err(DataLoadError::FileNotFound(display));
    }
    let contents = fs::read_to_string(path).map_err(|e| DataLoadError::ReadError {
        path: display.clone(),
        details: e.to_string(),
    })?;
    contents.trim().parse().map_err(|e: std::num::ParseIntError| DataLoadError::ParseError {
        path: display,
        details: e.to_string(),
    })
}

pub fn write_session_count(path: &Path, count: u32) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, count.to_string())
}

/// Load the stored count (missing or corrupt means zero), bump it, and save.
pub fn record_session(mut counter: ResMut<SessionCounter>) {
    let Some(path) = counter.path.clone() else {
        counter.count += 1;
        return;
    };

    let stored = match read_session_count(&path) {
        Ok(count) => count,
        Err(DataLoadError::FileNotFound(_)) => 0,
        Err(e) => {
            warn!("{}; resetting session count", e);
            0
        }
    };
    counter.count = stored.max(counter.count) + 1;

    if let Err(e) = write_session_count(&path, counter.count) {
        warn!("Could not save session count to {:?}: {}", path, e);
    }
    info!("Session #{}", counter.count);
}
