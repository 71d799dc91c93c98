//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store. Nothing
//! in this crate reads environment variables during request handling; the binaries read them
//! and hand the raw values to the `*_from_env_value` helpers below.

use crate::constants::DEFAULT_DATA_DIR;
use crate::seed::SeedData;
use crate::storage::JsonDirStore;
use crate::{EntityStore, StoreError, StoreResult};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// What a collection falls back to when its storage key is absent or malformed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedMode {
    /// The bundled demo roster, appointments, posts and notifications.
    #[default]
    Demo,
    /// Empty collections and no slot templates.
    Empty,
}

impl SeedMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            SeedMode::Demo => "demo",
            SeedMode::Empty => "empty",
        }
    }

    pub fn seed_data(self) -> StoreResult<SeedData> {
        match self {
            SeedMode::Demo => SeedData::demo(),
            SeedMode::Empty => Ok(SeedData::empty()),
        }
    }
}

impl fmt::Display for SeedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedMode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SeedMode::Demo),
            "empty" => Ok(SeedMode::Empty),
            other => Err(StoreError::InvalidInput(format!(
                "seed mode must be 'demo' or 'empty', got '{}'",
                other
            ))),
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    data_dir: PathBuf,
    seed_mode: SeedMode,
}

impl CoreConfig {
    pub fn new(data_dir: PathBuf, seed_mode: SeedMode) -> StoreResult<Self> {
        if data_dir.as_os_str().is_empty() {
            return Err(StoreError::InvalidInput("data_dir cannot be empty".into()));
        }

        Ok(Self {
            data_dir,
            seed_mode,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn seed_mode(&self) -> SeedMode {
        self.seed_mode
    }

    /// Opens a file-backed [`EntityStore`] in the configured data directory, creating the
    /// directory if needed.
    pub fn open_store(&self) -> StoreResult<EntityStore> {
        let kv = JsonDirStore::new(&self.data_dir)?;
        tracing::info!(
            data_dir = %self.data_dir.display(),
            seed = %self.seed_mode,
            "opening entity store"
        );
        EntityStore::open(Arc::new(kv), self.seed_mode.seed_data()?)
    }
}

/// Resolve the data directory from an optional override.
///
/// Blank or missing values fall back to [`DEFAULT_DATA_DIR`] relative to the working directory.
pub fn resolve_data_dir(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

/// Parse the seed mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`SeedMode::Demo`].
pub fn seed_mode_from_env_value(value: Option<String>) -> StoreResult<SeedMode> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<SeedMode>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}
