//! Daily state persisted as two small JSON documents:
//! `daily_state.json` for the automated pick and `override.json` for a
//! "surprise me" choice. Both are replaced wholesale on every write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use basalt_core::ports::{DailyStatePort, StateStoreError};
use basalt_core::{DailyAssignment, OverrideAssignment, WallpaperRecord};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::fs::atomic_write;

pub const STATE_SCHEMA_VERSION: u32 = 1;

const DAILY_FILE: &str = "daily_state.json";
const OVERRIDE_FILE: &str = "override.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredDaily {
    schema_version: u32,
    assignment: DailyAssignment,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredOverride {
    schema_version: u32,
    #[serde(rename = "override")]
    assignment: OverrideAssignment,
}

pub struct FileDailyStateStore {
    dir: PathBuf,
}

impl FileDailyStateStore {
    /// `dir` is the state directory, usually `<data>/state`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn daily_path(&self) -> PathBuf {
        self.dir.join(DAILY_FILE)
    }

    fn override_path(&self) -> PathBuf {
        self.dir.join(OVERRIDE_FILE)
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StateStoreError> {
        let content = serde_json::to_vec_pretty(value)
            .map_err(|e| StateStoreError::Serialize(e.to_string()))?;
        atomic_write(path, &content)
            .await
            .map_err(|e| StateStoreError::Io(format!("{e:#}")))
    }
}

/// Reads a JSON document. Missing files and malformed content both read as
/// `None`; only real I/O failures are errors.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StateStoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StateStoreError::Io(format!("read {}: {e}", path.display()))),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Discarding malformed state document");
            Ok(None)
        }
    }
}

#[async_trait]
impl DailyStatePort for FileDailyStateStore {
    async fn load_override(
        &self,
        today: NaiveDate,
    ) -> Result<Option<OverrideAssignment>, StateStoreError> {
        let stored: Option<StoredOverride> = read_json(&self.override_path()).await?;
        Ok(stored.map(|s| s.assignment).filter(|o| {
            let current = o.is_for(today);
            if !current {
                debug!(day = %o.day, "Ignoring override from another day");
            }
            current
        }))
    }

    async fn load_daily(
        &self,
        today: NaiveDate,
    ) -> Result<Option<DailyAssignment>, StateStoreError> {
        let stored: Option<StoredDaily> = read_json(&self.daily_path()).await?;
        Ok(stored.map(|s| s.assignment).filter(|a| a.day == today))
    }

    async fn save(&self, assignment: &DailyAssignment) -> Result<(), StateStoreError> {
        let stored = StoredDaily {
            schema_version: STATE_SCHEMA_VERSION,
            assignment: assignment.clone(),
        };
        self.write_json(&self.daily_path(), &stored).await
    }

    async fn save_override(
        &self,
        record: &WallpaperRecord,
        today: NaiveDate,
    ) -> Result<(), StateStoreError> {
        let stored = StoredOverride {
            schema_version: STATE_SCHEMA_VERSION,
            assignment: OverrideAssignment::new(today, record.clone()),
        };
        self.write_json(&self.override_path(), &stored).await
    }

    async fn clear_override(&self) -> Result<(), StateStoreError> {
        let path = self.override_path();
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateStoreError::Io(format!("remove {}: {e}", path.display()))),
        }
    }
}
