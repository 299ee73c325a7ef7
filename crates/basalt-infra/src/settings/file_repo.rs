use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use basalt_core::ports::SettingsPort;
use basalt_core::settings::model::{Settings, CURRENT_SCHEMA_VERSION};
use tokio::fs;
use tracing::info;

use crate::fs::atomic_write;

/// `settings.json` on disk. A missing file reads as [`Settings::default`].
pub struct FileSettingsRepository {
    path: PathBuf,
}

impl FileSettingsRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsPort for FileSettingsRepository {
    /// Loads settings, upgrading and re-saving documents from older schema versions.
    async fn load(&self) -> Result<Settings> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Settings::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read settings failed: {}", self.path.display()))
            }
        };

        let mut settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("parse settings failed: {}", self.path.display()))?;

        if settings.schema_version < CURRENT_SCHEMA_VERSION {
            info!(
                from = settings.schema_version,
                to = CURRENT_SCHEMA_VERSION,
                "Upgrading settings schema"
            );
            settings.schema_version = CURRENT_SCHEMA_VERSION;
            self.save(&settings).await?;
        }

        Ok(settings)
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        let content =
            serde_json::to_string_pretty(settings).context("serialize settings failed")?;

        atomic_write(&self.path, content.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basalt_core::Channel;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new(dir.path().join("settings.json"));

        let settings = repo.load().await.unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[tokio::test]
    async fn saved_settings_are_loaded_back() {
        let dir = TempDir::new().unwrap();
        let repo = FileSettingsRepository::new(dir.path().join("nested").join("settings.json"));
        let mut settings = Settings::default();
        settings.toggle_channel(Channel::Ai);
        settings.same_wallpaper_on_all_displays = false;

        repo.save(&settings).await.unwrap();

        assert_eq!(repo.load().await.unwrap(), settings);
    }

    #[tokio::test]
    async fn old_schema_is_upgraded_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"schema_version": 0, "fit_vertical_displays": false}"#).unwrap();
        let repo = FileSettingsRepository::new(&path);

        let settings = repo.load().await.unwrap();

        assert_eq!(settings.schema_version, CURRENT_SCHEMA_VERSION);
        assert!(!settings.fit_vertical_displays);
        let on_disk: Settings = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk.schema_version, CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FileSettingsRepository::new(&path).load().await;

        assert!(result.is_err());
    }
}
