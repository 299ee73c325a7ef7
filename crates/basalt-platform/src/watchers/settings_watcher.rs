use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use basalt_core::ports::SettingsPort;
use basalt_core::LifecycleEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

type FileStamp = Option<(SystemTime, u64)>;

/// Reloads settings whenever the settings file changes on disk and publishes
/// them as `SettingsChanged`. A file that fails to parse is reported and
/// skipped, so the previous settings stay in effect.
pub struct SettingsFileWatcher {
    path: PathBuf,
    settings: Arc<dyn SettingsPort>,
    interval: Duration,
}

impl SettingsFileWatcher {
    pub fn new(path: PathBuf, settings: Arc<dyn SettingsPort>, interval: Duration) -> Self {
        Self {
            path,
            settings,
            interval,
        }
    }

    async fn stamp(&self) -> FileStamp {
        let meta = tokio::fs::metadata(&self.path).await.ok()?;
        Some((meta.modified().ok()?, meta.len()))
    }

    pub async fn run(self, events: mpsc::Sender<LifecycleEvent>, shutdown: CancellationToken) {
        let mut last = self.stamp().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    let current = self.stamp().await;
                    if current == last {
                        continue;
                    }
                    last = current;

                    match self.settings.load().await {
                        Ok(settings) => {
                            info!(path = %self.path.display(), "Settings file changed");
                            if events.send(LifecycleEvent::SettingsChanged(settings)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %format!("{e:#}"), "Ignoring unreadable settings file");
                        }
                    }
                }
            }
        }
    }
}
