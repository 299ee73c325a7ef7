use std::sync::Arc;
use std::time::Duration;

use basalt_core::display::layout_fingerprint;
use basalt_core::ports::DisplayPort;
use basalt_core::LifecycleEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Emits `DisplaysChanged` whenever the enumerated layout changes.
pub struct DisplayWatcher {
    displays: Arc<dyn DisplayPort>,
    interval: Duration,
}

impl DisplayWatcher {
    pub fn new(displays: Arc<dyn DisplayPort>, interval: Duration) -> Self {
        Self { displays, interval }
    }

    pub async fn run(self, events: mpsc::Sender<LifecycleEvent>, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut last: Option<String> = None;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let fingerprint = match self.displays.enumerate().await {
                        Ok(displays) => layout_fingerprint(&displays),
                        Err(e) => {
                            debug!(error = %e, "Display poll failed");
                            continue;
                        }
                    };
                    if last.as_deref() == Some(fingerprint.as_str()) {
                        continue;
                    }
                    let first_reading = last.is_none();
                    last = Some(fingerprint);
                    if first_reading {
                        continue;
                    }
                    info!("Display layout changed");
                    if events.send(LifecycleEvent::DisplaysChanged).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use basalt_core::ports::DisplayError;
    use basalt_core::{DisplayId, DisplayTarget};
    use std::path::Path;
    use std::sync::Mutex;

    struct ScriptedDisplays {
        layouts: Mutex<Vec<Vec<DisplayTarget>>>,
    }

    #[async_trait]
    impl DisplayPort for ScriptedDisplays {
        async fn enumerate(&self) -> Result<Vec<DisplayTarget>, DisplayError> {
            let mut layouts = self.layouts.lock().unwrap();
            if layouts.len() > 1 {
                Ok(layouts.remove(0))
            } else {
                Ok(layouts[0].clone())
            }
        }

        async fn set_wallpaper(&self, _: &DisplayTarget, _: &Path) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    fn target(name: &str, width: u32) -> DisplayTarget {
        DisplayTarget {
            id: DisplayId::new(name, 0),
            name: name.to_string(),
            width,
            height: 1080,
            scale_factor: 1.0,
            x: 0,
            y: 0,
            primary: true,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_on_layout_change() {
        let displays = Arc::new(ScriptedDisplays {
            layouts: Mutex::new(vec![
                vec![target("eDP-1", 1920)],
                vec![target("eDP-1", 1920)],
                vec![target("eDP-1", 2560)],
            ]),
        });
        let (tx, mut rx) = mpsc::channel(8);
        let shutdown = CancellationToken::new();
        let task = tokio::spawn(
            DisplayWatcher::new(displays, Duration::from_secs(2)).run(tx, shutdown.clone()),
        );

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(rx.try_recv().unwrap(), LifecycleEvent::DisplaysChanged);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());

        shutdown.cancel();
        task.await.unwrap();
    }
}
