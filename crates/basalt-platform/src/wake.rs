//! Detects system sleep/wake.
//!
//! The monotonic clock stops while the machine is suspended but the wall
//! clock does not, so a tick whose wall-clock gap exceeds its monotonic gap by
//! more than the threshold means the system just woke up.

use std::time::{Duration, Instant, SystemTime};

use basalt_core::LifecycleEvent;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct WakeDetector {
    tick: Duration,
    threshold: Duration,
}

impl WakeDetector {
    pub fn new(tick: Duration, threshold: Duration) -> Self {
        Self { tick, threshold }
    }

    pub async fn run(self, events: mpsc::Sender<LifecycleEvent>, shutdown: CancellationToken) {
        let mut last_wall = SystemTime::now();
        let mut last_mono = Instant::now();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.tick) => {
                    let wall = SystemTime::now();
                    let mono = Instant::now();
                    let wall_elapsed = wall.duration_since(last_wall).unwrap_or_default();
                    let mono_elapsed = mono.duration_since(last_mono);
                    last_wall = wall;
                    last_mono = mono;

                    if is_wake(wall_elapsed, mono_elapsed, self.threshold) {
                        info!(
                            slept_secs = (wall_elapsed - mono_elapsed).as_secs(),
                            "System wake detected"
                        );
                        if events.send(LifecycleEvent::Wake).await.is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }
}

impl Default for WakeDetector {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), Duration::from_secs(30))
    }
}

pub fn is_wake(wall_elapsed: Duration, mono_elapsed: Duration, threshold: Duration) -> bool {
    wall_elapsed.saturating_sub(mono_elapsed) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_wall_clock_gap_is_a_wake() {
        let threshold = Duration::from_secs(30);
        assert!(is_wake(
            Duration::from_secs(3600),
            Duration::from_secs(5),
            threshold
        ));
        assert!(!is_wake(
            Duration::from_secs(6),
            Duration::from_secs(5),
            threshold
        ));
    }

    #[test]
    fn wall_clock_going_backwards_is_not_a_wake() {
        assert!(!is_wake(
            Duration::ZERO,
            Duration::from_secs(5),
            Duration::from_secs(30)
        ));
    }
}
