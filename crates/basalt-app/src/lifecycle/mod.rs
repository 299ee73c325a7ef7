//! Lifecycle scheduler.
//!
//! Turns [`LifecycleEvent`]s into reconciliations. Every trigger cancels the
//! in-flight run and re-arms a coalescing timer, so a burst of events results
//! in exactly one reconciliation with the latest settings.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use basalt_core::config::ScheduleConfig;
use basalt_core::ports::ClockPort;
use basalt_core::{LifecycleEvent, ReconcileOutcome, Settings};
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

/// What the scheduler drives. Implemented by
/// [`ReconciliationEngine`](crate::ReconciliationEngine).
#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn reconcile(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome;
    async fn surprise(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome;
    async fn reset_to_daily(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome;
    fn mark_offline(&self);
    fn cancel_in_flight(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerTiming {
    pub debounce: Duration,
    pub display_debounce: Duration,
    pub wake_retries: Vec<Duration>,
}

impl SchedulerTiming {
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            display_debounce: Duration::from_millis(config.display_debounce_ms),
            wake_retries: config
                .wake_retry_secs
                .iter()
                .map(|secs| Duration::from_secs(*secs))
                .collect(),
        }
    }
}

impl Default for SchedulerTiming {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            display_debounce: Duration::from_secs(2),
            wake_retries: vec![
                Duration::from_secs(5),
                Duration::from_secs(15),
                Duration::from_secs(30),
            ],
        }
    }
}

pub struct LifecycleScheduler {
    reconciler: Arc<dyn Reconciler>,
    clock: Arc<dyn ClockPort>,
    timing: SchedulerTiming,
    settings: Settings,
    events_tx: mpsc::Sender<LifecycleEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl LifecycleScheduler {
    /// `events_tx` must feed the receiver later passed to [`LifecycleScheduler::run`];
    /// wake retries are delivered through it.
    pub fn new(
        reconciler: Arc<dyn Reconciler>,
        clock: Arc<dyn ClockPort>,
        timing: SchedulerTiming,
        settings: Settings,
        events_tx: mpsc::Sender<LifecycleEvent>,
    ) -> Self {
        Self {
            reconciler,
            clock,
            timing,
            settings,
            events_tx,
            in_flight: None,
        }
    }

    /// Consumes events until `Shutdown`, channel close or `shutdown` cancellation.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<LifecycleEvent>,
        shutdown: CancellationToken,
    ) {
        let mut deadline: Option<Instant> = None;

        loop {
            let next = deadline;
            let timer = async move {
                match next {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = timer => {
                    deadline = None;
                    self.fire();
                }
                maybe_event = events.recv() => {
                    let Some(event) = maybe_event else {
                        debug!("Event channel closed");
                        break;
                    };
                    if !self.handle(event, &mut deadline, &shutdown) {
                        break;
                    }
                }
            }
        }

        self.reconciler.cancel_in_flight();
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }

    /// Returns `false` when the loop should stop.
    fn handle(
        &mut self,
        event: LifecycleEvent,
        deadline: &mut Option<Instant>,
        shutdown: &CancellationToken,
    ) -> bool {
        debug!(event = event.name(), "Lifecycle event");
        match event {
            LifecycleEvent::Startup | LifecycleEvent::WakeRetry { .. } => {
                self.trigger(self.timing.debounce, deadline);
            }
            LifecycleEvent::SettingsChanged(settings) => {
                self.settings = settings;
                self.trigger(self.timing.debounce, deadline);
            }
            LifecycleEvent::ConnectivityChanged { connected: false } => {
                self.reconciler.mark_offline();
            }
            LifecycleEvent::ConnectivityChanged { connected: true } => {
                self.trigger(self.timing.debounce, deadline);
            }
            LifecycleEvent::DisplaysChanged => {
                self.trigger(self.timing.display_debounce, deadline);
            }
            LifecycleEvent::Wake => {
                self.schedule_wake_retries(shutdown);
            }
            LifecycleEvent::Surprise => {
                *deadline = None;
                self.spawn_action(Action::Surprise);
            }
            LifecycleEvent::ResetToDaily | LifecycleEvent::Refresh => {
                *deadline = None;
                self.spawn_action(Action::ResetToDaily);
            }
            LifecycleEvent::Shutdown => return false,
        }
        true
    }

    fn trigger(&mut self, window: Duration, deadline: &mut Option<Instant>) {
        self.reconciler.cancel_in_flight();
        *deadline = Some(Instant::now() + window);
    }

    fn fire(&mut self) {
        self.spawn_action(Action::Reconcile);
    }

    fn spawn_action(&mut self, action: Action) {
        let reconciler = self.reconciler.clone();
        let settings = self.settings.clone();
        let today = self.clock.today();
        let span = info_span!("scheduler.run_action", action = ?action, today = %today);

        let handle = tokio::spawn(
            async move {
                let outcome = match action {
                    Action::Reconcile => reconciler.reconcile(today, &settings).await,
                    Action::Surprise => reconciler.surprise(today, &settings).await,
                    Action::ResetToDaily => reconciler.reset_to_daily(today, &settings).await,
                };
                debug!(outcome = %outcome.message(), "Action finished");
            }
            .instrument(span),
        );
        self.in_flight = Some(handle);
    }

    fn schedule_wake_retries(&self, shutdown: &CancellationToken) {
        info!(retries = self.timing.wake_retries.len(), "System woke, scheduling retries");
        for (index, delay) in self.timing.wake_retries.iter().enumerate() {
            let tx = self.events_tx.clone();
            let shutdown = shutdown.clone();
            let delay = *delay;
            let attempt = index as u32 + 1;
            tokio::spawn(async move {
                tokio::select! {
                    _ = shutdown.cancelled() => {}
                    _ = tokio::time::sleep(delay) => {
                        let _ = tx.send(LifecycleEvent::WakeRetry { attempt }).await;
                    }
                }
            });
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Reconcile,
    Surprise,
    ResetToDaily,
}
