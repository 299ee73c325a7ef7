use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use basalt_app::{LifecycleScheduler, Reconciler, SchedulerTiming};
use basalt_core::ports::ClockPort;
use basalt_core::{Channel, LifecycleEvent, ReconcileOutcome, Settings};
use chrono::NaiveDate;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Reconcile(Settings),
    Surprise,
    Reset,
}

#[derive(Default)]
struct RecordingReconciler {
    calls: Mutex<Vec<Call>>,
    cancels: AtomicUsize,
    offline: AtomicUsize,
}

impl RecordingReconciler {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reconciler for RecordingReconciler {
    async fn reconcile(&self, _today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Reconcile(settings.clone()));
        ReconcileOutcome::NoWallpapers
    }

    async fn surprise(&self, _today: NaiveDate, _settings: &Settings) -> ReconcileOutcome {
        self.calls.lock().unwrap().push(Call::Surprise);
        ReconcileOutcome::NoWallpapers
    }

    async fn reset_to_daily(&self, _today: NaiveDate, _settings: &Settings) -> ReconcileOutcome {
        self.calls.lock().unwrap().push(Call::Reset);
        ReconcileOutcome::NoWallpapers
    }

    fn mark_offline(&self) {
        self.offline.fetch_add(1, Ordering::SeqCst);
    }

    fn cancel_in_flight(&self) {
        self.cancels.fetch_add(1, Ordering::SeqCst);
    }
}

struct FixedClock;

impl ClockPort for FixedClock {
    fn now_ms(&self) -> i64 {
        0
    }

    fn today(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }
}

struct Running {
    reconciler: Arc<RecordingReconciler>,
    tx: mpsc::Sender<LifecycleEvent>,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

fn start(timing: SchedulerTiming) -> Running {
    let reconciler = Arc::new(RecordingReconciler::default());
    let (tx, rx) = mpsc::channel(32);
    let scheduler = LifecycleScheduler::new(
        reconciler.clone(),
        Arc::new(FixedClock),
        timing,
        Settings::default(),
        tx.clone(),
    );
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(scheduler.run(rx, shutdown.clone()));
    Running {
        reconciler,
        tx,
        shutdown,
        handle,
    }
}

fn ai_only() -> Settings {
    let mut settings = Settings::default();
    settings.toggle_channel(Channel::Human);
    settings
}

#[tokio::test(start_paused = true)]
async fn two_triggers_within_debounce_run_once_with_latest_settings() {
    let running = start(SchedulerTiming::default());

    running
        .tx
        .send(LifecycleEvent::SettingsChanged(Settings::default()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    running
        .tx
        .send(LifecycleEvent::SettingsChanged(ai_only()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;

    assert_eq!(running.reconciler.calls(), vec![Call::Reconcile(ai_only())]);
    assert!(running.reconciler.cancels.load(Ordering::SeqCst) >= 2);
}

#[tokio::test(start_paused = true)]
async fn nothing_runs_before_the_window_elapses() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::Startup).await.unwrap();
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(running.reconciler.calls().is_empty());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(running.reconciler.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn display_changes_use_the_longer_window() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::DisplaysChanged).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(running.reconciler.calls().is_empty());

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(running.reconciler.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn wake_schedules_three_independent_retries() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::Wake).await.unwrap();

    tokio::time::sleep(Duration::from_millis(5600)).await;
    assert_eq!(running.reconciler.calls().len(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(running.reconciler.calls().len(), 2);

    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(running.reconciler.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn connectivity_loss_marks_offline_without_reconciling() {
    let running = start(SchedulerTiming::default());

    running
        .tx
        .send(LifecycleEvent::ConnectivityChanged { connected: false })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(running.reconciler.offline.load(Ordering::SeqCst), 1);
    assert!(running.reconciler.calls().is_empty());

    running
        .tx
        .send(LifecycleEvent::ConnectivityChanged { connected: true })
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(running.reconciler.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn surprise_runs_immediately_and_drops_pending_trigger() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::Startup).await.unwrap();
    running.tx.send(LifecycleEvent::Surprise).await.unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(running.reconciler.calls(), vec![Call::Surprise]);

    running.tx.send(LifecycleEvent::Refresh).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(running.reconciler.calls(), vec![Call::Surprise, Call::Reset]);
}

#[tokio::test(start_paused = true)]
async fn shutdown_event_stops_the_loop() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::Startup).await.unwrap();
    running.tx.send(LifecycleEvent::Shutdown).await.unwrap();

    running.handle.await.unwrap();
    assert!(running.reconciler.calls().is_empty());
    drop(running.shutdown);
}

#[tokio::test(start_paused = true)]
async fn cancelling_the_token_stops_pending_wake_retries() {
    let running = start(SchedulerTiming::default());

    running.tx.send(LifecycleEvent::Wake).await.unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    running.shutdown.cancel();
    running.handle.await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(running.reconciler.calls().is_empty());
}
