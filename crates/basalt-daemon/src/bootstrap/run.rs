//! Daemon entry: assemble, spawn event sources, run the scheduler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use basalt_app::{LifecycleScheduler, Reconciler, SchedulerTiming};
use basalt_core::ports::AppDirsPort;
use basalt_core::{AppConfig, AppDirs, LifecycleEvent, Settings};
use basalt_platform::{DirsAppDirsAdapter, DisplayWatcher, SettingsFileWatcher, WakeDetector};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::config::{load_config, resolve_config_path};
use super::control::run_control;
use super::wiring::{resolve_paths, wire_dependencies, Wiring};

const EVENT_CHANNEL_CAPACITY: usize = 64;
const SETTINGS_POLL_INTERVAL: Duration = Duration::from_secs(1);
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct DaemonOptions {
    /// Explicit config file; `None` → `<data>/basalt.toml`.
    pub config_path: Option<PathBuf>,
    /// Read control commands from stdin.
    pub control: bool,
}

/// Runs the daemon until `quit`, Ctrl-C, or a fatal bootstrap error.
pub fn run_daemon(options: DaemonOptions) -> anyhow::Result<()> {
    let app_dirs = DirsAppDirsAdapter::new()
        .get_app_dirs()
        .context("Failed to resolve application directories")?;
    let config_path = resolve_config_path(options.config_path.clone(), &app_dirs);
    let config = load_config(&config_path)?;

    let paths = resolve_paths(&config, &app_dirs);
    super::tracing::init_tracing_subscriber(&paths.logs_dir)?;
    info!(config = %config_path.display(), "Basalt starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("basalt-worker")
        .build()
        .context("Failed to build tokio runtime")?;

    let result = runtime.block_on(serve(config, app_dirs, options.control));
    // A pending stdin read would otherwise keep the runtime alive.
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    result
}

async fn serve(config: AppConfig, app_dirs: AppDirs, control: bool) -> anyhow::Result<()> {
    let wiring = wire_dependencies(&config, &app_dirs)?;
    let Wiring {
        engine,
        status,
        clock,
        settings: settings_port,
        state,
        displays,
        monitor,
        paths,
    } = wiring;

    // A surprise pick never outlives the process.
    if let Err(e) = state.clear_override().await {
        warn!(error = %e, "Failed to clear override at startup");
    }

    let settings = match settings_port.load().await {
        Ok(settings) => settings,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "Failed to load settings, using defaults");
            Settings::default()
        }
    };

    monitor.refresh().await;

    let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let shutdown = CancellationToken::new();
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    tasks.push(tokio::spawn(
        monitor.clone().run(events_tx.clone(), shutdown.clone()),
    ));
    tasks.push(tokio::spawn(
        WakeDetector::default().run(events_tx.clone(), shutdown.clone()),
    ));
    tasks.push(tokio::spawn(
        DisplayWatcher::new(
            displays,
            Duration::from_secs(config.displays.poll_interval_secs),
        )
        .run(events_tx.clone(), shutdown.clone()),
    ));
    tasks.push(tokio::spawn(
        SettingsFileWatcher::new(
            paths.settings_path.clone(),
            settings_port,
            SETTINGS_POLL_INTERVAL,
        )
        .run(events_tx.clone(), shutdown.clone()),
    ));

    {
        let shutdown = shutdown.clone();
        tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                result = tokio::signal::ctrl_c() => {
                    match result {
                        Ok(()) => info!("Ctrl-C received"),
                        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C"),
                    }
                    shutdown.cancel();
                }
            }
        }));
    }

    if control {
        let events = events_tx.clone();
        let status = status.clone();
        let shutdown = shutdown.clone();
        // Not joined: the stdin read may block until the runtime is torn down.
        tokio::spawn(async move {
            let stdin = BufReader::new(tokio::io::stdin());
            if let Err(e) = run_control(stdin, tokio::io::stdout(), events, status, shutdown).await
            {
                warn!(error = %format!("{e:#}"), "Control channel stopped");
            }
        });
    }

    if events_tx.send(LifecycleEvent::Startup).await.is_err() {
        anyhow::bail!("Scheduler event channel closed before startup");
    }

    let reconciler: Arc<dyn Reconciler> = engine;
    let scheduler = LifecycleScheduler::new(
        reconciler,
        clock,
        SchedulerTiming::from_config(&config.schedule),
        settings,
        events_tx,
    );
    scheduler.run(events_rx, shutdown.clone()).await;

    shutdown.cancel();
    for task in tasks {
        if let Err(e) = task.await {
            warn!(error = %e, "Background task ended abnormally");
        }
    }

    let last = status.current();
    info!(state = ?last.state, message = %last.message, "Basalt stopped");
    Ok(())
}
