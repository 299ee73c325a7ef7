//! # Dependency Injection
//!
//! The only place that depends on `basalt-infra`, `basalt-platform` and
//! `basalt-app` at once. Builds adapters from [`AppConfig`] and injects them
//! into the engine. Assembly only, no decisions.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use basalt_app::{ReconcileDeps, ReconciliationEngine, StatusBoard};
use basalt_core::ports::{ClockPort, DailyStatePort, DisplayPort, SettingsPort};
use basalt_core::{AppConfig, AppDirs};
use basalt_infra::{
    FileDailyStateStore, FileSettingsRepository, FsArtifactCache, HttpManifestClient, SystemClock,
};
use basalt_platform::{SwwwDisplayAdapter, TcpConnectivityMonitor};

const CHECK_TIMEOUT: Duration = Duration::from_secs(3);

pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection.
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Storage initialization failed: {0}")]
    StorageInit(String),

    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(String),

    #[error("Unsupported display backend: {0}")]
    UnsupportedBackend(String),
}

/// Filesystem locations after config overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub state_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub settings_path: PathBuf,
    pub logs_dir: PathBuf,
}

pub fn resolve_paths(config: &AppConfig, app_dirs: &AppDirs) -> ResolvedPaths {
    let data_dirs = match &config.storage.data_dir {
        Some(data_dir) => AppDirs {
            app_data_root: data_dir.clone(),
            app_cache_root: app_dirs.app_cache_root.clone(),
        },
        None => app_dirs.clone(),
    };

    ResolvedPaths {
        state_dir: data_dirs.state_dir(),
        cache_dir: config
            .storage
            .cache_dir
            .clone()
            .unwrap_or_else(|| data_dirs.wallpaper_cache_dir()),
        settings_path: config
            .storage
            .settings_path
            .clone()
            .unwrap_or_else(|| data_dirs.settings_path()),
        logs_dir: data_dirs.logs_dir(),
    }
}

/// Everything the run loop needs after assembly.
pub struct Wiring {
    pub engine: Arc<ReconciliationEngine>,
    pub status: StatusBoard,
    pub clock: Arc<dyn ClockPort>,
    pub settings: Arc<dyn SettingsPort>,
    pub state: Arc<dyn DailyStatePort>,
    pub displays: Arc<dyn DisplayPort>,
    pub monitor: Arc<TcpConnectivityMonitor>,
    pub paths: ResolvedPaths,
}

/// Build all adapters and the reconciliation engine.
///
/// # Errors
///
/// - [`WiringError::StorageInit`] when the state or cache directory cannot be created
/// - [`WiringError::HttpClientInit`] when an HTTP client fails to build
/// - [`WiringError::UnsupportedBackend`] for any display backend other than `swww`
pub fn wire_dependencies(config: &AppConfig, app_dirs: &AppDirs) -> WiringResult<Wiring> {
    let paths = resolve_paths(config, app_dirs);

    for dir in [&paths.state_dir, &paths.cache_dir] {
        std::fs::create_dir_all(dir).map_err(|e| {
            WiringError::StorageInit(format!("Failed to create {}: {}", dir.display(), e))
        })?;
    }

    let displays: Arc<dyn DisplayPort> = match config.displays.backend.as_str() {
        "swww" => Arc::new(SwwwDisplayAdapter::new(config.displays.swww_path.clone())),
        other => return Err(WiringError::UnsupportedBackend(other.to_string())),
    };

    let timeout = Duration::from_secs(config.service.request_timeout_secs);
    let manifest = HttpManifestClient::new(
        config.service.manifest_url.clone(),
        config.service.random_url.clone(),
        timeout,
    )
    .map_err(|e| WiringError::HttpClientInit(format!("{e:#}")))?;
    let cache = FsArtifactCache::new(paths.cache_dir.clone(), timeout)
        .map_err(|e| WiringError::HttpClientInit(format!("{e:#}")))?;

    let state: Arc<dyn DailyStatePort> = Arc::new(FileDailyStateStore::new(paths.state_dir.clone()));
    let settings: Arc<dyn SettingsPort> =
        Arc::new(FileSettingsRepository::new(paths.settings_path.clone()));
    let monitor = Arc::new(TcpConnectivityMonitor::new(
        &config.connectivity.check_host,
        config.connectivity.check_port,
        CHECK_TIMEOUT,
        Duration::from_secs(config.connectivity.check_interval_secs),
    ));

    let status = StatusBoard::new();
    let deps = ReconcileDeps {
        manifest: Arc::new(manifest),
        cache: Arc::new(cache),
        state: state.clone(),
        displays: displays.clone(),
        connectivity: monitor.clone(),
    };
    let engine = Arc::new(ReconciliationEngine::new(deps, status.clone()));

    Ok(Wiring {
        engine,
        status,
        clock: Arc::new(SystemClock),
        settings,
        state,
        displays,
        monitor,
        paths,
    })
}
