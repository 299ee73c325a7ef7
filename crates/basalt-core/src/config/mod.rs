//! # Configuration DTO
//!
//! ## Responsibilities
//!
//! - Define the daemon configuration data structures
//! - Provide the TOML → DTO mapping
//!
//! Missing keys keep the value from [`AppConfig::default`]. Storage paths that
//! are not configured stay `None` and are resolved against the platform app
//! directories during wiring. No validation happens here: a zero timeout is a
//! fact, not an error.

use std::path::PathBuf;

/// Production manifest endpoint.
pub const DEFAULT_MANIFEST_URL: &str = "https://basalt-prod.up.railway.app/api/wallpapers";

/// Production random-pick endpoint.
pub const DEFAULT_RANDOM_URL: &str = "https://basalt-prod.up.railway.app/api/wallpapers/random";

/// Daemon configuration (pure data).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
    pub connectivity: ConnectivityConfig,
    pub displays: DisplaysConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub manifest_url: String,
    pub random_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StorageConfig {
    /// Root for persisted daily state. `None` → platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Artifact cache directory. `None` → platform cache dir.
    pub cache_dir: Option<PathBuf>,
    /// `settings.json` location. `None` → `<data_dir>/settings.json`.
    pub settings_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleConfig {
    /// Coalescing window for generic triggers.
    pub debounce_ms: u64,
    /// Coalescing window for display topology changes.
    pub display_debounce_ms: u64,
    /// Delays after a wake at which a reconciliation is retried.
    pub wake_retry_secs: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectivityConfig {
    pub check_host: String,
    pub check_port: u16,
    pub check_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplaysConfig {
    /// Background setter backend. Only `swww` is wired today.
    pub backend: String,
    pub swww_path: PathBuf,
    pub poll_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                manifest_url: DEFAULT_MANIFEST_URL.to_string(),
                random_url: DEFAULT_RANDOM_URL.to_string(),
                request_timeout_secs: 10,
            },
            storage: StorageConfig::default(),
            schedule: ScheduleConfig {
                debounce_ms: 500,
                display_debounce_ms: 2000,
                wake_retry_secs: vec![5, 15, 30],
            },
            connectivity: ConnectivityConfig {
                check_host: "1.1.1.1".to_string(),
                check_port: 443,
                check_interval_secs: 10,
            },
            displays: DisplaysConfig {
                backend: "swww".to_string(),
                swww_path: PathBuf::from("swww"),
                poll_interval_secs: 2,
            },
        }
    }
}

impl AppConfig {
    /// Create AppConfig from a parsed TOML document.
    ///
    /// Values of the wrong type are treated like missing keys.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let get = |section: &str, key: &str| toml_value.get(section).and_then(|s| s.get(key));
        let string = |section: &str, key: &str, fallback: &str| {
            get(section, key)
                .and_then(|v| v.as_str())
                .unwrap_or(fallback)
                .to_string()
        };
        let integer = |section: &str, key: &str, fallback: u64| {
            get(section, key)
                .and_then(|v| v.as_integer())
                .map(|v| v.max(0) as u64)
                .unwrap_or(fallback)
        };
        let path = |section: &str, key: &str| {
            get(section, key)
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        };

        let wake_retry_secs = match get("schedule", "wake_retry_secs").and_then(|v| v.as_array()) {
            Some(values) => values
                .iter()
                .filter_map(|v| v.as_integer())
                .map(|v| v.max(0) as u64)
                .collect(),
            None => defaults.schedule.wake_retry_secs.clone(),
        };

        Ok(Self {
            service: ServiceConfig {
                manifest_url: string("service", "manifest_url", &defaults.service.manifest_url),
                random_url: string("service", "random_url", &defaults.service.random_url),
                request_timeout_secs: integer(
                    "service",
                    "request_timeout_secs",
                    defaults.service.request_timeout_secs,
                ),
            },
            storage: StorageConfig {
                data_dir: path("storage", "data_dir"),
                cache_dir: path("storage", "cache_dir"),
                settings_path: path("storage", "settings_path"),
            },
            schedule: ScheduleConfig {
                debounce_ms: integer("schedule", "debounce_ms", defaults.schedule.debounce_ms),
                display_debounce_ms: integer(
                    "schedule",
                    "display_debounce_ms",
                    defaults.schedule.display_debounce_ms,
                ),
                wake_retry_secs,
            },
            connectivity: ConnectivityConfig {
                check_host: string(
                    "connectivity",
                    "check_host",
                    &defaults.connectivity.check_host,
                ),
                check_port: integer(
                    "connectivity",
                    "check_port",
                    defaults.connectivity.check_port as u64,
                ) as u16,
                check_interval_secs: integer(
                    "connectivity",
                    "check_interval_secs",
                    defaults.connectivity.check_interval_secs,
                ),
            },
            displays: DisplaysConfig {
                backend: string("displays", "backend", &defaults.displays.backend),
                swww_path: path("displays", "swww_path").unwrap_or(defaults.displays.swww_path),
                poll_interval_secs: integer(
                    "displays",
                    "poll_interval_secs",
                    defaults.displays.poll_interval_secs,
                ),
            },
        })
    }
}
