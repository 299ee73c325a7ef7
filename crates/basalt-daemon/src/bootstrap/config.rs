//! # Configuration Loader
//!
//! Reads `basalt.toml` and maps it onto [`AppConfig`]. Pure data loading:
//! no validation, and every absent key keeps its default.

use std::path::{Path, PathBuf};

use anyhow::Context;
use basalt_core::{AppConfig, AppDirs};

/// Load configuration from a TOML file.
///
/// A missing file is not an error: the daemon runs on defaults until the
/// user writes one.
///
/// # Errors
///
/// Returns error if the file exists but cannot be read, or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = match std::fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => {
            return Err(e).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })
        }
    };
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// `--config` wins; otherwise `<data>/basalt.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>, app_dirs: &AppDirs) -> PathBuf {
    explicit.unwrap_or_else(|| app_dirs.config_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [service]
            manifest_url = "http://localhost:3000/api/wallpapers"
            request_timeout_secs = 3

            [schedule]
            wake_retry_secs = [1, 2]

            [displays]
            swww_path = "/usr/local/bin/swww"
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(
            config.service.manifest_url,
            "http://localhost:3000/api/wallpapers"
        );
        assert_eq!(config.service.request_timeout_secs, 3);
        assert_eq!(config.schedule.wake_retry_secs, vec![1, 2]);
        assert_eq!(config.schedule.debounce_ms, 500);
        assert_eq!(
            config.displays.swww_path,
            PathBuf::from("/usr/local/bin/swww")
        );
    }

    #[test]
    fn test_load_config_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();

        let config = load_config(&dir.path().join("basalt.toml")).unwrap();

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_config_rejects_invalid_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[service\nmanifest_url = ").unwrap();

        let err = load_config(temp_file.path()).unwrap_err();

        assert!(format!("{err:#}").contains("TOML"));
    }

    #[test]
    fn test_resolve_config_path_prefers_explicit() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/data/basalt"),
            app_cache_root: PathBuf::from("/cache/basalt"),
        };

        assert_eq!(
            resolve_config_path(None, &dirs),
            PathBuf::from("/data/basalt/basalt.toml")
        );
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("/etc/basalt.toml")), &dirs),
            PathBuf::from("/etc/basalt.toml")
        );
    }
}
