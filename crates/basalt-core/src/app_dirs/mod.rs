use std::path::PathBuf;

/// Platform directories resolved for this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Persisted state, settings and the config file.
    pub app_data_root: PathBuf,
    /// Downloaded artifacts.
    pub app_cache_root: PathBuf,
}

impl AppDirs {
    pub fn state_dir(&self) -> PathBuf {
        self.app_data_root.join("state")
    }

    pub fn settings_path(&self) -> PathBuf {
        self.app_data_root.join("settings.json")
    }

    pub fn config_path(&self) -> PathBuf {
        self.app_data_root.join("basalt.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.app_data_root.join("logs")
    }

    pub fn wallpaper_cache_dir(&self) -> PathBuf {
        self.app_cache_root.join("wallpapers")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_paths_live_under_their_roots() {
        let dirs = AppDirs {
            app_data_root: PathBuf::from("/tmp/basalt"),
            app_cache_root: PathBuf::from("/tmp/cache/basalt"),
        };
        assert_eq!(dirs.state_dir(), PathBuf::from("/tmp/basalt/state"));
        assert_eq!(dirs.settings_path(), PathBuf::from("/tmp/basalt/settings.json"));
        assert_eq!(dirs.logs_dir(), PathBuf::from("/tmp/basalt/logs"));
        assert_eq!(
            dirs.wallpaper_cache_dir(),
            PathBuf::from("/tmp/cache/basalt/wallpapers")
        );
    }
}
