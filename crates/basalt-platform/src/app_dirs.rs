//! Data and cache roots from the platform base directories.

use std::path::PathBuf;

use basalt_core::{
    app_dirs::AppDirs,
    ports::{AppDirsError, AppDirsPort},
};

const APP_DIR_NAME: &str = "basalt";
const PROFILE_ENV: &str = "BASALT_PROFILE";

/// Resolves `<data_local>/basalt[-profile]` and `<cache>/basalt[-profile]`.
///
/// A profile keeps several instances apart on one machine. It is read once,
/// when the adapter is built.
pub struct DirsAppDirsAdapter {
    data_base: Option<PathBuf>,
    cache_base: Option<PathBuf>,
    profile: Option<String>,
}

impl DirsAppDirsAdapter {
    /// System base directories, profile from `BASALT_PROFILE`.
    pub fn new() -> Self {
        Self {
            data_base: dirs::data_local_dir(),
            cache_base: dirs::cache_dir(),
            profile: std::env::var(PROFILE_ENV).ok(),
        }
        .normalized()
    }

    /// Data under `base`, cache under `base/cache`, no profile.
    pub fn with_base_dir(base: PathBuf) -> Self {
        Self {
            cache_base: Some(base.join("cache")),
            data_base: Some(base),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.profile = self.profile.filter(|p| !p.trim().is_empty());
        self
    }

    fn dir_name(&self) -> String {
        match &self.profile {
            Some(profile) => format!("{APP_DIR_NAME}-{}", profile.trim()),
            None => APP_DIR_NAME.to_string(),
        }
    }
}

impl Default for DirsAppDirsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl AppDirsPort for DirsAppDirsAdapter {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError> {
        let data_base = self
            .data_base
            .as_ref()
            .ok_or(AppDirsError::DataLocalDirUnavailable)?;
        let cache_base = self
            .cache_base
            .as_ref()
            .ok_or(AppDirsError::CacheDirUnavailable)?;
        let name = self.dir_name();

        Ok(AppDirs {
            app_data_root: data_base.join(&name),
            app_cache_root: cache_base.join(&name),
        })
    }
}
