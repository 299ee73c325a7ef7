//! Polling event sources for display topology and the settings file.

mod display_watcher;
mod settings_watcher;

pub use display_watcher::DisplayWatcher;
pub use settings_watcher::SettingsFileWatcher;
