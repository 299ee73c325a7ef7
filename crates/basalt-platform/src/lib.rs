//! Platform adapters for Basalt: app directories, the `swww` display backend,
//! and the event sources (connectivity, wake, display and settings watchers)
//! that feed the lifecycle scheduler.

pub mod app_dirs;
pub mod connectivity;
pub mod display;
pub mod wake;
pub mod watchers;

pub use app_dirs::DirsAppDirsAdapter;
pub use connectivity::TcpConnectivityMonitor;
pub use display::SwwwDisplayAdapter;
pub use wake::WakeDetector;
pub use watchers::{DisplayWatcher, SettingsFileWatcher};
