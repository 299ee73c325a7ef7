//! Adapters for the Basalt ports that need I/O but nothing OS specific:
//! the artifact cache, the daily state store, the manifest HTTP client,
//! the settings file and the system clock.

pub mod cache;
pub mod fs;
pub mod manifest;
pub mod settings;
pub mod state;
pub mod time;

pub use cache::FsArtifactCache;
pub use manifest::HttpManifestClient;
pub use settings::FileSettingsRepository;
pub use state::FileDailyStateStore;
pub use time::SystemClock;
