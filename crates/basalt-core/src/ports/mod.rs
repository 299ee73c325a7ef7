//! Port interfaces for the application layer
//!
//! Ports define the contract between the reconciliation use cases and the
//! infrastructure / platform adapters. The engine only ever talks to these
//! traits, which keeps every collaborator injectable in tests.

pub mod app_dirs;
mod artifact_cache;
mod clock;
mod connectivity;
mod daily_state;
mod display;
pub mod errors;
mod manifest;
pub mod settings;

pub use app_dirs::AppDirsPort;
pub use artifact_cache::{ArtifactCachePort, CacheEntry};
pub use clock::ClockPort;
pub use connectivity::ConnectivityPort;
pub use daily_state::DailyStatePort;
pub use display::DisplayPort;
pub use errors::{AppDirsError, CacheError, DisplayError, ManifestError, StateStoreError};
pub use manifest::ManifestPort;
pub use settings::SettingsPort;
