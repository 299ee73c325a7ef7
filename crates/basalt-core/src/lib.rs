//! # basalt-core
//!
//! Core domain models and business rules for Basalt.
//!
//! This crate contains pure business logic without any infrastructure dependencies:
//! wallpaper records, display geometry, daily assignments, the transform resolver,
//! the daily selection rules and the port traits implemented by `basalt-infra`
//! and `basalt-platform`.

pub mod app_dirs;
pub mod config;
pub mod display;
pub mod lifecycle;
pub mod ports;
pub mod settings;
pub mod status;
pub mod transform;
pub mod wallpaper;

// Re-export commonly used types at the crate root
pub use app_dirs::AppDirs;
pub use config::AppConfig;
pub use display::{DisplayId, DisplayTarget, Orientation};
pub use lifecycle::LifecycleEvent;
pub use settings::model::Settings;
pub use status::{AssignmentMode, DisplayReport, EngineStatus, ReconcileOutcome, ReconcileState};
pub use transform::{FitMode, TransformRequest};
pub use wallpaper::{Channel, DailyAssignment, OverrideAssignment, WallpaperRecord};
