//! Wallpaper domain: records from the manifest, daily and override assignments,
//! and the rules that pick today's wallpaper.

mod assignment;
mod record;
pub mod selection;

pub use assignment::{DailyAssignment, OverrideAssignment};
pub use record::{Channel, WallpaperRecord};
pub use selection::{select_main, select_secondaries, SelectionReason};
