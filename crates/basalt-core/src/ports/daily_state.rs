use async_trait::async_trait;
use chrono::NaiveDate;

use crate::ports::errors::StateStoreError;
use crate::wallpaper::{DailyAssignment, OverrideAssignment, WallpaperRecord};

/// Durable storage for the daily pick and today's override.
///
/// Loads filter by day only. Whether a stored assignment still fits the
/// current settings is decided by the caller.
#[async_trait]
pub trait DailyStatePort: Send + Sync {
    /// Stored override, only if it was set for `today`. Stale overrides are
    /// left on disk.
    async fn load_override(
        &self,
        today: NaiveDate,
    ) -> Result<Option<OverrideAssignment>, StateStoreError>;

    /// Stored daily assignment for `today`. Malformed data reads as absent.
    async fn load_daily(&self, today: NaiveDate)
        -> Result<Option<DailyAssignment>, StateStoreError>;

    /// Replaces the stored daily assignment.
    async fn save(&self, assignment: &DailyAssignment) -> Result<(), StateStoreError>;

    async fn save_override(
        &self,
        record: &WallpaperRecord,
        today: NaiveDate,
    ) -> Result<(), StateStoreError>;

    async fn clear_override(&self) -> Result<(), StateStoreError>;
}
