use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WallpaperRecord;

/// The automated pick for one calendar day.
///
/// `secondaries` maps a display index (in apply order, primary is 0) to the record
/// shown on that display. It is only populated when displays do not share the
/// main wallpaper. Assignments are replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAssignment {
    pub day: NaiveDate,
    pub main: WallpaperRecord,
    #[serde(default)]
    pub secondaries: BTreeMap<usize, WallpaperRecord>,
}

impl DailyAssignment {
    pub fn new(day: NaiveDate, main: WallpaperRecord) -> Self {
        Self {
            day,
            main,
            secondaries: BTreeMap::new(),
        }
    }

    pub fn with_secondaries(mut self, secondaries: BTreeMap<usize, WallpaperRecord>) -> Self {
        self.secondaries = secondaries;
        self
    }

    /// Record for the display at `index`.
    ///
    /// Shared mode and the primary display always get the main record; other
    /// displays fall back to it when no secondary was picked for them.
    pub fn record_for_display(&self, index: usize, same_on_all: bool) -> &WallpaperRecord {
        if same_on_all || index == 0 {
            return &self.main;
        }
        self.secondaries.get(&index).unwrap_or(&self.main)
    }
}

/// An explicit "surprise me" choice, valid only for the day it was made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAssignment {
    pub day: NaiveDate,
    pub record: WallpaperRecord,
}

impl OverrideAssignment {
    pub fn new(day: NaiveDate, record: WallpaperRecord) -> Self {
        Self { day, record }
    }

    pub fn is_for(&self, today: NaiveDate) -> bool {
        self.day == today
    }

    /// Overrides are a single-target action: no secondaries.
    pub fn into_assignment(self) -> DailyAssignment {
        DailyAssignment::new(self.day, self.record)
    }
}
