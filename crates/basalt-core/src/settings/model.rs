use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::wallpaper::Channel;

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// User-facing settings that drive reconciliation.
///
/// Owned by the settings collaborator; the engine only reads them. A change
/// invalidates the applicability of the current assignment but never deletes
/// persisted state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "current_schema_version")]
    pub schema_version: u32,

    /// Show the main wallpaper on every display.
    #[serde(default = "default_true")]
    pub same_wallpaper_on_all_displays: bool,

    /// Channels the daily pick may come from.
    #[serde(default = "default_channels")]
    pub selected_channels: BTreeSet<Channel>,

    /// Pad (instead of crop) artwork on portrait displays.
    #[serde(default = "default_true")]
    pub fit_vertical_displays: bool,
}

impl Settings {
    pub fn channel_selected(&self, channel: Channel) -> bool {
        self.selected_channels.contains(&channel)
    }

    /// Flips one channel in or out of the selection.
    pub fn toggle_channel(&mut self, channel: Channel) {
        if !self.selected_channels.remove(&channel) {
            self.selected_channels.insert(channel);
        }
    }
}

fn current_schema_version() -> u32 {
    CURRENT_SCHEMA_VERSION
}

fn default_true() -> bool {
    true
}

pub(crate) fn default_channels() -> BTreeSet<Channel> {
    Channel::ALL.into_iter().collect()
}
