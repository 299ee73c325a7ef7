use super::model::*;

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            same_wallpaper_on_all_displays: true,
            selected_channels: default_channels(),
            fit_vertical_displays: true,
        }
    }
}
