//! Per-display transform resolution.
//!
//! Rewrites a wallpaper's source URL for the image-transform CDN: target
//! geometry, crop/pad policy, the corner icon and the optional title overlay
//! are injected as a parameter segment right after [`TRANSFORM_MARKER`].
//! Pure and deterministic, no I/O.

use serde::{Deserialize, Serialize};

use crate::display::{DisplayTarget, Orientation};
use crate::wallpaper::WallpaperRecord;

/// Path segment after which transform parameters are injected.
pub const TRANSFORM_MARKER: &str = "/upload/";

/// Longest edge we ever request from the CDN.
pub const MAX_RESOLUTION: u32 = 2560;

/// Neutral dark fill used around padded artwork.
pub const PAD_BACKGROUND: &str = "rgb:1C1C1E";

const ICON_LAYER: &str = "l_topbar-icon-white_cwox5b,w_16,h_16,g_south_west,x_8,y_8";
const OVERLAY_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitMode {
    /// Crop to fill the display exactly.
    Fill,
    /// Fit the whole artwork and pad with [`PAD_BACKGROUND`].
    Pad,
}

/// Output of [`resolve`]: the URL to download plus the parameters behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRequest {
    pub resolved_url: String,
    pub width: u32,
    pub height: u32,
    pub fit: FitMode,
    /// Unencoded overlay text; `None` when text is suppressed or empty.
    pub overlay_text: Option<String>,
    /// `false` when the source URL had no marker and is used as-is.
    pub transformed: bool,
}

/// Resolves the transform request for `record` on `display`.
pub fn resolve(
    record: &WallpaperRecord,
    display: &DisplayTarget,
    fit_vertical: bool,
) -> TransformRequest {
    let (raw_width, raw_height) = display.pixel_size();
    let (width, height) = cap_resolution(raw_width, raw_height);
    let fit = fit_mode(width, height, fit_vertical);
    let overlay_text = overlay_text(record);

    let Some(marker_at) = record.url.find(TRANSFORM_MARKER) else {
        return TransformRequest {
            resolved_url: record.url.clone(),
            width,
            height,
            fit,
            overlay_text: None,
            transformed: false,
        };
    };

    let mut params = format!("{}/{}/", fit_segment(width, height, fit), ICON_LAYER);
    if let Some(text) = &overlay_text {
        params.push_str(&text_segment(text));
        params.push('/');
    }

    let insert_at = marker_at + TRANSFORM_MARKER.len();
    let mut resolved_url = String::with_capacity(record.url.len() + params.len());
    resolved_url.push_str(&record.url[..insert_at]);
    resolved_url.push_str(&params);
    resolved_url.push_str(&record.url[insert_at..]);

    TransformRequest {
        resolved_url,
        width,
        height,
        fit,
        overlay_text,
        transformed: true,
    }
}

/// Caps the width at [`MAX_RESOLUTION`], scaling the height by the same ratio.
pub fn cap_resolution(width: u32, height: u32) -> (u32, u32) {
    if width <= MAX_RESOLUTION {
        return (width, height);
    }
    let ratio = height as f64 / width as f64;
    (MAX_RESOLUTION, (MAX_RESOLUTION as f64 * ratio) as u32)
}

/// Pad only portrait targets, and only when the user asked for it.
pub fn fit_mode(width: u32, height: u32, fit_vertical: bool) -> FitMode {
    match (Orientation::from_size(width, height), fit_vertical) {
        (Orientation::Portrait, true) => FitMode::Pad,
        _ => FitMode::Fill,
    }
}

/// Title overlay: suppressed for machine-generated art, otherwise the non-empty
/// name, artist and creation date joined by `", "`.
pub fn overlay_text(record: &WallpaperRecord) -> Option<String> {
    if record.is_machine_generated() {
        return None;
    }
    let parts: Vec<&str> = [&record.name, &record.artist, &record.creation_date]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(OVERLAY_SEPARATOR))
    }
}

/// Percent-encodes overlay text. Commas are the CDN's own parameter delimiter,
/// so they are encoded twice.
pub fn encode_overlay_text(text: &str) -> String {
    urlencoding::encode(text).replace("%2C", "%252C")
}

fn fit_segment(width: u32, height: u32, fit: FitMode) -> String {
    match fit {
        FitMode::Fill => format!("w_{width},h_{height},c_fill"),
        FitMode::Pad => format!("w_{width},h_{height},c_pad,b_{PAD_BACKGROUND}"),
    }
}

fn text_segment(text: &str) -> String {
    format!(
        "l_text:Arial_14:{},co_white,g_south_west,x_34,y_9",
        encode_overlay_text(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayId;
    use crate::wallpaper::Channel;

    const SOURCE: &str = "https://res.cloudinary.com/demo/image/upload/v1700/dawn.jpg";

    fn display(width: u32, height: u32, scale: f64) -> DisplayTarget {
        DisplayTarget {
            id: DisplayId::new("eDP-1", 0),
            name: "eDP-1".into(),
            width,
            height,
            scale_factor: scale,
            x: 0,
            y: 0,
            primary: true,
        }
    }

    fn human_record() -> WallpaperRecord {
        let mut record = WallpaperRecord::new("w1", SOURCE);
        record.channel = Some(Channel::Human);
        record.name = Some("Dawn".into());
        record.artist = Some("Ansel Adams".into());
        record.creation_date = Some("1942".into());
        record
    }

    #[test]
    fn injects_fill_icon_and_text_after_marker() {
        let request = resolve(&human_record(), &display(1920, 1080, 1.0), true);

        assert!(request.transformed);
        assert_eq!(request.fit, FitMode::Fill);
        assert_eq!(
            request.resolved_url,
            "https://res.cloudinary.com/demo/image/upload/\
             w_1920,h_1080,c_fill/\
             l_topbar-icon-white_cwox5b,w_16,h_16,g_south_west,x_8,y_8/\
             l_text:Arial_14:Dawn%252C%20Ansel%20Adams%252C%201942,co_white,g_south_west,x_34,y_9/\
             v1700/dawn.jpg"
        );
        assert_eq!(
            request.overlay_text.as_deref(),
            Some("Dawn, Ansel Adams, 1942")
        );
    }

    #[test]
    fn machine_generated_records_never_get_text() {
        let mut record = human_record();
        record.channel = Some(Channel::Ai);

        let request = resolve(&record, &display(1920, 1080, 1.0), false);

        assert_eq!(request.overlay_text, None);
        assert!(!request.resolved_url.contains("l_text:"));
        assert!(request.resolved_url.contains("l_topbar-icon-white_cwox5b"));
    }

    #[test]
    fn pad_only_for_portrait_with_fit_vertical() {
        let record = human_record();
        let portrait = display(1080, 1920, 1.0);
        let landscape = display(1920, 1080, 1.0);

        assert_eq!(resolve(&record, &portrait, true).fit, FitMode::Pad);
        assert_eq!(resolve(&record, &portrait, false).fit, FitMode::Fill);
        assert_eq!(resolve(&record, &landscape, true).fit, FitMode::Fill);
        assert_eq!(resolve(&record, &landscape, false).fit, FitMode::Fill);
        assert!(resolve(&record, &portrait, true)
            .resolved_url
            .contains("w_1080,h_1920,c_pad,b_rgb:1C1C1E/"));
    }

    #[test]
    fn caps_width_and_preserves_aspect_ratio() {
        let request = resolve(&human_record(), &display(1728, 1117, 2.0), false);

        assert_eq!(request.width, MAX_RESOLUTION);
        let expected = (MAX_RESOLUTION as f64 * (2234.0 / 3456.0)) as u32;
        assert_eq!(request.height, expected);
        assert_eq!(cap_resolution(2560, 1440), (2560, 1440));
        assert_eq!(cap_resolution(5120, 2880), (2560, 1440));
    }

    #[test]
    fn url_without_marker_is_used_unmodified() {
        let record = WallpaperRecord::new("w", "https://example.com/plain.jpg");

        let request = resolve(&record, &display(1920, 1080, 1.0), true);

        assert!(!request.transformed);
        assert_eq!(request.resolved_url, "https://example.com/plain.jpg");
        assert_eq!(request.overlay_text, None);
    }

    #[test]
    fn empty_attribution_fields_are_skipped() {
        let mut record = human_record();
        record.artist = Some(String::new());
        record.creation_date = None;
        assert_eq!(overlay_text(&record).as_deref(), Some("Dawn"));

        record.name = None;
        assert_eq!(overlay_text(&record), None);
    }

    #[test]
    fn overlay_encoding_double_encodes_commas_and_escapes_slashes() {
        assert_eq!(encode_overlay_text("A, B/C"), "A%252C%20B%2FC");
    }
}
