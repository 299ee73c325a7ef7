//! Display geometry as reported by the OS for one reconciliation pass.
//!
//! Display targets are ephemeral: they are rebuilt from live enumeration every
//! pass and never persisted.

use serde::{Deserialize, Serialize};

/// Session-stable display identity (OS output name + ordinal).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(String);

impl DisplayId {
    pub fn new(output_name: &str, ordinal: usize) -> Self {
        Self(format!("{output_name}#{ordinal}"))
    }

    pub fn from_str(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Portrait iff height > width; square counts as landscape.
    pub fn from_size(width: u32, height: u32) -> Self {
        if height > width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayTarget {
    pub id: DisplayId,
    /// OS output name, used by the background setter.
    pub name: String,
    /// Logical width in points.
    pub width: u32,
    /// Logical height in points.
    pub height: u32,
    pub scale_factor: f64,
    pub x: i32,
    pub y: i32,
    pub primary: bool,
}

impl DisplayTarget {
    pub fn orientation(&self) -> Orientation {
        Orientation::from_size(self.width, self.height)
    }

    /// Physical pixel size (logical size × scale factor, truncated).
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = if self.scale_factor.is_finite() && self.scale_factor > 0.0 {
            self.scale_factor
        } else {
            1.0
        };
        (
            (self.width as f64 * scale) as u32,
            (self.height as f64 * scale) as u32,
        )
    }
}

/// Orders displays for apply: the primary display first, then left to right.
///
/// The resulting index is what secondary assignments are keyed by, so the order
/// must be deterministic for an unchanged layout.
pub fn order_for_apply(mut displays: Vec<DisplayTarget>) -> Vec<DisplayTarget> {
    displays.sort_by(|a, b| {
        b.primary
            .cmp(&a.primary)
            .then(a.x.cmp(&b.x))
            .then(a.y.cmp(&b.y))
            .then_with(|| a.id.cmp(&b.id))
    });
    displays
}

/// Compact description of a layout, used to detect hot-plug and resolution changes.
pub fn layout_fingerprint(displays: &[DisplayTarget]) -> String {
    let mut parts: Vec<String> = displays
        .iter()
        .map(|d| {
            format!(
                "{}:{}x{}@{}:{},{}:{}",
                d.name, d.width, d.height, d.scale_factor, d.x, d.y, d.primary
            )
        })
        .collect();
    parts.sort();
    parts.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn display(name: &str, x: i32, primary: bool) -> DisplayTarget {
        DisplayTarget {
            id: DisplayId::new(name, 0),
            name: name.to_string(),
            width: 1920,
            height: 1080,
            scale_factor: 1.0,
            x,
            y: 0,
            primary,
        }
    }

    #[test]
    fn primary_first_then_left_to_right() {
        let ordered = order_for_apply(vec![
            display("right", 3840, false),
            display("main", 1920, true),
            display("left", 0, false),
        ]);

        let names: Vec<&str> = ordered.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["main", "left", "right"]);
    }

    #[test]
    fn orientation_is_portrait_only_when_taller() {
        assert_eq!(Orientation::from_size(1080, 1920), Orientation::Portrait);
        assert_eq!(Orientation::from_size(1920, 1080), Orientation::Landscape);
        assert_eq!(Orientation::from_size(1000, 1000), Orientation::Landscape);
    }

    #[test]
    fn fingerprint_ignores_enumeration_order() {
        let a = vec![display("a", 0, true), display("b", 1920, false)];
        let b = vec![display("b", 1920, false), display("a", 0, true)];
        assert_eq!(layout_fingerprint(&a), layout_fingerprint(&b));

        let mut moved = a.clone();
        moved[1].x = 0;
        assert_ne!(layout_fingerprint(&a), layout_fingerprint(&moved));
    }

    #[test]
    fn pixel_size_applies_scale_factor() {
        let mut d = display("hidpi", 0, true);
        d.width = 1512;
        d.height = 982;
        d.scale_factor = 2.0;
        assert_eq!(d.pixel_size(), (3024, 1964));
    }
}
