use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of artwork channels published by the manifest service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Made by real people.
    #[serde(rename = "HUMAN")]
    Human,
    /// Made by machines.
    #[serde(rename = "AI")]
    Ai,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Human, Channel::Ai];

    /// Wire representation used in manifest queries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Human => "HUMAN",
            Channel::Ai => "AI",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "HUMAN" => Some(Channel::Human),
            "AI" => Some(Channel::Ai),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wallpaper as returned by the manifest service.
///
/// Records are immutable once fetched. Unknown channel strings are read as a
/// missing channel so one odd entry cannot fail the whole manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallpaperRecord {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub external_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_channel")]
    pub channel: Option<Channel>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub creation_date: Option<String>,
}

fn lenient_channel<'de, D>(deserializer: D) -> Result<Option<Channel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Channel::parse))
}

impl WallpaperRecord {
    /// Creates a bare record; mostly useful for tests and fixtures.
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            name: None,
            description: None,
            external_url: None,
            channel: None,
            release_date: None,
            artist: None,
            creation_date: None,
        }
    }

    /// Channel used for filter checks. Records without a channel count as human-made.
    pub fn effective_channel(&self) -> Channel {
        self.channel.unwrap_or(Channel::Human)
    }

    pub fn is_machine_generated(&self) -> bool {
        self.channel == Some(Channel::Ai)
    }

    /// Calendar day of the release date.
    ///
    /// RFC 3339 instants are converted to UTC before taking the date; plain
    /// `YYYY-MM-DD` prefixes are read as naive dates.
    pub fn release_day(&self) -> Option<NaiveDate> {
        self.release_date.as_deref().and_then(parse_release_day)
    }

    /// Human readable title: `name - description`, name, description or `Untitled`.
    pub fn title(&self) -> String {
        let name = self.name.as_deref().filter(|n| !n.is_empty());
        let description = self.description.as_deref().filter(|d| !d.is_empty());
        match (name, description) {
            (Some(n), Some(d)) => format!("{n} - {d}"),
            (Some(n), None) => n.to_string(),
            (None, Some(d)) => d.to_string(),
            (None, None) => "Untitled".to_string(),
        }
    }
}

pub(crate) fn parse_release_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc).date_naive());
    }
    let prefix = raw.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
