//! Reconciliation status as exposed to the (out of process) UI layer.
//!
//! Failures only ever surface as a short human-readable message; there is no
//! separate error-code channel.

use std::path::PathBuf;

use serde::Serialize;

use crate::display::DisplayId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileState {
    Idle,
    Checking,
    Fetching,
    Applying,
    Done,
    Error,
    Offline,
}

/// Where the applied assignment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentMode {
    Daily,
    Override,
}

/// What one display ended up showing after an apply pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayReport {
    /// `Disp N`, 1-based in apply order.
    pub label: String,
    pub display_id: DisplayId,
    pub wallpaper_id: String,
    pub wallpaper_title: String,
    pub resolved_url: String,
    pub original_url: String,
    pub external_url: Option<String>,
    pub local_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl DisplayReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of one `reconcile` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Every display received its wallpaper.
    Updated {
        mode: AssignmentMode,
        displays: Vec<DisplayReport>,
    },
    /// Some displays failed; the others were still updated.
    UpdatedWithWarnings {
        mode: AssignmentMode,
        displays: Vec<DisplayReport>,
        failures: usize,
    },
    /// Nothing to apply to.
    NoDisplays,
    /// Connectivity is down and nothing valid was persisted for today.
    Offline,
    /// The manifest came back empty for the selected channels.
    NoWallpapers,
    /// Manifest or random-pick request failed while online.
    Failed(String),
    /// The random pick behind "surprise me" could not be fetched.
    SurpriseFailed(String),
    /// A newer reconciliation started; this run's results were discarded.
    Superseded,
}

impl ReconcileOutcome {
    pub fn state(&self) -> ReconcileState {
        match self {
            ReconcileOutcome::Updated { .. } | ReconcileOutcome::UpdatedWithWarnings { .. } => {
                ReconcileState::Done
            }
            ReconcileOutcome::NoWallpapers => ReconcileState::Done,
            ReconcileOutcome::Offline => ReconcileState::Offline,
            ReconcileOutcome::NoDisplays
            | ReconcileOutcome::Failed(_)
            | ReconcileOutcome::SurpriseFailed(_) => ReconcileState::Error,
            ReconcileOutcome::Superseded => ReconcileState::Idle,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ReconcileOutcome::Updated { .. } => "Updated!".to_string(),
            ReconcileOutcome::UpdatedWithWarnings { .. } => "Updated with warnings.".to_string(),
            ReconcileOutcome::NoDisplays => "No displays.".to_string(),
            ReconcileOutcome::Offline => "Offline".to_string(),
            ReconcileOutcome::NoWallpapers => "No wallpapers found.".to_string(),
            ReconcileOutcome::Failed(reason) => format!("Error: {reason}"),
            ReconcileOutcome::SurpriseFailed(_) => "Surprise failed.".to_string(),
            ReconcileOutcome::Superseded => "Superseded".to_string(),
        }
    }

    pub fn displays(&self) -> &[DisplayReport] {
        match self {
            ReconcileOutcome::Updated { displays, .. }
            | ReconcileOutcome::UpdatedWithWarnings { displays, .. } => displays,
            _ => &[],
        }
    }
}

/// Snapshot published on every state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatus {
    pub state: ReconcileState,
    pub message: String,
    pub mode: Option<AssignmentMode>,
    pub displays: Vec<DisplayReport>,
}

impl EngineStatus {
    pub fn ready() -> Self {
        Self {
            state: ReconcileState::Idle,
            message: "Ready".to_string(),
            mode: None,
            displays: Vec::new(),
        }
    }

    pub fn with_state(&self, state: ReconcileState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            mode: self.mode,
            displays: self.displays.clone(),
        }
    }
}

impl Default for EngineStatus {
    fn default() -> Self {
        Self::ready()
    }
}
