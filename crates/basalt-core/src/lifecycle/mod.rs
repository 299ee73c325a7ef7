//! Lifecycle events consumed by the scheduler.
//!
//! OS notifications (display hot-plug, network reachability, wake) and user
//! actions are all funneled into one channel of these events.

use crate::settings::model::Settings;

#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// Process start.
    Startup,
    /// User settings were changed; carries the new snapshot.
    SettingsChanged(Settings),
    /// Network reachability flipped.
    ConnectivityChanged { connected: bool },
    /// Display topology or resolution changed.
    DisplaysChanged,
    /// The system woke from sleep.
    Wake,
    /// Delayed follow-up to a [`LifecycleEvent::Wake`]; `attempt` is 1-based.
    WakeRetry { attempt: u32 },
    /// "Surprise me": pick a random wallpaper as today's override.
    Surprise,
    /// Drop today's override and go back to the daily pick.
    ResetToDaily,
    /// Manual refresh. Same effect as [`LifecycleEvent::ResetToDaily`].
    Refresh,
    Shutdown,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Startup => "startup",
            LifecycleEvent::SettingsChanged(_) => "settings_changed",
            LifecycleEvent::ConnectivityChanged { .. } => "connectivity_changed",
            LifecycleEvent::DisplaysChanged => "displays_changed",
            LifecycleEvent::Wake => "wake",
            LifecycleEvent::WakeRetry { .. } => "wake_retry",
            LifecycleEvent::Surprise => "surprise",
            LifecycleEvent::ResetToDaily => "reset_to_daily",
            LifecycleEvent::Refresh => "refresh",
            LifecycleEvent::Shutdown => "shutdown",
        }
    }
}
