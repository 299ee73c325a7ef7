//! Which assignment should be on screen today.
//!
//! Strict priority: today's override, then a still-valid persisted daily pick,
//! then a fresh pick from the manifest (online only).

use basalt_core::ports::{ConnectivityPort, DailyStatePort, ManifestPort};
use basalt_core::wallpaper::{select_main, select_secondaries};
use basalt_core::{AssignmentMode, Channel, DailyAssignment, ReconcileOutcome, Settings};
use chrono::NaiveDate;
use rand::Rng;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub(crate) enum Decision {
    /// Apply `assignment`; `fresh` picks still have to be persisted.
    Apply {
        assignment: DailyAssignment,
        mode: AssignmentMode,
        fresh: bool,
    },
    Stop(ReconcileOutcome),
}

/// An empty selection queries every channel, so it also accepts every channel.
/// Rejecting everything instead would discard today's pick and draw a new one
/// on every trigger while nothing is selected.
pub(crate) fn channel_allowed(settings: &Settings, channel: Channel) -> bool {
    settings.selected_channels.is_empty() || settings.channel_selected(channel)
}

/// A persisted daily pick is reused only if it still matches the channel filter
/// and was released today.
pub(crate) fn is_still_valid(
    assignment: &DailyAssignment,
    today: NaiveDate,
    settings: &Settings,
) -> bool {
    let main = &assignment.main;
    channel_allowed(settings, main.effective_channel()) && main.release_day() == Some(today)
}

pub(crate) async fn decide(
    state: &dyn DailyStatePort,
    manifest: &dyn ManifestPort,
    connectivity: &dyn ConnectivityPort,
    rng: &std::sync::Mutex<impl Rng + Send>,
    today: NaiveDate,
    settings: &Settings,
    display_count: usize,
) -> Decision {
    match state.load_override(today).await {
        Ok(Some(over)) => {
            info!(wallpaper_id = %over.record.id, "Using today's override");
            return Decision::Apply {
                assignment: over.into_assignment(),
                mode: AssignmentMode::Override,
                fresh: false,
            };
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to load override, ignoring it"),
    }

    match state.load_daily(today).await {
        Ok(Some(daily)) if is_still_valid(&daily, today, settings) => {
            debug!(wallpaper_id = %daily.main.id, "Persisted daily assignment still valid");
            return Decision::Apply {
                assignment: daily,
                mode: AssignmentMode::Daily,
                fresh: false,
            };
        }
        Ok(Some(daily)) => {
            debug!(
                wallpaper_id = %daily.main.id,
                channel = %daily.main.effective_channel(),
                release_date = ?daily.main.release_date,
                "Persisted daily assignment no longer valid"
            );
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "Failed to load daily assignment, ignoring it"),
    }

    if !connectivity.is_connected() {
        info!("Offline and nothing valid persisted for today");
        return Decision::Stop(ReconcileOutcome::Offline);
    }

    let candidates = match manifest.fetch_manifest(&settings.selected_channels).await {
        Ok(candidates) => candidates,
        Err(e) => {
            warn!(error = %e, "Manifest fetch failed");
            return Decision::Stop(ReconcileOutcome::Failed(e.to_string()));
        }
    };

    let assignment = {
        let mut rng = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some((main, reason)) = select_main(&candidates, today, &mut *rng) else {
            info!("Manifest returned no wallpapers");
            return Decision::Stop(ReconcileOutcome::NoWallpapers);
        };
        info!(
            wallpaper_id = %main.id,
            reason = ?reason,
            candidates = candidates.len(),
            "Picked today's wallpaper"
        );

        let mut assignment = DailyAssignment::new(today, main.clone());
        if !settings.same_wallpaper_on_all_displays && display_count > 1 {
            assignment = assignment.with_secondaries(select_secondaries(
                &candidates,
                main,
                display_count,
                &mut *rng,
            ));
        }
        assignment
    };

    Decision::Apply {
        assignment,
        mode: AssignmentMode::Daily,
        fresh: true,
    }
}
