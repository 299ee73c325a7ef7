//! Concurrent per-display apply.
//!
//! One future per display, joined together. A failing display only marks its
//! own report; siblings always run to completion.

use basalt_core::ports::{ArtifactCachePort, DisplayPort};
use basalt_core::transform;
use basalt_core::{DailyAssignment, DisplayReport, DisplayTarget, Settings};
use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub(crate) const CANCELLED: &str = "cancelled";

pub(crate) async fn apply_to_displays(
    cache: &dyn ArtifactCachePort,
    displays: &dyn DisplayPort,
    assignment: &DailyAssignment,
    ordered: &[DisplayTarget],
    settings: &Settings,
    token: &CancellationToken,
) -> Vec<DisplayReport> {
    let work = ordered.iter().enumerate().map(|(index, target)| {
        apply_one(cache, displays, assignment, index, target, settings, token)
    });
    join_all(work).await
}

async fn apply_one(
    cache: &dyn ArtifactCachePort,
    displays: &dyn DisplayPort,
    assignment: &DailyAssignment,
    index: usize,
    target: &DisplayTarget,
    settings: &Settings,
    token: &CancellationToken,
) -> DisplayReport {
    let record = assignment.record_for_display(index, settings.same_wallpaper_on_all_displays);
    let request = transform::resolve(record, target, settings.fit_vertical_displays);

    let mut report = DisplayReport {
        label: format!("Disp {}", index + 1),
        display_id: target.id.clone(),
        wallpaper_id: record.id.clone(),
        wallpaper_title: record.title(),
        resolved_url: request.resolved_url.clone(),
        original_url: record.url.clone(),
        external_url: record.external_url.clone(),
        local_path: None,
        error: None,
    };

    let entry = match cache.obtain(&request.resolved_url, &record.id).await {
        Ok(entry) => entry,
        Err(e) => {
            warn!(display = %target.id, wallpaper_id = %record.id, error = %e, "Failed to obtain artifact");
            report.error = Some(e.to_string());
            return report;
        }
    };

    if token.is_cancelled() {
        debug!(display = %target.id, "Skipping display, reconciliation superseded");
        report.error = Some(CANCELLED.to_string());
        return report;
    }

    match displays.set_wallpaper(target, &entry.path).await {
        Ok(()) => {
            debug!(
                display = %target.id,
                wallpaper_id = %record.id,
                path = %entry.path.display(),
                width = request.width,
                height = request.height,
                fit = ?request.fit,
                "Wallpaper applied"
            );
            report.local_path = Some(entry.path);
        }
        Err(e) => {
            warn!(display = %target.id, error = %e, "Failed to set wallpaper");
            report.error = Some(e.to_string());
        }
    }
    report
}
