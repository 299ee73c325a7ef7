//! Daily pick rules.
//!
//! Freshness contract: a record released today beats the most recent release,
//! which beats manifest order. Callers depend on this exact preference order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::WallpaperRecord;

/// Why a main wallpaper was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionReason {
    /// Uniform pick among records released today.
    ReleasedToday,
    /// No release today; the most recently released record.
    LatestRelease,
    /// No usable release dates at all; first record in manifest order.
    ManifestOrder,
}

/// Picks the main wallpaper for `today`. Returns `None` only for an empty manifest.
pub fn select_main<'a, R>(
    candidates: &'a [WallpaperRecord],
    today: NaiveDate,
    rng: &mut R,
) -> Option<(&'a WallpaperRecord, SelectionReason)>
where
    R: Rng + ?Sized,
{
    let released_today: Vec<&WallpaperRecord> = candidates
        .iter()
        .filter(|record| record.release_day() == Some(today))
        .collect();

    if let Some(pick) = released_today.choose(rng) {
        return Some((*pick, SelectionReason::ReleasedToday));
    }

    if let Some(latest) = latest_release(candidates) {
        return Some((latest, SelectionReason::LatestRelease));
    }

    candidates
        .first()
        .map(|record| (record, SelectionReason::ManifestOrder))
}

/// Most recent release; ties keep manifest order.
fn latest_release(candidates: &[WallpaperRecord]) -> Option<&WallpaperRecord> {
    let mut best: Option<(NaiveDate, &str, &WallpaperRecord)> = None;
    for record in candidates {
        let Some(day) = record.release_day() else {
            continue;
        };
        let raw = record.release_date.as_deref().unwrap_or_default();
        let newer = match best {
            Some((best_day, best_raw, _)) => (day, raw) > (best_day, best_raw),
            None => true,
        };
        if newer {
            best = Some((day, raw, record));
        }
    }
    best.map(|(_, _, record)| record)
}

/// Picks a wallpaper for every non-primary display index in `1..display_count`.
///
/// The pool excludes the main record; when nothing else is left the main record
/// is reused.
pub fn select_secondaries<R>(
    candidates: &[WallpaperRecord],
    main: &WallpaperRecord,
    display_count: usize,
    rng: &mut R,
) -> BTreeMap<usize, WallpaperRecord>
where
    R: Rng + ?Sized,
{
    let pool: Vec<&WallpaperRecord> = candidates
        .iter()
        .filter(|record| record.id != main.id)
        .collect();

    (1..display_count)
        .map(|index| {
            let pick = pool.choose(rng).copied().unwrap_or(main);
            (index, pick.clone())
        })
        .collect()
}
