//! Daily wallpaper reconciliation.
//!
//! ## Behavior
//! - At most one reconciliation is active: starting one cancels the previous.
//! - Decide (override → persisted daily → fresh pick), persist fresh picks,
//!   then apply to every display concurrently.
//! - Never returns an error: every failure ends as a [`ReconcileOutcome`] and
//!   a status message on the [`StatusBoard`].

mod apply;
mod decision;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use basalt_core::display::order_for_apply;
use basalt_core::ports::*;
use basalt_core::{
    AssignmentMode, DailyAssignment, DisplayTarget, ReconcileOutcome, ReconcileState, Settings,
};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};

use crate::deps::ReconcileDeps;
use crate::lifecycle::Reconciler;
use crate::status_board::StatusBoard;

use decision::Decision;

struct RunSlot {
    generation: u64,
    token: CancellationToken,
}

/// Handle of one reconciliation run.
struct Run {
    generation: u64,
    token: CancellationToken,
}

pub struct ReconciliationEngine {
    manifest: Arc<dyn ManifestPort>,
    cache: Arc<dyn ArtifactCachePort>,
    state: Arc<dyn DailyStatePort>,
    displays: Arc<dyn DisplayPort>,
    connectivity: Arc<dyn ConnectivityPort>,
    status: StatusBoard,
    rng: Mutex<StdRng>,
    run: Mutex<RunSlot>,
    // Serializes persistence so a superseded run cannot overwrite a newer one.
    commit: tokio::sync::Mutex<()>,
}

impl ReconciliationEngine {
    pub fn new(deps: ReconcileDeps, status: StatusBoard) -> Self {
        Self::with_rng(deps, status, StdRng::from_os_rng())
    }

    /// Same as [`ReconciliationEngine::new`] with a caller-provided random source.
    pub fn with_rng(deps: ReconcileDeps, status: StatusBoard, rng: StdRng) -> Self {
        let ReconcileDeps {
            manifest,
            cache,
            state,
            displays,
            connectivity,
        } = deps;

        Self {
            manifest,
            cache,
            state,
            displays,
            connectivity,
            status,
            rng: Mutex::new(rng),
            run: Mutex::new(RunSlot {
                generation: 0,
                token: CancellationToken::new(),
            }),
            commit: tokio::sync::Mutex::new(()),
        }
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    /// Cancels whatever is in flight and hands out a fresh run handle.
    fn begin_run(&self) -> Run {
        let mut slot = self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.token.cancel();
        slot.generation += 1;
        slot.token = CancellationToken::new();
        Run {
            generation: slot.generation,
            token: slot.token.clone(),
        }
    }

    /// Cooperatively cancels the in-flight run, if any.
    pub fn cancel_in_flight(&self) {
        let slot = self.run.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        slot.token.cancel();
    }

    fn set_state(&self, run: &Run, state: ReconcileState, message: &str) {
        if !run.token.is_cancelled() {
            self.status.set_state(state, message);
        }
    }

    /// Reconciles the displays with today's assignment.
    pub async fn reconcile(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        let run = self.begin_run();
        let span = info_span!(
            "usecase.reconcile.execute",
            generation = run.generation,
            today = %today
        );

        async {
            let outcome = self.reconcile_run(&run, today, settings).await;
            match &outcome {
                ReconcileOutcome::Superseded => {
                    info!("Reconciliation superseded, discarding results");
                }
                other => {
                    info!(outcome = %other.message(), "Reconciliation finished");
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn reconcile_run(
        &self,
        run: &Run,
        today: NaiveDate,
        settings: &Settings,
    ) -> ReconcileOutcome {
        self.set_state(run, ReconcileState::Checking, "Checking...");

        let ordered = self.enumerate_displays().await;

        let decision = decision::decide(
            self.state.as_ref(),
            self.manifest.as_ref(),
            self.connectivity.as_ref(),
            &self.rng,
            today,
            settings,
            ordered.len(),
        )
        .await;

        let (assignment, mode, fresh) = match decision {
            Decision::Apply {
                assignment,
                mode,
                fresh,
            } => (assignment, mode, fresh),
            Decision::Stop(outcome) => return self.finish(run, outcome),
        };

        if run.token.is_cancelled() {
            return ReconcileOutcome::Superseded;
        }

        if fresh && !self.persist(run, &assignment).await {
            return ReconcileOutcome::Superseded;
        }

        self.apply(run, &assignment, mode, &ordered, settings).await
    }

    async fn enumerate_displays(&self) -> Vec<DisplayTarget> {
        match self.displays.enumerate().await {
            Ok(displays) => order_for_apply(displays),
            Err(e) => {
                warn!(error = %e, "Display enumeration failed");
                Vec::new()
            }
        }
    }

    /// Persists a fresh pick and drops the override. Returns `false` when the
    /// run was superseded before it could commit.
    async fn persist(&self, run: &Run, assignment: &DailyAssignment) -> bool {
        let _commit = self.commit.lock().await;
        if run.token.is_cancelled() {
            return false;
        }
        if let Err(e) = self.state.save(assignment).await {
            warn!(error = %e, "Failed to persist daily assignment");
        }
        if let Err(e) = self.state.clear_override().await {
            warn!(error = %e, "Failed to clear override");
        }
        true
    }

    async fn apply(
        &self,
        run: &Run,
        assignment: &DailyAssignment,
        mode: AssignmentMode,
        ordered: &[DisplayTarget],
        settings: &Settings,
    ) -> ReconcileOutcome {
        if ordered.is_empty() {
            return self.finish(run, ReconcileOutcome::NoDisplays);
        }

        self.set_state(run, ReconcileState::Applying, "Applying...");
        let displays = apply::apply_to_displays(
            self.cache.as_ref(),
            self.displays.as_ref(),
            assignment,
            ordered,
            settings,
            &run.token,
        )
        .await;

        if run.token.is_cancelled() {
            return ReconcileOutcome::Superseded;
        }

        let failures = displays.iter().filter(|report| !report.succeeded()).count();
        let outcome = if failures == 0 {
            ReconcileOutcome::Updated { mode, displays }
        } else {
            warn!(failures, total = ordered.len(), "Some displays failed to update");
            ReconcileOutcome::UpdatedWithWarnings {
                mode,
                displays,
                failures,
            }
        };
        self.finish(run, outcome)
    }

    fn finish(&self, run: &Run, outcome: ReconcileOutcome) -> ReconcileOutcome {
        if run.token.is_cancelled() {
            return ReconcileOutcome::Superseded;
        }
        match &outcome {
            ReconcileOutcome::Updated { mode, displays }
            | ReconcileOutcome::UpdatedWithWarnings { mode, displays, .. } => {
                self.status
                    .set_applied(outcome.state(), outcome.message(), *mode, displays.clone());
            }
            other => self.status.set_state(other.state(), other.message()),
        }
        outcome
    }

    /// "Surprise me": fetches one random wallpaper, stores it as today's
    /// override and reconciles. Works even when the connectivity monitor says
    /// offline.
    ///
    /// The fetch and the override write are not tied to a run, so a trigger
    /// arriving meanwhile cannot drop the pick. Only the reconcile that
    /// follows takes part in supersession.
    pub async fn surprise(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        let span = info_span!("usecase.surprise.execute", today = %today);

        async {
            self.status.set_state(ReconcileState::Fetching, "Checking...");

            let record = match self.manifest.fetch_random(&settings.selected_channels).await {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Random pick failed");
                    let outcome = ReconcileOutcome::SurpriseFailed(e.to_string());
                    self.status.set_state(outcome.state(), outcome.message());
                    return outcome;
                }
            };
            info!(wallpaper_id = %record.id, "Surprise pick");

            {
                let _commit = self.commit.lock().await;
                if let Err(e) = self.state.save_override(&record, today).await {
                    warn!(error = %e, "Failed to persist override");
                }
            }

            self.reconcile(today, settings).await
        }
        .instrument(span)
        .await
    }

    /// Drops today's override and reconciles back to the daily pick.
    pub async fn reset_to_daily(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        let span = info_span!("usecase.reset_to_daily.execute");

        async {
            self.cancel_in_flight();
            {
                let _commit = self.commit.lock().await;
                if let Err(e) = self.state.clear_override().await {
                    warn!(error = %e, "Failed to clear override");
                }
            }
            self.reconcile(today, settings).await
        }
        .instrument(span)
        .await
    }

    /// Publishes the offline state without touching displays or storage.
    pub fn mark_offline(&self) {
        info!("Connectivity lost");
        self.status.set_state(ReconcileState::Offline, "Offline");
    }
}

#[async_trait]
impl Reconciler for ReconciliationEngine {
    async fn reconcile(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        ReconciliationEngine::reconcile(self, today, settings).await
    }

    async fn surprise(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        ReconciliationEngine::surprise(self, today, settings).await
    }

    async fn reset_to_daily(&self, today: NaiveDate, settings: &Settings) -> ReconcileOutcome {
        ReconciliationEngine::reset_to_daily(self, today, settings).await
    }

    fn mark_offline(&self) {
        ReconciliationEngine::mark_offline(self)
    }

    fn cancel_in_flight(&self) {
        ReconciliationEngine::cancel_in_flight(self)
    }
}
