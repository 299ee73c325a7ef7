//! Latest engine status, observable by any number of subscribers.

use basalt_core::{AssignmentMode, DisplayReport, EngineStatus, ReconcileState};
use tokio::sync::watch;

#[derive(Clone)]
pub struct StatusBoard {
    tx: watch::Sender<EngineStatus>,
}

impl StatusBoard {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(EngineStatus::ready());
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<EngineStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> EngineStatus {
        self.tx.borrow().clone()
    }

    /// Moves to `state`, keeping the last apply results.
    pub fn set_state(&self, state: ReconcileState, message: impl Into<String>) {
        let message = message.into();
        self.tx.send_modify(|status| {
            status.state = state;
            status.message = message;
        });
    }

    /// Records a completed apply pass.
    pub fn set_applied(
        &self,
        state: ReconcileState,
        message: impl Into<String>,
        mode: AssignmentMode,
        displays: Vec<DisplayReport>,
    ) {
        self.tx.send_replace(EngineStatus {
            state,
            message: message.into(),
            mode: Some(mode),
            displays,
        });
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribers_see_latest_state() {
        let board = StatusBoard::new();
        let rx = board.subscribe();

        board.set_state(ReconcileState::Checking, "Checking...");

        assert_eq!(rx.borrow().state, ReconcileState::Checking);
        assert_eq!(board.current().message, "Checking...");
    }

    #[test]
    fn set_state_keeps_previous_display_reports() {
        let board = StatusBoard::new();
        board.set_applied(
            ReconcileState::Done,
            "Updated!",
            AssignmentMode::Daily,
            Vec::new(),
        );

        board.set_state(ReconcileState::Offline, "Offline");

        let status = board.current();
        assert_eq!(status.state, ReconcileState::Offline);
        assert_eq!(status.mode, Some(AssignmentMode::Daily));
    }
}
