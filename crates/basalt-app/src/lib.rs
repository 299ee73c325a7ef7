//! Basalt application orchestration layer.
//!
//! Use cases (reconcile, surprise, reset to daily) and the lifecycle scheduler
//! that turns OS and user events into debounced reconciliations.

pub mod deps;
pub mod lifecycle;
pub mod status_board;
pub mod usecases;

pub use deps::ReconcileDeps;
pub use lifecycle::{LifecycleScheduler, Reconciler, SchedulerTiming};
pub use status_board::StatusBoard;
pub use usecases::reconcile::ReconciliationEngine;
