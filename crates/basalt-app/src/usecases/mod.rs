//! Business logic use cases.
//!
//! Everything funnels into [`reconcile::ReconciliationEngine::reconcile`]:
//! surprise and reset-to-daily only adjust the override before reconciling.

pub mod reconcile;
