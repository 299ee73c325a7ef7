//! # Engine Dependencies
//!
//! Parameter grouping for [`ReconciliationEngine`](crate::ReconciliationEngine)
//! construction. Not a builder: no defaults, no optional fields.

use std::sync::Arc;

use basalt_core::ports::*;

pub struct ReconcileDeps {
    pub manifest: Arc<dyn ManifestPort>,
    pub cache: Arc<dyn ArtifactCachePort>,
    pub state: Arc<dyn DailyStatePort>,
    pub displays: Arc<dyn DisplayPort>,
    pub connectivity: Arc<dyn ConnectivityPort>,
}
