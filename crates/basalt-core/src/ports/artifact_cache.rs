use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::errors::CacheError;

/// A downloaded artifact that passed the plausibility checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Maps a resolved URL to a valid local file, downloading it when needed.
#[async_trait]
pub trait ArtifactCachePort: Send + Sync {
    async fn obtain(&self, resolved_url: &str, wallpaper_id: &str)
        -> Result<CacheEntry, CacheError>;
}

#[async_trait]
impl<T: ArtifactCachePort + ?Sized> ArtifactCachePort for Arc<T> {
    async fn obtain(
        &self,
        resolved_url: &str,
        wallpaper_id: &str,
    ) -> Result<CacheEntry, CacheError> {
        (**self).obtain(resolved_url, wallpaper_id).await
    }
}
