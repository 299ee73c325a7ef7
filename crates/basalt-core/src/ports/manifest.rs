use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::errors::ManifestError;
use crate::wallpaper::{Channel, WallpaperRecord};

/// Remote catalogue of published wallpapers.
///
/// Implementations are stateless and never retry on their own.
#[async_trait]
pub trait ManifestPort: Send + Sync {
    /// Published records for `channels`, in service order.
    async fn fetch_manifest(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<Vec<WallpaperRecord>, ManifestError>;

    /// One random published record for `channels`, bypassing any caches.
    async fn fetch_random(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<WallpaperRecord, ManifestError>;
}

#[async_trait]
impl<T: ManifestPort + ?Sized> ManifestPort for Arc<T> {
    async fn fetch_manifest(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<Vec<WallpaperRecord>, ManifestError> {
        (**self).fetch_manifest(channels).await
    }

    async fn fetch_random(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<WallpaperRecord, ManifestError> {
        (**self).fetch_random(channels).await
    }
}
