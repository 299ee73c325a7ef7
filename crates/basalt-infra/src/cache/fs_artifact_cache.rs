use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use basalt_core::ports::{ArtifactCachePort, CacheEntry, CacheError};
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, info, warn};

/// Files at or below this size are never trusted.
pub const MIN_ARTIFACT_BYTES: u64 = 1000;

const PARTIAL_DIR: &str = ".partial";
const ERROR_BODY_LIMIT: usize = 512;
const KEY_PREFIX_LEN: usize = 32;

/// Artifact cache on the local filesystem.
///
/// Artifacts are addressed by a hash of the resolved URL and the wallpaper id,
/// so a different display geometry or overlay yields a different file. Entries
/// are never evicted.
pub struct FsArtifactCache {
    root: PathBuf,
    client: reqwest::Client,
}

impl FsArtifactCache {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build artifact download client failed")?;
        Ok(Self::with_client(root, client))
    }

    pub fn with_client(root: impl Into<PathBuf>, client: reqwest::Client) -> Self {
        Self {
            root: root.into(),
            client,
        }
    }

    /// Hex SHA-256 of `resolved_url` and `wallpaper_id`.
    pub fn cache_key(resolved_url: &str, wallpaper_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(resolved_url.as_bytes());
        hasher.update(b"\n");
        hasher.update(wallpaper_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn path_for(&self, resolved_url: &str, wallpaper_id: &str) -> PathBuf {
        let key = Self::cache_key(resolved_url, wallpaper_id);
        self.root.join(file_name(wallpaper_id, &key))
    }

    /// Size of a reusable file at `path`. Undersized leftovers are removed.
    async fn reusable_size(&self, path: &Path) -> Option<u64> {
        match fs::metadata(path).await {
            Ok(meta) if meta.is_file() && meta.len() > MIN_ARTIFACT_BYTES => Some(meta.len()),
            Ok(meta) => {
                debug!(path = %path.display(), size = meta.len(), "Discarding undersized artifact");
                if let Err(e) = fs::remove_file(path).await {
                    warn!(path = %path.display(), error = %e, "Failed to remove undersized artifact");
                }
                None
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat cached artifact");
                None
            }
        }
    }

    async fn download(&self, resolved_url: &str) -> Result<Vec<u8>, CacheError> {
        let response = self
            .client
            .get(resolved_url)
            .send()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CacheError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CacheError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// Writes to a unique partial file, then renames it over `dest`. Whatever
    /// raced into `dest` meanwhile is replaced; readers never see the path
    /// missing unless the plain rename fails.
    async fn store(&self, bytes: &[u8], dest: &Path) -> Result<(), CacheError> {
        let partial_dir = self.root.join(PARTIAL_DIR);
        fs::create_dir_all(&partial_dir)
            .await
            .map_err(|e| CacheError::Io(format!("create {}: {e}", partial_dir.display())))?;

        let tmp = partial_dir.join(format!("{}.part", uuid::Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(CacheError::Io(format!("write {}: {e}", tmp.display())));
        }

        if let Err(first) = fs::rename(&tmp, dest).await {
            debug!(path = %dest.display(), error = %first, "Rename failed, removing destination first");
            match fs::remove_file(dest).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %dest.display(), error = %e, "Failed to remove existing artifact"),
            }
            if let Err(e) = fs::rename(&tmp, dest).await {
                let _ = fs::remove_file(&tmp).await;
                return Err(CacheError::Io(format!("move into {}: {e}", dest.display())));
            }
        }
        Ok(())
    }
}

fn file_name(wallpaper_id: &str, key: &str) -> String {
    let safe_id: String = wallpaper_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("wallpaper_{}_{}.jpg", safe_id, &key[..KEY_PREFIX_LEN])
}

#[async_trait]
impl ArtifactCachePort for FsArtifactCache {
    async fn obtain(
        &self,
        resolved_url: &str,
        wallpaper_id: &str,
    ) -> Result<CacheEntry, CacheError> {
        let key = Self::cache_key(resolved_url, wallpaper_id);
        let path = self.root.join(file_name(wallpaper_id, &key));

        if let Some(size_bytes) = self.reusable_size(&path).await {
            debug!(wallpaper_id, path = %path.display(), "Artifact cache hit");
            return Ok(CacheEntry {
                key,
                path,
                size_bytes,
            });
        }

        let bytes = self.download(resolved_url).await?;
        let size_bytes = bytes.len() as u64;
        if size_bytes <= MIN_ARTIFACT_BYTES {
            warn!(wallpaper_id, size = size_bytes, "Downloaded artifact too small");
            return Err(CacheError::TooSmall { size: size_bytes });
        }
        if image::guess_format(&bytes).is_err() {
            warn!(wallpaper_id, size = size_bytes, "Downloaded artifact is not an image");
            return Err(CacheError::NotAnImage);
        }

        self.store(&bytes, &path).await?;
        info!(wallpaper_id, size = size_bytes, path = %path.display(), "Artifact downloaded");

        Ok(CacheEntry {
            key,
            path,
            size_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use tempfile::TempDir;

    fn png_bytes(len: usize) -> Vec<u8> {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(len, 0);
        bytes
    }

    fn cache(dir: &TempDir) -> FsArtifactCache {
        FsArtifactCache::new(dir.path(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn second_obtain_is_served_from_disk() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/image/upload/w_1920,h_1080,c_fill/a.jpg")
            .with_status(200)
            .with_body(png_bytes(4096))
            .expect(1)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let url = format!("{}/image/upload/w_1920,h_1080,c_fill/a.jpg", server.url());

        let first = cache.obtain(&url, "a").await.unwrap();
        let second = cache.obtain(&url, "a").await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.size_bytes, 4096);
        assert!(first.path.exists());
    }

    #[tokio::test]
    async fn undersized_file_on_disk_is_refetched() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/b.jpg")
            .with_status(200)
            .with_body(png_bytes(2048))
            .expect(1)
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let url = format!("{}/b.jpg", server.url());
        let path = cache.path_for(&url, "b");
        std::fs::write(&path, b"truncated").unwrap();

        let entry = cache.obtain(&url, "b").await.unwrap();

        mock.assert_async().await;
        assert_eq!(entry.path, path);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn too_small_download_is_rejected_and_not_stored() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/tiny.jpg")
            .with_status(200)
            .with_body(png_bytes(1000))
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let url = format!("{}/tiny.jpg", server.url());

        let err = cache.obtain(&url, "tiny").await.unwrap_err();

        assert_eq!(err, CacheError::TooSmall { size: 1000 });
        assert!(!cache.path_for(&url, "tiny").exists());
    }

    #[tokio::test]
    async fn non_image_payload_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/page")
            .with_status(200)
            .with_body("<html>".repeat(400))
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        let err = cache
            .obtain(&format!("{}/page", server.url()), "p")
            .await
            .unwrap_err();

        assert_eq!(err, CacheError::NotAnImage);
    }

    #[tokio::test]
    async fn error_status_carries_truncated_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/missing.jpg")
            .with_status(404)
            .with_body("x".repeat(2000))
            .create_async()
            .await;
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);

        let err = cache
            .obtain(&format!("{}/missing.jpg", server.url()), "m")
            .await
            .unwrap_err();

        match err {
            CacheError::HttpStatus { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body.len(), ERROR_BODY_LIMIT);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_replaces_an_existing_artifact() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        let dest = cache.path_for("https://cdn/c.jpg", "c");
        std::fs::write(&dest, png_bytes(1500)).unwrap();

        cache.store(&png_bytes(3000), &dest).await.unwrap();

        assert_eq!(std::fs::metadata(&dest).unwrap().len(), 3000);
        let leftovers = std::fs::read_dir(dir.path().join(PARTIAL_DIR)).unwrap().count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn key_depends_on_url_and_id() {
        let a = FsArtifactCache::cache_key("https://cdn/x.jpg", "1");
        assert_eq!(a, FsArtifactCache::cache_key("https://cdn/x.jpg", "1"));
        assert_ne!(a, FsArtifactCache::cache_key("https://cdn/x.jpg", "2"));
        assert_ne!(a, FsArtifactCache::cache_key("https://cdn/y.jpg", "1"));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn file_name_sanitizes_id() {
        let key = FsArtifactCache::cache_key("u", "../evil id");
        let name = file_name("../evil id", &key);
        assert!(name.starts_with("wallpaper____evil_id_"));
        assert!(name.ends_with(".jpg"));
        assert!(!name.contains('/'));
    }
}
