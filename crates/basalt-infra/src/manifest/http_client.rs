use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use basalt_core::ports::{ManifestError, ManifestPort};
use basalt_core::{Channel, WallpaperRecord};
use chrono::Utc;
use reqwest::header::CACHE_CONTROL;
use reqwest::StatusCode;
use tracing::{debug, info_span, Instrument};

/// Random picks must never be served from a cache and are given their own,
/// short deadline.
const RANDOM_TIMEOUT: Duration = Duration::from_secs(10);

/// Stateless client for the wallpaper manifest service. No retries.
pub struct HttpManifestClient {
    client: reqwest::Client,
    manifest_url: String,
    random_url: String,
}

impl HttpManifestClient {
    pub fn new(
        manifest_url: impl Into<String>,
        random_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build manifest HTTP client failed")?;
        Ok(Self {
            client,
            manifest_url: manifest_url.into(),
            random_url: random_url.into(),
        })
    }
}

/// `channel` is only sent for a strict, non-empty subset of the channels.
fn channel_param(channels: &BTreeSet<Channel>) -> Option<String> {
    if channels.is_empty() || Channel::ALL.iter().all(|c| channels.contains(c)) {
        return None;
    }
    Some(
        channels
            .iter()
            .map(Channel::as_str)
            .collect::<Vec<_>>()
            .join(","),
    )
}

fn base_query(channels: &BTreeSet<Channel>) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(channel) = channel_param(channels) {
        query.push(("channel", channel));
    }
    query.push(("published", "true".to_string()));
    query
}

fn transport(e: reqwest::Error) -> ManifestError {
    ManifestError::Transport(e.to_string())
}

#[async_trait]
impl ManifestPort for HttpManifestClient {
    async fn fetch_manifest(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<Vec<WallpaperRecord>, ManifestError> {
        let span = info_span!("infra.manifest.fetch", url = %self.manifest_url);
        async {
            let response = self
                .client
                .get(&self.manifest_url)
                .query(&base_query(channels))
                .send()
                .await
                .map_err(transport)?;

            if response.status() != StatusCode::OK {
                return Err(ManifestError::Status {
                    status: response.status().as_u16(),
                });
            }

            let records: Vec<WallpaperRecord> = response
                .json()
                .await
                .map_err(|e| ManifestError::Decode(e.to_string()))?;
            debug!(count = records.len(), "Manifest fetched");
            Ok(records)
        }
        .instrument(span)
        .await
    }

    async fn fetch_random(
        &self,
        channels: &BTreeSet<Channel>,
    ) -> Result<WallpaperRecord, ManifestError> {
        let span = info_span!("infra.manifest.fetch_random", url = %self.random_url);
        async {
            let mut query = base_query(channels);
            query.push(("t", Utc::now().timestamp().to_string()));

            let response = self
                .client
                .get(&self.random_url)
                .query(&query)
                .header(CACHE_CONTROL, "no-cache")
                .timeout(RANDOM_TIMEOUT)
                .send()
                .await
                .map_err(transport)?;

            if response.status() != StatusCode::OK {
                return Err(ManifestError::Status {
                    status: response.status().as_u16(),
                });
            }

            response
                .json()
                .await
                .map_err(|e| ManifestError::Decode(e.to_string()))
        }
        .instrument(span)
        .await
    }
}
