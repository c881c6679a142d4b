//! Chromium continuous snapshot integration
//!
//! The primary platform folder's `LAST_CHANGE` names the newest revision. Each
//! platform folder is then looked up at that revision through the Cloud Storage
//! JSON API; a platform whose build is missing at that revision is skipped.

use serde::Deserialize;
use tracing::debug;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, parse_url, send, send_json};
use crate::release::strategies::timestamp::parse_rfc3339;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

const DEFAULT_STORAGE_URL: &str = "https://storage.googleapis.com";
const DEFAULT_API_URL: &str = "https://www.googleapis.com";

const BUCKET: &str = "chromium-browser-snapshots";
const ARCHIVE_NAME: &str = "chrome-android.zip";

/// Snapshot folders, primary first
const PLATFORMS: [(&str, Abi); 2] = [("Android_Arm64", Abi::Arm64V8a), ("Android", Abi::ArmeabiV7a)];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StorageObject {
    updated: String,
    media_link: String,
}

pub struct ChromiumSnapshotStrategy {
    storage_url: String,
    api_url: String,
}

impl ChromiumSnapshotStrategy {
    pub fn new(storage_url: &str, api_url: &str) -> Self {
        Self {
            storage_url: storage_url.to_string(),
            api_url: api_url.to_string(),
        }
    }

    async fn object(
        &self,
        ctx: &FetchContext<'_>,
        platform: &str,
        revision: &str,
    ) -> Result<StorageObject, FetchError> {
        let url = join(
            &self.api_url,
            &format!("storage/v1/b/{BUCKET}/o/{platform}%2F{revision}%2F{ARCHIVE_NAME}"),
        )?;
        send_json(ctx, HttpRequest::get(url)).await
    }
}

impl Default for ChromiumSnapshotStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_STORAGE_URL, DEFAULT_API_URL)
    }
}

#[async_trait::async_trait]
impl FetchStrategy for ChromiumSnapshotStrategy {
    fn name(&self) -> &'static str {
        "chromium_snapshots"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let (primary, _) = PLATFORMS[0];
        let last_change = join(&self.storage_url, &format!("{BUCKET}/{primary}/LAST_CHANGE"))?;
        let response = send(ctx, HttpRequest::get(last_change)).await?;

        let revision = response.body.trim().to_string();
        if revision.is_empty() || !revision.chars().all(|c| c.is_ascii_digit()) {
            return Err(FetchError::Parse(format!(
                "LAST_CHANGE is not a revision: {revision:?}"
            )));
        }

        let primary_object = self.object(ctx, primary, &revision).await?;
        let mut artifacts = vec![Artifact::for_abi(
            parse_url(&primary_object.media_link)?,
            PLATFORMS[0].1,
        )];

        for (platform, abi) in &PLATFORMS[1..] {
            match self.object(ctx, platform, &revision).await {
                Ok(object) => {
                    artifacts.push(Artifact::for_abi(parse_url(&object.media_link)?, *abi))
                }
                Err(FetchError::Unavailable(e)) => {
                    debug!("No {} snapshot at r{}: {}", platform, revision, e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(ReleaseCandidate {
            published_at: parse_rfc3339(&primary_object.updated)?,
            version_text: revision,
            artifacts,
        })
    }
}
