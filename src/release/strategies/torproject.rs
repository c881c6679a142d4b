//! Tor Browser for Android integration
//!
//! The updater service publishes one small JSON manifest per architecture
//! naming the current version and binary. The manifests carry no date, so the
//! release directory listing on dist.torproject.org is scraped for the
//! modification time of the aarch64 APK.

use regex::Regex;
use serde::Deserialize;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, parse_url, send, send_json};
use crate::release::strategies::timestamp::parse_listing;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

const DEFAULT_UPDATE_URL: &str = "https://aus1.torproject.org";
const DEFAULT_DIST_URL: &str = "https://dist.torproject.org";

/// Architecture names used by Tor, primary first
const ARCHITECTURES: [(&str, Abi); 4] = [
    ("aarch64", Abi::Arm64V8a),
    ("armv7", Abi::ArmeabiV7a),
    ("x86_64", Abi::X86_64),
    ("x86", Abi::X86),
];

#[derive(Debug, Deserialize)]
struct DownloadManifest {
    binary: String,
    version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorChannel {
    Release,
    Alpha,
}

impl TorChannel {
    fn as_str(&self) -> &'static str {
        match self {
            TorChannel::Release => "release",
            TorChannel::Alpha => "alpha",
        }
    }
}

pub struct TorProjectStrategy {
    update_url: String,
    dist_url: String,
    channel: TorChannel,
}

impl TorProjectStrategy {
    pub fn new(update_url: &str, dist_url: &str, channel: TorChannel) -> Self {
        Self {
            update_url: update_url.to_string(),
            dist_url: dist_url.to_string(),
            channel,
        }
    }

    pub fn channel(channel: TorChannel) -> Self {
        Self::new(DEFAULT_UPDATE_URL, DEFAULT_DIST_URL, channel)
    }

    async fn manifest(
        &self,
        ctx: &FetchContext<'_>,
        arch: &str,
    ) -> Result<DownloadManifest, FetchError> {
        let url = join(
            &self.update_url,
            &format!(
                "torbrowser/update_3/{}/download-android-{arch}.json",
                self.channel.as_str()
            ),
        )?;
        send_json(ctx, HttpRequest::get(url)).await
    }

    async fn listing_time(
        &self,
        ctx: &FetchContext<'_>,
        version: &str,
        file_name: &str,
    ) -> Result<String, FetchError> {
        let url = join(&self.dist_url, &format!("torbrowser/{version}/"))?;
        let listing = send(ctx, HttpRequest::get(url)).await?;

        let pattern = format!(
            r"{}</a>\s+(\d{{4}}-\d{{2}}-\d{{2}} \d{{2}}:\d{{2}})",
            regex::escape(file_name)
        );
        let re = Regex::new(&pattern).map_err(|e| FetchError::Parse(e.to_string()))?;
        re.captures(&listing.body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| FetchError::Parse(format!("{file_name} not found in listing")))
    }
}

#[async_trait::async_trait]
impl FetchStrategy for TorProjectStrategy {
    fn name(&self) -> &'static str {
        "torproject"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let mut version = None;
        let mut artifacts = Vec::new();
        for (arch, abi) in ARCHITECTURES {
            let manifest = self.manifest(ctx, arch).await?;
            match &version {
                None => version = Some(manifest.version.clone()),
                Some(v) if *v != manifest.version => {
                    return Err(FetchError::Parse(format!(
                        "Manifest for {arch} names {} instead of {v}",
                        manifest.version
                    )));
                }
                Some(_) => {}
            }
            artifacts.push(Artifact::for_abi(parse_url(&manifest.binary)?, abi));
        }

        let version = version.ok_or_else(|| FetchError::Parse("No manifest".to_string()))?;
        let primary = &artifacts[0].url;
        let file_name = primary
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .ok_or_else(|| FetchError::Parse(format!("No file name in {primary}")))?
            .to_string();
        let listed = self.listing_time(ctx, &version, &file_name).await?;

        Ok(ReleaseCandidate {
            published_at: parse_listing(&listed)?,
            version_text: version,
            artifacts,
        })
    }
}
