//! Mozilla product-details integration for Firefox, Focus and Klar
//!
//! `mobile_versions.json` names the current version of each channel,
//! `mobile_android.json` records when it shipped and archive.mozilla.org
//! hosts one APK per ABI under a fixed path layout.

use std::collections::HashMap;

use serde::Deserialize;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, send_json};
use crate::release::strategies::timestamp::parse_date;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

const DEFAULT_PRODUCT_DETAILS_URL: &str = "https://product-details.mozilla.org";
const DEFAULT_ARCHIVE_URL: &str = "https://archive.mozilla.org";

const MOBILE_ABIS: [Abi; 3] = [Abi::Arm64V8a, Abi::ArmeabiV7a, Abi::X86_64];

#[derive(Debug, Deserialize)]
struct MobileVersions {
    version: Option<String>,
    beta_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MobileReleases {
    releases: HashMap<String, MobileRelease>,
}

#[derive(Debug, Deserialize)]
struct MobileRelease {
    date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MozillaChannel {
    Release,
    Beta,
}

/// Which product a strategy resolves and where its APKs live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MozillaProduct {
    /// Directory under `/pub/`, e.g. `fenix` or `focus`
    pub archive_dir: &'static str,
    /// Prefix of the APK file name, e.g. `fenix`, `focus`, `klar`
    pub file_prefix: &'static str,
    pub channel: MozillaChannel,
}

pub struct MozillaProductStrategy {
    product_details_url: String,
    archive_url: String,
    product: MozillaProduct,
}

impl MozillaProductStrategy {
    pub fn new(product_details_url: &str, archive_url: &str, product: MozillaProduct) -> Self {
        Self {
            product_details_url: product_details_url.to_string(),
            archive_url: archive_url.to_string(),
            product,
        }
    }

    pub fn product(product: MozillaProduct) -> Self {
        Self::new(DEFAULT_PRODUCT_DETAILS_URL, DEFAULT_ARCHIVE_URL, product)
    }

    fn artifact_url(&self, version: &str, abi: Abi) -> Result<url::Url, FetchError> {
        let MozillaProduct {
            archive_dir,
            file_prefix,
            ..
        } = self.product;
        join(
            &self.archive_url,
            &format!(
                "pub/{archive_dir}/releases/{version}/android/{file_prefix}-{version}-android-{abi}/{file_prefix}-{version}.multi.android-{abi}.apk"
            ),
        )
    }
}

#[async_trait::async_trait]
impl FetchStrategy for MozillaProductStrategy {
    fn name(&self) -> &'static str {
        "mozilla_product_details"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let versions: MobileVersions = send_json(
            ctx,
            HttpRequest::get(join(&self.product_details_url, "1.0/mobile_versions.json")?),
        )
        .await?;

        let version = match self.product.channel {
            MozillaChannel::Release => versions.version,
            MozillaChannel::Beta => versions.beta_version,
        }
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            FetchError::Parse(format!(
                "mobile_versions.json has no {:?} version",
                self.product.channel
            ))
        })?;

        let releases: MobileReleases = send_json(
            ctx,
            HttpRequest::get(join(&self.product_details_url, "1.0/mobile_android.json")?),
        )
        .await?;

        let release_key = format!("{}-{}", self.product.archive_dir, version);
        let release = releases.releases.get(&release_key).ok_or_else(|| {
            FetchError::Parse(format!("mobile_android.json has no entry {release_key}"))
        })?;

        let artifacts = MOBILE_ABIS
            .iter()
            .map(|abi| Ok(Artifact::for_abi(self.artifact_url(&version, *abi)?, *abi)))
            .collect::<Result<Vec<_>, FetchError>>()?;

        Ok(ReleaseCandidate {
            published_at: parse_date(&release.date)?,
            version_text: version,
            artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;
    use crate::release::transport::ReqwestTransport;
    use mockito::Server;

    const VERSIONS: &str = r#"{
        "version": "131.0.3",
        "beta_version": "132.0b5",
        "nightly_version": "133.0a1"
    }"#;

    const RELEASES: &str = r#"{
        "releases": {
            "fenix-131.0.3": {"category": "stability", "date": "2024-10-14", "version": "131.0.3"},
            "fenix-132.0b5": {"category": "dev", "date": "2024-10-11", "version": "132.0b5"},
            "focus-131.0.3": {"category": "stability", "date": "2024-10-15", "version": "131.0.3"}
        }
    }"#;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(&TransportConfig::default()).unwrap()
    }

    async fn mock_manifests(server: &mut mockito::ServerGuard) -> (mockito::Mock, mockito::Mock) {
        let versions = server
            .mock("GET", "/1.0/mobile_versions.json")
            .with_status(200)
            .with_body(VERSIONS)
            .create_async()
            .await;
        let releases = server
            .mock("GET", "/1.0/mobile_android.json")
            .with_status(200)
            .with_body(RELEASES)
            .create_async()
            .await;
        (versions, releases)
    }

    #[tokio::test]
    async fn fetch_latest_resolves_beta_channel_with_archive_urls() {
        let mut server = Server::new_async().await;
        let (versions_mock, releases_mock) = mock_manifests(&mut server).await;

        let transport = transport();
        let strategy = MozillaProductStrategy::new(
            &server.url(),
            "https://archive.mozilla.org",
            MozillaProduct {
                archive_dir: "fenix",
                file_prefix: "fenix",
                channel: MozillaChannel::Beta,
            },
        );
        let candidate = strategy
            .fetch_latest(&FetchContext::new(&transport))
            .await
            .unwrap();

        versions_mock.assert_async().await;
        releases_mock.assert_async().await;
        assert_eq!(candidate.version_text, "132.0b5");
        assert_eq!(candidate.published_at, parse_date("2024-10-11").unwrap());
        assert_eq!(candidate.artifacts.len(), 3);
        assert_eq!(
            candidate.artifacts[0].url.as_str(),
            "https://archive.mozilla.org/pub/fenix/releases/132.0b5/android/fenix-132.0b5-android-arm64-v8a/fenix-132.0b5.multi.android-arm64-v8a.apk"
        );
    }

    #[tokio::test]
    async fn fetch_latest_uses_file_prefix_for_klar() {
        let mut server = Server::new_async().await;
        let (_versions_mock, _releases_mock) = mock_manifests(&mut server).await;

        let transport = transport();
        let strategy = MozillaProductStrategy::new(
            &server.url(),
            "https://archive.mozilla.org",
            MozillaProduct {
                archive_dir: "focus",
                file_prefix: "klar",
                channel: MozillaChannel::Release,
            },
        );
        let candidate = strategy
            .fetch_latest(&FetchContext::new(&transport))
            .await
            .unwrap();

        assert_eq!(candidate.version_text, "131.0.3");
        assert_eq!(candidate.published_at, parse_date("2024-10-15").unwrap());
        assert_eq!(
            candidate.artifacts[1].url.as_str(),
            "https://archive.mozilla.org/pub/focus/releases/131.0.3/android/klar-131.0.3-android-armeabi-v7a/klar-131.0.3.multi.android-armeabi-v7a.apk"
        );
    }

    #[tokio::test]
    async fn fetch_latest_returns_parse_failure_when_release_entry_missing() {
        let mut server = Server::new_async().await;
        let (_versions_mock, _releases_mock) = mock_manifests(&mut server).await;

        let transport = transport();
        let strategy = MozillaProductStrategy::new(
            &server.url(),
            "https://archive.mozilla.org",
            MozillaProduct {
                archive_dir: "focus",
                file_prefix: "focus",
                channel: MozillaChannel::Beta,
            },
        );
        let result = strategy.fetch_latest(&FetchContext::new(&transport)).await;

        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
