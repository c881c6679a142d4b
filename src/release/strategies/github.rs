//! GitHub Releases API integration
//!
//! Most cataloged apps publish APKs as release assets. A strategy is configured
//! with the repository, a filter choosing the release (stable, pre-release,
//! name or tag prefix), a function deriving the version text and rules mapping
//! asset file names to ABIs.

use serde::Deserialize;
use tracing::debug;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, parse_url, send_json};
use crate::release::strategies::timestamp::parse_rfc3339;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

/// Default base URL for GitHub API
const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Releases per listing page when the latest one has to be searched for
const RELEASES_PER_PAGE: usize = 30;

/// Listing pages read before giving up on a search
const MAX_PAGES: usize = 5;

/// Response from GitHub Releases API
#[derive(Debug, Clone, Deserialize)]
pub struct GithubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<GithubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GithubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Chooses which release counts as the latest one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseFilter {
    /// Search the release listing instead of asking `/releases/latest`
    search: bool,
    /// `Some(true)` only pre-releases, `Some(false)` only stable releases
    prerelease: Option<bool>,
    name_prefix: Option<&'static str>,
    tag_prefix: Option<&'static str>,
}

impl ReleaseFilter {
    /// The release GitHub itself marks as latest
    pub fn latest() -> Self {
        Self::default()
    }

    /// The newest non-draft release of any kind
    pub fn any() -> Self {
        Self {
            search: true,
            ..Self::default()
        }
    }

    pub fn stable() -> Self {
        Self {
            prerelease: Some(false),
            ..Self::any()
        }
    }

    pub fn prerelease() -> Self {
        Self {
            prerelease: Some(true),
            ..Self::any()
        }
    }

    pub fn name_prefix(mut self, prefix: &'static str) -> Self {
        self.search = true;
        self.name_prefix = Some(prefix);
        self
    }

    pub fn tag_prefix(mut self, prefix: &'static str) -> Self {
        self.search = true;
        self.tag_prefix = Some(prefix);
        self
    }

    fn matches(&self, release: &GithubRelease) -> bool {
        !release.draft
            && self.prerelease.is_none_or(|p| p == release.prerelease)
            && self.name_prefix.is_none_or(|prefix| {
                release
                    .name
                    .as_deref()
                    .is_some_and(|name| name.starts_with(prefix))
            })
            && self
                .tag_prefix
                .is_none_or(|prefix| release.tag_name.starts_with(prefix))
    }
}

/// Maps release assets to ABIs by file name
///
/// An asset matches when its name ends with `.apk` and contains every fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRule {
    pub abi: Option<Abi>,
    pub fragments: &'static [&'static str],
}

impl AssetRule {
    pub fn abi(abi: Abi, fragments: &'static [&'static str]) -> Self {
        Self {
            abi: Some(abi),
            fragments,
        }
    }

    pub fn universal(fragments: &'static [&'static str]) -> Self {
        Self {
            abi: None,
            fragments,
        }
    }

    fn matches(&self, asset_name: &str) -> bool {
        asset_name.ends_with(".apk") && self.fragments.iter().all(|f| asset_name.contains(f))
    }
}

/// Derives the version text from a release
pub type VersionExtractor = fn(&GithubRelease) -> String;

/// Version text is the tag without a leading `v`
pub fn tag_without_v(release: &GithubRelease) -> String {
    release.tag_name.trim_start_matches('v').to_string()
}

pub struct GithubReleaseStrategy {
    base_url: String,
    repository: &'static str,
    filter: ReleaseFilter,
    asset_rules: Vec<AssetRule>,
    version: VersionExtractor,
    token: Option<String>,
}

impl GithubReleaseStrategy {
    /// Creates a strategy for `owner/repo` against a custom base URL
    pub fn new(base_url: &str, repository: &'static str) -> Self {
        Self {
            base_url: base_url.to_string(),
            repository,
            filter: ReleaseFilter::latest(),
            asset_rules: Vec::new(),
            version: tag_without_v,
            token: None,
        }
    }

    /// Creates a strategy for `owner/repo` against api.github.com
    pub fn repository(repository: &'static str) -> Self {
        Self::new(DEFAULT_BASE_URL, repository)
    }

    pub fn filter(mut self, filter: ReleaseFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn asset(mut self, rule: AssetRule) -> Self {
        self.asset_rules.push(rule);
        self
    }

    pub fn version(mut self, extractor: VersionExtractor) -> Self {
        self.version = extractor;
        self
    }

    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn request(&self, path: &str) -> Result<HttpRequest, FetchError> {
        let url = join(&self.base_url, &format!("repos/{}/{}", self.repository, path))?;
        let request = HttpRequest::get(url).header("Accept", "application/vnd.github+json");
        Ok(match &self.token {
            Some(token) => request.header("Authorization", &format!("Bearer {token}")),
            None => request,
        })
    }

    async fn find_release(&self, ctx: &FetchContext<'_>) -> Result<GithubRelease, FetchError> {
        if !self.filter.search {
            return send_json(ctx, self.request("releases/latest")?).await;
        }

        for page in 1..=MAX_PAGES {
            let releases: Vec<GithubRelease> = send_json(
                ctx,
                self.request(&format!(
                    "releases?per_page={RELEASES_PER_PAGE}&page={page}"
                ))?,
            )
            .await?;
            let last_page = releases.len() < RELEASES_PER_PAGE;

            if let Some(release) = releases.into_iter().find(|r| self.filter.matches(r)) {
                return Ok(release);
            }
            if last_page {
                break;
            }
            debug!("{}: no match on page {}", self.repository, page);
        }

        Err(FetchError::Parse(format!(
            "No release of {} matches {:?}",
            self.repository, self.filter
        )))
    }

    fn artifacts(&self, release: &GithubRelease) -> Result<Vec<Artifact>, FetchError> {
        let mut artifacts = Vec::new();
        for asset in &release.assets {
            let Some(rule) = self.asset_rules.iter().find(|r| r.matches(&asset.name)) else {
                continue;
            };
            let artifact = Artifact {
                url: parse_url(&asset.browser_download_url)?,
                abi: rule.abi,
                sha256: asset.digest.as_deref().and_then(parse_sha256_digest),
            };
            artifacts.push(artifact);
        }

        if artifacts.is_empty() {
            return Err(FetchError::Parse(format!(
                "Release {} of {} has no matching APK asset",
                release.tag_name, self.repository
            )));
        }
        Ok(artifacts)
    }
}

#[async_trait::async_trait]
impl FetchStrategy for GithubReleaseStrategy {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let release = self.find_release(ctx).await?;
        debug!("{}: found release {}", self.repository, release.tag_name);

        let published_at = release.published_at.as_deref().ok_or_else(|| {
            FetchError::Parse(format!("Release {} has no publish date", release.tag_name))
        })?;

        Ok(ReleaseCandidate {
            version_text: (self.version)(&release),
            published_at: parse_rfc3339(published_at)?,
            artifacts: self.artifacts(&release)?,
        })
    }
}

/// `sha256:<64 hex>` as reported in the asset `digest` field
fn parse_sha256_digest(digest: &str) -> Option<String> {
    let (algorithm, hash) = digest.split_once(':')?;
    if !algorithm.eq_ignore_ascii_case("sha256") {
        return None;
    }
    if hash.len() != 64 || !hash.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    Some(hash.to_ascii_lowercase())
}
