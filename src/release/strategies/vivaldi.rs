//! Vivaldi download page scraping
//!
//! Vivaldi has no release API. The download page links one APK per ABI; the
//! newest version among those links wins and the `Last-Modified` header of
//! its primary APK is taken as the publish time.

use regex::Regex;
use tracing::debug;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, parse_url, send};
use crate::release::strategies::timestamp::parse_http_date;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;
use crate::release::version::find_latest;

const DEFAULT_PAGE_URL: &str = "https://vivaldi.com";
const DOWNLOAD_PAGE: &str = "download/";

fn link_abi(tag: &str) -> Option<Abi> {
    match tag {
        "arm64-v8a" => Some(Abi::Arm64V8a),
        "armeabi-v7a" => Some(Abi::ArmeabiV7a),
        "x86-64" => Some(Abi::X86_64),
        _ => None,
    }
}

struct ApkLink {
    url: String,
    version: String,
    abi: Abi,
}

fn scrape_links(link_re: &Regex, page: &str) -> Vec<ApkLink> {
    link_re
        .captures_iter(page)
        .filter_map(|caps| {
            Some(ApkLink {
                url: caps.get(0)?.as_str().to_string(),
                version: caps.get(1)?.as_str().to_string(),
                abi: link_abi(caps.get(2)?.as_str())?,
            })
        })
        .collect()
}

pub struct VivaldiPageStrategy {
    page_url: String,
    link_re: Regex,
}

impl VivaldiPageStrategy {
    pub fn new(page_url: &str) -> Self {
        Self {
            page_url: page_url.to_string(),
            // Match: .../stable/Vivaldi.6.9.3447.48_arm64-v8a.apk
            link_re: Regex::new(
                r#"https?://[^"'\s<>]+/stable/Vivaldi\.(\d+(?:\.\d+)+)_(arm64-v8a|armeabi-v7a|x86-64)\.apk"#,
            )
            .unwrap(),
        }
    }
}

impl Default for VivaldiPageStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_URL)
    }
}

#[async_trait::async_trait]
impl FetchStrategy for VivaldiPageStrategy {
    fn name(&self) -> &'static str {
        "vivaldi_page"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let page = send(ctx, HttpRequest::get(join(&self.page_url, DOWNLOAD_PAGE)?)).await?;
        let links = scrape_links(&self.link_re, &page.body);

        let versions: Vec<String> = links.iter().map(|l| l.version.clone()).collect();
        let version = find_latest(&versions)
            .ok_or_else(|| FetchError::Parse("No APK link on the download page".to_string()))?;

        let mut artifacts: Vec<Artifact> = Vec::new();
        for link in links.iter().filter(|l| l.version == version) {
            if artifacts.iter().any(|a| a.abi == Some(link.abi)) {
                continue;
            }
            artifacts.push(Artifact::for_abi(parse_url(&link.url)?, link.abi));
        }
        artifacts.sort_by_key(|a| a.abi);
        debug!("Vivaldi {}: {} APK links", version, artifacts.len());

        let primary = artifacts[0].url.clone();
        let head = send(ctx, HttpRequest::head(primary.clone())).await?;
        let last_modified = head.header("last-modified").ok_or_else(|| {
            FetchError::Parse(format!("{primary} has no Last-Modified header"))
        })?;

        Ok(ReleaseCandidate {
            published_at: parse_http_date(last_modified)?,
            version_text: version,
            artifacts,
        })
    }
}
