//! F-Droid repository integration
//!
//! The package API names the suggested version; the publish date comes from
//! the fdroiddata commit that added that version to the app's metadata file.

use serde::Deserialize;
use tracing::debug;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, send_json};
use crate::release::strategies::timestamp::parse_rfc3339;
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

const DEFAULT_FDROID_URL: &str = "https://f-droid.org";
const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

/// GitLab project id of fdroid/fdroiddata
const FDROIDDATA_PROJECT_ID: u64 = 36528;

/// Metadata commits searched for the one mentioning the suggested version
const COMMITS_PER_PAGE: u32 = 20;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageResponse {
    suggested_version_code: u64,
    packages: Vec<PackageVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageVersion {
    version_name: String,
    version_code: u64,
}

#[derive(Debug, Deserialize)]
struct Commit {
    title: String,
    created_at: String,
}

/// How the builds of one version are split across ABIs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdroidLayout {
    /// A single APK per version
    Universal,
    /// One APK per ABI, told apart by the last digit of the version code
    AbiSplit(&'static [(u64, Abi)]),
}

pub struct FdroidStrategy {
    fdroid_url: String,
    gitlab_url: String,
    package_name: &'static str,
    layout: FdroidLayout,
}

impl FdroidStrategy {
    pub fn new(
        fdroid_url: &str,
        gitlab_url: &str,
        package_name: &'static str,
        layout: FdroidLayout,
    ) -> Self {
        Self {
            fdroid_url: fdroid_url.to_string(),
            gitlab_url: gitlab_url.to_string(),
            package_name,
            layout,
        }
    }

    pub fn package(package_name: &'static str, layout: FdroidLayout) -> Self {
        Self::new(DEFAULT_FDROID_URL, DEFAULT_GITLAB_URL, package_name, layout)
    }

    fn artifact_abi(&self, version_code: u64) -> Option<Option<Abi>> {
        match self.layout {
            FdroidLayout::Universal => Some(None),
            FdroidLayout::AbiSplit(codes) => codes
                .iter()
                .find(|(digit, _)| version_code % 10 == *digit)
                .map(|(_, abi)| Some(*abi)),
        }
    }

    fn artifacts(&self, builds: &[&PackageVersion]) -> Result<Vec<Artifact>, FetchError> {
        let mut artifacts = Vec::new();
        for build in builds {
            let Some(abi) = self.artifact_abi(build.version_code) else {
                debug!(
                    "{}: skipping version code {} with unknown ABI",
                    self.package_name, build.version_code
                );
                continue;
            };
            let url = join(
                &self.fdroid_url,
                &format!("repo/{}_{}.apk", self.package_name, build.version_code),
            )?;
            artifacts.push(Artifact {
                url,
                abi,
                sha256: None,
            });
        }
        Ok(artifacts)
    }

    async fn publish_date(
        &self,
        ctx: &FetchContext<'_>,
        version_name: &str,
    ) -> Result<String, FetchError> {
        let url = join(
            &self.gitlab_url,
            &format!(
                "api/v4/projects/{FDROIDDATA_PROJECT_ID}/repository/commits?path=metadata%2F{}.yml&per_page={COMMITS_PER_PAGE}",
                self.package_name
            ),
        )?;
        let commits: Vec<Commit> = send_json(ctx, HttpRequest::get(url)).await?;

        commits
            .into_iter()
            .find(|c| c.title.contains(version_name))
            .map(|c| c.created_at)
            .ok_or_else(|| {
                FetchError::Parse(format!(
                    "No fdroiddata commit mentions {} {}",
                    self.package_name, version_name
                ))
            })
    }
}

#[async_trait::async_trait]
impl FetchStrategy for FdroidStrategy {
    fn name(&self) -> &'static str {
        "fdroid"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let url = join(
            &self.fdroid_url,
            &format!("api/v1/packages/{}", self.package_name),
        )?;
        let response: PackageResponse = send_json(ctx, HttpRequest::get(url)).await?;

        let suggested = response
            .packages
            .iter()
            .find(|p| p.version_code == response.suggested_version_code)
            .ok_or_else(|| {
                FetchError::Parse(format!(
                    "Suggested version code {} of {} is not listed",
                    response.suggested_version_code, self.package_name
                ))
            })?;

        let builds: Vec<&PackageVersion> = response
            .packages
            .iter()
            .filter(|p| p.version_name == suggested.version_name)
            .collect();
        let artifacts = self.artifacts(&builds)?;

        let created_at = self.publish_date(ctx, &suggested.version_name).await?;

        Ok(ReleaseCandidate {
            version_text: suggested.version_name.clone(),
            published_at: parse_rfc3339(&created_at)?,
            artifacts,
        })
    }
}
