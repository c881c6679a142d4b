//! Mozilla CI (Taskcluster) integration for nightly builds
//!
//! The index maps a namespace to the task that built the newest nightly. The
//! task's `chain-of-trust.json` lists every APK it produced with its hash and
//! tells when the task was created. Nightlies carry no version number, so the
//! build time is used as version text.

use std::collections::HashMap;

use serde::Deserialize;

use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
use crate::release::error::FetchError;
use crate::release::strategies::http::{join, send_json};
use crate::release::strategies::timestamp::{format_build_date, parse_rfc3339};
use crate::release::strategy::{FetchContext, FetchStrategy};
use crate::release::transport::HttpRequest;

const DEFAULT_BASE_URL: &str = "https://firefox-ci-tc.services.mozilla.com";

const ARTIFACT_PREFIX: &str = "public/build/target.";
const ARTIFACT_SUFFIX: &str = ".apk";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexedTask {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct ChainOfTrust {
    artifacts: HashMap<String, ArtifactHash>,
    task: TaskDefinition,
}

#[derive(Debug, Deserialize)]
struct ArtifactHash {
    sha256: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TaskDefinition {
    created: String,
}

pub struct TaskclusterStrategy {
    base_url: String,
    namespace: &'static str,
}

impl TaskclusterStrategy {
    pub fn new(base_url: &str, namespace: &'static str) -> Self {
        Self {
            base_url: base_url.to_string(),
            namespace,
        }
    }

    pub fn namespace(namespace: &'static str) -> Self {
        Self::new(DEFAULT_BASE_URL, namespace)
    }

    fn artifact_url(&self, task_id: &str, name: &str) -> Result<url::Url, FetchError> {
        join(
            &self.base_url,
            &format!("api/queue/v1/task/{task_id}/artifacts/{name}"),
        )
    }
}

#[async_trait::async_trait]
impl FetchStrategy for TaskclusterStrategy {
    fn name(&self) -> &'static str {
        "taskcluster"
    }

    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError> {
        let index_url = join(
            &self.base_url,
            &format!("api/index/v1/task/{}", self.namespace),
        )?;
        let task: IndexedTask = send_json(ctx, HttpRequest::get(index_url)).await?;

        let chain_of_trust: ChainOfTrust = send_json(
            ctx,
            HttpRequest::get(self.artifact_url(&task.task_id, "public/chain-of-trust.json")?),
        )
        .await?;

        let mut artifacts = Vec::new();
        for (name, hash) in &chain_of_trust.artifacts {
            let Some(abi) = name
                .strip_prefix(ARTIFACT_PREFIX)
                .and_then(|rest| rest.strip_suffix(ARTIFACT_SUFFIX))
                .and_then(|abi| abi.parse::<Abi>().ok())
            else {
                continue;
            };
            artifacts.push(Artifact {
                url: self.artifact_url(&task.task_id, name)?,
                abi: Some(abi),
                sha256: hash.sha256.clone(),
            });
        }
        artifacts.sort_by_key(|a| a.abi);

        if artifacts.is_empty() {
            return Err(FetchError::Parse(format!(
                "Task {} of {} produced no APK",
                task.task_id, self.namespace
            )));
        }

        let published_at = parse_rfc3339(&chain_of_trust.task.created)?;
        Ok(ReleaseCandidate {
            version_text: format_build_date(&published_at),
            published_at,
            artifacts,
        })
    }
}
