//! Resolution orchestrator
//!
//! Drives one application through fetch, normalization, artifact selection
//! and freshness validation. Every upstream failure becomes a
//! [`ResolutionOutcome`]; only an unknown id or cancellation is an error.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::release::artifact::FetchResult;
use crate::release::clock::Clock;
use crate::release::device::{DeviceProfile, DeviceProfileProvider};
use crate::release::error::FetchError;
use crate::release::freshness::FreshnessValidator;
use crate::release::outcome::ResolutionOutcome;
use crate::release::selector::select;
use crate::release::strategy::{FetchContext, verify_download};
use crate::release::transport::Transport;
use crate::release::version::normalize;
use crate::resolve::catalog::{Catalog, CatalogEntry};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("Unknown application: {0}")]
    UnknownApplication(String),

    #[error("Resolution cancelled")]
    Cancelled,
}

/// Per-call options of a resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    pub cancel: CancellationToken,
}

impl ResolveContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

pub struct Resolver {
    catalog: Catalog,
    transport: Arc<dyn Transport>,
    device: Arc<dyn DeviceProfileProvider>,
    clock: Arc<dyn Clock>,
    validator: FreshnessValidator,
}

impl Resolver {
    pub fn new(
        catalog: Catalog,
        transport: Arc<dyn Transport>,
        device: Arc<dyn DeviceProfileProvider>,
        clock: Arc<dyn Clock>,
        validator: FreshnessValidator,
    ) -> Self {
        Self {
            catalog,
            transport,
            device,
            clock,
            validator,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolves the latest release of one application
    ///
    /// The device profile and the current time are taken when the call
    /// starts. Cancelling the token drops the in-flight fetch.
    ///
    /// # Returns
    /// * `Ok(ResolutionOutcome)` - The terminal state of the resolution
    /// * `Err(ResolveError::UnknownApplication)` - `app_id` is not cataloged
    /// * `Err(ResolveError::Cancelled)` - The token was cancelled first
    pub async fn resolve_latest(
        &self,
        app_id: &str,
        ctx: &ResolveContext,
    ) -> Result<ResolutionOutcome, ResolveError> {
        let entry = self
            .catalog
            .get(app_id)
            .ok_or_else(|| ResolveError::UnknownApplication(app_id.to_string()))?;

        if ctx.cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => {
                debug!("{}: cancelled", app_id);
                Err(ResolveError::Cancelled)
            }
            outcome = self.run(entry) => {
                info!("{}: {}", app_id, outcome.kind());
                Ok(outcome)
            }
        }
    }

    /// Sends a `HEAD` request to a resolved download URL
    pub async fn verify_download(&self, url: &Url) -> Result<(), FetchError> {
        verify_download(self.transport.as_ref(), url).await
    }

    async fn run(&self, entry: &CatalogEntry) -> ResolutionOutcome {
        let descriptor = &entry.descriptor;
        let device = DeviceProfile::snapshot(self.device.as_ref());
        let now = self.clock.now();

        if descriptor.requires_min_os && !device.supports_min_os {
            debug!("{}: device is below the minimum OS level", descriptor.id);
            return ResolutionOutcome::NoCompatibleArtifact;
        }

        debug!("{}: fetching with {}", descriptor.id, entry.strategy.name());
        let fetch_ctx = FetchContext::new(self.transport.as_ref());
        let candidate = match entry.strategy.fetch_latest(&fetch_ctx).await {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("{}: {}", descriptor.id, e);
                return e.into();
            }
        };

        let version = match normalize(&candidate.version_text) {
            Ok(version) => version,
            Err(e) => {
                warn!("{}: {}", descriptor.id, e);
                return ResolutionOutcome::ParseFailure {
                    detail: e.to_string(),
                };
            }
        };
        debug!("{}: parsed version {}", descriptor.id, version.version_text());

        let artifact = match select(&candidate.artifacts, &device) {
            Ok(artifact) => artifact,
            Err(e) => {
                debug!("{}: {}", descriptor.id, e);
                return ResolutionOutcome::NoCompatibleArtifact;
            }
        };
        debug!("{}: selected {}", descriptor.id, artifact.url);

        let result = FetchResult {
            version,
            published_at: candidate.published_at,
            download_url: artifact.url.clone(),
            artifact_hint: artifact.abi,
            sha256: artifact.sha256.clone(),
        };
        self.validator.validate(result, descriptor, now)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::release::artifact::{Abi, Artifact, ReleaseCandidate};
    use crate::release::clock::FixedClock;
    use crate::release::descriptor::ApplicationDescriptor;
    use crate::release::device::StaticDeviceProfile;
    use crate::release::strategy::FetchStrategy;
    use crate::release::transport::MockTransport;
    use chrono::{DateTime, Duration, FixedOffset};
    use std::time::Duration as StdDuration;

    pub(crate) fn now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-10-20T12:00:00+00:00").unwrap()
    }

    /// Returns a canned result after an optional delay
    pub(crate) struct StubStrategy {
        pub result: Result<ReleaseCandidate, FetchError>,
        pub delay: Option<StdDuration>,
    }

    impl StubStrategy {
        pub(crate) fn published(version: &str, age_in_days: i64, artifacts: Vec<Artifact>) -> Self {
            Self {
                result: Ok(ReleaseCandidate {
                    version_text: version.to_string(),
                    published_at: now() - Duration::days(age_in_days),
                    artifacts,
                }),
                delay: None,
            }
        }

        pub(crate) fn failing(error: FetchError) -> Self {
            Self {
                result: Err(error),
                delay: None,
            }
        }

        pub(crate) fn after(mut self, delay: StdDuration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait::async_trait]
    impl FetchStrategy for StubStrategy {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_latest(
            &self,
            _ctx: &FetchContext<'_>,
        ) -> Result<ReleaseCandidate, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.result.clone()
        }
    }

    /// Never finishes
    struct PendingStrategy;

    #[async_trait::async_trait]
    impl FetchStrategy for PendingStrategy {
        fn name(&self) -> &'static str {
            "pending"
        }

        async fn fetch_latest(
            &self,
            _ctx: &FetchContext<'_>,
        ) -> Result<ReleaseCandidate, FetchError> {
            std::future::pending().await
        }
    }

    pub(crate) fn apk(name: &str) -> Url {
        Url::parse(&format!("https://example.com/{name}.apk")).unwrap()
    }

    pub(crate) fn device(abi: Abi, prefer_32bit: bool) -> StaticDeviceProfile {
        StaticDeviceProfile(DeviceProfile {
            abi,
            prefer_32bit,
            supports_min_os: true,
        })
    }

    pub(crate) fn resolver(catalog: Catalog, device: StaticDeviceProfile) -> Resolver {
        Resolver::new(
            catalog,
            Arc::new(MockTransport::new()),
            Arc::new(device),
            Arc::new(FixedClock(now())),
            FreshnessValidator::default(),
        )
    }

    fn single(descriptor: ApplicationDescriptor, strategy: impl FetchStrategy + 'static) -> Catalog {
        let mut catalog = Catalog::new();
        catalog.register(descriptor, strategy);
        catalog
    }

    #[tokio::test]
    async fn resolve_latest_succeeds_for_fresh_release() {
        let catalog = single(
            ApplicationDescriptor::new("brave", "Brave", "com.brave.browser").max_age_days(28),
            StubStrategy::published(
                "1.70.117",
                3,
                vec![
                    Artifact::for_abi(apk("arm64"), Abi::Arm64V8a),
                    Artifact::for_abi(apk("arm"), Abi::ArmeabiV7a),
                ],
            ),
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));

        let outcome = resolver
            .resolve_latest("brave", &ResolveContext::new())
            .await
            .unwrap();

        let ResolutionOutcome::Success(result) = outcome else {
            panic!("expected success, got {outcome:?}");
        };
        assert_eq!(result.version.version_text(), "1.70.117");
        assert_eq!(result.download_url, apk("arm64"));
        assert_eq!(result.artifact_hint, Some(Abi::Arm64V8a));
    }

    #[tokio::test]
    async fn resolve_latest_reports_stale_release() {
        let catalog = single(
            ApplicationDescriptor::new("firefox_nightly", "Firefox Nightly", "org.mozilla.fenix")
                .max_age_days(7),
            StubStrategy::published(
                "2024-10-10 05:12",
                10,
                vec![Artifact::for_abi(apk("arm64"), Abi::Arm64V8a)],
            ),
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));

        let outcome = resolver
            .resolve_latest("firefox_nightly", &ResolveContext::new())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            ResolutionOutcome::StaleRelease {
                age_in_days: 10,
                threshold_in_days: 7
            }
        );
    }

    #[tokio::test]
    async fn resolve_latest_maps_fetch_errors() {
        let mut catalog = Catalog::new();
        catalog
            .register(
                ApplicationDescriptor::new("down", "Down", "org.down"),
                StubStrategy::failing(FetchError::Unavailable("status 503".to_string())),
            )
            .register(
                ApplicationDescriptor::new("broken", "Broken", "org.broken"),
                StubStrategy::failing(FetchError::Parse("no assets".to_string())),
            );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));
        let ctx = ResolveContext::new();

        assert_eq!(
            resolver.resolve_latest("down", &ctx).await.unwrap(),
            ResolutionOutcome::SourceUnavailable {
                detail: "status 503".to_string()
            }
        );
        assert_eq!(
            resolver.resolve_latest("broken", &ctx).await.unwrap(),
            ResolutionOutcome::ParseFailure {
                detail: "no assets".to_string()
            }
        );
    }

    #[tokio::test]
    async fn resolve_latest_reports_unparseable_version() {
        let catalog = single(
            ApplicationDescriptor::new("app", "App", "org.app"),
            StubStrategy::published("latest", 1, vec![Artifact::universal(apk("app"))]),
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));

        let outcome = resolver
            .resolve_latest("app", &ResolveContext::new())
            .await
            .unwrap();

        assert_eq!(outcome.kind(), "parse_failure");
    }

    #[tokio::test]
    async fn resolve_latest_reports_missing_artifact() {
        let catalog = single(
            ApplicationDescriptor::new("app", "App", "org.app"),
            StubStrategy::published(
                "1.0",
                1,
                vec![Artifact::for_abi(apk("x86_64"), Abi::X86_64)],
            ),
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));

        let outcome = resolver
            .resolve_latest("app", &ResolveContext::new())
            .await
            .unwrap();

        assert_eq!(outcome, ResolutionOutcome::NoCompatibleArtifact);
    }

    #[tokio::test]
    async fn resolve_latest_honors_min_os_requirement() {
        let mut catalog = Catalog::new();
        catalog
            .register(
                ApplicationDescriptor::new("modern", "Modern", "org.modern"),
                StubStrategy::published("1.0", 1, vec![Artifact::universal(apk("modern"))]),
            )
            .register(
                ApplicationDescriptor::new("legacy", "Legacy", "org.legacy").without_min_os(),
                StubStrategy::published("1.0", 1, vec![Artifact::universal(apk("legacy"))]),
            );
        let old_device = StaticDeviceProfile(DeviceProfile {
            abi: Abi::ArmeabiV7a,
            prefer_32bit: false,
            supports_min_os: false,
        });
        let resolver = resolver(catalog, old_device);
        let ctx = ResolveContext::new();

        assert_eq!(
            resolver.resolve_latest("modern", &ctx).await.unwrap(),
            ResolutionOutcome::NoCompatibleArtifact
        );
        assert!(resolver.resolve_latest("legacy", &ctx).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn resolve_latest_rejects_unknown_application() {
        let resolver = resolver(Catalog::new(), device(Abi::Arm64V8a, false));

        let result = resolver
            .resolve_latest("netscape", &ResolveContext::new())
            .await;

        assert_eq!(
            result,
            Err(ResolveError::UnknownApplication("netscape".to_string()))
        );
    }

    #[tokio::test]
    async fn resolve_latest_stops_when_cancelled() {
        let catalog = single(
            ApplicationDescriptor::new("slow", "Slow", "org.slow"),
            PendingStrategy,
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));
        let cancel = CancellationToken::new();
        let ctx = ResolveContext::with_cancellation(cancel.clone());

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(20)).await;
            cancel.cancel();
        });
        let result = resolver.resolve_latest("slow", &ctx).await;
        trigger.await.unwrap();

        assert_eq!(result, Err(ResolveError::Cancelled));
    }

    #[tokio::test]
    async fn resolve_latest_fails_fast_on_cancelled_token() {
        let catalog = single(
            ApplicationDescriptor::new("app", "App", "org.app"),
            StubStrategy::published("1.0", 1, vec![Artifact::universal(apk("app"))]),
        );
        let resolver = resolver(catalog, device(Abi::Arm64V8a, false));
        let ctx = ResolveContext::new();
        ctx.cancel.cancel();

        assert_eq!(
            resolver.resolve_latest("app", &ctx).await,
            Err(ResolveError::Cancelled)
        );
    }
}
