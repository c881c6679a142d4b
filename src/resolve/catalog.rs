//! Registry of resolvable applications
//!
//! Each entry pairs the immutable descriptor (identity and staleness policy)
//! with the strategy that reads its upstream. Iteration follows registration
//! order.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::EngineConfig;
use crate::release::artifact::Abi;
use crate::release::descriptor::ApplicationDescriptor;
use crate::release::strategies::github::{GithubRelease, tag_without_v};
use crate::release::strategies::{
    AssetRule, ChromiumSnapshotStrategy, FdroidLayout, FdroidStrategy, GithubReleaseStrategy,
    MozillaChannel, MozillaProduct, MozillaProductStrategy, ReleaseFilter, TaskclusterStrategy,
    TorChannel, TorProjectStrategy, VivaldiPageStrategy,
};
use crate::release::strategy::FetchStrategy;

/// Version-code suffixes of the Fennec F-Droid ABI splits
const FENNEC_ABI_CODES: &[(u64, Abi)] = &[
    (0, Abi::ArmeabiV7a),
    (1, Abi::X86),
    (2, Abi::Arm64V8a),
    (3, Abi::X86_64),
];

const FENIX_NIGHTLY_NAMESPACE: &str = "mobile.v3.firefox-android.apks.fenix-nightly.latest";

#[derive(Clone)]
pub struct CatalogEntry {
    pub descriptor: ApplicationDescriptor,
    pub strategy: Arc<dyn FetchStrategy>,
}

#[derive(Clone, Default)]
pub struct Catalog {
    entries: IndexMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an application; registering an id again replaces the entry in place
    pub fn register(
        &mut self,
        descriptor: ApplicationDescriptor,
        strategy: impl FetchStrategy + 'static,
    ) -> &mut Self {
        self.entries.insert(
            descriptor.id.clone(),
            CatalogEntry {
                descriptor,
                strategy: Arc::new(strategy),
            },
        );
        self
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The default catalog, minus the apps disabled in the configuration
    pub fn builtin(config: &EngineConfig) -> Self {
        let token = config.github_token.clone();
        let github = |repository: &'static str| {
            GithubReleaseStrategy::repository(repository).token(token.clone())
        };
        let brave = |channel: &'static str| {
            github("brave/brave-browser")
                .filter(ReleaseFilter::any().name_prefix(channel))
                .asset(AssetRule::abi(Abi::Arm64V8a, &["BraveMonoarm64"]))
                .asset(AssetRule::abi(Abi::ArmeabiV7a, &["BraveMonoarm."]))
                .asset(AssetRule::abi(Abi::X86_64, &["BraveMonox64"]))
                .asset(AssetRule::abi(Abi::X86, &["BraveMonox86"]))
        };
        let mozilla = |archive_dir: &'static str, file_prefix: &'static str, channel| {
            MozillaProductStrategy::product(MozillaProduct {
                archive_dir,
                file_prefix,
                channel,
            })
        };

        let mut catalog = Catalog::new();
        catalog
            .register(
                ApplicationDescriptor::new("brave", "Brave", "com.brave.browser").max_age_days(28),
                brave("Release"),
            )
            .register(
                ApplicationDescriptor::new("brave_beta", "Brave Beta", "com.brave.browser_beta")
                    .max_age_days(14),
                brave("Beta"),
            )
            .register(
                ApplicationDescriptor::new(
                    "brave_nightly",
                    "Brave Nightly",
                    "com.brave.browser_nightly",
                )
                .max_age_days(7),
                brave("Nightly"),
            )
            .register(
                ApplicationDescriptor::new("chromium", "Chromium", "org.chromium.chrome")
                    .max_age_days(60),
                ChromiumSnapshotStrategy::default(),
            )
            .register(
                ApplicationDescriptor::new("cromite", "Cromite", "org.cromite.cromite")
                    .max_age_days(60),
                github("uazo/cromite")
                    .asset(AssetRule::abi(Abi::Arm64V8a, &["arm64_ChromePublic"]))
                    .asset(AssetRule::abi(Abi::ArmeabiV7a, &["arm_ChromePublic"]))
                    .asset(AssetRule::abi(Abi::X86_64, &["x64_ChromePublic"]))
                    .version(tag_before_dash),
            )
            .register(
                ApplicationDescriptor::new(
                    "duckduckgo",
                    "DuckDuckGo",
                    "com.duckduckgo.mobile.android",
                )
                .max_age_days(60),
                github("duckduckgo/Android").asset(AssetRule::universal(&["duckduckgo"])),
            )
            .register(
                ApplicationDescriptor::new("fairemail", "FairEmail", "eu.faircode.email")
                    .max_age_days(60),
                github("M66B/FairEmail").asset(AssetRule::universal(&["github-release"])),
            )
            .register(
                ApplicationDescriptor::new(
                    "fennec_fdroid",
                    "Fennec F-Droid",
                    "org.mozilla.fennec_fdroid",
                )
                .max_age_days(60),
                FdroidStrategy::package(
                    "org.mozilla.fennec_fdroid",
                    FdroidLayout::AbiSplit(FENNEC_ABI_CODES),
                ),
            )
            .register(
                ApplicationDescriptor::new("ffupdater", "FFUpdater", "de.marmaro.krt.ffupdater")
                    .max_age_days(60)
                    .without_min_os(),
                github("Tobi823/ffupdater").asset(AssetRule::universal(&["ffupdater-release"])),
            )
            .register(
                ApplicationDescriptor::new("firefox_beta", "Firefox Beta", "org.mozilla.firefox_beta")
                    .max_age_days(21),
                mozilla("fenix", "fenix", MozillaChannel::Beta),
            )
            .register(
                ApplicationDescriptor::new(
                    "firefox_focus_beta",
                    "Firefox Focus Beta",
                    "org.mozilla.focus.beta",
                )
                .max_age_days(21),
                mozilla("focus", "focus", MozillaChannel::Beta),
            )
            .register(
                ApplicationDescriptor::new("firefox_focus", "Firefox Focus", "org.mozilla.focus")
                    .max_age_days(60),
                mozilla("focus", "focus", MozillaChannel::Release),
            )
            .register(
                ApplicationDescriptor::new("firefox_klar", "Firefox Klar", "org.mozilla.klar")
                    .max_age_days(60),
                mozilla("focus", "klar", MozillaChannel::Release),
            )
            .register(
                ApplicationDescriptor::new("firefox_nightly", "Firefox Nightly", "org.mozilla.fenix")
                    .max_age_days(7),
                TaskclusterStrategy::namespace(FENIX_NIGHTLY_NAMESPACE),
            )
            .register(
                ApplicationDescriptor::new("firefox_release", "Firefox", "org.mozilla.firefox")
                    .max_age_days(60),
                mozilla("fenix", "fenix", MozillaChannel::Release),
            )
            .register(
                ApplicationDescriptor::new("k9mail", "K-9 Mail", "com.fsck.k9").max_age_days(60),
                github("thunderbird/thunderbird-android")
                    .filter(ReleaseFilter::stable().tag_prefix("K9MAIL_"))
                    .asset(AssetRule::universal(&["k9mail"]))
                    .version(underscored_tag),
            )
            .register(
                ApplicationDescriptor::new(
                    "iceraven",
                    "Iceraven",
                    "io.github.forkmaintainers.iceraven",
                )
                .max_age_days(60),
                github("fork-maintainers/iceraven-browser")
                    .asset(AssetRule::abi(Abi::Arm64V8a, &["browser-arm64-v8a"]))
                    .asset(AssetRule::abi(Abi::ArmeabiV7a, &["browser-armeabi-v7a"]))
                    .asset(AssetRule::abi(Abi::X86_64, &["browser-x86_64"]))
                    .asset(AssetRule::abi(Abi::X86, &["browser-x86-"]))
                    .version(tag_after_dash),
            )
            .register(
                ApplicationDescriptor::new("orbot", "Orbot", "org.torproject.android")
                    .max_age_days(60)
                    .exempt_version("17.3.2-RC-1-tor-0.4.8.12"),
                github("guardianproject/orbot")
                    .filter(ReleaseFilter::stable())
                    .asset(AssetRule::abi(Abi::Arm64V8a, &["fullperm", "arm64-v8a"]))
                    .asset(AssetRule::abi(Abi::ArmeabiV7a, &["fullperm", "armeabi-v7a"]))
                    .asset(AssetRule::abi(Abi::X86_64, &["fullperm", "x86_64"]))
                    .asset(AssetRule::abi(Abi::X86, &["fullperm", "x86-"])),
            )
            .register(
                ApplicationDescriptor::new(
                    "privacy_browser",
                    "Privacy Browser",
                    "com.stoutner.privacybrowser.standard",
                )
                .max_age_days(60),
                FdroidStrategy::package(
                    "com.stoutner.privacybrowser.standard",
                    FdroidLayout::Universal,
                ),
            )
            .register(
                ApplicationDescriptor::new("thorium", "Thorium", "com.thorium.browser")
                    .max_age_days(300)
                    .exempt_version("126.0.6478.246"),
                github("Alex313031/Thorium-Android")
                    .asset(AssetRule::abi(Abi::Arm64V8a, &["arm64"]))
                    .asset(AssetRule::abi(Abi::ArmeabiV7a, &["arm32"]))
                    .asset(AssetRule::abi(Abi::X86_64, &["x64"]))
                    .version(tag_without_m),
            )
            .register(
                ApplicationDescriptor::new(
                    "thunderbird",
                    "Thunderbird",
                    "net.thunderbird.android",
                )
                .max_age_days(60),
                github("thunderbird/thunderbird-android")
                    .filter(ReleaseFilter::stable().tag_prefix("THUNDERBIRD_"))
                    .asset(AssetRule::universal(&["thunderbird-"]))
                    .version(underscored_tag),
            )
            .register(
                ApplicationDescriptor::new(
                    "thunderbird_beta",
                    "Thunderbird Beta",
                    "net.thunderbird.android.beta",
                )
                .max_age_days(60),
                github("thunderbird/thunderbird-android")
                    .filter(ReleaseFilter::prerelease().tag_prefix("THUNDERBIRD_"))
                    .asset(AssetRule::universal(&["thunderbird-beta"]))
                    .version(underscored_tag),
            )
            .register(
                ApplicationDescriptor::new(
                    "tor_browser_alpha",
                    "Tor Browser Alpha",
                    "org.torproject.torbrowser_alpha",
                )
                .max_age_days(60),
                TorProjectStrategy::channel(TorChannel::Alpha),
            )
            .register(
                ApplicationDescriptor::new("tor_browser", "Tor Browser", "org.torproject.torbrowser")
                    .max_age_days(60),
                TorProjectStrategy::channel(TorChannel::Release),
            )
            .register(
                ApplicationDescriptor::new("vivaldi", "Vivaldi", "com.vivaldi.browser"),
                VivaldiPageStrategy::default(),
            );

        catalog
            .entries
            .retain(|id, _| !config.disabled_apps.iter().any(|disabled| disabled == id));
        catalog
    }
}

/// `v131.0.6778.86-c5f5d1c` -> `131.0.6778.86`
fn tag_before_dash(release: &GithubRelease) -> String {
    let tag = tag_without_v(release);
    match tag.split_once('-') {
        Some((version, _)) => version.to_string(),
        None => tag,
    }
}

/// `iceraven-2.24.0` -> `2.24.0`
fn tag_after_dash(release: &GithubRelease) -> String {
    match release.tag_name.split_once('-') {
        Some((_, version)) => version.to_string(),
        None => tag_without_v(release),
    }
}

/// `M126.0.6478.246` -> `126.0.6478.246`
fn tag_without_m(release: &GithubRelease) -> String {
    release.tag_name.trim_start_matches('M').to_string()
}

/// `THUNDERBIRD_8_1` -> `8.1`, `K9MAIL_6_804` -> `6.804`
fn underscored_tag(release: &GithubRelease) -> String {
    match release.tag_name.split_once('_') {
        Some((_, version)) => version.replace('_', "."),
        None => tag_without_v(release),
    }
}
