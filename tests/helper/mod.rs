//! Shared setup for end-to-end resolution tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, SecondsFormat};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::{Value, json};

use release_resolver::config::TransportConfig;
use release_resolver::release::artifact::Abi;
use release_resolver::release::clock::FixedClock;
use release_resolver::release::device::{DeviceProfile, StaticDeviceProfile};
use release_resolver::release::freshness::FreshnessValidator;
use release_resolver::release::transport::ReqwestTransport;
use release_resolver::resolve::{Catalog, Resolver};

pub fn now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-10-20T12:00:00+00:00").unwrap()
}

/// RFC 3339 timestamp `days` before [`now`]
pub fn days_ago(days: i64) -> String {
    (now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn device(abi: Abi, prefer_32bit: bool) -> StaticDeviceProfile {
    StaticDeviceProfile(DeviceProfile {
        abi,
        prefer_32bit,
        supports_min_os: true,
    })
}

pub fn create_resolver(catalog: Catalog, device: StaticDeviceProfile) -> Resolver {
    create_resolver_with_ceiling(catalog, device, FreshnessValidator::default())
}

pub fn create_resolver_with_ceiling(
    catalog: Catalog,
    device: StaticDeviceProfile,
    validator: FreshnessValidator,
) -> Resolver {
    let transport = ReqwestTransport::new(&TransportConfig::default()).unwrap();
    Resolver::new(
        catalog,
        Arc::new(transport),
        Arc::new(device),
        Arc::new(FixedClock(now())),
        validator,
    )
}

/// One entry of a GitHub releases listing
pub fn github_release(
    server_url: &str,
    tag: &str,
    name: &str,
    prerelease: bool,
    published_at: &str,
    assets: &[&str],
) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|asset| {
            json!({
                "name": asset,
                "browser_download_url": format!("{server_url}/download/{tag}/{asset}"),
            })
        })
        .collect();
    json!({
        "tag_name": tag,
        "name": name,
        "draft": false,
        "prerelease": prerelease,
        "published_at": published_at,
        "assets": assets,
    })
}

/// Serves `releases` as the first listing page of `repository`
pub async fn mock_release_listing(
    server: &mut ServerGuard,
    repository: &str,
    releases: Vec<Value>,
) -> Mock {
    server
        .mock("GET", format!("/repos/{repository}/releases").as_str())
        .match_query(Matcher::UrlEncoded("per_page".into(), "30".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(Value::Array(releases).to_string())
        .create_async()
        .await
}
