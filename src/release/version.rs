//! Version normalization and ordering
//!
//! Upstream channels publish versions in very different shapes:
//! - Plain dotted numbers: `126.0.6478.246`
//! - Semver with suffixes: `1.2.3-beta`, `17.3.2-RC-1-tor-0.4.8.12`
//! - Channel-qualified names: `Nightly v1.72.50`, `M126.0.6478.246`
//! - Mozilla style pre-releases: `132.0b5`
//!
//! The numeric core is the first run of digits plus every `.`-separated digit
//! run directly following it. Text before the core is the channel prefix, text
//! after it is the suffix.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;

use crate::release::error::VersionParseError;

/// A normalized version together with the text it was parsed from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    version_text: String,
    components: Vec<u64>,
    suffix: String,
    #[serde(skip)]
    prefix: String,
}

impl VersionInfo {
    /// The original upstream text
    pub fn version_text(&self) -> &str {
        &self.version_text
    }

    /// Numeric components of the core, e.g. `[17, 3, 2]` for `17.3.2-RC-1`
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// Text following the numeric core, e.g. `-RC-1-tor-0.4.8.12`
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Channel qualifier preceding the numeric core, e.g. `Nightly` for `Nightly v1.72.50`
    pub fn channel(&self) -> Option<&str> {
        // The `v` marker only counts when it sits directly before the digits
        let prefix = self.prefix.trim_start();
        let channel = prefix
            .strip_suffix(['v', 'V'])
            .unwrap_or(prefix)
            .trim_end();
        (!channel.is_empty()).then_some(channel)
    }

    /// Components without trailing zeros, so that `1.2` and `1.2.0` order equally
    fn significant(&self) -> &[u64] {
        let len = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |i| i + 1);
        &self.components[..len]
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version_text)
    }
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant()
            .cmp(other.significant())
            .then_with(|| self.suffix.cmp(&other.suffix))
            .then_with(|| self.version_text.cmp(&other.version_text))
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionInfo {}

/// Parse upstream version text into a [`VersionInfo`].
///
/// Text without any digit is rejected instead of being coerced into a default.
pub fn normalize(raw: &str) -> Result<VersionInfo, VersionParseError> {
    let text = raw.trim();
    let start = text
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| VersionParseError::NoNumericRun(raw.to_string()))?;

    let bytes = text.as_bytes();
    let mut components = Vec::new();
    let mut pos = start;
    loop {
        let run_end = bytes[pos..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |offset| pos + offset);
        let component = text[pos..run_end]
            .parse::<u64>()
            .map_err(|_| VersionParseError::ComponentOverflow(raw.to_string()))?;
        components.push(component);
        pos = run_end;

        let continues = bytes.get(pos) == Some(&b'.')
            && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit());
        if !continues {
            break;
        }
        pos += 1;
    }

    Ok(VersionInfo {
        version_text: text.to_string(),
        components,
        suffix: text[pos..].to_string(),
        prefix: text[..start].to_string(),
    })
}

/// Compare two normalized versions
pub fn compare(a: &VersionInfo, b: &VersionInfo) -> Ordering {
    a.cmp(b)
}

/// Find the greatest version among upstream texts, skipping unparseable ones
pub fn find_latest(versions: &[String]) -> Option<String> {
    versions
        .iter()
        .filter_map(|v| normalize(v).ok())
        .max()
        .map(|v| v.version_text)
}
