//! Canonical value types shared by every upstream integration

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::release::version::VersionInfo;

/// Android application binary interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Abi {
    #[serde(rename = "arm64-v8a")]
    Arm64V8a,
    #[serde(rename = "armeabi-v7a")]
    ArmeabiV7a,
    #[serde(rename = "x86_64")]
    X86_64,
    #[serde(rename = "x86")]
    X86,
}

impl Abi {
    pub const ALL: [Abi; 4] = [Abi::Arm64V8a, Abi::ArmeabiV7a, Abi::X86_64, Abi::X86];

    /// Returns the string representation used by Android
    pub fn as_str(&self) -> &'static str {
        match self {
            Abi::Arm64V8a => "arm64-v8a",
            Abi::ArmeabiV7a => "armeabi-v7a",
            Abi::X86_64 => "x86_64",
            Abi::X86 => "x86",
        }
    }

    pub fn is_64bit(&self) -> bool {
        matches!(self, Abi::Arm64V8a | Abi::X86_64)
    }

    /// The 32-bit ABI a device of this class can also run
    pub fn companion_32bit(&self) -> Option<Abi> {
        match self {
            Abi::Arm64V8a => Some(Abi::ArmeabiV7a),
            Abi::X86_64 => Some(Abi::X86),
            Abi::ArmeabiV7a | Abi::X86 => None,
        }
    }
}

impl fmt::Display for Abi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Abi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arm64-v8a" | "arm64" | "aarch64" => Ok(Abi::Arm64V8a),
            "armeabi-v7a" | "armv7" | "arm" => Ok(Abi::ArmeabiV7a),
            "x86_64" | "x64" => Ok(Abi::X86_64),
            "x86" => Ok(Abi::X86),
            _ => Err(format!("unknown ABI: {s}")),
        }
    }
}

/// A concrete downloadable binary offered by an upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub url: Url,
    /// `None` marks a universal artifact that runs on every ABI
    pub abi: Option<Abi>,
    pub sha256: Option<String>,
}

impl Artifact {
    pub fn universal(url: Url) -> Self {
        Self {
            url,
            abi: None,
            sha256: None,
        }
    }

    pub fn for_abi(url: Url, abi: Abi) -> Self {
        Self {
            url,
            abi: Some(abi),
            sha256: None,
        }
    }

    pub fn with_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.sha256 = Some(sha256.into());
        self
    }
}

/// What a strategy read from its upstream, before normalization and selection
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseCandidate {
    pub version_text: String,
    pub published_at: DateTime<FixedOffset>,
    pub artifacts: Vec<Artifact>,
}

/// The canonical, source-agnostic description of the latest release
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub version: VersionInfo,
    pub published_at: DateTime<FixedOffset>,
    pub download_url: Url,
    pub artifact_hint: Option<Abi>,
    pub sha256: Option<String>,
}
