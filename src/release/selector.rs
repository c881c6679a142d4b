//! Artifact selection for a device profile
//!
//! Policy:
//! - An exact ABI match beats a universal artifact
//! - ABIs are tried in [`DeviceProfile::preferred_abis`] order, so a 32-bit
//!   preference picks the 32-bit build even when the 64-bit one would run
//! - Ties inside one bucket go to the lexically smallest URL, making the
//!   choice independent of the order the upstream listed its assets in

use thiserror::Error;

use crate::release::artifact::{Abi, Artifact};
use crate::release::device::DeviceProfile;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No artifact compatible with {abi} (prefer 32-bit: {prefer_32bit})")]
pub struct NoCompatibleArtifact {
    pub abi: Abi,
    pub prefer_32bit: bool,
}

pub fn select<'a>(
    artifacts: &'a [Artifact],
    device: &DeviceProfile,
) -> Result<&'a Artifact, NoCompatibleArtifact> {
    let pick = |abi: Option<Abi>| {
        artifacts
            .iter()
            .filter(|a| a.abi == abi)
            .min_by(|a, b| a.url.as_str().cmp(b.url.as_str()))
    };

    device
        .preferred_abis()
        .into_iter()
        .find_map(|abi| pick(Some(abi)))
        .or_else(|| pick(None))
        .ok_or(NoCompatibleArtifact {
            abi: device.abi,
            prefer_32bit: device.prefer_32bit,
        })
}
