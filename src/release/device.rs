//! Device capabilities consumed by artifact selection

#[cfg(test)]
use mockall::automock;

use serde::Serialize;

use crate::release::artifact::Abi;

/// Trait for probing the capabilities of the target device
#[cfg_attr(test, automock)]
pub trait DeviceProfileProvider: Send + Sync {
    /// The best ABI the device runs natively
    fn current_abi(&self) -> Abi;

    /// Whether the user asked for 32-bit builds when both are available
    fn prefers_32bit(&self) -> bool;

    /// Whether the device runs the minimum OS version the cataloged apps require
    fn supports_min_os_version(&self) -> bool;
}

/// Snapshot of the device capabilities for one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub abi: Abi,
    pub prefer_32bit: bool,
    pub supports_min_os: bool,
}

impl DeviceProfile {
    pub fn snapshot(provider: &dyn DeviceProfileProvider) -> Self {
        Self {
            abi: provider.current_abi(),
            prefer_32bit: provider.prefers_32bit(),
            supports_min_os: provider.supports_min_os_version(),
        }
    }

    /// ABIs this device can run, in order of preference
    pub fn preferred_abis(&self) -> Vec<Abi> {
        let mut abis = vec![self.abi];
        if let Some(companion) = self.abi.companion_32bit() {
            if self.prefer_32bit {
                abis.insert(0, companion);
            } else {
                abis.push(companion);
            }
        }
        abis
    }
}

/// A fixed device profile, e.g. from command-line flags
#[derive(Debug, Clone, Copy)]
pub struct StaticDeviceProfile(pub DeviceProfile);

impl DeviceProfileProvider for StaticDeviceProfile {
    fn current_abi(&self) -> Abi {
        self.0.abi
    }

    fn prefers_32bit(&self) -> bool {
        self.0.prefer_32bit
    }

    fn supports_min_os_version(&self) -> bool {
        self.0.supports_min_os
    }
}
