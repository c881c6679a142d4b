//! Upstream integrations, one per publishing channel

pub mod chromium;
pub mod fdroid;
pub mod github;
pub mod http;
pub mod mozilla;
pub mod taskcluster;
pub mod timestamp;
pub mod torproject;
pub mod vivaldi;

pub use chromium::ChromiumSnapshotStrategy;
pub use fdroid::{FdroidLayout, FdroidStrategy};
pub use github::{AssetRule, GithubReleaseStrategy, ReleaseFilter};
pub use mozilla::{MozillaChannel, MozillaProduct, MozillaProductStrategy};
pub use taskcluster::TaskclusterStrategy;
pub use torproject::{TorChannel, TorProjectStrategy};
pub use vivaldi::VivaldiPageStrategy;
