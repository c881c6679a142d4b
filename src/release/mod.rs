//! Release resolution core
//!
//! This module provides the building blocks for determining the latest published
//! release of a cataloged application and the download artifact that fits a device.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Strategy   │────▶│   Version   │────▶│  Selector   │────▶│  Freshness  │
//! │  (fetch)    │     │ (normalize) │     │ (artifact)  │     │ (max age)   │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//!        │                                       ▲
//!        ▼                                       │
//! ┌─────────────┐                         ┌─────────────┐
//! │  Transport  │                         │   Device    │
//! │ (injected)  │                         │ (injected)  │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`artifact`]: Canonical value types (ABI, artifacts, raw candidates, fetch results)
//! - [`clock`]: Injected time source
//! - [`descriptor`]: Identity and staleness policy of a cataloged application
//! - [`device`]: Injected device capability provider
//! - [`error`]: Error types for transport, fetch and version parsing
//! - [`freshness`]: Per-app maximum age policy with a global ceiling
//! - [`outcome`]: The serializable result of a resolution
//! - [`selector`]: Picks the artifact for a device profile
//! - [`strategy`]: Trait for reading the latest release from one upstream channel
//! - [`strategies`]: Concrete upstream integrations (GitHub, F-Droid, Mozilla, ...)
//! - [`transport`]: Injected HTTP transport and its reqwest implementation
//! - [`version`]: Version normalization and ordering

pub mod artifact;
pub mod clock;
pub mod descriptor;
pub mod device;
pub mod error;
pub mod freshness;
pub mod outcome;
pub mod selector;
pub mod strategies;
pub mod strategy;
pub mod transport;
pub mod version;
