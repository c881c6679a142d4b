//! Application catalog and resolution orchestration
//!
//! - [`catalog`]: Cataloged applications and their fetch strategies
//! - [`resolver`]: Resolves one application into a [`ResolutionOutcome`](crate::release::outcome::ResolutionOutcome)
//! - [`batch`]: Resolves many applications with bounded concurrency

pub mod batch;
pub mod catalog;
pub mod resolver;

pub use batch::BatchEntry;
pub use catalog::{Catalog, CatalogEntry};
pub use resolver::{ResolveContext, ResolveError, Resolver};
