//! Resolving many applications at once

use futures::stream::{self, StreamExt};
use tracing::info;

use crate::release::outcome::ResolutionOutcome;
use crate::resolve::resolver::{ResolveContext, ResolveError, Resolver};

/// Result of one application within a batch
pub type BatchEntry = (String, Result<ResolutionOutcome, ResolveError>);

impl Resolver {
    /// Resolves several applications with at most `concurrency` in flight
    ///
    /// Results come back in the order of `app_ids`. Each resolution is
    /// independent; a failing app never affects the others.
    pub async fn resolve_all(
        &self,
        app_ids: &[String],
        ctx: &ResolveContext,
        concurrency: usize,
    ) -> Vec<BatchEntry> {
        let mut results: Vec<(usize, BatchEntry)> = stream::iter(app_ids.iter().enumerate())
            .map(|(index, app_id)| async move {
                let result = self.resolve_latest(app_id, ctx).await;
                (index, (app_id.clone(), result))
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);

        let succeeded = results
            .iter()
            .filter(|(_, (_, result))| matches!(result, Ok(outcome) if outcome.is_success()))
            .count();
        info!("Resolved {}/{} applications", succeeded, results.len());

        results.into_iter().map(|(_, entry)| entry).collect()
    }
}
