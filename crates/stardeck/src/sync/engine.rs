//! Sync orchestration.
//!
//! Sequences estimate → collect → load → merge → persist. Phases are
//! strictly sequential and never re-entered; a failed phase emits one
//! terminal `error` event and ends the run. There is no cancellation: once
//! started, a run completes or fails, and a dropped client connection only
//! means undelivered events.

use std::sync::Arc;

use thiserror::Error;

use crate::github::{GitHubClient, GitHubError};
use crate::store::{FileStore, StoreError};

use super::collect::collect_detailed;
use super::estimate::count_starred;
use super::merge::merge_snapshots;
use super::progress::{CollectProgress, ProgressEvent, ProgressSink, emit};

/// Result of one completed sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Remote item count from the estimation pre-pass.
    pub total: usize,
    /// Items in the merged, persisted snapshot.
    pub merged: usize,
    /// Items persisted with list-page fields only.
    pub degraded: usize,
}

/// Terminal failure of a sync run, tagged by the phase that failed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to estimate starred repositories: {0}")]
    Estimate(#[source] GitHubError),

    #[error("failed to collect repository details: {0}")]
    Collect(#[source] GitHubError),

    #[error("failed to persist snapshot: {0}")]
    Store(#[from] StoreError),
}

/// One sync run's orchestrator, owning the client and store handles.
///
/// Both server entry points use this: the one-shot endpoint runs with no
/// sink, the WebSocket endpoint passes its socket sink. The merge rule is
/// therefore identical on both paths.
pub struct SyncEngine {
    github: GitHubClient,
    store: Arc<FileStore>,
}

impl SyncEngine {
    pub fn new(github: GitHubClient, store: Arc<FileStore>) -> Self {
        Self { github, store }
    }

    /// Run a full synchronization.
    ///
    /// On failure the terminal `error` event has already been emitted when
    /// this returns; callers only need to translate the error for their own
    /// surface. Progress percentages: 0–10 estimation, 10–80 collection,
    /// 80–95 load/merge, 95–100 persistence.
    pub async fn run(
        &self,
        sink: Option<Arc<dyn ProgressSink>>,
    ) -> Result<SyncOutcome, SyncError> {
        let sink_ref = sink.as_ref();

        emit(sink_ref, ProgressEvent::start("starting sync")).await;
        emit(
            sink_ref,
            ProgressEvent::info(5, "fetching starred repository list"),
        )
        .await;

        let total = match count_starred(&self.github).await {
            Ok(total) => total,
            Err(e) => {
                emit(
                    sink_ref,
                    ProgressEvent::error(format!("failed to fetch starred repositories: {e}")),
                )
                .await;
                return Err(SyncError::Estimate(e));
            }
        };

        emit(
            sink_ref,
            ProgressEvent::info_with_total(
                10,
                format!("found {total} starred repositories, fetching details"),
                total,
            ),
        )
        .await;

        let progress = CollectProgress::new(total, sink.clone());
        let collected = match collect_detailed(&self.github, total, progress).await {
            Ok(collected) => collected,
            Err(e) => {
                emit(
                    sink_ref,
                    ProgressEvent::error(format!("failed to fetch repository details: {e}")),
                )
                .await;
                return Err(SyncError::Collect(e));
            }
        };

        emit(
            sink_ref,
            ProgressEvent::info_with_total(
                80,
                format!(
                    "finished fetching details for {} repositories",
                    collected.repos.len()
                ),
                collected.repos.len(),
            ),
        )
        .await;

        emit(sink_ref, ProgressEvent::info(85, "loading local snapshot")).await;

        let local = match self.store.load_repos().await {
            Ok(repos) => repos,
            Err(StoreError::NotFound) => Vec::new(),
            Err(e) => {
                // A damaged local snapshot should not block a re-sync; the
                // fresh remote data replaces it.
                tracing::warn!(error = %e, "failed to load local snapshot, treating as empty");
                Vec::new()
            }
        };

        emit(
            sink_ref,
            ProgressEvent::info(90, "merging remote and local snapshots"),
        )
        .await;

        let merged = merge_snapshots(collected.repos, &local);

        emit(
            sink_ref,
            ProgressEvent::progress(
                95,
                format!("processed {} repositories", merged.len()),
                merged.len(),
                merged.len(),
            ),
        )
        .await;

        if let Err(e) = self.store.save_repos(&merged).await {
            emit(
                sink_ref,
                ProgressEvent::error(format!("failed to save snapshot: {e}")),
            )
            .await;
            return Err(SyncError::Store(e));
        }

        if let Err(e) = self.store.save_sync_time().await {
            tracing::warn!(error = %e, "failed to record sync time");
        }

        let outcome = SyncOutcome {
            total,
            merged: merged.len(),
            degraded: collected.degraded,
        };

        tracing::info!(
            total = outcome.total,
            merged = outcome.merged,
            degraded = outcome.degraded,
            "sync complete"
        );

        emit(
            sink_ref,
            ProgressEvent::complete(
                format!("sync complete, processed {} repositories", outcome.merged),
                outcome.merged,
            ),
        )
        .await;

        Ok(outcome)
    }
}
