//! Concurrent detail collection.
//!
//! One worker per page, launched all at once; parallelism is bounded only by
//! page count. Within a worker, item detail fetches run strictly
//! sequentially. Item-level failures degrade; page-level failures abort the
//! whole phase, first error wins, and sibling workers run to completion with
//! their results discarded.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::github::{GitHubClient, GitHubError, PAGE_SIZE, owner_repo_from_url};
use crate::model::Repo;

use super::progress::CollectProgress;

/// Result of the collection phase.
#[derive(Debug)]
pub struct CollectOutcome {
    /// One enriched or degraded item per remote item. Cross-page order is
    /// unspecified: it depends on worker completion timing.
    pub repos: Vec<Repo>,
    /// Items built from list-page fields after detail retries ran out.
    pub degraded: usize,
}

/// Collect full detail for every starred item.
///
/// `total` comes from the estimation pre-pass. Zero items short-circuits to
/// an empty success without spawning any workers. There is no partial
/// success: on the first page-level error the phase returns that error and
/// every other page's result is dropped.
pub async fn collect_detailed(
    client: &GitHubClient,
    total: usize,
    progress: Arc<CollectProgress>,
) -> Result<CollectOutcome, GitHubError> {
    let pages = total.div_ceil(PAGE_SIZE);
    if pages == 0 {
        return Ok(CollectOutcome {
            repos: Vec::new(),
            degraded: 0,
        });
    }

    // Channels sized to page count so no worker ever blocks on send, even
    // after the collector has stopped draining.
    let (result_tx, mut result_rx) = mpsc::channel::<(Vec<Repo>, usize)>(pages);
    let (error_tx, mut error_rx) = mpsc::channel::<GitHubError>(pages);

    for page in 1..=pages {
        let client = client.clone();
        let progress = Arc::clone(&progress);
        let result_tx = result_tx.clone();
        let error_tx = error_tx.clone();

        tokio::spawn(async move {
            match collect_page(&client, page, &progress).await {
                Ok(page_result) => {
                    let _ = result_tx.send(page_result).await;
                }
                Err(e) => {
                    tracing::error!(page, error = %e, "page collection failed");
                    let _ = error_tx.send(e).await;
                }
            }
        });
    }
    drop(result_tx);
    drop(error_tx);

    let mut repos = Vec::with_capacity(total);
    let mut degraded = 0usize;

    // Exactly one message arrives per page, across the two channels.
    for _ in 0..pages {
        tokio::select! {
            Some((page_repos, page_degraded)) = result_rx.recv() => {
                repos.extend(page_repos);
                degraded += page_degraded;
            }
            Some(err) = error_rx.recv() => {
                return Err(err);
            }
        }
    }

    Ok(CollectOutcome { repos, degraded })
}

/// Fetch one page's item list and enrich each item sequentially.
///
/// Returns the enriched items and the count of degraded ones. A list-fetch
/// failure is the page's hard error; a detail-fetch failure only downgrades
/// that item to its list-page fields.
async fn collect_page(
    client: &GitHubClient,
    page: usize,
    progress: &CollectProgress,
) -> Result<(Vec<Repo>, usize), GitHubError> {
    let listed = client.list_starred_page(page).await?;

    let mut repos = Vec::with_capacity(listed.len());
    let mut degraded = 0usize;

    for item in listed {
        let repo = match owner_repo_from_url(&item.html_url) {
            Ok((owner, name)) => match client.get_repo_detail(&owner, &name).await {
                Ok(mut detail) => {
                    // New or existing is unknown here; the merge decides.
                    detail.clear_local_fields();
                    detail
                }
                Err(e) => {
                    tracing::warn!(
                        repo = %format!("{}/{}", owner, name),
                        error = %e,
                        "detail fetch failed, falling back to list fields"
                    );
                    degraded += 1;
                    item.into_basic_repo()
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "unparseable repository URL, using list fields");
                degraded += 1;
                item.into_basic_repo()
            }
        };

        repos.push(repo);
        progress.item_done().await;
    }

    tracing::debug!(page, count = repos.len(), degraded, "collected page");
    Ok((repos, degraded))
}
