//! GitHub REST client over the transport seam.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::fetch::{RetryPolicy, send_with_retry};
use crate::http::{HttpHeaders, HttpRequest, HttpTransport};
use crate::model::Repo;

use super::error::GitHubError;
use super::types::{GitHubUser, PageRepo, RepoDetail};

/// Base URL for the public GitHub API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Fixed page size for the paginated starred list.
pub const PAGE_SIZE: usize = 100;

/// Token-authenticated GitHub API client.
///
/// Cheap to clone; the transport is shared behind an `Arc` so one client can
/// be handed to many concurrent page workers.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    token: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GitHubClient {
    /// Create a client for the public GitHub API.
    pub fn new(transport: Arc<dyn HttpTransport>, token: impl Into<String>) -> Self {
        Self {
            transport,
            token: token.into(),
            base_url: DEFAULT_API_URL.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    /// Override the API base URL (tests, GitHub Enterprise).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Override the per-call retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn headers(&self) -> HttpHeaders {
        vec![
            (
                "Authorization".to_string(),
                format!("token {}", self.token),
            ),
            (
                "Accept".to_string(),
                "application/vnd.github.v3+json".to_string(),
            ),
            ("User-Agent".to_string(), "stardeck".to_string()),
        ]
    }

    /// GET a route and decode the JSON body.
    ///
    /// Transport failures are retried by the fetcher; a non-success status
    /// is returned as [`GitHubError::Status`] without retrying.
    async fn get_json<T: DeserializeOwned>(&self, route: &str) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, route);
        let request = HttpRequest::get(url, self.headers());
        let response = send_with_retry(self.transport.as_ref(), request, self.retry).await?;

        if !response.is_success() {
            return Err(GitHubError::Status {
                code: response.status,
            });
        }

        serde_json::from_slice(&response.body).map_err(|e| GitHubError::Decode(e.to_string()))
    }

    /// Fetch the authenticated user's identity.
    pub async fn get_authenticated_user(&self) -> Result<GitHubUser, GitHubError> {
        self.get_json("/user").await
    }

    /// Fetch one page of the starred list (basic fields only).
    ///
    /// Pages are 1-indexed. A page shorter than [`PAGE_SIZE`] is the last.
    pub async fn list_starred_page(&self, page: usize) -> Result<Vec<PageRepo>, GitHubError> {
        self.get_json(&format!(
            "/user/starred?page={}&per_page={}",
            page, PAGE_SIZE
        ))
        .await
    }

    /// Fetch the full detail for one repository, including its language set.
    ///
    /// The languages request is best-effort: a failure there is logged and
    /// yields an empty language set rather than failing the whole item.
    pub async fn get_repo_detail(&self, owner: &str, name: &str) -> Result<Repo, GitHubError> {
        let detail: RepoDetail = self.get_json(&format!("/repos/{}/{}", owner, name)).await?;

        let languages = match self
            .get_json::<BTreeMap<String, u64>>(&format!("/repos/{}/{}/languages", owner, name))
            .await
        {
            Ok(map) => map.into_keys().collect(),
            Err(e) => {
                tracing::warn!(
                    repo = %format!("{}/{}", owner, name),
                    error = %e,
                    "failed to fetch repository languages"
                );
                Vec::new()
            }
        };

        Ok(detail.into_repo(languages))
    }
}

/// Derive the `(owner, name)` pair from a repository's canonical URL.
///
/// A trailing `.git` suffix is stripped first. Errors when the URL does not
/// contain at least two path segments.
pub fn owner_repo_from_url(html_url: &str) -> Result<(String, String), GitHubError> {
    let trimmed = html_url.trim_end_matches(".git").trim_end_matches('/');
    let mut parts = trimmed.rsplit('/');

    let name = parts.next().unwrap_or_default();
    let owner = parts.next().unwrap_or_default();

    if owner.is_empty() || name.is_empty() || owner.contains(':') {
        return Err(GitHubError::InvalidRepoUrl(html_url.to_string()));
    }

    Ok((owner.to_string(), name.to_string()))
}
