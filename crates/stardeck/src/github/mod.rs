//! GitHub API integration.
//!
//! A thin, token-authenticated REST client over the [`HttpTransport`] seam.
//! All calls go through the retrying fetcher; pagination and fan-out live in
//! the sync engine, not here.
//!
//! [`HttpTransport`]: crate::http::HttpTransport

mod client;
mod error;
mod types;

pub use client::{DEFAULT_API_URL, GitHubClient, PAGE_SIZE, owner_repo_from_url};
pub use error::GitHubError;
pub use types::{GitHubUser, PageRepo, RepoDetail};
