//! Wire types for GitHub API responses.

use serde::Deserialize;

use crate::model::Repo;

/// The authenticated user, from `/user`.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

/// One repository as returned by the starred list endpoint.
///
/// The list payload carries only the basic fields; the detail endpoint
/// fills in the rest.
#[derive(Debug, Clone, Deserialize)]
pub struct PageRepo {
    pub id: i64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl PageRepo {
    /// Build a basic [`Repo`] from list-page fields alone.
    ///
    /// Used when the detail fetch for an item exhausts its retries: no
    /// language set, no README link, empty local fields.
    #[must_use]
    pub fn into_basic_repo(self) -> Repo {
        Repo {
            id: self.id,
            name: self.name,
            html_url: self.html_url,
            stargazers_count: self.stargazers_count,
            description: self.description.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            languages: Vec::new(),
            topics: self.topics,
            readme_url: String::new(),
            tag: String::new(),
            category: None,
            ai_description: String::new(),
        }
    }
}

/// Full repository payload from `/repos/{owner}/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoDetail {
    pub id: i64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl RepoDetail {
    /// Build an enriched [`Repo`], attaching the flattened language set.
    ///
    /// Local-sourced fields start empty; the merge decides whether prior
    /// values carry over.
    #[must_use]
    pub fn into_repo(self, languages: Vec<String>) -> Repo {
        let readme_url = format!("{}#readme", self.html_url);
        Repo {
            id: self.id,
            name: self.name,
            html_url: self.html_url,
            stargazers_count: self.stargazers_count,
            description: self.description.unwrap_or_default(),
            language: self.language.unwrap_or_default(),
            languages,
            topics: self.topics,
            readme_url,
            tag: String::new(),
            category: None,
            ai_description: String::new(),
        }
    }
}
