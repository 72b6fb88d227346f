//! Core domain types shared across the sync engine, store, and server.
//!
//! A [`Repo`] combines two kinds of fields:
//!
//! - **Remote-sourced** fields (name, URL, stars, languages, topics) are
//!   always overwritten by the latest sync.
//! - **Local-sourced** fields (tag, category, AI description) belong to the
//!   user and survive re-syncs for any repository that already existed in
//!   the local snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One starred repository, as persisted in the local snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repo {
    /// Stable numeric ID assigned by GitHub. The merge key.
    pub id: i64,
    pub name: String,
    pub html_url: String,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub description: String,
    /// Primary language as reported on the list page.
    #[serde(default)]
    pub language: String,
    /// Full language set from the per-repo languages endpoint.
    /// Empty for degraded items until a later sync enriches them.
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    /// Convenience link to the rendered README.
    #[serde(default)]
    pub readme_url: String,
    /// User-assigned free-text tag. Empty when unset.
    #[serde(default)]
    pub tag: String,
    /// User-assigned category. `None` when unset.
    #[serde(default)]
    pub category: Option<Category>,
    /// AI-refined description. Empty until generated.
    #[serde(default)]
    pub ai_description: String,
}

impl Repo {
    /// Reset the local-sourced fields to their empty defaults.
    ///
    /// The collector calls this on every freshly fetched item; whether the
    /// item keeps these defaults or inherits prior values is decided later
    /// by the merge.
    pub fn clear_local_fields(&mut self) {
        self.tag.clear();
        self.category = None;
        self.ai_description.clear();
    }

    /// Whether the user has annotated this repository.
    #[must_use]
    pub fn is_annotated(&self) -> bool {
        !self.tag.is_empty() || self.category.is_some()
    }
}

/// Fixed set of user-assignable categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Mobile,
    Tooling,
    Database,
    DevOps,
    Ai,
    Security,
    Iot,
    Games,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 10] = [
        Category::Frontend,
        Category::Backend,
        Category::Mobile,
        Category::Tooling,
        Category::Database,
        Category::DevOps,
        Category::Ai,
        Category::Security,
        Category::Iot,
        Category::Games,
    ];

    /// The lowercase identifier used on the wire and in storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Frontend => "frontend",
            Category::Backend => "backend",
            Category::Mobile => "mobile",
            Category::Tooling => "tooling",
            Category::Database => "database",
            Category::DevOps => "devops",
            Category::Ai => "ai",
            Category::Security => "security",
            Category::Iot => "iot",
            Category::Games => "games",
        }
    }

    /// Human-readable label for the dashboard.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Frontend => "Frontend",
            Category::Backend => "Backend",
            Category::Mobile => "Mobile",
            Category::Tooling => "Tooling",
            Category::Database => "Database",
            Category::DevOps => "DevOps",
            Category::Ai => "AI / ML",
            Category::Security => "Security",
            Category::Iot => "IoT",
            Category::Games => "Games",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category identifier.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CategoryParseError(s.to_string()))
    }
}

/// User annotation for a single repository, keyed by repo ID.
///
/// Annotations live beside the snapshot rather than inside it so that edits
/// persist across re-syncs. A record whose three fields are all empty is
/// deleted rather than stored; absence is the tombstone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub description: String,
}

impl Annotation {
    /// Create an empty annotation for a repo ID.
    #[must_use]
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Whether every field is empty, meaning the record should be deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tag.is_empty() && self.category.is_none() && self.description.is_empty()
    }
}

/// Dashboard statistics derived from the snapshot and annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_repos: usize,
    pub annotated_repos: usize,
    /// RFC 3339 timestamp of the last successful sync, empty if never synced.
    #[serde(default)]
    pub last_sync: String,
}

/// Persisted user settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub openai: OpenAiSettings,
}

/// Connection settings for the annotation model endpoint.
///
/// All fields empty means the AI feature is unconfigured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub key: String,
    pub endpoint: String,
    pub model: String,
}

impl OpenAiSettings {
    /// Whether enough is configured to issue analysis requests.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.key.is_empty() && !self.endpoint.is_empty() && !self.model.is_empty()
    }
}
