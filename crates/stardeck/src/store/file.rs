//! File-backed snapshot store.
//!
//! Layout under the data directory:
//!
//! - `repos.json`: the snapshot, a JSON array of repos.
//! - `annotations.json`: ID-keyed map of user annotations.
//! - `last_sync.txt`: RFC 3339 timestamp of the last successful sync.
//! - `settings.json`: user settings.
//!
//! One read/write lock guards the whole read-then-write cycle; a sync run
//! holds the write half only while persisting, so concurrent readers see
//! the pre-sync snapshot until persistence completes.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::sync::RwLock;

use crate::model::{Annotation, Repo, Settings, Stats};

use super::StoreError;

const REPOS_FILE: &str = "repos.json";
const ANNOTATIONS_FILE: &str = "annotations.json";
const SYNC_TIME_FILE: &str = "last_sync.txt";
const SETTINGS_FILE: &str = "settings.json";

/// JSON-file persistence rooted at a data directory.
pub struct FileStore {
    data_dir: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir).await?;
        Ok(Self {
            data_dir,
            lock: RwLock::new(()),
        })
    }

    /// The directory this store persists into.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Load the snapshot with annotations merged in by ID.
    ///
    /// Returns [`StoreError::NotFound`] when no snapshot has been written.
    pub async fn load_repos(&self) -> Result<Vec<Repo>, StoreError> {
        let _guard = self.lock.read().await;
        self.read_repos_unlocked().await
    }

    /// Persist the full snapshot, replacing the previous one.
    pub async fn save_repos(&self, repos: &[Repo]) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let data = serde_json::to_vec(repos)?;
        tokio::fs::write(self.path(REPOS_FILE), data).await?;
        tracing::debug!(count = repos.len(), "saved snapshot");
        Ok(())
    }

    /// Record the current time as the last successful sync.
    pub async fn save_sync_time(&self) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let now = Utc::now().to_rfc3339();
        tokio::fs::write(self.path(SYNC_TIME_FILE), now).await?;
        Ok(())
    }

    /// The last sync timestamp, if any sync has completed.
    pub async fn load_sync_time(&self) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.read().await;
        match tokio::fs::read_to_string(self.path(SYNC_TIME_FILE)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up the annotation for one repo ID.
    pub async fn annotation(&self, id: i64) -> Result<Option<Annotation>, StoreError> {
        let _guard = self.lock.read().await;
        let annotations = self.read_annotations_unlocked().await?;
        Ok(annotations.get(&id).cloned())
    }

    /// Upsert an annotation; an all-empty record deletes instead.
    pub async fn save_annotation(&self, annotation: Annotation) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let mut annotations = self.read_annotations_unlocked().await?;

        if annotation.is_empty() {
            annotations.remove(&annotation.id);
        } else {
            annotations.insert(annotation.id, annotation);
        }

        let data = serde_json::to_vec_pretty(&annotations)?;
        tokio::fs::write(self.path(ANNOTATIONS_FILE), data).await?;
        Ok(())
    }

    /// Dashboard statistics from the snapshot and annotations.
    pub async fn stats(&self) -> Result<Stats, StoreError> {
        let _guard = self.lock.read().await;
        let repos = match self.read_repos_unlocked().await {
            Ok(repos) => repos,
            Err(StoreError::NotFound) => Vec::new(),
            Err(e) => return Err(e),
        };

        let annotated_repos = repos.iter().filter(|r| r.is_annotated()).count();
        let last_sync = match tokio::fs::read_to_string(self.path(SYNC_TIME_FILE)).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Stats {
            total_repos: repos.len(),
            annotated_repos,
            last_sync,
        })
    }

    /// Load settings, falling back to defaults when none are stored.
    pub async fn load_settings(&self) -> Result<Settings, StoreError> {
        let _guard = self.lock.read().await;
        match tokio::fs::read(self.path(SETTINGS_FILE)).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist settings, replacing the previous file.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), StoreError> {
        let _guard = self.lock.write().await;
        let data = serde_json::to_vec_pretty(settings)?;
        tokio::fs::write(self.path(SETTINGS_FILE), data).await?;
        Ok(())
    }

    async fn read_repos_unlocked(&self) -> Result<Vec<Repo>, StoreError> {
        let data = match tokio::fs::read(self.path(REPOS_FILE)).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };

        let mut repos: Vec<Repo> = serde_json::from_slice(&data)?;
        let annotations = self.read_annotations_unlocked().await?;

        // The annotation map is the source of truth for local fields;
        // values baked into the snapshot by a previous merge never outlive
        // a deleted record.
        for repo in &mut repos {
            match annotations.get(&repo.id) {
                Some(annotation) => {
                    repo.tag = annotation.tag.clone();
                    repo.category = annotation.category;
                    repo.ai_description = annotation.description.clone();
                }
                None => repo.clear_local_fields(),
            }
        }

        Ok(repos)
    }

    async fn read_annotations_unlocked(&self) -> Result<BTreeMap<i64, Annotation>, StoreError> {
        match tokio::fs::read(self.path(ANNOTATIONS_FILE)).await {
            Ok(data) => Ok(serde_json::from_slice(&data)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}
