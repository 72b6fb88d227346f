//! Stardeck - a personal dashboard core for starred repositories.
//!
//! This library reconciles a user's remote starred collection against a
//! local, annotated snapshot. The sync engine walks the paginated starred
//! list to learn the total count, fans out one worker per page to enrich
//! every item with full detail, merges the result with the prior snapshot
//! so user annotations survive, and persists the outcome: streaming
//! monotonic progress percentages to an interactive client all the while.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use stardeck::http::ReqwestTransport;
//! use stardeck::github::GitHubClient;
//! use stardeck::{FileStore, SyncEngine};
//!
//! let transport = Arc::new(ReqwestTransport::with_default_timeout()?);
//! let store = Arc::new(FileStore::open("data").await?);
//! let client = GitHubClient::new(transport, token);
//!
//! let outcome = SyncEngine::new(client, store).run(None).await?;
//! println!("synced {} repositories", outcome.merged);
//! ```

pub mod ai;
pub mod fetch;
pub mod github;
pub mod http;
pub mod model;
pub mod session;
pub mod store;
pub mod sync;

pub use model::{Annotation, Category, OpenAiSettings, Repo, Settings, Stats};
pub use session::{Session, SessionRegistry};
pub use store::{FileStore, StoreError};
pub use sync::{ProgressEvent, ProgressKind, ProgressSink, SyncEngine, SyncError, SyncOutcome};
