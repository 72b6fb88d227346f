//! The starred-item synchronization engine.
//!
//! Reconciles the remote starred collection against the local snapshot
//! while streaming progress to an interactive client:
//!
//! 1. [`estimate`] walks the paginated list once to learn the total count.
//! 2. [`collect`] fans out one worker per page and enriches every item via
//!    detail calls, degrading items whose detail fetch exhausts its retries.
//! 3. [`merge`] reconciles the fresh remote set with the prior snapshot,
//!    preserving local annotations for surviving items.
//! 4. [`engine`] sequences the phases and persists the result.

pub mod collect;
pub mod engine;
pub mod estimate;
pub mod merge;
pub mod progress;

pub use collect::{CollectOutcome, collect_detailed};
pub use engine::{SyncEngine, SyncError, SyncOutcome};
pub use estimate::count_starred;
pub use merge::merge_snapshots;
pub use progress::{
    COLLECT_CEILING, COLLECT_FLOOR, CollectProgress, ProgressEvent, ProgressKind, ProgressSink,
    emit,
};
