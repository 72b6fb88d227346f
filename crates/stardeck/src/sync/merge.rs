//! Snapshot reconciliation.
//!
//! Two-branch decision per item, no conflict cases: remote-sourced fields
//! always come from the fresh fetch, local-sourced fields always come from
//! the prior snapshot when the item survived. Applied uniformly by every
//! sync path.

use std::collections::HashMap;

use crate::model::Repo;

/// Merge the freshly collected remote set with the prior snapshot.
///
/// - Every remote item appears in the output exactly once.
/// - Surviving IDs keep the prior snapshot's tag, category, and AI
///   description verbatim, ignoring whatever the collector attached.
/// - New IDs get empty local fields.
/// - IDs absent from the remote set are dropped; no tombstones.
///
/// O(n) via an ID-keyed lookup built once from the prior snapshot.
#[must_use]
pub fn merge_snapshots(remote: Vec<Repo>, local: &[Repo]) -> Vec<Repo> {
    let prior: HashMap<i64, &Repo> = local.iter().map(|r| (r.id, r)).collect();

    remote
        .into_iter()
        .map(|mut repo| {
            match prior.get(&repo.id) {
                Some(existing) => {
                    repo.tag = existing.tag.clone();
                    repo.category = existing.category;
                    repo.ai_description = existing.ai_description.clone();
                }
                None => repo.clear_local_fields(),
            }
            repo
        })
        .collect()
}
