//! Per-path reconciliation over an injected revision source.
//!
//! The engine itself never touches version control; these functions fetch
//! the three revisions of one path through a [`RevisionSource`] and hand
//! the texts to the engine. A path absent at a revision is an empty
//! snapshot; only transport failure of the source itself is an error.

use schemerge_engine::{
    merge_record_caches, merge_schematic, KeywordSet, MergePolicy, MergeScenario,
};
use schemerge_git::{GitError, RevisionSource};

/// Fetch the three revisions of `path` and merge them structurally.
pub fn reconcile_schematic(
    source: &dyn RevisionSource,
    path: &str,
    revisions: &MergeScenario<&str>,
    policy: MergePolicy,
    keywords: &KeywordSet,
) -> Result<String, GitError> {
    let texts = fetch_revisions(source, path, revisions)?;
    Ok(merge_schematic(&texts.as_deref(), policy, keywords))
}

/// Fetch the three revisions of `path` and union-merge them as a flat
/// record cache.
pub fn reconcile_record_cache(
    source: &dyn RevisionSource,
    path: &str,
    revisions: &MergeScenario<&str>,
) -> Result<String, GitError> {
    let texts = fetch_revisions(source, path, revisions)?;
    Ok(merge_record_caches(&texts.as_deref()))
}

fn fetch_revisions(
    source: &dyn RevisionSource,
    path: &str,
    revisions: &MergeScenario<&str>,
) -> Result<MergeScenario<Option<String>>, GitError> {
    Ok(MergeScenario::new(
        source.read_at(path, revisions.ancestor)?,
        source.read_at(path, revisions.mainline)?,
        source.read_at(path, revisions.proposed)?,
    ))
}
