//! Three-way reconciliation.
//!
//! Classifies every object key present in any of the three snapshots and
//! decides its fate. The table is deliberately conservative:
//!
//! - an object absent from the ancestor was introduced by one side since
//!   the histories diverged and is never dropped;
//! - an object the proposed side no longer carries is only dropped when
//!   deletions are explicitly allowed, because "missing on one side" is
//!   ambiguous between a real deletion and an unsynced branch;
//! - a key carried by both sides is an overlap, resolved by an explicit
//!   precedence policy rather than any content heuristic.

use std::collections::{BTreeMap, BTreeSet};

use crate::rebuild::rebuild_document;
use crate::snapshot::Snapshot;
use crate::types::{Fate, KeywordSet, MergePolicy, MergeScenario, ObjectKey, OverlapResolution};

/// Decide the fate of one key from its presence in the ancestor, mainline,
/// and proposed snapshots.
pub fn classify(
    in_ancestor: bool,
    in_mainline: bool,
    in_proposed: bool,
    policy: MergePolicy,
) -> Fate {
    match (in_ancestor, in_mainline, in_proposed) {
        // Added on the mainline since the ancestor.
        (false, true, false) => Fate::KeepMainline,
        // Added on the proposed side since the ancestor.
        (false, false, true) => Fate::KeepProposed,
        // Deleted by the proposed side.
        (true, true, false) => {
            if policy.allow_deletions {
                Fate::Drop
            } else {
                Fate::KeepMainline
            }
        }
        // Deleted by the mainline, still carried by the proposed side.
        (true, false, true) => Fate::KeepProposed,
        // Carried by both sides, with or without an ancestor: overlap.
        (_, true, true) => match policy.overlap {
            OverlapResolution::PreferProposed => Fate::KeepProposed,
            OverlapResolution::PreferMainline => Fate::KeepMainline,
        },
        // Removed by both sides.
        (true, false, false) => Fate::Drop,
        // A key comes from the union of the three snapshots, so this arm
        // is unreachable in practice.
        (false, false, false) => Fate::Drop,
    }
}

/// Compute the kept keys and their resolved content for one document.
pub fn reconcile(
    snapshots: &MergeScenario<Snapshot>,
    policy: MergePolicy,
) -> BTreeMap<ObjectKey, String> {
    let mut union: BTreeSet<&ObjectKey> = BTreeSet::new();
    union.extend(snapshots.ancestor.keys());
    union.extend(snapshots.mainline.keys());
    union.extend(snapshots.proposed.keys());

    let mut keep = BTreeMap::new();
    for key in union {
        let fate = classify(
            snapshots.ancestor.contains(key),
            snapshots.mainline.contains(key),
            snapshots.proposed.contains(key),
            policy,
        );
        let resolved = match fate {
            Fate::KeepMainline => snapshots.mainline.get(key),
            Fate::KeepProposed => snapshots.proposed.get(key),
            Fate::Drop => None,
        };
        if let Some(block) = resolved {
            keep.insert(key.clone(), block.content.clone());
        }
    }
    keep
}

/// Merge one schematic document end to end: index the three revisions,
/// reconcile the key union, and rebuild onto the mainline text.
pub fn merge_schematic(
    texts: &MergeScenario<Option<&str>>,
    policy: MergePolicy,
    keywords: &KeywordSet,
) -> String {
    let snapshots = MergeScenario::new(
        Snapshot::parse_opt(texts.ancestor, keywords),
        Snapshot::parse_opt(texts.mainline, keywords),
        Snapshot::parse_opt(texts.proposed, keywords),
    );
    let keep = reconcile(&snapshots, policy);
    rebuild_document(texts.mainline, &keep, keywords)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(overlap: OverlapResolution, allow_deletions: bool) -> MergePolicy {
        MergePolicy {
            overlap,
            allow_deletions,
        }
    }

    #[test]
    fn test_classification_table() {
        let default = MergePolicy::default();
        assert_eq!(classify(false, true, false, default), Fate::KeepMainline);
        assert_eq!(classify(false, false, true, default), Fate::KeepProposed);
        assert_eq!(classify(true, false, true, default), Fate::KeepProposed);
        assert_eq!(classify(true, false, false, default), Fate::Drop);
    }

    #[test]
    fn test_proposed_side_deletion_is_opt_in() {
        let conservative = policy(OverlapResolution::PreferProposed, false);
        let destructive = policy(OverlapResolution::PreferProposed, true);
        assert_eq!(classify(true, true, false, conservative), Fate::KeepMainline);
        assert_eq!(classify(true, true, false, destructive), Fate::Drop);
    }

    #[test]
    fn test_overlaps_follow_precedence_policy() {
        for in_ancestor in [true, false] {
            assert_eq!(
                classify(
                    in_ancestor,
                    true,
                    true,
                    policy(OverlapResolution::PreferProposed, false)
                ),
                Fate::KeepProposed
            );
            assert_eq!(
                classify(
                    in_ancestor,
                    true,
                    true,
                    policy(OverlapResolution::PreferMainline, false)
                ),
                Fate::KeepMainline
            );
        }
    }

    #[test]
    fn test_new_work_is_never_dropped() {
        for in_mainline in [true, false] {
            for in_proposed in [true, false] {
                if !in_mainline && !in_proposed {
                    continue;
                }
                for overlap in [
                    OverlapResolution::PreferProposed,
                    OverlapResolution::PreferMainline,
                ] {
                    for allow_deletions in [true, false] {
                        let fate = classify(
                            false,
                            in_mainline,
                            in_proposed,
                            policy(overlap, allow_deletions),
                        );
                        assert_ne!(fate, Fate::Drop);
                    }
                }
            }
        }
    }

    #[test]
    fn test_overlap_content_comes_from_the_preferred_side() {
        let keywords = KeywordSet::default();
        let ancestor = "(root\n(wire (pts (xy 0 0)) (uuid aaaa1111))\n)";
        let mainline = "(root\n(wire (pts (xy 1 1)) (uuid aaaa1111))\n)";
        let proposed = "(root\n(wire (pts (xy 2 2)) (uuid aaaa1111))\n)";
        let snapshots = MergeScenario::new(
            Snapshot::parse(ancestor, &keywords),
            Snapshot::parse(mainline, &keywords),
            Snapshot::parse(proposed, &keywords),
        );

        let keep = reconcile(
            &snapshots,
            policy(OverlapResolution::PreferProposed, false),
        );
        assert_eq!(
            keep[&ObjectKey::new("wire", "aaaa1111")],
            "(wire (pts (xy 2 2)) (uuid aaaa1111))"
        );

        let keep = reconcile(
            &snapshots,
            policy(OverlapResolution::PreferMainline, false),
        );
        assert_eq!(
            keep[&ObjectKey::new("wire", "aaaa1111")],
            "(wire (pts (xy 1 1)) (uuid aaaa1111))"
        );
    }

    #[test]
    fn test_merge_is_idempotent_on_identical_revisions() {
        let doc = "(kicad_sch (version 20211014)\n(wire (pts (xy 0 0)) (uuid aaaa1111))\n(junction (at 3 4) (uuid bbbb2222))\n)\n";
        let texts = MergeScenario::new(Some(doc), Some(doc), Some(doc));
        let merged = merge_schematic(&texts, MergePolicy::default(), &KeywordSet::default());
        assert_eq!(merged, doc);
    }

    #[test]
    fn test_independent_additions_both_survive_any_policy() {
        let ancestor = "(root (version 1)\n)";
        let mainline = "(root (version 1)\n(wire (pts (xy 1 1)) (uuid aaaa1111))\n)";
        let proposed = "(root (version 1)\n(wire (pts (xy 2 2)) (uuid bbbb2222))\n)";
        let texts = MergeScenario::new(Some(ancestor), Some(mainline), Some(proposed));

        for overlap in [
            OverlapResolution::PreferProposed,
            OverlapResolution::PreferMainline,
        ] {
            let merged = merge_schematic(&texts, policy(overlap, false), &KeywordSet::default());
            assert_eq!(merged.matches("aaaa1111").count(), 1);
            assert_eq!(merged.matches("bbbb2222").count(), 1);
        }
    }

    #[test]
    fn test_document_only_on_proposed_side_is_recreated() {
        let proposed = "(kicad_sch (version 20211014)\n(wire (pts) (uuid cccc3333))\n)";
        let texts = MergeScenario::new(None, None, Some(proposed));
        let merged = merge_schematic(&texts, MergePolicy::default(), &KeywordSet::default());
        assert!(merged.starts_with("(kicad_sch"));
        assert!(merged.contains("(wire (pts) (uuid cccc3333))"));
    }

    #[test]
    fn test_untagged_edit_reads_as_replace() {
        // Without an identifier an edit is an add of a new key plus a
        // proposed-side deletion of the old one, which the conservative
        // default keeps.
        let ancestor = "(root\n(wire (pts (xy 0 0)))\n)";
        let mainline = "(root\n(wire (pts (xy 0 0)))\n)";
        let proposed = "(root\n(wire (pts (xy 5 5)))\n)";
        let texts = MergeScenario::new(Some(ancestor), Some(mainline), Some(proposed));
        let merged = merge_schematic(&texts, MergePolicy::default(), &KeywordSet::default());
        assert!(merged.contains("(xy 5 5)"));
        assert!(merged.contains("(xy 0 0)"));
    }
}
