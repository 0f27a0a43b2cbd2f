//! # schemerge-engine
//!
//! Structure-aware three-way merge for KiCad schematic documents and
//! footprint info caches.
//!
//! ## Approach
//!
//! A schematic is treated as opaque text containing independently-movable
//! top-level blocks (wires, symbols, labels, junctions, ...). Merging a
//! proposed revision against an evolving mainline runs a strict pipeline:
//!
//! 1. **Scan** — each of the three revisions (ancestor, mainline,
//!    proposed) is scanned for recognized blocks: balanced-parenthesis
//!    constructs with a known head keyword, located by an explicit state
//!    machine (depth counter, string-literal mode, escape handling).
//! 2. **Identify** — every block gets a stable identity: the embedded
//!    `(uuid ...)` field when present, a digest of its exact bytes
//!    otherwise.
//! 3. **Reconcile** — the union of (keyword, identity) keys is classified
//!    against the three snapshots. Work introduced by either side is never
//!    dropped, deletions are opt-in, and true overlaps defer to an
//!    explicit precedence policy.
//! 4. **Rebuild** — the merged document is replayed onto the mainline
//!    text: untouched bytes survive verbatim, kept blocks are replaced in
//!    place, and position-less kept blocks are appended before the final
//!    closing delimiter.
//!
//! Blocks are atomic: the engine never merges inside a block, by design.
//! [`merge_record_caches`] is a simpler sibling for the flat two-line-keyed
//! cache format.
//!
//! ## Example
//!
//! ```rust
//! use schemerge_engine::{merge_schematic, KeywordSet, MergePolicy, MergeScenario};
//!
//! let ancestor = "(kicad_sch (version 1)\n)";
//! let mainline = "(kicad_sch (version 1)\n(wire (pts (xy 1 1)) (uuid aaaa1111))\n)";
//! let proposed = "(kicad_sch (version 1)\n(wire (pts (xy 2 2)) (uuid bbbb2222))\n)";
//!
//! let texts = MergeScenario::new(Some(ancestor), Some(mainline), Some(proposed));
//! let merged = merge_schematic(&texts, MergePolicy::default(), &KeywordSet::default());
//!
//! assert!(merged.contains("aaaa1111"));
//! assert!(merged.contains("bbbb2222"));
//! ```

pub mod identity;
pub mod rebuild;
pub mod reconcile;
pub mod records;
pub mod scanner;
pub mod snapshot;
pub mod types;

pub use rebuild::{rebuild_document, EMPTY_DOCUMENT};
pub use reconcile::{classify, merge_schematic, reconcile};
pub use records::{merge_record_caches, parse_records};
pub use snapshot::Snapshot;
pub use types::{
    Block, Fate, KeywordSet, MergePolicy, MergeScenario, ObjectKey, OverlapResolution,
    SCHEMATIC_KEYWORDS,
};
