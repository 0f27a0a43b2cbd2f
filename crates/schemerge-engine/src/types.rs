//! Core types for the structural merge engine.
//!
//! A schematic document is modeled as opaque text containing
//! independently-movable top-level constructs. A [`Block`] is the atomic
//! unit of merge: it is kept verbatim from one revision or dropped, never
//! partially modified.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Head keywords of the KiCad schematic constructs that move independently
/// between revisions. Everything else (the document root, paper settings,
/// symbol libraries, ...) is treated as surrounding text.
pub const SCHEMATIC_KEYWORDS: &[&str] = &[
    "symbol",
    "wire",
    "junction",
    "no_connect",
    "label",
    "global_label",
    "hierarchical_label",
    "sheet",
    "bus",
    "bus_entry",
    "polyline",
    "text",
    "image",
    "group",
    "note",
    "dimension",
];

/// The set of head keywords the scanner extracts as blocks.
///
/// Injected into the scanner rather than consulted as a process-wide
/// global, so configuration and tests can substitute their own set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet(BTreeSet<String>);

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keywords.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.0.contains(keyword)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(SCHEMATIC_KEYWORDS.iter().copied())
    }
}

/// A balanced-delimiter construct located by the scanner, before identity
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub keyword: String,
    /// Byte range in the source document, delimiters included.
    pub span: Range<usize>,
}

/// An atomic, identity-bearing top-level construct in a schematic document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub keyword: String,
    pub identity: String,
    /// Exact text of the block, delimiters included.
    pub content: String,
    /// Byte range in the document the block was parsed from.
    pub span: Range<usize>,
}

impl Block {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.keyword, &self.identity)
    }
}

/// (keyword, identity) pair uniquely identifying a block within one
/// snapshot. Blocks with the same key across revisions are the same
/// logical object even when their content differs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub keyword: String,
    pub identity: String,
}

impl ObjectKey {
    pub fn new(keyword: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            identity: identity.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.keyword, self.identity)
    }
}

/// The three revisions of one document taking part in a merge.
#[derive(Debug, Clone)]
pub struct MergeScenario<T> {
    pub ancestor: T,
    pub mainline: T,
    pub proposed: T,
}

impl<T> MergeScenario<T> {
    pub fn new(ancestor: T, mainline: T, proposed: T) -> Self {
        Self {
            ancestor,
            mainline,
            proposed,
        }
    }
}

impl MergeScenario<Option<String>> {
    /// Borrow the owned revision texts as `Option<&str>` for the engine.
    pub fn as_deref(&self) -> MergeScenario<Option<&str>> {
        MergeScenario::new(
            self.ancestor.as_deref(),
            self.mainline.as_deref(),
            self.proposed.as_deref(),
        )
    }
}

/// Which side supplies the content when both mainline and proposed carry
/// the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapResolution {
    PreferProposed,
    PreferMainline,
}

impl OverlapResolution {
    pub fn as_str(&self) -> &str {
        match self {
            OverlapResolution::PreferProposed => "prefer-proposed",
            OverlapResolution::PreferMainline => "prefer-mainline",
        }
    }
}

impl fmt::Display for OverlapResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlapResolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "prefer-proposed" => Ok(OverlapResolution::PreferProposed),
            "prefer-mainline" => Ok(OverlapResolution::PreferMainline),
            other => Err(format!(
                "unknown overlap mode `{other}` (expected prefer-proposed or prefer-mainline)"
            )),
        }
    }
}

/// Policy knobs for the three-way reconciler.
#[derive(Debug, Clone, Copy)]
pub struct MergePolicy {
    pub overlap: OverlapResolution,
    /// When false, an object the proposed side deleted but the mainline
    /// still carries survives the merge. Deletions are opt-in because an
    /// object missing from one side is ambiguous between a real deletion
    /// and that side simply not having synced yet.
    pub allow_deletions: bool,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            overlap: OverlapResolution::PreferProposed,
            allow_deletions: false,
        }
    }
}

/// The fate of one object key after three-way classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    KeepMainline,
    KeepProposed,
    Drop,
}
