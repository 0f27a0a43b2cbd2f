//! Document rebuilding.
//!
//! Replays a decision set onto the mainline document's literal text. Bytes
//! not covered by a recognized block are copied through untouched, kept
//! blocks are replaced in place by their resolved content, dropped blocks
//! are excised with their delimiters, and kept blocks with no mainline
//! position are appended before the document's final closing delimiter.

use std::collections::{BTreeMap, BTreeSet};

use crate::identity::resolve_identity;
use crate::scanner::scan_blocks;
use crate::types::{KeywordSet, ObjectKey};

/// Skeleton used when the document does not exist on the mainline.
pub const EMPTY_DOCUMENT: &str = "(kicad_sch (version 20211014) (generator merged)\n)";

/// Rebuild the merged document text from the mainline revision and the
/// reconciler's keep map (kept key → resolved content).
///
/// The output is trimmed of trailing whitespace and ends with exactly one
/// newline. Orphaned keys (kept but positionless on the mainline) are
/// appended in key order, separated by blank lines.
pub fn rebuild_document(
    mainline: Option<&str>,
    keep: &BTreeMap<ObjectKey, String>,
    keywords: &KeywordSet,
) -> String {
    let source = mainline.unwrap_or(EMPTY_DOCUMENT);

    let mut out = String::with_capacity(source.len());
    let mut last = 0;
    let mut placed: BTreeSet<&ObjectKey> = BTreeSet::new();

    for raw in scan_blocks(source, keywords) {
        let content = &source[raw.span.clone()];
        let key = ObjectKey::new(raw.keyword, resolve_identity(content));
        out.push_str(&source[last..raw.span.start]);
        if let Some((kept_key, resolved)) = keep.get_key_value(&key) {
            out.push_str(resolved);
            placed.insert(kept_key);
        }
        last = raw.span.end;
    }
    out.push_str(&source[last..]);

    let mut merged = out.trim_end().to_string();

    let orphans: Vec<&str> = keep
        .iter()
        .filter(|(key, _)| !placed.contains(*key))
        .map(|(_, content)| content.as_str())
        .collect();
    if !orphans.is_empty() {
        if merged.ends_with(')') {
            merged.pop();
        }
        merged.push('\n');
        merged.push_str(&orphans.join("\n\n"));
        merged.push_str("\n)");
    }

    let mut normalized = merged.trim_end().to_string();
    normalized.push('\n');
    normalized
}
