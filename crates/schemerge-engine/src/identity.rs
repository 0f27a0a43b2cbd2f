//! Block identity resolution.
//!
//! A block carrying a `(uuid ...)` field keeps that identity across edits
//! to the rest of its content. A block without one is identified by a
//! digest of its exact bytes, so any edit reads as a removal of the old
//! object plus an addition of a new one.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static UUID_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(uuid\s+([0-9a-fA-F-]{8,})\)").expect("uuid field pattern"));

/// Derive the stable identity string for a block's raw text.
///
/// The identifier token is case-normalized so `AAAA1111` and `aaaa1111`
/// name the same object.
pub fn resolve_identity(content: &str) -> String {
    match UUID_FIELD.captures(content) {
        Some(caps) => caps[1].to_ascii_lowercase(),
        None => format!("{:x}", Sha256::digest(content.as_bytes())),
    }
}
