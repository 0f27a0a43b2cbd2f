//! Snapshot indexing: one document revision, keyed by object identity.

use std::collections::BTreeMap;

use crate::identity::resolve_identity;
use crate::scanner::scan_blocks;
use crate::types::{Block, KeywordSet, ObjectKey};

/// Every recognized block of one document revision, keyed by
/// (keyword, identity).
///
/// A document absent at a revision is modeled as an empty snapshot, not an
/// error. Building a snapshot is pure and deterministic for identical
/// input text.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    blocks: BTreeMap<ObjectKey, Block>,
}

impl Snapshot {
    /// Index one document revision.
    pub fn parse(text: &str, keywords: &KeywordSet) -> Self {
        let mut blocks = BTreeMap::new();
        for raw in scan_blocks(text, keywords) {
            let content = text[raw.span.clone()].to_string();
            let identity = resolve_identity(&content);
            let key = ObjectKey::new(raw.keyword.clone(), identity.clone());
            blocks.insert(
                key,
                Block {
                    keyword: raw.keyword,
                    identity,
                    content,
                    span: raw.span,
                },
            );
        }
        Self { blocks }
    }

    /// Index a revision that may not have the document at all.
    pub fn parse_opt(text: Option<&str>, keywords: &KeywordSet) -> Self {
        text.map(|t| Self::parse(t, keywords)).unwrap_or_default()
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.blocks.contains_key(key)
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&Block> {
        self.blocks.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.blocks.keys()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
