//! Top-level block scanner.
//!
//! Locates every balanced-parenthesis construct whose head keyword is in
//! the recognized set, in a single forward pass over the document bytes.
//! Matching is an explicit state machine: a depth counter plus a
//! string-literal mode that suspends depth counting between quotes (with
//! `\"` escaping), so parentheses embedded in net names or text fields
//! cannot unbalance a block.
//!
//! A candidate with an unrecognized head keyword is not consumed: the scan
//! descends into it, which is how blocks nested in the `(kicad_sch ...)`
//! document root are found. A recognized block is consumed whole, so
//! recognized keywords nested inside it are never extracted separately.
//!
//! Unbalanced input (or an unterminated string) stops the scan at the
//! failure point; everything from there on stays opaque trailing text for
//! the rebuilder to preserve.

use crate::types::{KeywordSet, RawBlock};

/// Scan `text` for recognized blocks, in document order.
pub fn scan_blocks(text: &str, keywords: &KeywordSet) -> Vec<RawBlock> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(open) = find_open(bytes, pos) {
        let keyword = read_keyword(bytes, open);
        if !keywords.contains(&keyword) {
            pos = open + 1;
            continue;
        }
        let Some(end) = match_close(bytes, open) else {
            break;
        };
        blocks.push(RawBlock {
            keyword,
            span: open..end,
        });
        pos = end;
    }

    blocks
}

fn find_open(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == b'(')
        .map(|i| from + i)
}

/// Read the head keyword immediately after an opening parenthesis,
/// skipping leading whitespace. Keywords are runs of alphanumerics,
/// underscores, and hyphens.
fn read_keyword(bytes: &[u8], open: usize) -> String {
    let mut j = open + 1;
    while j < bytes.len() && bytes[j].is_ascii_whitespace() {
        j += 1;
    }
    let start = j;
    while j < bytes.len()
        && (bytes[j].is_ascii_alphanumeric() || bytes[j] == b'_' || bytes[j] == b'-')
    {
        j += 1;
    }
    String::from_utf8_lossy(&bytes[start..j]).into_owned()
}

/// Find the offset one past the parenthesis matching the one at `open`.
/// Returns `None` on unbalanced input or an unterminated string literal.
fn match_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_str = false;
    let mut esc = false;

    for (j, &b) in bytes.iter().enumerate().skip(open) {
        if in_str {
            if esc {
                esc = false;
            } else if b == b'\\' {
                esc = true;
            } else if b == b'"' {
                in_str = false;
            }
        } else {
            match b {
                b'"' => in_str = true,
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(j + 1);
                    }
                }
                _ => {}
            }
        }
    }
    None
}
