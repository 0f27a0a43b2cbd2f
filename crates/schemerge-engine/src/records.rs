//! Footprint info cache union merging.
//!
//! The cache is a flat sequence of line records, each keyed by two
//! consecutive header lines (category, then footprint name). The merger
//! is a union across the three revisions in ancestor, mainline, proposed
//! order: the first occurrence of a key fixes its output position, the
//! last occurrence supplies its lines, so the proposed side wins content
//! on duplicates.

use std::collections::HashMap;

use crate::types::MergeScenario;

/// Key of one cache record: the trimmed (category, name) header pair.
pub type RecordKey = (String, String);

/// Whether a line can serve as one half of a record header: non-empty
/// after trimming, no internal whitespace, not a URL, not purely numeric,
/// and drawn from the identifier character class.
fn is_header_candidate(line: &str) -> bool {
    let s = line.trim();
    if s.is_empty() {
        return false;
    }
    if s.contains(char::is_whitespace) {
        return false;
    }
    if s.to_ascii_lowercase().starts_with("http") {
        return false;
    }
    if s.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

/// Split cache text into records. A record starts where two consecutive
/// lines are both header candidates and runs to the next such pair or the
/// end of the document. Lines before the first header pair belong to no
/// record and are dropped.
pub fn parse_records(text: &str) -> Vec<(RecordKey, Vec<String>)> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();
    let mut i = 0;

    while i + 1 < lines.len() {
        if !(is_header_candidate(lines[i]) && is_header_candidate(lines[i + 1])) {
            i += 1;
            continue;
        }
        let key = (
            lines[i].trim().to_string(),
            lines[i + 1].trim().to_string(),
        );
        let mut j = i + 2;
        loop {
            if j + 1 >= lines.len() {
                j = lines.len();
                break;
            }
            if is_header_candidate(lines[j]) && is_header_candidate(lines[j + 1]) {
                break;
            }
            j += 1;
        }
        records.push((key, lines[i..j].iter().map(|l| l.to_string()).collect()));
        i = j;
    }

    records
}

/// Union-merge the three revisions of a cache document.
pub fn merge_record_caches(texts: &MergeScenario<Option<&str>>) -> String {
    let mut order: Vec<RecordKey> = Vec::new();
    let mut merged: HashMap<RecordKey, Vec<String>> = HashMap::new();

    for text in [texts.ancestor, texts.mainline, texts.proposed]
        .into_iter()
        .flatten()
    {
        for (key, lines) in parse_records(text) {
            if !merged.contains_key(&key) {
                order.push(key.clone());
            }
            merged.insert(key, lines);
        }
    }

    let mut out: Vec<String> = Vec::new();
    for key in &order {
        if let Some(lines) = merged.get(key) {
            out.extend(lines.iter().cloned());
        }
    }
    out.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_candidate_rules() {
        assert!(is_header_candidate("Resistor_SMD"));
        assert!(is_header_candidate("R_0402_1005Metric"));
        assert!(is_header_candidate("Connector:USB-C"));
        assert!(!is_header_candidate(""));
        assert!(!is_header_candidate("   "));
        assert!(!is_header_candidate("two words"));
        assert!(!is_header_candidate("https://example.com/lib"));
        assert!(!is_header_candidate("HTTP://EXAMPLE.COM"));
        assert!(!is_header_candidate("1234"));
        assert!(!is_header_candidate("bad|chars"));
    }

    #[test]
    fn test_records_split_on_header_pairs() {
        let text = "Resistor_SMD\nR_0402\n0\n10\nCapacitor_SMD\nC_0603\n0\n12\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].0,
            ("Resistor_SMD".to_string(), "R_0402".to_string())
        );
        assert_eq!(records[0].1, vec!["Resistor_SMD", "R_0402", "0", "10"]);
        assert_eq!(records[1].1, vec!["Capacitor_SMD", "C_0603", "0", "12"]);
    }

    #[test]
    fn test_last_record_extends_to_end_of_document() {
        let text = "Resistor_SMD\nR_0402\n0\n10\n20\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, vec!["Resistor_SMD", "R_0402", "0", "10", "20"]);
    }

    #[test]
    fn test_preamble_lines_belong_to_no_record() {
        let text = "some preamble text\nResistor_SMD\nR_0402\n0\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].1, vec!["Resistor_SMD", "R_0402", "0"]);
    }

    #[test]
    fn test_proposed_wins_duplicate_keys_at_first_seen_position() {
        let ancestor = "Resistor_SMD\nR_0402\nold\nCapacitor_SMD\nC_0603\nkeep\n";
        let mainline = "Resistor_SMD\nR_0402\nold\nCapacitor_SMD\nC_0603\nkeep\n";
        let proposed = "Resistor_SMD\nR_0402\nnew\n";
        let texts = MergeScenario::new(Some(ancestor), Some(mainline), Some(proposed));
        let merged = merge_record_caches(&texts);
        assert_eq!(
            merged,
            "Resistor_SMD\nR_0402\nnew\nCapacitor_SMD\nC_0603\nkeep\n"
        );
    }

    #[test]
    fn test_union_keeps_records_unique_to_each_side() {
        let ancestor = "Lib_A\nPart_A\n1\n";
        let mainline = "Lib_A\nPart_A\n1\nLib_B\nPart_B\n2\n";
        let proposed = "Lib_A\nPart_A\n1\nLib_C\nPart_C\n3\n";
        let texts = MergeScenario::new(Some(ancestor), Some(mainline), Some(proposed));
        let merged = merge_record_caches(&texts);
        assert_eq!(merged, "Lib_A\nPart_A\n1\nLib_B\nPart_B\n2\nLib_C\nPart_C\n3\n");
    }

    #[test]
    fn test_absent_revisions_are_empty() {
        let texts = MergeScenario::new(None, None, Some("Lib_A\nPart_A\n9\n"));
        let merged = merge_record_caches(&texts);
        assert_eq!(merged, "Lib_A\nPart_A\n9\n");
    }
}
