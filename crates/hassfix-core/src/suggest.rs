// Suggestion engine for broken references.
//
// Two passes: sequence similarity against same-domain candidates, then
// a table of suffixes commonly lost when entities are re-registered.
// Output order is deterministic: fuzzy matches by descending ratio with
// lexicographic tie-break, suffix candidates appended, first occurrence
// wins on duplicates.

use std::collections::{BTreeSet, HashMap};

use crate::ident;

const SIMILARITY_CUTOFF: f64 = 0.6;
const MAX_FUZZY: usize = 3;

/// Suffixes an entity id may have lost, in lookup order.
const STRIPPABLE_SUFFIXES: &[&str] = &[
    "_switch",
    "_light",
    "_sensor",
    "_binary_sensor",
    "_cover",
    "_fan",
    "_lock",
    "_climate",
    "_media_player",
];

/// Propose up to three fuzzy matches plus any suffix-stripped hit for a
/// broken reference, drawn from `valid`.
pub fn suggest(broken: &str, valid: &BTreeSet<String>) -> Vec<String> {
    let Some((domain, name)) = ident::split_identifier(broken) else {
        return Vec::new();
    };
    let prefix = format!("{domain}.");

    let mut scored: Vec<(f64, &str)> = valid
        .iter()
        .filter(|candidate| candidate.starts_with(&prefix))
        .map(|candidate| (similarity(broken, candidate), candidate.as_str()))
        .filter(|(ratio, _)| *ratio >= SIMILARITY_CUTOFF)
        .collect();
    // Stable sort over the already-lexicographic candidate order keeps
    // ties deterministic.
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut suggestions: Vec<String> = scored
        .into_iter()
        .take(MAX_FUZZY)
        .map(|(_, candidate)| candidate.to_owned())
        .collect();

    for suffix in STRIPPABLE_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            let candidate = format!("{domain}.{stripped}");
            if valid.contains(&candidate) && !suggestions.contains(&candidate) {
                suggestions.push(candidate);
            }
        }
    }

    suggestions
}

/// Ratcliff-Obershelp similarity: twice the total length of recursively
/// matched blocks over the combined length.
#[allow(clippy::cast_precision_loss)]
pub fn similarity(a: &str, b: &str) -> f64 {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_len(a, b) as f64 / total as f64
}

fn matched_len(a: &[u8], b: &[u8]) -> usize {
    let (i, j, len) = longest_match(a, b);
    if len == 0 {
        return 0;
    }
    len + matched_len(&a[..i], &b[..j]) + matched_len(&a[i + len..], &b[j + len..])
}

/// Longest common block, earliest in `a` then `b` on ties.
fn longest_match(a: &[u8], b: &[u8]) -> (usize, usize, usize) {
    let mut positions: HashMap<u8, Vec<usize>> = HashMap::new();
    for (j, &ch) in b.iter().enumerate() {
        positions.entry(ch).or_default().push(j);
    }

    let mut best = (0, 0, 0);
    let mut lengths: HashMap<usize, usize> = HashMap::new();
    for (i, &ch) in a.iter().enumerate() {
        let mut next_lengths = HashMap::new();
        if let Some(js) = positions.get(&ch) {
            for &j in js {
                let len = 1 + j
                    .checked_sub(1)
                    .and_then(|prev| lengths.get(&prev))
                    .copied()
                    .unwrap_or(0);
                next_lengths.insert(j, len);
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        lengths = next_lengths;
    }
    best
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn similarity_matches_known_ratios() {
        assert_eq!(similarity("abcd", "abcd"), 1.0);
        assert_eq!(similarity("abcd", "bcde"), 0.75);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn typo_produces_close_match() {
        let valid = set(&["light.kitchen", "light.hallway", "switch.kitchen"]);
        let suggestions = suggest("light.kitche", &valid);
        assert_eq!(suggestions[0], "light.kitchen");
        assert!(!suggestions.contains(&"switch.kitchen".to_owned()));
    }

    #[test]
    fn suggestions_stay_in_domain() {
        let valid = set(&["switch.foo_switch", "light.foo"]);
        let suggestions = suggest("light.foo_switch", &valid);
        assert_eq!(suggestions, vec!["light.foo"]);
    }

    #[test]
    fn fuzzy_results_precede_suffix_hits() {
        let valid = set(&["light.bedroom", "light.bedroom_lamp"]);
        let suggestions = suggest("light.bedroom_lamp_switch", &valid);
        assert_eq!(suggestions, vec!["light.bedroom_lamp", "light.bedroom"]);
    }

    #[test]
    fn deterministic_tie_break_is_lexicographic() {
        let valid = set(&["light.room_b", "light.room_a"]);
        let first = suggest("light.room_x", &valid);
        let second = suggest("light.room_x", &valid);
        assert_eq!(first, second);
        assert_eq!(first, vec!["light.room_a", "light.room_b"]);
    }

    #[test]
    fn no_suggestions_below_cutoff() {
        let valid = set(&["light.completely_different_name"]);
        assert!(suggest("light.zz", &valid).is_empty());
    }
}
