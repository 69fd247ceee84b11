// Reference rewriter.
//
// Replaces identifier occurrences inside config trees, including inside
// template strings, without touching longer identifiers that merely
// start with the same text. The right boundary is any character outside
// `[a-z0-9_.-]`; `light.old` must not rewrite `light.old_switch` or
// `light.oldie`.

use regex::Regex;
use serde_json::Value;

use crate::error::CoreError;

/// Replace every boundary-safe occurrence of `old` with `new` in all
/// string leaves of `data`. Returns whether anything changed.
pub fn replace_references(data: &mut Value, old: &str, new: &str) -> Result<bool, CoreError> {
    let pattern = Regex::new(&format!("(?i){}", regex::escape(old)))?;
    Ok(replace_in(data, &pattern, new))
}

fn replace_in(data: &mut Value, pattern: &Regex, new: &str) -> bool {
    match data {
        Value::String(s) => match rewrite_bounded(s, pattern, new) {
            Some(replaced) => {
                *s = replaced;
                true
            }
            None => false,
        },
        Value::Array(items) => {
            let mut modified = false;
            for item in items {
                modified |= replace_in(item, pattern, new);
            }
            modified
        }
        Value::Object(map) => {
            let mut modified = false;
            for value in map.values_mut() {
                modified |= replace_in(value, pattern, new);
            }
            modified
        }
        _ => false,
    }
}

// The regex crate has no lookahead, so the trailing boundary is checked
// by hand. A rejected match advances the scan by one character, not past
// its end: another occurrence may begin inside it.
fn rewrite_bounded(s: &str, pattern: &Regex, new: &str) -> Option<String> {
    let mut out = String::new();
    let mut copied = 0;
    let mut at = 0;
    while let Some(m) = pattern.find_at(s, at) {
        if is_boundary(s.as_bytes().get(m.end()).copied()) {
            out.push_str(&s[copied..m.start()]);
            out.push_str(new);
            copied = m.end();
            at = m.end();
        } else {
            let step = s[m.start()..].chars().next().map_or(1, char::len_utf8);
            at = m.start() + step;
        }
    }
    if copied == 0 {
        return None;
    }
    out.push_str(&s[copied..]);
    Some(out)
}

fn is_boundary(next: Option<u8>) -> bool {
    !next.is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn replaces_exact_and_template_occurrences() {
        let mut config = json!({
            "entity_id": "light.old",
            "condition": "{{ states('light.old') == 'on' }}",
            "nested": [{ "entity_id": ["light.old", "light.other"] }]
        });
        let modified =
            replace_references(&mut config, "light.old", "light.new").expect("valid pattern");

        assert!(modified);
        assert_eq!(
            config,
            json!({
                "entity_id": "light.new",
                "condition": "{{ states('light.new') == 'on' }}",
                "nested": [{ "entity_id": ["light.new", "light.other"] }]
            })
        );
    }

    #[test]
    fn leaves_longer_identifiers_alone() {
        let mut config = json!({
            "a": "light.old_switch",
            "b": "light.oldie",
            "c": "light.old.attr",
            "d": "light.old"
        });
        replace_references(&mut config, "light.old", "light.new").expect("valid pattern");

        assert_eq!(
            config,
            json!({
                "a": "light.old_switch",
                "b": "light.oldie",
                "c": "light.old.attr",
                "d": "light.new"
            })
        );
    }

    #[test]
    fn occurrence_adjacent_to_longer_identifier_is_rewritten() {
        let mut config = json!({ "condition": "light.oldlight.old" });
        let modified =
            replace_references(&mut config, "light.old", "light.new").expect("valid pattern");

        assert!(modified);
        assert_eq!(config, json!({ "condition": "light.oldlight.new" }));
    }

    #[test]
    fn matches_case_insensitively() {
        let mut config = json!({ "entity_id": "Light.Old" });
        let modified =
            replace_references(&mut config, "light.old", "light.new").expect("valid pattern");

        assert!(modified);
        assert_eq!(config, json!({ "entity_id": "light.new" }));
    }

    #[test]
    fn rewriting_is_idempotent() {
        let mut config = json!({ "entity_id": "light.old" });
        replace_references(&mut config, "light.old", "light.new").expect("valid pattern");
        let modified_again =
            replace_references(&mut config, "light.old", "light.new").expect("valid pattern");

        assert!(!modified_again);
        assert_eq!(config, json!({ "entity_id": "light.new" }));
    }

    #[test]
    fn untouched_tree_reports_no_change() {
        let mut config = json!({ "entity_id": "light.other", "n": 3, "b": true });
        let modified =
            replace_references(&mut config, "light.old", "light.new").expect("valid pattern");
        assert!(!modified);
    }
}
