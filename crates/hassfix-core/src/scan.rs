// Reference scanner.
//
// Two extraction strategies feed the audit pipeline: a structural walk
// over string leaves (dashboards, where references sit in well-formed
// config trees) and a quoted-substring pass over the serialized JSON
// (automations and scripts, where references also hide inside template
// strings). Both report candidates in first-seen order without
// duplicates; validity is judged later against the catalog.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::ident;

/// Values that happen to have the identifier shape but never denote an
/// entity or a service.
const PLATFORM_LITERALS: &[&str] = &[
    "platform.state",
    "platform.numeric_state",
    "platform.template",
    "platform.time",
    "platform.sun",
    "platform.zone",
    "platform.webhook",
    "platform.mqtt",
];

/// Domains a dashboard is expected to reference. Everything else in a
/// dashboard config (card types, actions) is dropped as a non-entity.
const DASHBOARD_DOMAINS: &[&str] = &[
    "sensor",
    "binary_sensor",
    "switch",
    "light",
    "cover",
    "media_player",
    "climate",
    "fan",
    "lock",
    "camera",
    "weather",
    "device_tracker",
    "person",
    "zone",
    "sun",
    "timer",
    "counter",
    "group",
    "scene",
    "script",
    "automation",
];

static QUOTED_IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r#"(?i)"([a-z0-9_]+\.[a-z0-9_]+)""#).unwrap()
});

/// User-configurable exclusion, checked before any built-in filtering.
#[derive(Debug, Clone)]
pub enum IgnoreRule {
    Exact(String),
    Pattern(Regex),
}

impl IgnoreRule {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Self::Exact(s) => s == candidate,
            Self::Pattern(re) => re.is_match(candidate),
        }
    }
}

/// Which candidates a scan admits.
#[derive(Debug, Clone, Default)]
pub struct ScanPolicy<'a> {
    /// The scanned document's own identifier (its `id` field shows up in
    /// the serialized form and must not count as a reference).
    owner: Option<&'a str>,
    ignore: &'a [IgnoreRule],
    /// Restrict candidates to these domains plus the `input_*` helpers.
    domain_allow_list: Option<&'static [&'static str]>,
    /// `input_select` option values frequently mimic the identifier
    /// shape, so serialized scans drop that domain wholesale.
    exclude_input_select: bool,
}

impl<'a> ScanPolicy<'a> {
    /// Policy for serialized automation/script scans.
    pub fn serialized(owner: &'a str, ignore: &'a [IgnoreRule]) -> Self {
        Self {
            owner: Some(owner),
            ignore,
            domain_allow_list: None,
            exclude_input_select: true,
        }
    }

    /// Policy for structural dashboard scans.
    pub fn dashboard(ignore: &'a [IgnoreRule]) -> Self {
        Self {
            owner: None,
            ignore,
            domain_allow_list: Some(DASHBOARD_DOMAINS),
            exclude_input_select: false,
        }
    }

    fn admits(&self, candidate: &str) -> bool {
        if self.ignore.iter().any(|rule| rule.matches(candidate)) {
            return false;
        }
        if self.owner == Some(candidate) {
            return false;
        }
        if PLATFORM_LITERALS.contains(&candidate) {
            return false;
        }
        if self.exclude_input_select && candidate.starts_with("input_select.") {
            return false;
        }
        if let Some(domains) = self.domain_allow_list {
            let Some(domain) = ident::domain(candidate) else {
                return false;
            };
            if !domains.contains(&domain) && !domain.starts_with("input_") {
                return false;
            }
        }
        true
    }
}

/// Extract candidate identifiers from the serialized JSON form of a
/// document: every quoted `domain.name` substring the policy admits.
pub fn scan_serialized(text: &str, policy: &ScanPolicy<'_>) -> Vec<String> {
    let mut seen = Vec::new();
    for captures in QUOTED_IDENTIFIER.captures_iter(text) {
        let candidate = &captures[1];
        if policy.admits(candidate) && !seen.iter().any(|s| s == candidate) {
            seen.push(candidate.to_owned());
        }
    }
    seen
}

/// Extract candidate identifiers from a config tree: every string leaf
/// with the identifier shape that the policy admits.
pub fn scan_document(doc: &Value, policy: &ScanPolicy<'_>) -> Vec<String> {
    let mut seen = Vec::new();
    walk(doc, policy, &mut seen);
    seen
}

fn walk(value: &Value, policy: &ScanPolicy<'_>, seen: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if ident::is_identifier(s) && policy.admits(s) && !seen.iter().any(|c| c == s) {
                seen.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, policy, seen);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                walk(item, policy, seen);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn serialized_scan_finds_quoted_identifiers_once() {
        let config = json!({
            "id": "1718000000000",
            "trigger": [{ "platform": "state", "entity_id": "binary_sensor.door" }],
            "action": [
                { "service": "light.turn_on", "entity_id": "light.kitchen" },
                { "service": "light.turn_on", "entity_id": "light.kitchen" }
            ]
        });
        let policy = ScanPolicy::serialized("automation.morning", &[]);
        let found = scan_serialized(&config.to_string(), &policy);

        assert_eq!(
            found,
            vec!["binary_sensor.door", "light.turn_on", "light.kitchen"]
        );
    }

    #[test]
    fn serialized_scan_applies_exclusions() {
        let config = json!({
            "id": "automation.morning",
            "trigger": [{ "x": "platform.state" }],
            "options": ["input_select.mode_a"],
            "entity_id": "light.kitchen"
        });
        let policy = ScanPolicy::serialized("automation.morning", &[]);
        let found = scan_serialized(&config.to_string(), &policy);

        assert_eq!(found, vec!["light.kitchen"]);
    }

    #[test]
    fn ignore_rules_run_first() {
        let ignore = vec![
            IgnoreRule::Exact("light.kitchen".into()),
            IgnoreRule::Pattern(Regex::new(r"^sensor\.debug_").expect("valid pattern")),
        ];
        let config = json!(["light.kitchen", "sensor.debug_uptime", "light.hall"]);
        let policy = ScanPolicy::serialized("automation.x", &ignore);
        let found = scan_serialized(&config.to_string(), &policy);

        assert_eq!(found, vec!["light.hall"]);
    }

    #[test]
    fn dashboard_scan_is_structural_and_domain_scoped() {
        let config = json!({
            "views": [{
                "cards": [
                    { "type": "custom:button-card", "entity": "light.kitchen" },
                    { "entity": "media_player.living_room",
                      "tap_action": { "action": "call-service",
                                      "service": "media_player.play_media" } },
                    { "entity": "input_boolean.guest_mode" },
                    { "entity": "mushroom.template" }
                ]
            }]
        });
        let policy = ScanPolicy::dashboard(&[]);
        let found = scan_document(&config, &policy);

        // "custom:button-card" fails the shape, "mushroom.template" fails
        // the allow-list; service values in allow-listed domains are kept
        // and resolved against the catalog later.
        assert_eq!(
            found,
            vec![
                "light.kitchen",
                "media_player.living_room",
                "media_player.play_media",
                "input_boolean.guest_mode"
            ]
        );
    }
}
