// Heuristic split between missing entities and missing services.
//
// Automations and scripts validate references against the union of
// entities and services, so a broken reference could be either. The
// split is vocabulary-based and knowingly imprecise for dual-use
// domains (a `switch.restart` entity classifies as a service).

/// Domains that only ever appear as service calls.
const SERVICE_DOMAINS: &[&str] = &[
    "homeassistant",
    "system_log",
    "logger",
    "persistent_notification",
    "notify",
    "tts",
    "frontend",
    "recorder",
    "history",
    "logbook",
];

/// Common service verbs across domains.
const SERVICE_VERBS: &[&str] = &[
    "turn_on",
    "turn_off",
    "toggle",
    "stop",
    "start",
    "restart",
    "reload",
    "create",
    "delete",
    "add_item",
    "remove_item",
    "snapshot",
    "play_media",
    "trigger",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    LikelyEntity,
    LikelyService,
}

/// Classify a broken `domain.name` reference.
pub fn classify(identifier: &str) -> Classification {
    let Some((domain, name)) = crate::ident::split_identifier(identifier) else {
        return Classification::LikelyEntity;
    };
    if SERVICE_DOMAINS.contains(&domain) || SERVICE_VERBS.contains(&name) {
        Classification::LikelyService
    } else {
        Classification::LikelyEntity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_domains_and_verbs() {
        assert_eq!(
            classify("notify.mobile_app_phone"),
            Classification::LikelyService
        );
        assert_eq!(classify("script.turn_on"), Classification::LikelyService);
        assert_eq!(classify("homeassistant.restart"), Classification::LikelyService);
    }

    #[test]
    fn everything_else_is_an_entity() {
        assert_eq!(classify("light.missing_lamp"), Classification::LikelyEntity);
        assert_eq!(classify("sensor.temp_outdoor"), Classification::LikelyEntity);
    }
}
