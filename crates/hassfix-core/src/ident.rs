// The `domain.name` identifier shape shared by entities and services.

use std::sync::LazyLock;

use regex::Regex;

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // literal pattern
    Regex::new(r"^[a-z0-9_]+\.[a-z0-9_]+$").unwrap()
});

/// Whether a string has the `domain.name` shape.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Split an identifier into `(domain, name)` at the first dot.
pub fn split_identifier(s: &str) -> Option<(&str, &str)> {
    s.split_once('.')
}

/// The domain part of an identifier.
pub fn domain(s: &str) -> Option<&str> {
    split_identifier(s).map(|(domain, _)| domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_matching() {
        assert!(is_identifier("light.kitchen"));
        assert!(is_identifier("binary_sensor.door_2"));
        assert!(!is_identifier("light"));
        assert!(!is_identifier("Light.Kitchen"));
        assert!(!is_identifier("light.kitchen table"));
        assert!(!is_identifier("custom:button-card"));
    }

    #[test]
    fn splitting() {
        assert_eq!(
            split_identifier("sensor.outdoor.temp"),
            Some(("sensor", "outdoor.temp"))
        );
        assert_eq!(domain("light.kitchen"), Some("light"));
        assert_eq!(domain("nodots"), None);
    }
}
