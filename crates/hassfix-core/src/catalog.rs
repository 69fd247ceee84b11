// Snapshot of every identifier the instance currently knows.
//
// Captured once at the start of a run and never refreshed: fixes applied
// during the run validate against the state of the world when the run
// began.

use std::collections::BTreeSet;

use hassfix_api::CommandSocket;
use serde_json::Value;
use tracing::{info, warn};

/// Valid entity and service identifiers, plus their union.
///
/// Entities come from the registry and the live state machine (synthetic
/// entities like `sun.sun` and `zone.home` only appear in the latter).
/// Services are the flattened `domain.service` pairs from `get_services`.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entities: BTreeSet<String>,
    services: BTreeSet<String>,
    all: BTreeSet<String>,
}

impl Catalog {
    /// Fetch the snapshot. A failing fetch degrades that category to an
    /// empty set rather than aborting the run.
    pub async fn load(socket: &mut CommandSocket) -> Self {
        let mut entities = BTreeSet::new();

        match socket.list_registry_entries().await {
            Ok(entries) => entities.extend(entries.into_iter().map(|e| e.entity_id)),
            Err(e) => warn!(error = %e, "could not list registry entities"),
        }
        match socket.get_states().await {
            Ok(states) => entities.extend(states.into_iter().map(|s| s.entity_id)),
            Err(e) => warn!(error = %e, "could not list states"),
        }

        let mut services = BTreeSet::new();
        match socket.get_services().await {
            Ok(domains) => {
                for (domain, domain_services) in &domains {
                    if let Value::Object(domain_services) = domain_services {
                        services.extend(
                            domain_services.keys().map(|name| format!("{domain}.{name}")),
                        );
                    }
                }
            }
            Err(e) => warn!(error = %e, "could not list services"),
        }

        info!(
            entities = entities.len(),
            services = services.len(),
            "catalog loaded"
        );
        Self::from_parts(entities, services)
    }

    pub fn from_parts(entities: BTreeSet<String>, services: BTreeSet<String>) -> Self {
        let all = entities.union(&services).cloned().collect();
        Self {
            entities,
            services,
            all,
        }
    }

    pub fn entities(&self) -> &BTreeSet<String> {
        &self.entities
    }

    pub fn services(&self) -> &BTreeSet<String> {
        &self.services
    }

    /// The union of entities and services.
    pub fn all(&self) -> &BTreeSet<String> {
        &self.all
    }

    /// Entity ids within one domain, in sorted order.
    pub fn entities_in_domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a str> {
        self.entities
            .iter()
            .map(String::as_str)
            .filter(move |e| crate::ident::domain(e) == Some(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        Catalog::from_parts(
            ["light.kitchen", "light.hall", "sun.sun", "automation.morning"]
                .into_iter()
                .map(String::from)
                .collect(),
            ["light.turn_on", "homeassistant.restart"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    #[test]
    fn union_covers_both_categories() {
        let catalog = sample();
        assert!(catalog.all().contains("light.kitchen"));
        assert!(catalog.all().contains("light.turn_on"));
        assert!(!catalog.entities().contains("light.turn_on"));
    }

    #[test]
    fn domain_enumeration() {
        let catalog = sample();
        let lights: Vec<&str> = catalog.entities_in_domain("light").collect();
        assert_eq!(lights, vec!["light.hall", "light.kitchen"]);
    }
}
