// Entity renamer.
//
// Regex search over live entity ids, regex-substituted new ids, registry
// updates, then a pass over related automations rewriting the old ids
// with the shared boundary-safe rewriter.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::rewrite::replace_references;
use crate::session::Session;

/// One planned rename, with the friendly name for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub friendly_name: String,
    pub current: String,
    pub new: String,
}

/// `(friendly_name, entity_id)` pairs whose entity id matches `search`,
/// sorted by friendly name. Fetched over REST so the listing works the
/// same as the audit-independent entity listing.
pub async fn list_entities(
    rest: &hassfix_api::RestClient,
    search: Option<&Regex>,
) -> Result<Vec<(String, String)>, CoreError> {
    let mut entities: Vec<(String, String)> = rest
        .get_states()
        .await?
        .into_iter()
        .filter(|state| search.is_none_or(|re| re.is_match(&state.entity_id)))
        .map(|state| {
            let friendly = state.friendly_name().unwrap_or_default().to_owned();
            (friendly, state.entity_id)
        })
        .collect();
    entities.sort();
    Ok(entities)
}

/// Compute new ids by regex substitution, keeping only entries that
/// actually change.
pub fn plan_renames(
    entities: &[(String, String)],
    search: &Regex,
    replace: &str,
) -> Vec<RenameEntry> {
    entities
        .iter()
        .filter_map(|(friendly_name, entity_id)| {
            let new = search.replace_all(entity_id, replace).into_owned();
            (new != *entity_id).then(|| RenameEntry {
                friendly_name: friendly_name.clone(),
                current: entity_id.clone(),
                new,
            })
        })
        .collect()
}

/// Apply registry renames one by one. Per-entry failures are logged and
/// skipped; the successfully applied `(old, new)` pairs are returned for
/// the reference-update pass.
pub async fn apply_renames(
    session: &mut Session,
    plan: &[RenameEntry],
) -> Result<Vec<(String, String)>, CoreError> {
    let mut applied = Vec::new();
    for entry in plan {
        match session
            .socket
            .update_entity_id(&entry.current, &entry.new)
            .await
        {
            Ok(()) => {
                info!(from = %entry.current, to = %entry.new, "entity renamed");
                applied.push((entry.current.clone(), entry.new.clone()));
            }
            Err(e) => warn!(entity = %entry.current, error = %e, "rename failed"),
        }
    }
    Ok(applied)
}

/// Rewrite references to renamed entities inside related automations.
///
/// The search index still resolves the old ids to the automations whose
/// configs mention them, so relatedness is looked up by old id. Returns
/// the number of automations saved.
pub async fn update_automation_references(
    session: &mut Session,
    updates: &[(String, String)],
) -> Result<usize, CoreError> {
    // Group replacements per automation so each config is saved once.
    let mut per_automation: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();
    for (old, new) in updates {
        for automation in session.socket.related_automations(old).await? {
            per_automation
                .entry(automation)
                .or_default()
                .push((old.clone(), new.clone()));
        }
    }

    let mut saved = 0;
    for (automation, replacements) in per_automation {
        let mut config = match session.socket.get_automation_config(&automation).await {
            Ok(config) => config,
            Err(e) => {
                warn!(automation = %automation, error = %e, "could not fetch config, skipping");
                continue;
            }
        };

        let mut modified = false;
        for (old, new) in &replacements {
            modified |= replace_references(&mut config, old, new)?;
        }
        if !modified {
            continue;
        }

        let Some(id) = config_id(session, &automation, &mut config).await else {
            warn!(automation = %automation, "no usable config id, skipping save");
            continue;
        };
        match session.rest.save_automation_config(&id, &config).await {
            Ok(()) => {
                info!(automation = %automation, "references updated");
                saved += 1;
            }
            Err(e) => warn!(automation = %automation, error = %e, "save failed"),
        }
    }
    Ok(saved)
}

async fn config_id(session: &mut Session, entity_id: &str, config: &mut Value) -> Option<String> {
    if let Some(id) = config.get("id").and_then(Value::as_str) {
        return Some(id.to_owned());
    }
    let unique_id = session
        .socket
        .get_registry_entry(entity_id)
        .await
        .ok()?
        .unique_id?;
    config["id"] = Value::String(unique_id.clone());
    Some(unique_id)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn plan_keeps_only_changed_ids() {
        let entities = vec![
            ("Kitchen".to_owned(), "light.kitchen_old".to_owned()),
            ("Hall".to_owned(), "light.hall".to_owned()),
        ];
        let search = Regex::new("_old$").expect("valid pattern");
        let plan = plan_renames(&entities, &search, "");

        assert_eq!(
            plan,
            vec![RenameEntry {
                friendly_name: "Kitchen".to_owned(),
                current: "light.kitchen_old".to_owned(),
                new: "light.kitchen".to_owned(),
            }]
        );
    }

    #[test]
    fn plan_supports_capture_groups() {
        let entities = vec![(String::new(), "sensor.temp_bedroom".to_owned())];
        let search = Regex::new(r"temp_(\w+)").expect("valid pattern");
        let plan = plan_renames(&entities, &search, "${1}_temperature");

        assert_eq!(plan[0].new, "sensor.bedroom_temperature");
    }
}
