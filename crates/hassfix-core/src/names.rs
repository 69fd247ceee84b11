// Friendly-name reset.
//
// Clears user-assigned entity names back to the integration default,
// except where the device itself was renamed: there the entity name is
// rebuilt from the device's custom name plus the original name's
// suffix, so "Hue lamp Brightness" on a device renamed to "Desk lamp"
// becomes "Desk lamp Brightness".
//
// Resetting names can change what the registry considers the canonical
// entity id, so an optional second pass recreates ids via the
// registry's own suggestion endpoint and patches automation references.

use std::collections::HashMap;

use hassfix_api::types::{DeviceEntry, RegistryEntry};
use regex::Regex;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::rename;
use crate::session::Session;

/// One proposed name change. `proposed: None` resets to the default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameProposal {
    pub entity_id: String,
    pub current: Option<String>,
    pub proposed: Option<String>,
}

/// Device-backed registry entries whose entity id matches `search`.
/// Helpers without a device are excluded; they have no default name to
/// reset to.
pub async fn list_named_entities(
    session: &mut Session,
    search: Option<&Regex>,
) -> Result<Vec<RegistryEntry>, CoreError> {
    let entries = session.socket.list_registry_entries().await?;
    Ok(entries
        .into_iter()
        .filter(|e| e.device_id.is_some())
        .filter(|e| search.is_none_or(|re| re.is_match(&e.entity_id)))
        .collect())
}

/// Compute the target name for each entry and keep those that differ
/// from the current name.
pub fn propose_names(entries: &[RegistryEntry], devices: &[DeviceEntry]) -> Vec<NameProposal> {
    let by_id: HashMap<&str, &DeviceEntry> =
        devices.iter().map(|d| (d.id.as_str(), d)).collect();

    entries
        .iter()
        .filter_map(|entry| {
            let target = target_name(entry, &by_id);
            (entry.name != target).then(|| NameProposal {
                entity_id: entry.entity_id.clone(),
                current: entry.name.clone(),
                proposed: target,
            })
        })
        .collect()
}

fn target_name(entry: &RegistryEntry, devices: &HashMap<&str, &DeviceEntry>) -> Option<String> {
    let device = entry.device_id.as_deref().and_then(|id| devices.get(id))?;
    let user_device_name = device.name_by_user.as_deref()?;
    let original_name = entry.original_name.as_deref()?;
    let default_device_name = device.name.as_deref()?;

    let suffix = original_name.strip_prefix(default_device_name)?.trim();
    Some(format!("{user_device_name} {suffix}").trim().to_owned())
}

/// Apply the proposals through the registry. Per-entry failures are
/// logged and skipped. Returns the number of applied changes.
pub async fn apply_name_changes(
    session: &mut Session,
    proposals: &[NameProposal],
) -> Result<usize, CoreError> {
    let mut applied = 0;
    for proposal in proposals {
        match session
            .socket
            .update_entity_name(&proposal.entity_id, proposal.proposed.as_deref())
            .await
        {
            Ok(()) => {
                info!(
                    entity = %proposal.entity_id,
                    name = proposal.proposed.as_deref().unwrap_or("<default>"),
                    "name updated"
                );
                applied += 1;
            }
            Err(e) => warn!(entity = %proposal.entity_id, error = %e, "name update failed"),
        }
    }
    Ok(applied)
}

/// Ask the registry which entity ids it would assign today, apply the
/// changed ones, and patch automation references. Returns the applied
/// `(old, new)` pairs.
pub async fn recreate_entity_ids(
    session: &mut Session,
    entity_ids: &[String],
    execute: bool,
) -> Result<Vec<(String, String)>, CoreError> {
    let updates = session.socket.automatic_entity_ids(entity_ids).await?;
    if updates.is_empty() || !execute {
        return Ok(updates);
    }

    let plan: Vec<rename::RenameEntry> = updates
        .iter()
        .map(|(old, new)| rename::RenameEntry {
            friendly_name: String::new(),
            current: old.clone(),
            new: new.clone(),
        })
        .collect();
    let applied = rename::apply_renames(session, &plan).await?;
    rename::update_automation_references(session, &applied).await?;
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn entry(
        entity_id: &str,
        name: Option<&str>,
        original_name: Option<&str>,
        device_id: Option<&str>,
    ) -> RegistryEntry {
        RegistryEntry {
            entity_id: entity_id.to_owned(),
            unique_id: None,
            platform: None,
            device_id: device_id.map(str::to_owned),
            name: name.map(str::to_owned),
            original_name: original_name.map(str::to_owned),
            config_entry_id: None,
        }
    }

    fn device(id: &str, name: Option<&str>, name_by_user: Option<&str>) -> DeviceEntry {
        DeviceEntry {
            id: id.to_owned(),
            name: name.map(str::to_owned),
            name_by_user: name_by_user.map(str::to_owned),
        }
    }

    #[test]
    fn custom_name_resets_to_default() {
        let entries = vec![entry(
            "light.desk",
            Some("My fancy lamp"),
            Some("Hue lamp"),
            Some("dev1"),
        )];
        let devices = vec![device("dev1", Some("Hue lamp"), None)];

        let proposals = propose_names(&entries, &devices);
        assert_eq!(
            proposals,
            vec![NameProposal {
                entity_id: "light.desk".to_owned(),
                current: Some("My fancy lamp".to_owned()),
                proposed: None,
            }]
        );
    }

    #[test]
    fn renamed_device_rebuilds_name_with_suffix() {
        let entries = vec![entry(
            "sensor.desk_brightness",
            None,
            Some("Hue lamp Brightness"),
            Some("dev1"),
        )];
        let devices = vec![device("dev1", Some("Hue lamp"), Some("Desk lamp"))];

        let proposals = propose_names(&entries, &devices);
        assert_eq!(
            proposals[0].proposed,
            Some("Desk lamp Brightness".to_owned())
        );
    }

    #[test]
    fn matching_name_produces_no_proposal() {
        let entries = vec![entry("light.desk", None, Some("Hue lamp"), Some("dev1"))];
        let devices = vec![device("dev1", Some("Hue lamp"), None)];

        assert!(propose_names(&entries, &devices).is_empty());
    }
}
