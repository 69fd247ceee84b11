// Wire types shared by the WebSocket and REST clients.
//
// Everything the server sends beyond the fields we consume is preserved
// in `extra` maps where a caller might need it, and dropped otherwise.

use serde::{Deserialize, Serialize};

/// One entry from `config/entity_registry/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub entity_id: String,

    /// Stable ID the config APIs address automations/scripts by.
    #[serde(default)]
    pub unique_id: Option<String>,

    /// Integration that provides this entity (e.g. `"mqtt"`, `"zha"`).
    #[serde(default)]
    pub platform: Option<String>,

    #[serde(default)]
    pub device_id: Option<String>,

    /// User-assigned display name (`null` means "use the default").
    #[serde(default)]
    pub name: Option<String>,

    /// Name the integration originally assigned.
    #[serde(default)]
    pub original_name: Option<String>,

    /// Present when the entity is backed by a config entry (helpers).
    #[serde(default)]
    pub config_entry_id: Option<String>,
}

/// One entry from `config/device_registry/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceEntry {
    pub id: String,

    /// Default device name from the integration.
    #[serde(default)]
    pub name: Option<String>,

    /// User override for the device name.
    #[serde(default)]
    pub name_by_user: Option<String>,
}

/// One entry from `get_states`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateObject {
    pub entity_id: String,

    #[serde(default)]
    pub state: String,

    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl StateObject {
    /// The `friendly_name` attribute, if set.
    pub fn friendly_name(&self) -> Option<&str> {
        self.attributes.get("friendly_name").and_then(|v| v.as_str())
    }

    /// The list-valued `entity_id` attribute carried by groups and
    /// group-like helpers, if present.
    pub fn member_entity_ids(&self) -> Option<Vec<String>> {
        let members = self.attributes.get("entity_id")?.as_array()?;
        Some(
            members
                .iter()
                .filter_map(|m| m.as_str().map(String::from))
                .collect(),
        )
    }
}

/// One entry from `lovelace/dashboards/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
    #[serde(default)]
    pub id: Option<String>,

    /// `None` addresses the default (Overview) dashboard.
    #[serde(default)]
    pub url_path: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}
