// Entity and device registry commands.

use serde_json::{Value, json};

use crate::error::Error;
use crate::socket::CommandSocket;
use crate::socket::client::parse;
use crate::types::{DeviceEntry, RegistryEntry};

impl CommandSocket {
    /// `config/entity_registry/list` -- every registered entity.
    pub async fn list_registry_entries(&mut self) -> Result<Vec<RegistryEntry>, Error> {
        self.call_as("config/entity_registry/list", Value::Null).await
    }

    /// `config/entity_registry/get` -- one registry entry by entity id.
    pub async fn get_registry_entry(&mut self, entity_id: &str) -> Result<RegistryEntry, Error> {
        self.call_as(
            "config/entity_registry/get",
            json!({ "entity_id": entity_id }),
        )
        .await
    }

    /// `config/entity_registry/update` with a new entity id (rename).
    pub async fn update_entity_id(
        &mut self,
        entity_id: &str,
        new_entity_id: &str,
    ) -> Result<(), Error> {
        self.call_unit(
            "config/entity_registry/update",
            json!({ "entity_id": entity_id, "new_entity_id": new_entity_id }),
        )
        .await
    }

    /// `config/entity_registry/update` with a new display name.
    ///
    /// `None` resets the name to the integration default.
    pub async fn update_entity_name(
        &mut self,
        entity_id: &str,
        name: Option<&str>,
    ) -> Result<(), Error> {
        self.call_unit(
            "config/entity_registry/update",
            json!({ "entity_id": entity_id, "name": name }),
        )
        .await
    }

    /// `config/entity_registry/get_automatic_entity_ids` -- the ids the
    /// registry would assign today, keyed by current id. Entries that
    /// would not change come back as `null`.
    pub async fn automatic_entity_ids(
        &mut self,
        entity_ids: &[String],
    ) -> Result<Vec<(String, String)>, Error> {
        let result = self
            .call(
                "config/entity_registry/get_automatic_entity_ids",
                json!({ "entity_ids": entity_ids }),
            )
            .await?;

        let map: serde_json::Map<String, Value> = parse(result)?;
        Ok(map
            .into_iter()
            .filter_map(|(old, new)| match new {
                Value::String(new) if new != old => Some((old, new)),
                _ => None,
            })
            .collect())
    }

    /// `config/device_registry/list` -- every registered device.
    pub async fn list_devices(&mut self) -> Result<Vec<DeviceEntry>, Error> {
        self.call_as("config/device_registry/list", Value::Null).await
    }

    /// `search/related` -- automations referencing the given entity.
    pub async fn related_automations(&mut self, entity_id: &str) -> Result<Vec<String>, Error> {
        let result = self
            .call(
                "search/related",
                json!({ "item_type": "entity", "item_id": entity_id }),
            )
            .await?;

        match result.get("automation") {
            Some(list) => parse(list.clone()),
            None => Ok(Vec::new()),
        }
    }

    /// `config_entries/options/flow` shortcut: update a config entry's
    /// options map (used for group-like helper entities).
    pub async fn update_config_entry_options(
        &mut self,
        config_entry_id: &str,
        options: Value,
    ) -> Result<(), Error> {
        self.call_unit(
            "config_entries/update",
            json!({ "entry_id": config_entry_id, "options": options }),
        )
        .await
    }
}
