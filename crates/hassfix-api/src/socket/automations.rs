// Automation and script config commands.

use serde_json::{Value, json};

use crate::error::Error;
use crate::socket::CommandSocket;

impl CommandSocket {
    /// `automation/config` -- the stored config for one automation,
    /// addressed by its entity id. Some server versions wrap the payload
    /// in a `config` key; both shapes are accepted.
    pub async fn get_automation_config(&mut self, entity_id: &str) -> Result<Value, Error> {
        let result = self
            .call("automation/config", json!({ "entity_id": entity_id }))
            .await?;
        Ok(unwrap_config(result))
    }

    /// `script/config` -- the stored config for one script, addressed by
    /// its entity id.
    pub async fn get_script_config(&mut self, entity_id: &str) -> Result<Value, Error> {
        let result = self
            .call("script/config", json!({ "entity_id": entity_id }))
            .await?;
        Ok(unwrap_config(result))
    }
}

fn unwrap_config(mut result: Value) -> Value {
    match result.get_mut("config") {
        Some(config) => config.take(),
        None => result,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::unwrap_config;

    #[test]
    fn unwraps_config_key_when_present() {
        let wrapped = json!({ "config": { "alias": "Morning", "trigger": [] } });
        assert_eq!(
            unwrap_config(wrapped),
            json!({ "alias": "Morning", "trigger": [] })
        );
    }

    #[test]
    fn passes_bare_config_through() {
        let bare = json!({ "alias": "Morning", "trigger": [] });
        assert_eq!(unwrap_config(bare.clone()), bare);
    }
}
