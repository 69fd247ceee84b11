// Group audit target.
//
// A "group" here is any entity whose state carries the list-valued
// `entity_id` attribute: legacy `group.*` groups, but also group-like
// helpers (light groups, sensor groups). Members are validated against
// entities only, and a broken member may be deleted outright.
//
// Two save paths exist: helpers backed by a config entry get their
// options updated; legacy `group.*` entries go through the `group.set`
// service. Anything else is not fixable from here and is skipped.

use std::collections::{BTreeSet, HashMap};

use serde_json::{Value, json};
use tracing::warn;

use crate::audit::{AuditTarget, DocumentRef};
use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::ident;
use crate::session::Session;

pub struct GroupAudit<'a> {
    session: &'a mut Session,
    members: HashMap<String, Vec<String>>,
}

impl<'a> GroupAudit<'a> {
    pub fn new(session: &'a mut Session) -> Self {
        Self {
            session,
            members: HashMap::new(),
        }
    }

    async fn save(&mut self, entity_id: &str, members: &[String]) -> Result<bool, CoreError> {
        let config_entry_id = match self.session.socket.get_registry_entry(entity_id).await {
            Ok(entry) => entry.config_entry_id,
            // Legacy groups are often not in the registry at all.
            Err(hassfix_api::Error::Api { .. }) => None,
            Err(e) => return Err(e.into()),
        };

        if let Some(entry_id) = config_entry_id {
            self.session
                .socket
                .update_config_entry_options(&entry_id, json!({ "entities": members }))
                .await?;
            return Ok(true);
        }

        let Some(("group", object_id)) = ident::split_identifier(entity_id) else {
            warn!(
                entity = entity_id,
                "auto-fix only supported for 'group' entities and config-entry helpers, skipping"
            );
            return Ok(false);
        };
        self.session
            .socket
            .call_service(
                "group",
                "set",
                json!({ "object_id": object_id, "entities": members }),
            )
            .await?;
        Ok(true)
    }
}

impl AuditTarget for GroupAudit<'_> {
    fn label(&self) -> &'static str {
        "groups"
    }

    fn supports_delete(&self) -> bool {
        true
    }

    fn valid<'c>(&self, catalog: &'c Catalog) -> &'c BTreeSet<String> {
        catalog.entities()
    }

    async fn documents(&mut self, _catalog: &Catalog) -> Result<Vec<DocumentRef>, CoreError> {
        let states = self.session.socket.get_states().await?;
        let mut documents = Vec::new();
        for state in states {
            let Some(members) = state.member_entity_ids() else {
                continue;
            };
            let label = state
                .friendly_name()
                .map_or_else(|| state.entity_id.clone(), str::to_owned);
            documents.push(DocumentRef::new(state.entity_id.clone(), label));
            self.members.insert(state.entity_id, members);
        }
        Ok(documents)
    }

    async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError> {
        let members = doc.id.as_ref().and_then(|id| self.members.get(id));
        Ok(members.map(|m| json!(m)))
    }

    fn scan(&self, _doc: &DocumentRef, config: &Value) -> Vec<String> {
        // The member list itself; validity filtering happens upstream.
        config
            .as_array()
            .map(|members| {
                members
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn apply_fix(
        &mut self,
        doc: &DocumentRef,
        config: &mut Value,
        old: &str,
        new: Option<&str>,
    ) -> Result<bool, CoreError> {
        let Some(entity_id) = doc.id.as_deref().map(str::to_owned) else {
            return Ok(false);
        };
        let Some(members) = config.as_array_mut() else {
            return Ok(false);
        };

        match new {
            Some(new) => {
                for member in members.iter_mut() {
                    if member.as_str() == Some(old) {
                        *member = Value::String(new.to_owned());
                    }
                }
            }
            None => members.retain(|member| member.as_str() != Some(old)),
        }

        let updated: Vec<String> = members
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();
        self.save(&entity_id, &updated).await
    }
}
