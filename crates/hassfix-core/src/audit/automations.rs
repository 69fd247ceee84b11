// Automation audit target: serialized scan, classification on, saves
// through the REST config endpoint keyed by the automation's config id.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use crate::audit::{AuditTarget, DocumentRef};
use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::rewrite::replace_references;
use crate::scan::{IgnoreRule, ScanPolicy, scan_serialized};
use crate::session::Session;

pub struct AutomationAudit<'a> {
    session: &'a mut Session,
    ignore: Vec<IgnoreRule>,
}

impl<'a> AutomationAudit<'a> {
    pub fn new(session: &'a mut Session, ignore: Vec<IgnoreRule>) -> Self {
        Self { session, ignore }
    }

    /// The numeric config id the REST endpoint is keyed by. Falls back
    /// to the registry `unique_id` when the config carries none.
    async fn config_id(&mut self, entity_id: &str, config: &mut Value) -> Result<String, CoreError> {
        if let Some(id) = config.get("id").and_then(Value::as_str) {
            return Ok(id.to_owned());
        }
        let entry = self.session.socket.get_registry_entry(entity_id).await?;
        let Some(unique_id) = entry.unique_id else {
            return Err(CoreError::MissingId {
                entity_id: entity_id.to_owned(),
            });
        };
        config["id"] = Value::String(unique_id.clone());
        Ok(unique_id)
    }
}

impl AuditTarget for AutomationAudit<'_> {
    fn label(&self) -> &'static str {
        "automations"
    }

    fn uses_classifier(&self) -> bool {
        true
    }

    fn valid<'c>(&self, catalog: &'c Catalog) -> &'c BTreeSet<String> {
        catalog.all()
    }

    async fn documents(&mut self, catalog: &Catalog) -> Result<Vec<DocumentRef>, CoreError> {
        Ok(catalog
            .entities_in_domain("automation")
            .map(|id| DocumentRef::new(id, id))
            .collect())
    }

    async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError> {
        let Some(entity_id) = doc.id.as_deref() else {
            return Ok(None);
        };
        match self.session.socket.get_automation_config(entity_id).await {
            Ok(config) => Ok(Some(config)),
            Err(e @ hassfix_api::Error::Api { .. }) => {
                warn!(automation = entity_id, error = %e, "could not fetch config, skipping");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn scan(&self, doc: &DocumentRef, config: &Value) -> Vec<String> {
        let owner = doc.id.as_deref().unwrap_or_default();
        let policy = ScanPolicy::serialized(owner, &self.ignore);
        scan_serialized(&config.to_string(), &policy)
    }

    async fn apply_fix(
        &mut self,
        doc: &DocumentRef,
        config: &mut Value,
        old: &str,
        new: Option<&str>,
    ) -> Result<bool, CoreError> {
        let Some(new) = new else { return Ok(false) };
        let Some(entity_id) = doc.id.as_deref().map(str::to_owned) else {
            return Ok(false);
        };

        let id = self.config_id(&entity_id, config).await?;
        if !replace_references(config, old, new)? {
            warn!(
                automation = %entity_id,
                reference = old,
                "reference not found in config, nothing to save"
            );
            return Ok(false);
        }
        self.session.rest.save_automation_config(&id, config).await?;
        Ok(true)
    }
}
