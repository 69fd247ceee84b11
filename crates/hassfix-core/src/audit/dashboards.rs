// Dashboard audit target: structural scan with the domain allow-list,
// entities-only validity, saves over the socket.
//
// The default (Overview) dashboard never appears in the dashboards list,
// so a pseudo-entry for it is prepended; it may fail to fetch when the
// instance still auto-generates it, which is a skip, not an error.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::warn;

use crate::audit::{AuditTarget, DocumentRef};
use crate::catalog::Catalog;
use crate::error::CoreError;
use crate::rewrite::replace_references;
use crate::scan::{IgnoreRule, ScanPolicy, scan_document};
use crate::session::Session;

pub struct DashboardAudit<'a> {
    session: &'a mut Session,
    ignore: Vec<IgnoreRule>,
    /// Restrict the run to the dashboard with this url path or id.
    /// `"default"` selects the default dashboard.
    filter: Option<String>,
}

impl<'a> DashboardAudit<'a> {
    pub fn new(session: &'a mut Session, ignore: Vec<IgnoreRule>, filter: Option<String>) -> Self {
        Self {
            session,
            ignore,
            filter,
        }
    }
}

impl AuditTarget for DashboardAudit<'_> {
    fn label(&self) -> &'static str {
        "dashboards"
    }

    fn valid<'c>(&self, catalog: &'c Catalog) -> &'c BTreeSet<String> {
        catalog.entities()
    }

    async fn documents(&mut self, _catalog: &Catalog) -> Result<Vec<DocumentRef>, CoreError> {
        let mut documents = vec![DocumentRef {
            id: None,
            label: "Default (Overview)".to_owned(),
        }];

        for dashboard in self.session.socket.list_dashboards().await? {
            let label = dashboard
                .title
                .clone()
                .or_else(|| dashboard.url_path.clone())
                .unwrap_or_else(|| "unnamed".to_owned());
            if let Some(filter) = &self.filter {
                let matches = dashboard.url_path.as_deref() == Some(filter)
                    || dashboard.id.as_deref() == Some(filter);
                if !matches {
                    continue;
                }
            }
            documents.push(DocumentRef {
                id: dashboard.url_path,
                label,
            });
        }

        if let Some(filter) = &self.filter {
            if filter != "default" {
                documents.remove(0);
            }
            if documents.is_empty() {
                return Err(CoreError::NotFound(format!("dashboard '{filter}'")));
            }
        }
        Ok(documents)
    }

    async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError> {
        match self
            .session
            .socket
            .get_dashboard_config(doc.id.as_deref())
            .await
        {
            Ok(config) => Ok(Some(config)),
            Err(e @ hassfix_api::Error::Api { .. }) => {
                warn!(
                    dashboard = %doc.label,
                    error = %e,
                    "could not fetch config (may be auto-generated), skipping"
                );
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn scan(&self, _doc: &DocumentRef, config: &Value) -> Vec<String> {
        scan_document(config, &ScanPolicy::dashboard(&self.ignore))
    }

    async fn apply_fix(
        &mut self,
        doc: &DocumentRef,
        config: &mut Value,
        old: &str,
        new: Option<&str>,
    ) -> Result<bool, CoreError> {
        let Some(new) = new else { return Ok(false) };
        if !replace_references(config, old, new)? {
            warn!(
                dashboard = %doc.label,
                reference = old,
                "reference not found in config, nothing to save"
            );
            return Ok(false);
        }
        self.session
            .socket
            .save_dashboard_config(doc.id.as_deref(), config)
            .await?;
        Ok(true)
    }
}
