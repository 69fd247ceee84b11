// The audit pipeline.
//
// One generic flow covers all four document kinds: enumerate documents,
// fetch each config, scan for referenced identifiers, diff against the
// catalog, and optionally repair interactively. What varies per kind
// (enumeration, scan strategy, validity set, save path) lives behind
// [`AuditTarget`]; what varies per caller (interactive vs scripted
// decisions) lives behind [`Prompt`].

mod automations;
mod dashboards;
mod groups;
mod scripts;

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::classify::{Classification, classify};
use crate::error::CoreError;
use crate::suggest::suggest;

pub use automations::AutomationAudit;
pub use dashboards::DashboardAudit;
pub use groups::GroupAudit;
pub use scripts::ScriptAudit;

/// One auditable document: an automation, script, group or dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// Identifier used to fetch and save the document. `None` addresses
    /// the default dashboard.
    pub id: Option<String>,
    /// Human-readable name for prompts and reports.
    pub label: String,
}

impl DocumentRef {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            label: label.into(),
        }
    }
}

/// A reference that points at nothing in the catalog.
#[derive(Debug, Clone)]
pub struct BrokenReference {
    pub document: DocumentRef,
    pub identifier: String,
    pub kind: Classification,
    pub suggestions: Vec<String>,
    pub resolution: Resolution,
}

/// What became of a broken reference during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Unresolved,
    Replaced(String),
    Deleted,
}

/// Decision for one broken reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixDecision {
    /// Apply the suggestion at this index.
    Apply(usize),
    /// Remove the reference (group members only).
    Delete,
    Skip,
}

/// Everything a decision needs to be made on.
pub struct FixContext<'a> {
    pub target_label: &'static str,
    pub document: &'a DocumentRef,
    pub identifier: &'a str,
    pub suggestions: &'a [String],
    pub can_delete: bool,
}

/// Decision seam between the pipeline and the caller. The CLI implements
/// this interactively; tests script it.
pub trait Prompt {
    fn decide(&mut self, context: &FixContext<'_>) -> FixDecision;
}

/// Per-kind behavior of the audit pipeline.
#[allow(async_fn_in_trait)]
pub trait AuditTarget {
    /// Short plural name for logs and prompts ("automations", ...).
    fn label(&self) -> &'static str;

    /// Whether broken references get the service/entity classification
    /// (only meaningful when validity includes services).
    fn uses_classifier(&self) -> bool {
        false
    }

    /// Whether a broken reference may be deleted instead of replaced.
    fn supports_delete(&self) -> bool {
        false
    }

    /// The identifiers references are validated against and suggestions
    /// are drawn from.
    fn valid<'c>(&self, catalog: &'c Catalog) -> &'c BTreeSet<String>;

    async fn documents(&mut self, catalog: &Catalog) -> Result<Vec<DocumentRef>, CoreError>;

    /// Fetch one document's config. `Ok(None)` skips the document (the
    /// target has already logged why).
    async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError>;

    /// Candidate identifiers referenced by the document.
    fn scan(&self, doc: &DocumentRef, config: &Value) -> Vec<String>;

    /// Rewrite one reference (`new` is `None` for deletion) and persist
    /// the document. Returns whether a save happened.
    async fn apply_fix(
        &mut self,
        doc: &DocumentRef,
        config: &mut Value,
        old: &str,
        new: Option<&str>,
    ) -> Result<bool, CoreError>;
}

/// Outcome of one audit run.
#[derive(Debug, Default)]
pub struct AuditReport {
    pub documents_scanned: usize,
    pub broken: Vec<BrokenReference>,
    pub fixed: usize,
    pub unresolved: usize,
}

impl AuditReport {
    /// No broken references remain (none found, or all repaired).
    pub fn is_clean(&self) -> bool {
        self.unresolved == 0
    }

    pub fn missing_entities(&self) -> impl Iterator<Item = &BrokenReference> {
        self.broken
            .iter()
            .filter(|b| b.kind == Classification::LikelyEntity)
    }

    pub fn missing_services(&self) -> impl Iterator<Item = &BrokenReference> {
        self.broken
            .iter()
            .filter(|b| b.kind == Classification::LikelyService)
    }
}

/// Run the audit over every document the target enumerates.
///
/// With `fix` unset this is a pure report. With it set, each likely
/// entity is routed through the prompt; missing services are reported
/// but never fixed (there is nothing sensible to rewrite them to).
pub async fn run_audit<T, P>(
    target: &mut T,
    catalog: &Catalog,
    prompt: &mut P,
    fix: bool,
) -> Result<AuditReport, CoreError>
where
    T: AuditTarget,
    P: Prompt,
{
    let documents = target.documents(catalog).await?;
    let valid = target.valid(catalog);

    let mut report = AuditReport {
        documents_scanned: documents.len(),
        ..AuditReport::default()
    };
    debug!(target = target.label(), count = documents.len(), "scanning documents");

    for doc in &documents {
        let Some(mut config) = target.fetch(doc).await? else {
            continue;
        };

        let broken: Vec<String> = target
            .scan(doc, &config)
            .into_iter()
            .filter(|candidate| !valid.contains(candidate))
            .collect();

        for identifier in broken {
            let kind = if target.uses_classifier() {
                classify(&identifier)
            } else {
                Classification::LikelyEntity
            };

            if kind == Classification::LikelyService {
                report.unresolved += 1;
                report.broken.push(BrokenReference {
                    document: doc.clone(),
                    identifier,
                    kind,
                    suggestions: Vec::new(),
                    resolution: Resolution::Unresolved,
                });
                continue;
            }

            let suggestions = suggest(&identifier, valid);
            let mut resolution = Resolution::Unresolved;

            if fix {
                let context = FixContext {
                    target_label: target.label(),
                    document: doc,
                    identifier: &identifier,
                    suggestions: &suggestions,
                    can_delete: target.supports_delete(),
                };
                resolution = match prompt.decide(&context) {
                    FixDecision::Apply(i) if i < suggestions.len() => {
                        let replacement = &suggestions[i];
                        match target
                            .apply_fix(doc, &mut config, &identifier, Some(replacement))
                            .await
                        {
                            Ok(true) => Resolution::Replaced(replacement.clone()),
                            Ok(false) => Resolution::Unresolved,
                            Err(e) => {
                                warn!(
                                    document = %doc.label,
                                    reference = %identifier,
                                    error = %e,
                                    "fix failed"
                                );
                                Resolution::Unresolved
                            }
                        }
                    }
                    FixDecision::Delete if target.supports_delete() => {
                        match target.apply_fix(doc, &mut config, &identifier, None).await {
                            Ok(true) => Resolution::Deleted,
                            Ok(false) => Resolution::Unresolved,
                            Err(e) => {
                                warn!(
                                    document = %doc.label,
                                    reference = %identifier,
                                    error = %e,
                                    "delete failed"
                                );
                                Resolution::Unresolved
                            }
                        }
                    }
                    _ => Resolution::Unresolved,
                };
            }

            if resolution == Resolution::Unresolved {
                report.unresolved += 1;
            } else {
                report.fixed += 1;
            }
            report.broken.push(BrokenReference {
                document: doc.clone(),
                identifier,
                kind,
                suggestions,
                resolution,
            });
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::scan::{ScanPolicy, scan_serialized};

    /// In-memory target over a map of automation-like documents.
    struct MemoryTarget {
        docs: BTreeMap<String, Value>,
        saved: Vec<(String, Value)>,
    }

    impl MemoryTarget {
        fn new(docs: &[(&str, Value)]) -> Self {
            Self {
                docs: docs
                    .iter()
                    .map(|(id, v)| ((*id).to_owned(), v.clone()))
                    .collect(),
                saved: Vec::new(),
            }
        }
    }

    impl AuditTarget for MemoryTarget {
        fn label(&self) -> &'static str {
            "automations"
        }

        fn uses_classifier(&self) -> bool {
            true
        }

        fn valid<'c>(&self, catalog: &'c Catalog) -> &'c BTreeSet<String> {
            catalog.all()
        }

        async fn documents(&mut self, _catalog: &Catalog) -> Result<Vec<DocumentRef>, CoreError> {
            Ok(self
                .docs
                .keys()
                .map(|id| DocumentRef::new(id.clone(), id.clone()))
                .collect())
        }

        async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError> {
            Ok(doc.id.as_ref().and_then(|id| self.docs.get(id)).cloned())
        }

        fn scan(&self, doc: &DocumentRef, config: &Value) -> Vec<String> {
            let owner = doc.id.as_deref().unwrap_or_default();
            scan_serialized(&config.to_string(), &ScanPolicy::serialized(owner, &[]))
        }

        async fn apply_fix(
            &mut self,
            doc: &DocumentRef,
            config: &mut Value,
            old: &str,
            new: Option<&str>,
        ) -> Result<bool, CoreError> {
            let Some(new) = new else { return Ok(false) };
            if crate::rewrite::replace_references(config, old, new)? {
                let id = doc.id.clone().unwrap_or_default();
                self.saved.push((id, config.clone()));
                Ok(true)
            } else {
                Ok(false)
            }
        }
    }

    /// In-memory target over group-style member lists, with delete
    /// support.
    struct MemberListTarget {
        docs: BTreeMap<String, Value>,
        saved: Vec<(String, Value)>,
    }

    impl AuditTarget for MemberListTarget {
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
            Ok(self
                .docs
                .keys()
                .map(|id| DocumentRef::new(id.clone(), id.clone()))
                .collect())
        }

        async fn fetch(&mut self, doc: &DocumentRef) -> Result<Option<Value>, CoreError> {
            Ok(doc.id.as_ref().and_then(|id| self.docs.get(id)).cloned())
        }

        fn scan(&self, _doc: &DocumentRef, config: &Value) -> Vec<String> {
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
            let id = doc.id.clone().unwrap_or_default();
            self.saved.push((id, config.clone()));
            Ok(true)
        }
    }

    /// Prompt that replays a fixed script of decisions.
    struct ScriptedPrompt(Vec<FixDecision>);

    impl Prompt for ScriptedPrompt {
        fn decide(&mut self, _context: &FixContext<'_>) -> FixDecision {
            if self.0.is_empty() {
                FixDecision::Skip
            } else {
                self.0.remove(0)
            }
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_parts(
            [
                "light.kitchen",
                "light.hallway",
                "binary_sensor.front_door",
                "automation.morning",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            ["light.turn_on", "notify.mobile_app_phone"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }

    #[tokio::test]
    async fn clean_run_reports_nothing() {
        let mut target = MemoryTarget::new(&[(
            "automation.morning",
            json!({
                "id": "1",
                "trigger": [{ "platform": "state", "entity_id": "binary_sensor.front_door" }],
                "action": [{ "service": "light.turn_on", "entity_id": "light.kitchen" }]
            }),
        )]);
        let mut prompt = ScriptedPrompt(Vec::new());

        let report = run_audit(&mut target, &catalog(), &mut prompt, false)
            .await
            .expect("audit");

        assert_eq!(report.documents_scanned, 1);
        assert!(report.broken.is_empty());
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn typo_is_fixed_via_suggestion() {
        let mut target = MemoryTarget::new(&[(
            "automation.morning",
            json!({
                "id": "1",
                "action": [{ "service": "light.turn_on", "entity_id": "light.kitche" }]
            }),
        )]);
        // Apply the first suggestion for the single broken reference.
        let mut prompt = ScriptedPrompt(vec![FixDecision::Apply(0)]);

        let report = run_audit(&mut target, &catalog(), &mut prompt, true)
            .await
            .expect("audit");

        assert_eq!(report.fixed, 1);
        assert_eq!(report.unresolved, 0);
        assert_eq!(
            report.broken[0].resolution,
            Resolution::Replaced("light.kitchen".to_owned())
        );
        assert_eq!(target.saved.len(), 1);
        assert_eq!(
            target.saved[0].1["action"][0]["entity_id"],
            json!("light.kitchen")
        );
    }

    #[tokio::test]
    async fn missing_service_is_reported_but_never_prompted() {
        let mut target = MemoryTarget::new(&[(
            "automation.morning",
            json!({
                "id": "1",
                "action": [{ "service": "notify.mobile_app_gone" }]
            }),
        )]);
        let mut prompt = ScriptedPrompt(vec![FixDecision::Apply(0)]);

        let report = run_audit(&mut target, &catalog(), &mut prompt, true)
            .await
            .expect("audit");

        assert_eq!(report.fixed, 0);
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.missing_services().count(), 1);
        assert!(target.saved.is_empty());
        // The scripted decision was never consumed.
        assert_eq!(prompt.0.len(), 1);
    }

    #[tokio::test]
    async fn deleted_member_is_dropped_from_the_saved_list() {
        let mut target = MemberListTarget {
            docs: [(
                "group.living_room".to_owned(),
                json!(["light.kitchen", "media_player.vanished"]),
            )]
            .into_iter()
            .collect(),
            saved: Vec::new(),
        };
        let mut prompt = ScriptedPrompt(vec![FixDecision::Delete]);

        let report = run_audit(&mut target, &catalog(), &mut prompt, true)
            .await
            .expect("audit");

        assert_eq!(report.fixed, 1);
        assert_eq!(report.unresolved, 0);
        assert_eq!(report.broken[0].resolution, Resolution::Deleted);
        assert!(report.is_clean());
        assert_eq!(target.saved.len(), 1);
        assert_eq!(target.saved[0].1, json!(["light.kitchen"]));
    }

    #[tokio::test]
    async fn skip_leaves_reference_unresolved() {
        let mut target = MemoryTarget::new(&[(
            "automation.morning",
            json!({ "id": "1", "entity_id": "light.kitche" }),
        )]);
        let mut prompt = ScriptedPrompt(vec![FixDecision::Skip]);

        let report = run_audit(&mut target, &catalog(), &mut prompt, true)
            .await
            .expect("audit");

        assert_eq!(report.fixed, 0);
        assert_eq!(report.unresolved, 1);
        assert!(!report.is_clean());
        assert!(target.saved.is_empty());
    }
}
