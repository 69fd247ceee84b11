//! Audit subcommand handlers.
//!
//! Each target runs through the shared pipeline against one catalog
//! snapshot; `audit all` chains the four targets in sequence. A run with
//! unresolved references exits non-zero so the command works as a check
//! in scripts.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::Tabled;

use hassfix_core::audit::{AutomationAudit, DashboardAudit, GroupAudit, ScriptAudit};
use hassfix_core::scan::IgnoreRule;
use hassfix_core::{AuditReport, Catalog, Classification, Resolution, Session, run_audit};

use crate::cli::{AuditArgs, AuditCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;
use crate::prompt::InteractivePrompt;

#[derive(Debug, Clone, Serialize, Tabled)]
struct BrokenRow {
    #[tabled(rename = "Document")]
    document: String,

    #[tabled(rename = "Missing Reference")]
    reference: String,

    #[tabled(rename = "Kind")]
    kind: String,

    #[tabled(rename = "Suggestions")]
    suggestions: String,

    #[tabled(rename = "Outcome")]
    outcome: String,
}

pub async fn handle(
    session: &mut Session,
    args: AuditArgs,
    ignore: Vec<IgnoreRule>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let catalog = Catalog::load(&mut session.socket).await;
    let mut prompt = InteractivePrompt::new(global.yes, output::should_color(&global.color));

    let mut unresolved = 0;
    match args.command {
        AuditCommand::Automations { fix } => {
            let report = {
                let mut target = AutomationAudit::new(session, ignore);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("automations", &report, global);
        }

        AuditCommand::Scripts { fix } => {
            let report = {
                let mut target = ScriptAudit::new(session, ignore);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("scripts", &report, global);
        }

        AuditCommand::Groups { fix } => {
            let report = {
                let mut target = GroupAudit::new(session);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("groups", &report, global);
        }

        AuditCommand::Dashboards { target, fix } => {
            let report = {
                let mut target = DashboardAudit::new(session, ignore, target);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("dashboards", &report, global);
        }

        AuditCommand::All { fix } => {
            let report = {
                let mut target = AutomationAudit::new(session, ignore.clone());
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("automations", &report, global);

            let report = {
                let mut target = ScriptAudit::new(session, ignore.clone());
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("scripts", &report, global);

            let report = {
                let mut target = GroupAudit::new(session);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("groups", &report, global);

            let report = {
                let mut target = DashboardAudit::new(session, ignore, None);
                run_audit(&mut target, &catalog, &mut prompt, fix).await?
            };
            unresolved += render_report("dashboards", &report, global);
        }
    }

    if unresolved > 0 {
        return Err(CliError::BrokenReferencesRemain { count: unresolved });
    }
    Ok(())
}

/// Print one target's findings; returns its unresolved count.
fn render_report(label: &str, report: &AuditReport, global: &GlobalOpts) -> usize {
    let color = output::should_color(&global.color);

    if report.broken.is_empty() {
        if !global.quiet {
            let msg = format!(
                "{label}: {} documents scanned, no broken references",
                report.documents_scanned
            );
            if color {
                println!("{}", msg.green());
            } else {
                println!("{msg}");
            }
        }
        return 0;
    }

    let rows: Vec<BrokenRow> = report.broken.iter().map(to_row).collect();
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| r.reference.clone());
    output::print_output(&out, global.quiet);

    if !global.quiet {
        let summary = format!(
            "{label}: {} documents scanned, {} broken ({} fixed, {} unresolved)",
            report.documents_scanned,
            report.broken.len(),
            report.fixed,
            report.unresolved
        );
        if color && report.unresolved > 0 {
            eprintln!("{}", summary.red());
        } else {
            eprintln!("{summary}");
        }
    }
    report.unresolved
}

fn to_row(broken: &hassfix_core::BrokenReference) -> BrokenRow {
    BrokenRow {
        document: broken.document.label.clone(),
        reference: broken.identifier.clone(),
        kind: match broken.kind {
            Classification::LikelyEntity => "entity".to_owned(),
            Classification::LikelyService => "service".to_owned(),
        },
        suggestions: if broken.suggestions.is_empty() {
            "-".to_owned()
        } else {
            broken.suggestions.join(", ")
        },
        outcome: match &broken.resolution {
            Resolution::Unresolved => "unresolved".to_owned(),
            Resolution::Replaced(new) => format!("replaced with {new}"),
            Resolution::Deleted => "removed".to_owned(),
        },
    }
}
