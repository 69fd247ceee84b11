//! Rename subcommand handler.
//!
//! Without `--replace` this is a filtered entity listing. With it, the
//! plan is previewed (and optionally exported to CSV), confirmed, applied
//! through the registry, and referencing automations are rewritten.

use regex::Regex;
use serde::Serialize;
use tabled::Tabled;

use hassfix_core::Session;
use hassfix_core::rename::{
    RenameEntry, apply_renames, list_entities, plan_renames, update_automation_references,
};

use crate::cli::{GlobalOpts, RenameArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Friendly Name")]
    friendly_name: String,

    #[tabled(rename = "Entity ID")]
    entity_id: String,
}

#[derive(Debug, Clone, Serialize, Tabled)]
struct RenameRow {
    #[tabled(rename = "Friendly Name")]
    friendly_name: String,

    #[tabled(rename = "Current Entity ID")]
    current: String,

    #[tabled(rename = "New Entity ID")]
    new: String,
}

pub async fn handle(
    session: &mut Session,
    args: RenameArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let search = Regex::new(&args.search).map_err(|e| CliError::Validation {
        field: "search".into(),
        reason: e.to_string(),
    })?;

    let entities = list_entities(&session.rest, Some(&search)).await?;

    let Some(replace) = args.replace else {
        // Listing mode.
        let aligned = output::align_on_dot(
            &entities.iter().map(|(_, id)| id.clone()).collect::<Vec<_>>(),
        );
        let rows: Vec<EntityRow> = entities
            .iter()
            .zip(aligned)
            .map(|((friendly_name, _), entity_id)| EntityRow {
                friendly_name: friendly_name.clone(),
                entity_id,
            })
            .collect();
        let out = output::render_list(&global.output, &rows, Clone::clone, |r| {
            r.entity_id.trim_start().to_owned()
        });
        output::print_output(&out, global.quiet);
        return Ok(());
    };

    let plan = plan_renames(&entities, &search, &replace);
    if plan.is_empty() {
        if !global.quiet {
            println!("No entity ids would change.");
        }
        return Ok(());
    }

    let rows: Vec<RenameRow> = {
        let currents =
            output::align_on_dot(&plan.iter().map(|e| e.current.clone()).collect::<Vec<_>>());
        let news = output::align_on_dot(&plan.iter().map(|e| e.new.clone()).collect::<Vec<_>>());
        plan.iter()
            .zip(currents.into_iter().zip(news))
            .map(|(entry, (current, new))| RenameRow {
                friendly_name: entry.friendly_name.clone(),
                current,
                new,
            })
            .collect()
    };
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| {
        format!("{} {}", r.current.trim_start(), r.new.trim_start())
    });
    output::print_output(&out, global.quiet);

    if let Some(path) = &args.output_csv {
        write_csv(path, &plan)?;
        if !global.quiet {
            eprintln!("Plan written to {}", path.display());
        }
    }

    if !util::confirm(&format!("Apply {} rename(s)?", plan.len()), global.yes)? {
        if !global.quiet {
            eprintln!("Aborted, nothing changed.");
        }
        return Ok(());
    }

    let applied = apply_renames(session, &plan).await?;
    let saved = update_automation_references(session, &applied).await?;
    if !global.quiet {
        eprintln!(
            "Renamed {} entity(ies), updated {} automation(s).",
            applied.len(),
            saved
        );
    }
    Ok(())
}

fn write_csv(path: &std::path::Path, plan: &[RenameEntry]) -> Result<(), CliError> {
    let mut csv = String::from("Friendly Name,Current Entity ID,New Entity ID\n");
    for entry in plan {
        csv.push_str(&format!(
            "{},{},{}\n",
            util::csv_field(&entry.friendly_name),
            util::csv_field(&entry.current),
            util::csv_field(&entry.new)
        ));
    }
    std::fs::write(path, csv)?;
    Ok(())
}
