//! Names subcommand handlers.

use regex::Regex;
use serde::Serialize;
use tabled::Tabled;

use hassfix_core::Session;
use hassfix_core::names::{
    apply_name_changes, list_named_entities, propose_names, recreate_entity_ids,
};

use crate::cli::{GlobalOpts, NamesArgs, NamesCommand};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct ProposalRow {
    #[tabled(rename = "Entity ID")]
    entity_id: String,

    #[tabled(rename = "Current Name")]
    current: String,

    #[tabled(rename = "Proposed Name")]
    proposed: String,
}

pub async fn handle(
    session: &mut Session,
    args: NamesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let NamesCommand::Reset {
        search,
        execute,
        no_recreate_ids,
    } = args.command;

    let search = search
        .map(|s| {
            Regex::new(&s).map_err(|e| CliError::Validation {
                field: "search".into(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let entries = list_named_entities(session, search.as_ref()).await?;
    let devices = session.socket.list_devices().await?;
    let proposals = propose_names(&entries, &devices);

    if proposals.is_empty() {
        if !global.quiet {
            println!("All names already match their defaults.");
        }
        return Ok(());
    }

    let rows: Vec<ProposalRow> = proposals
        .iter()
        .map(|p| ProposalRow {
            entity_id: p.entity_id.clone(),
            current: p.current.clone().unwrap_or_else(|| "(default)".to_owned()),
            proposed: p.proposed.clone().unwrap_or_else(|| "(default)".to_owned()),
        })
        .collect();
    let out = output::render_list(&global.output, &rows, Clone::clone, |r| r.entity_id.clone());
    output::print_output(&out, global.quiet);

    if !execute {
        if !global.quiet {
            eprintln!(
                "Dry run: {} name(s) would change. Pass --execute to apply.",
                proposals.len()
            );
        }
        return Ok(());
    }

    if !util::confirm(&format!("Reset {} name(s)?", proposals.len()), global.yes)? {
        if !global.quiet {
            eprintln!("Aborted, nothing changed.");
        }
        return Ok(());
    }

    let applied = apply_name_changes(session, &proposals).await?;
    if !global.quiet {
        eprintln!("Updated {applied} name(s).");
    }

    if no_recreate_ids {
        return Ok(());
    }

    // Resetting names can change the id the registry would assign, so
    // follow up with an id pass over the affected entities.
    let entity_ids: Vec<String> = proposals.iter().map(|p| p.entity_id.clone()).collect();
    let updates = recreate_entity_ids(session, &entity_ids, true).await?;
    if !global.quiet {
        if updates.is_empty() {
            eprintln!("Entity ids already match what the registry would assign.");
        } else {
            for (old, new) in &updates {
                eprintln!("  {old} -> {new}");
            }
            eprintln!("Recreated {} entity id(s).", updates.len());
        }
    }
    Ok(())
}
