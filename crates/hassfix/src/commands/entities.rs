//! Entities subcommand handlers.

use regex::Regex;
use serde::Serialize;
use tabled::Tabled;

use hassfix_core::Session;
use hassfix_core::rename::list_entities;

use crate::cli::{EntitiesArgs, EntitiesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct EntityRow {
    #[tabled(rename = "Friendly Name")]
    friendly_name: String,

    #[tabled(rename = "Entity ID")]
    entity_id: String,
}

pub async fn handle(
    session: &mut Session,
    args: EntitiesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let EntitiesCommand::List { pattern } = args.command;

    let search = pattern
        .map(|s| {
            Regex::new(&s).map_err(|e| CliError::Validation {
                field: "pattern".into(),
                reason: e.to_string(),
            })
        })
        .transpose()?;

    let entities = list_entities(&session.rest, search.as_ref()).await?;
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
    Ok(())
}
