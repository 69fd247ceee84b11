//! Platforms subcommand: entity counts per integration platform.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use hassfix_core::Session;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Clone, Serialize, Tabled)]
struct PlatformRow {
    #[tabled(rename = "Platform")]
    platform: String,

    #[tabled(rename = "Count")]
    count: usize,

    #[tabled(rename = "Examples")]
    examples: String,
}

const MAX_EXAMPLES: usize = 3;

pub async fn handle(session: &mut Session, global: &GlobalOpts) -> Result<(), CliError> {
    let entries = session.socket.list_registry_entries().await?;

    let mut per_platform: BTreeMap<String, (usize, Vec<String>)> = BTreeMap::new();
    for entry in entries {
        let platform = entry.platform.unwrap_or_else(|| "(unknown)".to_owned());
        let (count, examples) = per_platform.entry(platform).or_default();
        *count += 1;
        if examples.len() < MAX_EXAMPLES {
            examples.push(entry.entity_id);
        }
    }

    // Busiest platforms first; name breaks ties via the BTreeMap order.
    let mut rows: Vec<PlatformRow> = per_platform
        .into_iter()
        .map(|(platform, (count, examples))| PlatformRow {
            platform,
            count,
            examples: examples.join(", "),
        })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count));

    let out = output::render_list(&global.output, &rows, Clone::clone, |r| r.platform.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
