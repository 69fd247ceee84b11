//! Command dispatch: bridges CLI args -> core workflows -> output formatting.

pub mod audit;
pub mod config_cmd;
pub mod entities;
pub mod names;
pub mod platforms;
pub mod rename;
pub mod util;

use hassfix_core::Session;
use hassfix_core::scan::IgnoreRule;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a connection-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &mut Session,
    ignore: Vec<IgnoreRule>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Audit(args) => audit::handle(session, args, ignore, global).await,
        Command::Rename(args) => rename::handle(session, args, global).await,
        Command::Names(args) => names::handle(session, args, global).await,
        Command::Entities(args) => entities::handle(session, args, global).await,
        Command::Platforms => platforms::handle(session, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
