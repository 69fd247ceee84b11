//! Clap derive structures for the `hassfix` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// hassfix -- reference-consistency auditor for Home Assistant
#[derive(Debug, Parser)]
#[command(
    name = "hassfix",
    version,
    about = "Find and repair broken entity references in Home Assistant",
    long_about = "Audits automations, scripts, groups and dashboards for references\n\
        to entities and services that no longer exist, suggests close matches,\n\
        and can rewrite the configurations in place. Also renames entities in\n\
        bulk and resets friendly names to their integration defaults.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Instance profile to use
    #[arg(long, short = 'p', env = "HASSFIX_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Instance host and port (overrides profile, e.g. "hass.local:8123")
    #[arg(long, env = "HASSFIX_HOST", global = true)]
    pub host: Option<String>,

    /// Long-lived access token (overrides profile)
    #[arg(long, env = "HASSFIX_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Connect with https/wss instead of http/ws
    #[arg(long, global = true)]
    pub tls: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HASSFIX_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts, taking the first suggestion where one exists
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HASSFIX_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "HASSFIX_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit configurations for broken references
    #[command(alias = "a")]
    Audit(AuditArgs),

    /// Rename entities in bulk with a regex
    Rename(RenameArgs),

    /// Manage entity friendly names
    Names(NamesArgs),

    /// List entities
    #[command(alias = "ent")]
    Entities(EntitiesArgs),

    /// Summarize entities per integration platform
    Platforms,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUDIT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuditArgs {
    #[command(subcommand)]
    pub command: AuditCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Audit automation configurations
    #[command(alias = "auto")]
    Automations {
        /// Interactively repair broken references
        #[arg(long)]
        fix: bool,
    },

    /// Audit script configurations
    Scripts {
        /// Interactively repair broken references
        #[arg(long)]
        fix: bool,
    },

    /// Audit group member lists
    Groups {
        /// Interactively repair broken references
        #[arg(long)]
        fix: bool,
    },

    /// Audit Lovelace dashboard configurations
    #[command(alias = "dash")]
    Dashboards {
        /// Restrict to one dashboard by url path or id ("default" for Overview)
        target: Option<String>,

        /// Interactively repair broken references
        #[arg(long)]
        fix: bool,
    },

    /// Audit automations, scripts, groups and dashboards in one run
    All {
        /// Interactively repair broken references
        #[arg(long)]
        fix: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RENAME
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Regex matched against entity ids
    #[arg(long, short = 's', required = true)]
    pub search: String,

    /// Replacement string; capture groups as ${1}. Omit to only list matches
    #[arg(long, short = 'r')]
    pub replace: Option<String>,

    /// Write the rename plan to a CSV file
    #[arg(long, value_name = "FILE")]
    pub output_csv: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NAMES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NamesArgs {
    #[command(subcommand)]
    pub command: NamesCommand,
}

#[derive(Debug, Subcommand)]
pub enum NamesCommand {
    /// Reset user-assigned entity names to the integration defaults
    Reset {
        /// Regex restricting which entity ids are considered
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Apply the changes (default is a dry run)
        #[arg(long)]
        execute: bool,

        /// Skip recreating entity ids after the name reset
        #[arg(long)]
        no_recreate_ids: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitiesCommand {
    /// List entities with their friendly names
    #[command(alias = "ls")]
    List {
        /// Regex matched against entity ids
        pattern: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an access token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
