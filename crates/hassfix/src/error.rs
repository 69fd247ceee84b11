//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hassfix_config::ConfigError;
use hassfix_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to Home Assistant: {message}")]
    #[diagnostic(
        code(hassfix::connection_failed),
        help(
            "Check that the instance is running and the host is reachable.\n\
             Self-signed certificate? Try --insecure (-k)."
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(hassfix::auth_failed),
        help(
            "The access token was rejected. Create a long-lived access token\n\
             under your Home Assistant user profile, then run:\n\
             hassfix config set-token"
        )
    )]
    AuthFailed,

    #[error("No access token configured for profile '{profile}'")]
    #[diagnostic(
        code(hassfix::no_token),
        help(
            "Store one with: hassfix config set-token --profile {profile}\n\
             Or set the HASSFIX_TOKEN environment variable."
        )
    )]
    NoToken { profile: String },

    // ── Audit outcome ────────────────────────────────────────────────

    #[error("{count} broken reference(s) remain")]
    #[diagnostic(
        code(hassfix::broken_references),
        help("Re-run with --fix to repair them interactively.")
    )]
    BrokenReferencesRemain { count: usize },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{0} not found")]
    #[diagnostic(code(hassfix::not_found))]
    NotFound(String),

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(hassfix::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hassfix::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hassfix::profile_not_found),
        help(
            "List profiles with: hassfix config profiles\n\
             Create one with: hassfix config init"
        )
    )]
    ProfileNotFound { name: String },

    #[error("No configuration found and no --host given")]
    #[diagnostic(
        code(hassfix::no_config),
        help(
            "Create a config with: hassfix config init\n\
             Expected at: {path}\n\
             Or pass --host and --token directly."
        )
    )]
    NoConfig { path: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NoToken { .. } => exit_code::AUTH,
            Self::Validation { .. } | Self::ProfileNotFound { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        if err.is_auth_failure() {
            return Self::AuthFailed;
        }
        match err {
            CoreError::Api(api) => match api {
                hassfix_api::Error::Transport(_)
                | hassfix_api::Error::InvalidUrl(_)
                | hassfix_api::Error::Tls(_)
                | hassfix_api::Error::WebSocket(_)
                | hassfix_api::Error::ConnectionClosed { .. } => Self::ConnectionFailed {
                    message: api.to_string(),
                },
                other => Self::Api {
                    message: other.to_string(),
                },
            },

            CoreError::NotFound(what) => Self::NotFound(what),

            CoreError::Pattern(e) => Self::Validation {
                field: "pattern".into(),
                reason: e.to_string(),
            },

            other @ (CoreError::MissingId { .. } | CoreError::SaveRejected { .. }) => Self::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<hassfix_api::Error> for CliError {
    fn from(err: hassfix_api::Error) -> Self {
        Self::from(CoreError::from(err))
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::NoToken { profile } => Self::NoToken { profile },
            ConfigError::UnknownProfile(name) => Self::ProfileNotFound { name },
            ConfigError::Io(e) => Self::Io(e),
            other @ (ConfigError::Serialization(_) | ConfigError::Figment(_)) => Self::Validation {
                field: "config".into(),
                reason: other.to_string(),
            },
        }
    }
}
