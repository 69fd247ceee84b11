use thiserror::Error;

/// Errors surfaced by the audit, rename and names workflows.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Api(#[from] hassfix_api::Error),

    /// A document has no config id to address the save endpoint with,
    /// and the registry lookup could not recover one.
    #[error("no usable config id for {entity_id}")]
    MissingId { entity_id: String },

    /// The server refused to persist an updated config.
    #[error("save rejected for {entity_id}: {reason}")]
    SaveRejected { entity_id: String, reason: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl CoreError {
    /// Authentication failures get a dedicated exit code in the CLI.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_auth_failure())
    }
}
