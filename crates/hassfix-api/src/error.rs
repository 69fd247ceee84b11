use thiserror::Error;

/// Top-level error type for the `hassfix-api` crate.
///
/// Covers every failure mode across both API surfaces: the WebSocket
/// command channel and the REST config endpoints. `hassfix-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The auth handshake was rejected (bad or expired access token).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket connection or frame-level failure.
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// The server closed the channel before a pending call completed.
    #[error("Connection closed while waiting for response to command {id}")]
    ConnectionClosed { id: u64 },

    // ── Command channel ─────────────────────────────────────────────
    /// A command result arrived with `success: false`.
    #[error("API error ({code}): {message}")]
    Api { code: String, message: String },

    // ── REST ────────────────────────────────────────────────────────
    /// A REST endpoint returned a non-success status.
    #[error("REST error (HTTP {status}): {message}")]
    Rest { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates the access token was rejected.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::Rest { status: 401, .. }
        )
    }

    /// Returns `true` if the remote reported "not found" for the request.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Rest { status: 404, .. } => true,
            Self::Api { code, .. } => code == "not_found",
            _ => false,
        }
    }
}
