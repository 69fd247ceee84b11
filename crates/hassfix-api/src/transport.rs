// Shared transport configuration for building reqwest::Client instances
// and deriving the WebSocket endpoint URL.
//
// The REST and WebSocket clients share host, TLS, and timeout settings
// through this module, avoiding duplicated builder logic.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Accept any certificate (for self-signed local instances).
    DangerAcceptInvalid,
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, crate::error::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("hassfix/", env!("CARGO_PKG_VERSION")));

        if matches!(self.tls, TlsMode::DangerAcceptInvalid) {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| crate::error::Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

/// Everything needed to reach one Home Assistant instance.
///
/// `host` is the bare `host[:port]` part; URL schemes are derived from
/// the `tls` flag (`https`/`wss` vs `http`/`ws`), matching how the
/// instance itself splits its two API surfaces.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Host and optional port, e.g. `"homeassistant.local:8123"`.
    pub host: String,
    /// Whether to use TLS for both surfaces.
    pub tls: bool,
    /// Long-lived access token.
    pub token: SecretString,
    /// Transport settings shared by both clients.
    pub transport: TransportConfig,
}

impl ConnectionConfig {
    /// The WebSocket endpoint: `ws(s)://{host}/api/websocket`.
    pub fn websocket_url(&self) -> Result<Url, crate::error::Error> {
        let scheme = if self.tls { "wss" } else { "ws" };
        Url::parse(&format!("{scheme}://{}/api/websocket", self.host)).map_err(Into::into)
    }

    /// The REST base: `http(s)://{host}`.
    pub fn rest_base_url(&self) -> Result<Url, crate::error::Error> {
        let scheme = if self.tls { "https" } else { "http" };
        Url::parse(&format!("{scheme}://{}", self.host)).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(tls: bool) -> ConnectionConfig {
        ConnectionConfig {
            host: "hass.local:8123".into(),
            tls,
            token: SecretString::from("secret".to_owned()),
            transport: TransportConfig::default(),
        }
    }

    #[test]
    fn websocket_url_plain() {
        let url = config(false).websocket_url().expect("valid url");
        assert_eq!(url.as_str(), "ws://hass.local:8123/api/websocket");
    }

    #[test]
    fn websocket_url_tls() {
        let url = config(true).websocket_url().expect("valid url");
        assert_eq!(url.as_str(), "wss://hass.local:8123/api/websocket");
    }

    #[test]
    fn rest_base_url_tls() {
        let url = config(true).rest_base_url().expect("valid url");
        assert_eq!(url.as_str(), "https://hass.local:8123/");
    }
}
