// hassfix-api: Async Rust client for the Home Assistant remote API
// (WebSocket command channel + REST config endpoints).

pub mod error;
pub mod rest;
pub mod socket;
pub mod transport;
pub mod types;

pub use error::Error;
pub use rest::RestClient;
pub use socket::CommandSocket;
pub use transport::{ConnectionConfig, TlsMode, TransportConfig};
