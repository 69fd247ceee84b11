use hassfix_api::{CommandSocket, ConnectionConfig, RestClient};

use crate::error::CoreError;

/// Both API surfaces of one instance, connected with the same token.
///
/// The socket carries reads and most writes; the REST client carries the
/// automation/script config save path, which has no WebSocket
/// equivalent.
pub struct Session {
    pub socket: CommandSocket,
    pub rest: RestClient,
}

impl Session {
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, CoreError> {
        let socket = CommandSocket::connect(config).await?;
        let rest = RestClient::new(config)?;
        Ok(Self { socket, rest })
    }
}
