// WebSocket command channel client.
//
// Wraps a tokio-tungstenite stream with the Home Assistant message
// protocol: an auth handshake on connect, then strictly sequential
// `{id, type, ...}` commands answered by `{id, type: "result", ...}`
// frames. There is never more than one in-flight request -- the
// correlation id is incremented and committed before each send.

use futures_util::{SinkExt, StreamExt};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use crate::error::Error;
use crate::transport::ConnectionConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Synchronous request/response client over the WebSocket command channel.
///
/// Methods take `&mut self` by design: the protocol is sequential and the
/// type system enforces that no two calls overlap.
pub struct CommandSocket {
    stream: WsStream,
    next_id: u64,
}

impl CommandSocket {
    /// Connect to the instance and run the auth handshake.
    ///
    /// The server greets with `auth_required`; we answer with the access
    /// token and expect `auth_ok`. Anything else is an authentication
    /// failure with the server's message attached.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, Error> {
        let url = config.websocket_url()?;
        debug!(url = %url, "connecting to command channel");

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))?;

        let mut socket = Self { stream, next_id: 0 };

        let greeting = socket.read_json().await?;
        if greeting["type"] != "auth_required" {
            return Err(Error::WebSocket(format!(
                "expected auth_required greeting, got: {greeting}"
            )));
        }

        let auth = json!({
            "type": "auth",
            "access_token": config.token.expose_secret(),
        });
        socket.send_json(&auth).await?;

        let result = socket.read_json().await?;
        match result["type"].as_str() {
            Some("auth_ok") => {
                debug!("authenticated");
                Ok(socket)
            }
            Some("auth_invalid") => Err(Error::Authentication {
                message: result["message"]
                    .as_str()
                    .unwrap_or("access token rejected")
                    .to_owned(),
            }),
            _ => Err(Error::WebSocket(format!(
                "unexpected auth response: {result}"
            ))),
        }
    }

    /// Send one command and block until its matching result arrives.
    ///
    /// `params` must be a JSON object (or `null`); its fields are merged
    /// into the envelope next to `id` and `type`. Frames that are not the
    /// matching result (events, pongs) are skipped with a trace log.
    pub async fn call(&mut self, msg_type: &str, params: Value) -> Result<Value, Error> {
        self.next_id += 1;
        let id = self.next_id;

        let mut envelope = serde_json::Map::new();
        envelope.insert("id".into(), json!(id));
        envelope.insert("type".into(), json!(msg_type));
        if let Value::Object(extra) = params {
            envelope.extend(extra);
        }
        let envelope = Value::Object(envelope);

        debug!(id, msg_type, "sending command");
        self.send_json(&envelope).await?;

        loop {
            let frame = self.read_json_or_closed(id).await?;

            if frame["type"] == "result" && frame["id"] == id {
                return if frame["success"].as_bool() == Some(true) {
                    Ok(frame.get("result").cloned().unwrap_or(Value::Null))
                } else {
                    let error = &frame["error"];
                    Err(Error::Api {
                        code: error["code"].as_str().unwrap_or("unknown").to_owned(),
                        message: error["message"]
                            .as_str()
                            .unwrap_or("command failed")
                            .to_owned(),
                    })
                };
            }

            trace!(frame_type = ?frame["type"], "skipping non-matching frame");
        }
    }

    /// Like [`call`](Self::call), deserializing the result payload.
    pub async fn call_as<T: DeserializeOwned>(
        &mut self,
        msg_type: &str,
        params: Value,
    ) -> Result<T, Error> {
        let result = self.call(msg_type, params).await?;
        parse(result)
    }

    /// Like [`call`](Self::call) for commands whose result payload is
    /// irrelevant -- only success matters.
    pub async fn call_unit(&mut self, msg_type: &str, params: Value) -> Result<(), Error> {
        self.call(msg_type, params).await.map(|_| ())
    }

    // ── Frame helpers ────────────────────────────────────────────────

    async fn send_json(&mut self, value: &Value) -> Result<(), Error> {
        self.stream
            .send(Message::text(value.to_string()))
            .await
            .map_err(|e| Error::WebSocket(e.to_string()))
    }

    /// Read frames until a text frame parses as JSON.
    async fn read_json(&mut self) -> Result<Value, Error> {
        loop {
            let frame = self
                .stream
                .next()
                .await
                .ok_or_else(|| Error::WebSocket("connection closed".into()))?
                .map_err(|e| Error::WebSocket(e.to_string()))?;

            match frame {
                Message::Text(text) => {
                    return serde_json::from_str(&text).map_err(|e| Error::Deserialization {
                        message: e.to_string(),
                        body: text.to_string(),
                    });
                }
                Message::Close(_) => {
                    return Err(Error::WebSocket("server closed connection".into()));
                }
                // Ping/pong handled by tungstenite; binary frames unused.
                _ => {}
            }
        }
    }

    async fn read_json_or_closed(&mut self, pending_id: u64) -> Result<Value, Error> {
        self.read_json().await.map_err(|e| match e {
            Error::WebSocket(ref msg) if msg.contains("closed") => Error::ConnectionClosed {
                id: pending_id,
            },
            other => other,
        })
    }
}

/// Deserialize a result payload, keeping the raw body for debugging.
pub(crate) fn parse<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|e| {
        let preview = &body[..body.len().min(200)];
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body,
        }
    })
}
