// State machine and service registry commands.

use serde_json::{Value, json};

use crate::error::Error;
use crate::socket::CommandSocket;
use crate::types::StateObject;

impl CommandSocket {
    /// `get_states` -- every entity currently exposing state, including
    /// non-registry synthetic entities like `sun.sun` and `zone.home`.
    pub async fn get_states(&mut self) -> Result<Vec<StateObject>, Error> {
        self.call_as("get_states", Value::Null).await
    }

    /// `get_services` -- the two-level `domain -> {service: meta}` map.
    pub async fn get_services(&mut self) -> Result<serde_json::Map<String, Value>, Error> {
        self.call_as("get_services", Value::Null).await
    }

    /// `call_service` -- invoke an arbitrary domain/service pair.
    pub async fn call_service(
        &mut self,
        domain: &str,
        service: &str,
        service_data: Value,
    ) -> Result<(), Error> {
        self.call_unit(
            "call_service",
            json!({
                "domain": domain,
                "service": service,
                "service_data": service_data,
            }),
        )
        .await
    }
}
