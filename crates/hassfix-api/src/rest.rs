// REST API client.
//
// The command channel has no write path for automation or script
// configs, so saves go through the REST config endpoints with the same
// long-lived access token as a bearer header.

use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::ConnectionConfig;
use crate::types::StateObject;

pub struct RestClient {
    client: Client,
    base: Url,
    token: secrecy::SecretString,
}

impl RestClient {
    pub fn new(config: &ConnectionConfig) -> Result<Self, Error> {
        Ok(Self {
            client: config.transport.build_client()?,
            base: config.rest_base_url()?,
            token: config.token.clone(),
        })
    }

    /// `GET /api/states`
    pub async fn get_states(&self) -> Result<Vec<StateObject>, Error> {
        let url = self.endpoint("api/states")?;
        debug!(url = %url, "fetching states");

        let response = self
            .client
            .get(url)
            .bearer_auth(self.token.expose_secret())
            .send()
            .await?;
        let body = check_status(response).await?;

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// `POST /api/config/automation/config/{id}` -- `id` is the numeric
    /// config id from the automation's `id` field, not its entity id.
    pub async fn save_automation_config(&self, id: &str, config: &Value) -> Result<(), Error> {
        let url = self.endpoint(&format!("api/config/automation/config/{id}"))?;
        self.post_config(url, config).await
    }

    /// `POST /api/config/script/config/{unique_id}` -- scripts are keyed
    /// by the object id part of their entity id.
    pub async fn save_script_config(&self, unique_id: &str, config: &Value) -> Result<(), Error> {
        let url = self.endpoint(&format!("api/config/script/config/{unique_id}"))?;
        self.post_config(url, config).await
    }

    async fn post_config(&self, url: Url, config: &Value) -> Result<(), Error> {
        debug!(url = %url, "saving config");
        let response = self
            .client
            .post(url)
            .bearer_auth(self.token.expose_secret())
            .json(config)
            .send()
            .await?;
        check_status(response).await.map(|_| ())
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base.join(path)?)
    }
}

/// Map non-2xx responses to errors, keeping a body preview for context.
async fn check_status(response: reqwest::Response) -> Result<String, Error> {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    if status.is_success() {
        return Ok(body);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: format!("server returned {status}"),
        });
    }

    let preview = body.chars().take(200).collect::<String>();
    Err(Error::Rest {
        status: status.as_u16(),
        message: preview,
    })
}
