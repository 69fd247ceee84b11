// Lovelace dashboard commands.
//
// The default (Overview) dashboard is addressed by omitting `url_path`;
// it never appears in the dashboards list.

use serde_json::{Value, json};

use crate::error::Error;
use crate::socket::CommandSocket;
use crate::types::Dashboard;

impl CommandSocket {
    /// `lovelace/dashboards/list` -- all storage-mode dashboards.
    pub async fn list_dashboards(&mut self) -> Result<Vec<Dashboard>, Error> {
        self.call_as("lovelace/dashboards/list", Value::Null).await
    }

    /// `lovelace/config` -- full config tree for one dashboard.
    pub async fn get_dashboard_config(
        &mut self,
        url_path: Option<&str>,
    ) -> Result<Value, Error> {
        let params = match url_path {
            Some(path) => json!({ "url_path": path }),
            None => Value::Null,
        };
        self.call("lovelace/config", params).await
    }

    /// `lovelace/config/save` -- persist a dashboard config tree.
    pub async fn save_dashboard_config(
        &mut self,
        url_path: Option<&str>,
        config: &Value,
    ) -> Result<(), Error> {
        let params = match url_path {
            Some(path) => json!({ "url_path": path, "config": config }),
            None => json!({ "config": config }),
        };
        self.call_unit("lovelace/config/save", params).await
    }
}
