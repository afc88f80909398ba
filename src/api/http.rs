use async_trait::async_trait;
use tracing::debug;

use super::WorkflowApi;
use crate::catalog::{DagMetadata, Operator};
use crate::error::ApiError;
use crate::project::ServerDefaults;
use crate::wml::WmlFile;

/// A reqwest-backed [`WorkflowApi`] client.
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    /// A client against an explicit base URL, e.g. `http://localhost:8000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.client.get(self.url(path)).send().await?;
        Self::check(path, &response)?;
        Ok(response.json().await?)
    }

    fn check(path: &str, response: &reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            })
        }
    }
}

impl Default for HttpApi {
    fn default() -> Self {
        Self::new(ServerDefaults::base_url())
    }
}

#[async_trait]
impl WorkflowApi for HttpApi {
    async fn operators(&self) -> Result<Vec<Operator>, ApiError> {
        self.get_json("/v1/operators").await
    }

    async fn dag_spec(&self) -> Result<DagMetadata, ApiError> {
        self.get_json("/v1/dag").await
    }

    async fn wml_list(&self) -> Result<Vec<String>, ApiError> {
        self.get_json("/v1/wml/").await
    }

    async fn wml(&self, name: &str) -> Result<serde_json::Value, ApiError> {
        self.get_json(&format!("/v1/wml/{}", name)).await
    }

    async fn save_wml(&self, name: &str, wml: &WmlFile) -> Result<(), ApiError> {
        let path = format!("/v1/wml/{}", name);
        debug!(path = %path, "POST");
        let response = self.client.post(self.url(&path)).json(wml).send().await?;
        Self::check(&path, &response)
    }
}
