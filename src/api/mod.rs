//! The backend seam: the `/v1` REST surface as an async capability.
//!
//! The application controller only ever sees [`WorkflowApi`]; the production
//! implementation is the reqwest-backed [`HttpApi`], and tests substitute an
//! in-memory fake. `wml` deliberately returns the raw JSON payload: the
//! caller parses and validates it through [`crate::wml::WmlFile`] before any
//! of it reaches application state.

pub mod http;

pub use http::HttpApi;

use async_trait::async_trait;

use crate::catalog::{DagMetadata, Operator};
use crate::error::ApiError;
use crate::wml::WmlFile;

/// The workflow backend's REST surface.
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    /// `GET /v1/operators`: the operator catalog.
    async fn operators(&self) -> Result<Vec<Operator>, ApiError>;

    /// `GET /v1/dag`: workflow-level metadata and parameters.
    async fn dag_spec(&self) -> Result<DagMetadata, ApiError>;

    /// `GET /v1/wml/`: the names of all saved workflow files.
    async fn wml_list(&self) -> Result<Vec<String>, ApiError>;

    /// `GET /v1/wml/{name}`: a saved workflow file, as raw JSON.
    async fn wml(&self, name: &str) -> Result<serde_json::Value, ApiError>;

    /// `POST /v1/wml/{name}`: persist a workflow file.
    async fn save_wml(&self, name: &str, wml: &WmlFile) -> Result<(), ApiError>;
}
