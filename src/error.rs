use crate::catalog::ParameterKind;
use thiserror::Error;

/// Errors that can occur while talking to the workflow backend.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to '{path}' failed with status {status}")]
    Status { status: u16, path: String },

    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors that can occur when coercing a raw parameter value into its declared kind.
#[derive(Error, Debug, Clone)]
pub enum ParameterError {
    #[error("parameter '{id}' is not a valid {kind} value: '{raw}'")]
    InvalidValue {
        id: String,
        kind: ParameterKind,
        raw: String,
    },
}

/// Errors that can occur when parsing, validating or exchanging a WML document.
#[derive(Error, Debug)]
pub enum WmlError {
    #[error("failed to parse WML document: {0}")]
    Parse(String),

    #[error("link '{link_id}' references a missing node or port on '{node_id}'")]
    DanglingLink { link_id: String, node_id: String },

    #[error("workflow graph contains a cycle")]
    CycleDetected,

    #[error("'{parameter}' is a required parameter on '{scope}'")]
    MissingRequiredParameter { scope: String, parameter: String },

    #[error("invalid parameter value on '{scope}'")]
    Parameter {
        scope: String,
        #[source]
        source: ParameterError,
    },

    #[error("DAG metadata has not been loaded yet")]
    DagNotLoaded,

    #[error("backend request failed: {0}")]
    Backend(#[from] ApiError),
}

/// Errors that can occur in the local snapshot store.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("stored snapshot is malformed: {0}")]
    Malformed(String),

    #[error("could not write snapshot: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur when reading or scaffolding a project configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("'{path}' is not a valid windmill project")]
    NotAProject { path: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not serialize project config: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
