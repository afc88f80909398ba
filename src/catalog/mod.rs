//! Operator catalog and DAG metadata as served by the workflow backend.
//!
//! Operators are node templates: a type name plus a parameter schema,
//! fetched once from `GET /v1/operators` and cached in application state.
//! [`DagMetadata`] is the workflow-level counterpart fetched from
//! `GET /v1/dag`. Both seed each parameter's `value` from its `default`
//! exactly once, when the fetched payload is normalized for storage.

pub mod parameter;

pub use parameter::{OperatorParameter, ParameterKind, ParameterValue};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::chart::types::Port;

/// The editable parameter set of an operator node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperatorProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<OperatorParameter>,
}

impl OperatorProperties {
    pub fn parameter(&self, id: &str) -> Option<&OperatorParameter> {
        self.parameters.iter().find(|param| param.id == id)
    }

    /// One-time default→value seeding over every parameter.
    pub fn seed_defaults(&mut self) {
        for parameter in &mut self.parameters {
            parameter.seed_from_default();
        }
    }
}

/// A reusable node template from the backend catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operator {
    #[serde(rename = "type")]
    pub op_type: String,
    pub properties: OperatorProperties,
    /// Port layout for nodes created from this operator; the default
    /// top/bottom pair is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<AHashMap<String, Port>>,
}

/// Workflow-level metadata and parameters, distinct from any single node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DagMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<OperatorParameter>,
}

impl DagMetadata {
    /// One-time default→value seeding over every parameter.
    pub fn seed_defaults(&mut self) {
        for parameter in &mut self.parameters {
            parameter.seed_from_default();
        }
    }
}
