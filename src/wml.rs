//! The WML document: the named, persisted serialization of a workflow.
//!
//! A WML file carries exactly the fields the backend needs to build an
//! Airflow DAG: `filename`, workflow-level `dag` metadata, and the `nodes`
//! and `links` of the chart. Responses from `GET /v1/wml/{name}` are parsed
//! through [`WmlFile`] before anything is merged into application state;
//! unknown fields are rejected rather than silently dropped.

use ahash::AHashMap;
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::DagMetadata;
use crate::chart::{Chart, Link, Node};
use crate::error::WmlError;

/// Suffix carried by every saved workflow file.
pub const WML_SUFFIX: &str = ".wml";

/// Appends the `.wml` suffix unless the name already carries it.
pub fn with_suffix(name: &str) -> String {
    if name.ends_with(WML_SUFFIX) {
        name.to_string()
    } else {
        format!("{}{}", name, WML_SUFFIX)
    }
}

/// Strips the `.wml` suffix if present.
pub fn strip_suffix(name: &str) -> &str {
    name.strip_suffix(WML_SUFFIX).unwrap_or(name)
}

/// The minimal workflow document exchanged with the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WmlFile {
    pub filename: String,
    pub dag: DagMetadata,
    pub nodes: AHashMap<String, Node>,
    pub links: AHashMap<String, Link>,
}

impl WmlFile {
    /// Parses a backend payload, rejecting documents that do not match the
    /// schema (missing fields, unknown fields, malformed nodes or links).
    pub fn from_value(payload: serde_json::Value) -> Result<Self, WmlError> {
        serde_json::from_value(payload).map_err(|err| WmlError::Parse(err.to_string()))
    }

    pub fn from_json(raw: &str) -> Result<Self, WmlError> {
        serde_json::from_str(raw).map_err(|err| WmlError::Parse(err.to_string()))
    }

    /// Derives a document from the live editing state. Links still being
    /// dragged (no target endpoint yet) cannot be expressed in the schema
    /// and are skipped with a warning.
    pub fn from_state(filename: &str, dag: DagMetadata, chart: &Chart) -> Self {
        let mut links = AHashMap::new();
        for (id, link) in &chart.links {
            if link.is_complete() {
                links.insert(id.clone(), link.clone());
            } else {
                warn!(link = %id, "skipping pending link while building WML document");
            }
        }
        Self {
            filename: strip_suffix(filename).to_string(),
            dag,
            nodes: chart.nodes.clone(),
            links,
        }
    }

    /// Validates the document the way the backend will: every link endpoint
    /// must reference a live node and port, the graph must be acyclic, every
    /// parameter with a value must coerce into its declared kind, and every
    /// `required` parameter must have a value.
    pub fn validate(&self) -> Result<(), WmlError> {
        self.check_endpoints()?;
        self.check_acyclic()?;
        self.check_parameters()
    }

    fn check_endpoints(&self) -> Result<(), WmlError> {
        for link in self.links.values() {
            let endpoints = [Some(&link.from), link.to.as_ref()];
            for endpoint in endpoints.into_iter().flatten() {
                let live = self
                    .nodes
                    .get(&endpoint.node_id)
                    .is_some_and(|node| node.ports.contains_key(&endpoint.port_id));
                if !live {
                    return Err(WmlError::DanglingLink {
                        link_id: link.id.clone(),
                        node_id: endpoint.node_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn check_acyclic(&self) -> Result<(), WmlError> {
        let mut graph = DiGraph::<&str, ()>::new();
        let mut indices = AHashMap::new();
        for id in self.nodes.keys() {
            indices.insert(id.as_str(), graph.add_node(id.as_str()));
        }
        for link in self.links.values() {
            let Some(to) = &link.to else { continue };
            let (Some(&from), Some(&to)) = (
                indices.get(link.from.node_id.as_str()),
                indices.get(to.node_id.as_str()),
            ) else {
                continue;
            };
            graph.add_edge(from, to, ());
        }
        if is_cyclic_directed(&graph) {
            return Err(WmlError::CycleDetected);
        }
        Ok(())
    }

    fn check_parameters(&self) -> Result<(), WmlError> {
        check_parameter_list("DAG", &self.dag.parameters)?;
        for (id, node) in &self.nodes {
            if let Some(properties) = &node.properties {
                check_parameter_list(id, &properties.parameters)?;
            }
        }
        Ok(())
    }
}

fn check_parameter_list(
    scope: &str,
    parameters: &[crate::catalog::OperatorParameter],
) -> Result<(), WmlError> {
    for parameter in parameters {
        if parameter.required && parameter.value.is_none() {
            return Err(WmlError::MissingRequiredParameter {
                scope: scope.to_string(),
                parameter: parameter.id.clone(),
            });
        }
        parameter.validate().map_err(|source| WmlError::Parameter {
            scope: scope.to_string(),
            source,
        })?;
    }
    Ok(())
}
