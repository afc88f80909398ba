//! Common test utilities: state builders and a scriptable backend fake.
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;
use windmill::prelude::*;

/// Creates the one-operator catalog from the bash example: a `str`
/// parameter with a default and no value.
#[allow(dead_code)]
pub fn bash_operator() -> Operator {
    Operator {
        op_type: "bash".to_string(),
        properties: OperatorProperties {
            name: Some(String::new()),
            module: None,
            description: None,
            parameters: vec![OperatorParameter {
                id: "cmd".to_string(),
                kind: ParameterKind::Str,
                value: None,
                default: Some("echo hi".to_string()),
                description: None,
                required: false,
                inherited_from: None,
            }],
        },
        ports: None,
    }
}

/// A catalog entry with a `bool` parameter defaulted to `"true"`.
#[allow(dead_code)]
pub fn bool_operator() -> Operator {
    Operator {
        op_type: "bool-param".to_string(),
        properties: OperatorProperties {
            name: Some("test1".to_string()),
            module: None,
            description: None,
            parameters: vec![OperatorParameter {
                id: "useLegacySql".to_string(),
                kind: ParameterKind::Bool,
                value: None,
                default: Some("true".to_string()),
                description: None,
                required: false,
                inherited_from: None,
            }],
        },
        ports: None,
    }
}

/// Workflow-level metadata with one defaulted parameter.
#[allow(dead_code)]
pub fn sample_dag() -> DagMetadata {
    DagMetadata {
        name: None,
        description: Some("test workflow".to_string()),
        parameters: vec![OperatorParameter {
            id: "retries".to_string(),
            kind: ParameterKind::Int,
            value: None,
            default: Some("1".to_string()),
            description: None,
            required: false,
            inherited_from: None,
        }],
    }
}

/// A node with the default port pair at a fixed position.
#[allow(dead_code)]
pub fn node(id: &str, op_type: &str) -> Node {
    Node {
        id: id.to_string(),
        position: Point::new(100.0, 100.0),
        orientation: 0,
        op_type: op_type.to_string(),
        ports: Port::default_pair(),
        properties: None,
        size: None,
    }
}

/// A complete link from one node's output port to another's input port.
#[allow(dead_code)]
pub fn link(id: &str, from_node: &str, to_node: &str) -> Link {
    Link {
        id: id.to_string(),
        from: LinkEndpoint::new(from_node, "port2"),
        to: Some(LinkEndpoint::new(to_node, "port1")),
    }
}

/// A well-formed two-node WML document.
#[allow(dead_code)]
pub fn sample_wml(filename: &str) -> WmlFile {
    let mut nodes = AHashMap::new();
    nodes.insert("a".to_string(), node("a", "bash"));
    nodes.insert("b".to_string(), node("b", "bash"));
    let mut links = AHashMap::new();
    links.insert("l1".to_string(), link("l1", "a", "b"));
    WmlFile {
        filename: filename.to_string(),
        dag: sample_dag(),
        nodes,
        links,
    }
}

/// An in-memory, scriptable [`WorkflowApi`]: fixed catalog and DAG payloads,
/// a file map shared between saves and opens, optional failure injection,
/// and latches for holding fetches in flight.
#[derive(Default)]
#[allow(dead_code)]
pub struct FakeApi {
    pub catalog: Vec<Operator>,
    pub dag: Option<DagMetadata>,
    pub files: Mutex<AHashMap<String, serde_json::Value>>,
    pub saved: Mutex<Vec<(String, serde_json::Value)>>,
    pub fail_all: AtomicBool,
    /// When set, catalog and DAG fetches wait on this before responding.
    pub fetch_gate: Option<Arc<Notify>>,
    /// Per-call gates for `wml` fetches, consumed front-first.
    pub wml_gates: Mutex<VecDeque<Option<Arc<Notify>>>>,
}

#[allow(dead_code)]
impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(mut self, catalog: Vec<Operator>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn with_dag(mut self, dag: DagMetadata) -> Self {
        self.dag = Some(dag);
        self
    }

    pub fn with_fetch_gate(mut self, gate: Arc<Notify>) -> Self {
        self.fetch_gate = Some(gate);
        self
    }

    pub fn insert_file(&self, name: &str, value: serde_json::Value) {
        self.files.lock().unwrap().insert(name.to_string(), value);
    }

    pub fn push_wml_gate(&self, gate: Option<Arc<Notify>>) {
        self.wml_gates.lock().unwrap().push_back(gate);
    }

    fn failing(&self, path: &str) -> Result<(), ApiError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(ApiError::Status {
                status: 500,
                path: path.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl WorkflowApi for FakeApi {
    async fn operators(&self) -> Result<Vec<Operator>, ApiError> {
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        self.failing("/v1/operators")?;
        Ok(self.catalog.clone())
    }

    async fn dag_spec(&self) -> Result<DagMetadata, ApiError> {
        if let Some(gate) = &self.fetch_gate {
            gate.notified().await;
        }
        self.failing("/v1/dag")?;
        self.dag.clone().ok_or(ApiError::Status {
            status: 404,
            path: "/v1/dag".to_string(),
        })
    }

    async fn wml_list(&self) -> Result<Vec<String>, ApiError> {
        self.failing("/v1/wml/")?;
        Ok(self.files.lock().unwrap().keys().cloned().collect())
    }

    async fn wml(&self, name: &str) -> Result<serde_json::Value, ApiError> {
        let gate = self.wml_gates.lock().unwrap().pop_front().flatten();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let path = format!("/v1/wml/{}", name);
        self.failing(&path)?;
        self.files
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or(ApiError::Status { status: 404, path })
    }

    async fn save_wml(&self, name: &str, wml: &WmlFile) -> Result<(), ApiError> {
        self.failing(&format!("/v1/wml/{}", name))?;
        let value = serde_json::to_value(wml).expect("WML documents always serialize");
        self.saved
            .lock()
            .unwrap()
            .push((name.to_string(), value.clone()));
        self.files.lock().unwrap().insert(name.to_string(), value);
        Ok(())
    }
}

/// A controller over a fake backend and an in-memory store.
#[allow(dead_code)]
pub fn controller(api: FakeApi) -> AppController<FakeApi, MemoryStore> {
    AppController::new(api, MemoryStore::new())
}
