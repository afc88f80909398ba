use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::OperatorProperties;

/// A 2D coordinate, used for the canvas viewport offset and node/port positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Node dimensions as measured by the canvas layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Which edge of a node a port sits on. Workflow links always run from a
/// `Bottom` (output) port into a `Top` (input) port of a downstream node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortKind {
    Top,
    Bottom,
}

/// A connection point on a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PortKind,
    #[serde(default)]
    pub properties: AHashMap<String, String>,
    /// Position within the node, filled in once the canvas has laid the node out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
}

impl Port {
    /// The standard port pair for an operator node: one upstream input on
    /// top, one downstream output on the bottom. Used whenever a catalog
    /// entry does not declare its own ports.
    pub fn default_pair() -> AHashMap<String, Port> {
        let mut ports = AHashMap::new();
        ports.insert(
            "port1".to_string(),
            Port {
                id: "port1".to_string(),
                kind: PortKind::Top,
                properties: AHashMap::new(),
                position: None,
            },
        );
        ports.insert(
            "port2".to_string(),
            Port {
                id: "port2".to_string(),
                kind: PortKind::Bottom,
                properties: AHashMap::new(),
                position: None,
            },
        );
        ports
    }
}

/// A single operator node placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: Point,
    #[serde(default)]
    pub orientation: i32,
    #[serde(rename = "type")]
    pub op_type: String,
    #[serde(default)]
    pub ports: AHashMap<String, Port>,
    /// Operator parameters as edited through the properties sidebar. Attached
    /// when the node is created from a catalog entry; never touched by the
    /// canvas transitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<OperatorProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
}

/// One end of a link: a port on a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEndpoint {
    pub node_id: String,
    pub port_id: String,
}

impl LinkEndpoint {
    pub fn new(node_id: impl Into<String>, port_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            port_id: port_id.into(),
        }
    }
}

/// A directed connection between two node ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub from: LinkEndpoint,
    /// `None` while the link is still being dragged out of its source port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<LinkEndpoint>,
}

impl Link {
    /// Whether both endpoints are anchored to ports.
    pub fn is_complete(&self) -> bool {
        self.to.is_some()
    }

    /// Whether either endpoint touches the given node.
    pub fn touches(&self, node_id: &str) -> bool {
        self.from.node_id == node_id
            || self
                .to
                .as_ref()
                .is_some_and(|to| to.node_id == node_id)
    }
}

/// What is currently selected or hovered on the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Selection {
    Node {
        id: String,
    },
    Link {
        id: String,
    },
    Port {
        #[serde(rename = "nodeId")]
        node_id: String,
        id: String,
    },
}
