//! The in-memory graph being edited: nodes, links, selection and viewport.
//!
//! The [`Chart`] is the canonical representation of the workflow under
//! construction. It is owned by the application state and mutated only
//! through the transition table in [`transitions`] or through the targeted
//! field updates exposed here (property replacement, selection pruning).

pub mod transitions;
pub mod types;

pub use transitions::{ChartEvent, apply};
pub use types::*;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Default viewport offset, chosen so the scrollable canvas starts centered.
pub const DEFAULT_OFFSET: Point = Point {
    x: -1000.0,
    y: -1000.0,
};

fn default_scale() -> f64 {
    1.0
}

/// The graph-editing state: nodes, links, selection and viewport.
///
/// Invariant: every complete link references node and port ids present in
/// `nodes`, and `selected`/`hovered` are either empty or reference a live
/// node/link/port. The transition table upholds both; code replacing
/// `nodes`/`links` wholesale must call [`Chart::prune_selection`] afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub offset: Point,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub nodes: AHashMap<String, Node>,
    pub links: AHashMap<String, Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<Selection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovered: Option<Selection>,
}

impl Default for Chart {
    fn default() -> Self {
        Self {
            offset: DEFAULT_OFFSET,
            scale: 1.0,
            nodes: AHashMap::new(),
            links: AHashMap::new(),
            selected: None,
            hovered: None,
        }
    }
}

impl Chart {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links.get(id)
    }

    /// Replaces the properties of the node identified by `node_id`, leaving
    /// position, ports and type untouched. Returns `false` (and changes
    /// nothing) when the node does not exist; a stale id must never create a
    /// phantom entry.
    pub fn set_node_properties(
        &mut self,
        node_id: &str,
        properties: crate::catalog::OperatorProperties,
    ) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.properties = Some(properties);
                true
            }
            None => false,
        }
    }

    /// Removes a node and every link touching it. Returns `false` when the
    /// node does not exist.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        if self.nodes.remove(node_id).is_none() {
            return false;
        }
        self.links.retain(|_, link| !link.touches(node_id));
        self.prune_selection();
        true
    }

    /// Whether a port exists on the given node.
    pub fn has_port(&self, node_id: &str, port_id: &str) -> bool {
        self.nodes
            .get(node_id)
            .is_some_and(|node| node.ports.contains_key(port_id))
    }

    /// Clears `selected`/`hovered` entries that no longer reference a live
    /// node or link, restoring the selection invariant after bulk updates.
    pub fn prune_selection(&mut self) {
        let dead = |selection: &Selection| match selection {
            Selection::Node { id } => !self.nodes.contains_key(id),
            Selection::Link { id } => !self.links.contains_key(id),
            Selection::Port { node_id, id } => !self
                .nodes
                .get(node_id)
                .is_some_and(|node| node.ports.contains_key(id)),
        };
        let selected_dead = self.selected.as_ref().is_some_and(&dead);
        let hovered_dead = self.hovered.as_ref().is_some_and(&dead);
        if selected_dead {
            self.selected = None;
        }
        if hovered_dead {
            self.hovered = None;
        }
    }
}
