//! The reducer-style transition table for the chart.
//!
//! Every gesture the canvas layer can emit is a [`ChartEvent`]; [`apply`]
//! dispatches it against the current [`Chart`] and reports whether anything
//! changed. Events carrying ids that no longer exist (a node deleted while a
//! drag was in flight, a selection of a link that was just removed) are
//! no-ops, never errors.

use tracing::debug;
use uuid::Uuid;

use super::types::{Link, LinkEndpoint, Node, Point, Port, Selection, Size};
use super::Chart;
use crate::catalog::Operator;

/// A single state transition emitted by the canvas layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// Move a node to a new canvas position.
    DragNode { id: String, position: Point },
    /// Pan the viewport.
    DragCanvas { offset: Point },
    /// Zoom the viewport. Non-positive scales are ignored.
    Zoom { scale: f64 },
    /// Drop a catalog operator onto the canvas, creating a new node.
    CanvasDrop {
        operator: Operator,
        position: Point,
    },
    /// Begin dragging a new link out of a source port.
    LinkStart { link_id: String, from: LinkEndpoint },
    /// Anchor a dragged link to its target port.
    LinkComplete { link_id: String, to: LinkEndpoint },
    /// Abandon a dragged link.
    LinkCancel { link_id: String },
    /// Replace the selection; `None` is a click on empty canvas.
    Select { target: Option<Selection> },
    /// Replace the hover state.
    Hover { target: Option<Selection> },
    /// Delete whatever is currently selected.
    DeleteSelected,
    /// The canvas re-measured a node.
    NodeSizeChange { id: String, size: Size },
    /// The canvas re-laid-out a port within its node.
    PortPositionChange {
        node_id: String,
        port_id: String,
        position: Point,
    },
}

/// Applies one transition to the chart. Returns `true` when the chart
/// changed, `false` when the event was stale or invalid and was dropped.
pub fn apply(chart: &mut Chart, event: ChartEvent) -> bool {
    match event {
        ChartEvent::DragNode { id, position } => match chart.nodes.get_mut(&id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => {
                debug!(node = %id, "ignoring drag for unknown node");
                false
            }
        },

        ChartEvent::DragCanvas { offset } => {
            chart.offset = offset;
            true
        }

        ChartEvent::Zoom { scale } => {
            if scale <= 0.0 {
                return false;
            }
            chart.scale = scale;
            true
        }

        ChartEvent::CanvasDrop { operator, position } => {
            let node = node_from_operator(&operator, position);
            chart.selected = Some(Selection::Node {
                id: node.id.clone(),
            });
            chart.nodes.insert(node.id.clone(), node);
            true
        }

        ChartEvent::LinkStart { link_id, from } => {
            if !chart.has_port(&from.node_id, &from.port_id) {
                debug!(link = %link_id, "ignoring link start from unknown port");
                return false;
            }
            chart.links.insert(
                link_id.clone(),
                Link {
                    id: link_id,
                    from,
                    to: None,
                },
            );
            true
        }

        ChartEvent::LinkComplete { link_id, to } => {
            let Some(link) = chart.links.get(&link_id) else {
                debug!(link = %link_id, "ignoring completion of unknown link");
                return false;
            };
            let valid = chart.has_port(&to.node_id, &to.port_id)
                && link.from.node_id != to.node_id;
            if valid {
                if let Some(link) = chart.links.get_mut(&link_id) {
                    link.to = Some(to);
                }
            } else {
                // Dropped on empty canvas, a dead port, or back onto its own
                // node: the pending link is discarded.
                chart.links.remove(&link_id);
                chart.prune_selection();
            }
            true
        }

        ChartEvent::LinkCancel { link_id } => {
            if chart.links.remove(&link_id).is_none() {
                return false;
            }
            chart.prune_selection();
            true
        }

        ChartEvent::Select { target } => {
            if let Some(selection) = &target {
                if !selection_is_live(chart, selection) {
                    debug!("ignoring selection of missing target");
                    return false;
                }
            }
            chart.selected = target;
            true
        }

        ChartEvent::Hover { target } => {
            if let Some(selection) = &target {
                if !selection_is_live(chart, selection) {
                    return false;
                }
            }
            chart.hovered = target;
            true
        }

        ChartEvent::DeleteSelected => match chart.selected.take() {
            Some(Selection::Node { id }) => chart.remove_node(&id),
            Some(Selection::Link { id }) => {
                let removed = chart.links.remove(&id).is_some();
                chart.prune_selection();
                removed
            }
            Some(selection @ Selection::Port { .. }) => {
                chart.selected = Some(selection);
                false
            }
            None => false,
        },

        ChartEvent::NodeSizeChange { id, size } => match chart.nodes.get_mut(&id) {
            Some(node) => {
                node.size = Some(size);
                true
            }
            None => false,
        },

        ChartEvent::PortPositionChange {
            node_id,
            port_id,
            position,
        } => match chart
            .nodes
            .get_mut(&node_id)
            .and_then(|node| node.ports.get_mut(&port_id))
        {
            Some(port) => {
                port.position = Some(position);
                true
            }
            None => false,
        },
    }
}

/// Builds a fresh node from a catalog entry dropped at `position`: a new v4
/// id, the operator's declared ports (or the default top/bottom pair), and a
/// copy of its parameter properties.
fn node_from_operator(operator: &Operator, position: Point) -> Node {
    Node {
        id: Uuid::new_v4().to_string(),
        position,
        orientation: 0,
        op_type: operator.op_type.clone(),
        ports: operator
            .ports
            .clone()
            .unwrap_or_else(Port::default_pair),
        properties: Some(operator.properties.clone()),
        size: None,
    }
}

fn selection_is_live(chart: &Chart, selection: &Selection) -> bool {
    match selection {
        Selection::Node { id } => chart.nodes.contains_key(id),
        Selection::Link { id } => chart.links.contains_key(id),
        Selection::Port { node_id, id } => chart.has_port(node_id, id),
    }
}
