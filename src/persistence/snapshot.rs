use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::DagMetadata;
use crate::chart::{Chart, Link, Node, Point};
use crate::error::SnapshotError;
use crate::state::AppState;

fn default_scale() -> f64 {
    1.0
}

/// The sanitized application snapshot written to the local store.
///
/// Only durable editing state is kept: viewport, nodes, links, filename and
/// DAG metadata. Selection, hover, the loading counter, overlay flags and
/// the operator catalog are all transient or refetchable and are stripped;
/// a restored snapshot must never be able to wedge the application in a
/// loading or modal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub offset: Point,
    #[serde(default = "default_scale")]
    pub scale: f64,
    pub nodes: AHashMap<String, Node>,
    pub links: AHashMap<String, Link>,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag: Option<DagMetadata>,
}

impl PersistedState {
    /// Captures the persistable subset of the application state.
    pub fn capture(state: &AppState) -> Self {
        Self {
            offset: state.chart.offset,
            scale: state.chart.scale,
            nodes: state.chart.nodes.clone(),
            links: state.chart.links.clone(),
            filename: state.filename.clone(),
            dag: state.dag.clone(),
        }
    }

    /// Parses a stored snapshot. The shape check is the deserialization
    /// itself: a payload missing `offset`, `nodes` or `links` (or carrying
    /// the wrong types) is rejected, and the caller falls back to the
    /// default state instead of trusting it.
    pub fn restore(raw: &str) -> Result<Self, SnapshotError> {
        serde_json::from_str(raw).map_err(|err| SnapshotError::Malformed(err.to_string()))
    }

    /// Rehydrates a full application state: restored fields plus pristine
    /// transients (no selection, counter at zero, overlays closed, catalog
    /// unset so it is refetched on bootstrap).
    pub fn into_state(self) -> AppState {
        AppState {
            chart: Chart {
                offset: self.offset,
                scale: self.scale,
                nodes: self.nodes,
                links: self.links,
                selected: None,
                hovered: None,
            },
            filename: self.filename,
            operators: None,
            dag: self.dag,
            loading: 0,
            file_browser_open: false,
            rename_box_open: false,
        }
    }
}
