//! Application state and its single owner.
//!
//! [`AppState`] is the one authoritative state tree: the chart plus the
//! filename, the cached operator catalog, DAG metadata, the loading counter
//! and the overlay flags. It is owned exclusively by the
//! [`AppController`](controller::AppController); every mutation flows
//! through the controller's update methods, and each one is followed by a
//! sanitized snapshot write to the local store.

pub mod controller;

pub use controller::{AppController, Overlay};

use crate::catalog::{DagMetadata, Operator};
use crate::chart::Chart;

/// Sentinel filename for a workflow that has never been saved or named.
pub const UNTITLED: &str = "Untitled";

/// The full application state tree.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub chart: Chart,
    /// Current workflow name, without the `.wml` suffix.
    pub filename: String,
    /// The operator catalog; `None` until the first successful fetch, which
    /// is what drives the "loading operators…" placeholder.
    pub operators: Option<Vec<Operator>>,
    /// Workflow-level metadata; `None` until fetched.
    pub dag: Option<DagMetadata>,
    /// Number of asynchronous operations in flight. Always ≥ 0; increments
    /// and decrements pair 1:1 even on error paths.
    pub loading: u32,
    pub file_browser_open: bool,
    pub rename_box_open: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            chart: Chart::default(),
            filename: UNTITLED.to_string(),
            operators: None,
            dag: None,
            loading: 0,
            file_browser_open: false,
            rename_box_open: false,
        }
    }
}

impl AppState {
    /// While true, the presentation layer replaces the whole UI with a
    /// blocking spinner.
    pub fn is_busy(&self) -> bool {
        self.loading > 0
    }
}
