//! # Windmill - Application Core for a Visual DAG Builder
//!
//! **Windmill** is the application-state engine behind a drag-and-drop
//! editor for Airflow-style workflow DAGs. The presentation layer (canvas
//! rendering, gesture handling, styled panels) stays outside this crate;
//! what lives here is everything those surfaces delegate to: the chart
//! being edited, the operator catalog, workflow (WML) files, local
//! snapshot persistence and the REST client for the workflow backend.
//!
//! ## Core Workflow
//!
//! 1.  **Build a controller**: [`state::AppController`] owns the whole
//!     application state. It restores the last sanitized snapshot from a
//!     [`persistence::SnapshotStore`] (or starts from the default state)
//!     and talks to the backend through any [`api::WorkflowApi`]
//!     implementation.
//! 2.  **Bootstrap**: `bootstrap()` fetches the operator catalog and the
//!     DAG metadata concurrently, seeding each parameter's value from its
//!     default exactly once. The loading counter gates a blocking spinner
//!     while anything is in flight.
//! 3.  **Edit**: canvas gestures arrive as [`chart::ChartEvent`]s and are
//!     dispatched through the controller; property-form edits go through
//!     `update_node_properties`/`update_dag`. Every committed change is
//!     snapshotted to the local store.
//! 4.  **Exchange files**: `open_file`, `save_file`, `new_file` and
//!     `rename_file` move the workflow in and out of the backend's named
//!     WML storage, validating documents against the WML schema before
//!     anything is merged into state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use windmill::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Backend client and local snapshot store.
//!     let api = HttpApi::new("http://localhost:8000");
//!     let store = FileStore::new(".windmill");
//!
//!     // Restore the previous session (or start fresh) and fetch what is
//!     // missing.
//!     let controller = AppController::new(api, store);
//!     controller.bootstrap().await;
//!
//!     // Drop the first catalog operator onto the canvas.
//!     if let Some(operator) = controller.state().operators.and_then(|ops| ops.first().cloned()) {
//!         controller.apply(ChartEvent::CanvasDrop {
//!             operator,
//!             position: Point::new(120.0, 80.0),
//!         });
//!     }
//!
//!     // Name it and persist it on the backend as "etl.wml".
//!     controller.rename_file("etl");
//!     controller.save_file().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod chart;
pub mod error;
pub mod persistence;
pub mod prelude;
pub mod project;
pub mod state;
pub mod wml;
