//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the
//! windmill crate. Import this module to get access to the core
//! functionality without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use windmill::prelude::*;
//!
//! #[tokio::main]
//! async fn main() {
//!     let controller = AppController::new(HttpApi::default(), MemoryStore::new());
//!     controller.bootstrap().await;
//!     println!("{} operators cached", controller.state().operators.map_or(0, |ops| ops.len()));
//! }
//! ```

// State ownership
pub use crate::state::{AppController, AppState, Overlay, UNTITLED};

// Chart types and transitions
pub use crate::chart::{
    apply, Chart, ChartEvent, Link, LinkEndpoint, Node, Point, Port, PortKind, Selection, Size,
};

// Catalog and parameters
pub use crate::catalog::{
    DagMetadata, Operator, OperatorParameter, OperatorProperties, ParameterKind, ParameterValue,
};

// WML documents
pub use crate::wml::{strip_suffix, with_suffix, WmlFile, WML_SUFFIX};

// Backend and persistence seams
pub use crate::api::{HttpApi, WorkflowApi};
pub use crate::persistence::{FileStore, MemoryStore, PersistedState, SnapshotStore, STATE_KEY};

// Project layout
pub use crate::project::{ProjectConfig, ProjectDefaults, ServerConfig, ServerDefaults};

// Error types
pub use crate::error::{ApiError, ConfigError, ParameterError, SnapshotError, WmlError};

// The map type used throughout the chart and catalog
pub use ahash::AHashMap;
