//! The application controller: single owner of [`AppState`].
//!
//! Every mutation (chart transitions, property edits, fetch completions,
//! file operations, overlay toggles) goes through the controller, and each
//! committed change writes a sanitized snapshot to the local store. Fetches
//! follow one shape: bump the resource's generation fence, hold a loading
//! guard for the duration, and merge the response only if no newer request
//! for the same resource has been issued since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use itertools::Itertools;
use tracing::{debug, info, warn};

use super::AppState;
use crate::api::WorkflowApi;
use crate::catalog::{DagMetadata, OperatorProperties};
use crate::chart::{transitions, ChartEvent};
use crate::error::{ApiError, WmlError};
use crate::persistence::{PersistedState, SnapshotStore, STATE_KEY};
use crate::wml::{self, WmlFile};

/// The modal overlays gated by application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    FileBrowser,
    RenameBox,
}

/// A monotonically increasing request generation for one resource kind.
/// Completions holding a stale token are discarded without touching state.
#[derive(Default)]
struct Fence {
    latest: AtomicU64,
}

impl Fence {
    fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == token
    }
}

#[derive(Default)]
struct Fences {
    operators: Fence,
    dag: Fence,
    file: Fence,
}

impl Fences {
    fn invalidate_all(&self) {
        self.operators.begin();
        self.dag.begin();
        self.file.begin();
    }
}

/// Owns the application state and the seams to the backend and the local
/// snapshot store.
pub struct AppController<A: WorkflowApi, S: SnapshotStore> {
    api: Arc<A>,
    store: Arc<S>,
    state: Arc<Mutex<AppState>>,
    fences: Fences,
}

impl<A: WorkflowApi, S: SnapshotStore> AppController<A, S> {
    /// Builds a controller, restoring the persisted snapshot when one is
    /// present and passes the shape check, and falling back to the default
    /// state otherwise.
    pub fn new(api: A, store: S) -> Self {
        let state = store
            .get(STATE_KEY)
            .and_then(|raw| match PersistedState::restore(&raw) {
                Ok(snapshot) => Some(snapshot.into_state()),
                Err(err) => {
                    warn!(error = %err, "discarding stored snapshot");
                    None
                }
            })
            .unwrap_or_default();

        Self {
            api: Arc::new(api),
            store: Arc::new(store),
            state: Arc::new(Mutex::new(state)),
            fences: Fences::default(),
        }
    }

    /// Startup: fetch whatever the restored snapshot could not provide. The
    /// two fetches race independently; the loading counter's return to zero
    /// is the only synchronization point the UI sees.
    pub async fn bootstrap(&self) {
        let (need_operators, need_dag) = {
            let state = self.lock();
            (state.operators.is_none(), state.dag.is_none())
        };
        tokio::join!(
            async {
                if need_operators {
                    self.refresh_operators().await;
                }
            },
            async {
                if need_dag {
                    self.refresh_dag().await;
                }
            },
        );
    }

    /// The backend seam this controller talks to.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// The snapshot store this controller persists into.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// A clone of the current state, for rendering.
    pub fn state(&self) -> AppState {
        self.lock().clone()
    }

    /// Runs a read against the current state without cloning it.
    pub fn with_state<R>(&self, read: impl FnOnce(&AppState) -> R) -> R {
        read(&self.lock())
    }

    pub fn is_busy(&self) -> bool {
        self.lock().is_busy()
    }

    /// Dispatches a canvas transition into the owned chart and persists the
    /// result. Stale events are no-ops.
    pub fn apply(&self, event: ChartEvent) {
        self.commit(|state| {
            transitions::apply(&mut state.chart, event);
        });
    }

    /// Replaces the properties of one node, leaving its position, ports and
    /// type untouched. Unknown ids are ignored; no phantom entries.
    pub fn update_node_properties(&self, node_id: &str, properties: OperatorProperties) {
        self.commit(|state| {
            if !state.chart.set_node_properties(node_id, properties) {
                debug!(node = %node_id, "ignoring property update for unknown node");
            }
        });
    }

    /// Wholesale-replaces the DAG metadata.
    pub fn update_dag(&self, dag: DagMetadata) {
        self.commit(|state| state.dag = Some(dag));
    }

    /// Fetches the operator catalog and caches it. A failed fetch leaves
    /// the cache unset (the UI keeps its placeholder); either way the
    /// loading counter returns to where it started.
    pub async fn refresh_operators(&self) {
        let token = self.fences.operators.begin();
        let _loading = self.begin_loading();
        match self.api.operators().await {
            Ok(mut catalog) => {
                if !self.fences.operators.is_current(token) {
                    debug!("discarding stale operator catalog response");
                    return;
                }
                for operator in &mut catalog {
                    operator.properties.seed_defaults();
                }
                info!(count = catalog.len(), "operator catalog refreshed");
                self.commit(|state| state.operators = Some(catalog));
            }
            Err(err) => warn!(error = %err, "operator catalog refresh failed"),
        }
    }

    /// Fetches the workflow-level DAG metadata, seeding parameter values
    /// from defaults the same way the catalog fetch does.
    pub async fn refresh_dag(&self) {
        let token = self.fences.dag.begin();
        let _loading = self.begin_loading();
        match self.api.dag_spec().await {
            Ok(mut dag) => {
                if !self.fences.dag.is_current(token) {
                    debug!("discarding stale DAG spec response");
                    return;
                }
                dag.seed_defaults();
                self.commit(|state| state.dag = Some(dag));
            }
            Err(err) => warn!(error = %err, "DAG spec refresh failed"),
        }
    }

    /// The sorted list of saved workflow files. Drives the file browser,
    /// which manages its own local spinner; the global counter is not
    /// involved.
    pub async fn list_files(&self) -> Result<Vec<String>, ApiError> {
        let files = self.api.wml_list().await?;
        Ok(files.into_iter().sorted().collect())
    }

    /// Loads a named workflow file and merges it into state: nodes, links,
    /// DAG metadata and filename. The payload must match the WML schema;
    /// anything else is surfaced and nothing is merged. On success the file
    /// browser closes; on failure it stays as it was.
    pub async fn open_file(&self, name: &str) -> Result<(), WmlError> {
        let token = self.fences.file.begin();
        let _loading = self.begin_loading();

        let payload = self.api.wml(name).await?;
        let file = WmlFile::from_value(payload)?;

        if !self.fences.file.is_current(token) {
            debug!(file = %name, "discarding stale file response");
            return Ok(());
        }

        self.commit(|state| {
            state.chart.nodes = file.nodes;
            state.chart.links = file.links;
            state.chart.prune_selection();
            state.dag = Some(file.dag);
            state.filename = wml::strip_suffix(&file.filename).to_string();
            state.file_browser_open = false;
        });
        info!(file = %name, "opened workflow file");
        Ok(())
    }

    /// Persists the current workflow under its filename (with the `.wml`
    /// suffix) on the backend. Only the durable subset is sent: filename,
    /// DAG metadata, nodes and links.
    pub async fn save_file(&self) -> Result<(), WmlError> {
        let (name, file) = {
            let state = self.lock();
            let dag = state.dag.clone().ok_or(WmlError::DagNotLoaded)?;
            let file = WmlFile::from_state(&state.filename, dag, &state.chart);
            (wml::with_suffix(&state.filename), file)
        };

        let _loading = self.begin_loading();
        self.api.save_wml(&name, &file).await?;
        info!(file = %name, "saved workflow file");
        Ok(())
    }

    /// Resets to a pristine workflow and repopulates the catalog and DAG
    /// metadata. Outstanding fetches from the previous workflow are fenced
    /// off so their late responses cannot leak into the fresh state.
    pub async fn new_file(&self) {
        self.fences.invalidate_all();
        self.commit(|state| {
            let loading = state.loading;
            *state = AppState::default();
            state.loading = loading;
        });
        tokio::join!(self.refresh_operators(), self.refresh_dag());
    }

    /// Renames the workflow. An empty or unchanged name is silently
    /// discarded; either way the rename overlay closes.
    pub fn rename_file(&self, new_name: &str) {
        self.commit(|state| {
            if !new_name.is_empty() && new_name != state.filename {
                info!(from = %state.filename, to = %new_name, "workflow renamed");
                state.filename = new_name.to_string();
            }
            state.rename_box_open = false;
        });
    }

    pub fn toggle_file_browser(&self) {
        self.commit(|state| state.file_browser_open = !state.file_browser_open);
    }

    pub fn toggle_rename_box(&self) {
        self.commit(|state| state.rename_box_open = !state.rename_box_open);
    }

    /// The presentation layer signals a click outside an open overlay; the
    /// overlay closes if open, and nothing else changes.
    pub fn overlay_clicked_outside(&self, overlay: Overlay) {
        self.commit(|state| match overlay {
            Overlay::FileBrowser => state.file_browser_open = false,
            Overlay::RenameBox => state.rename_box_open = false,
        });
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        lock(&self.state)
    }

    /// Applies a mutation and writes the sanitized snapshot.
    fn commit<R>(&self, mutate: impl FnOnce(&mut AppState) -> R) -> R {
        let mut state = self.lock();
        let out = mutate(&mut state);
        persist(self.store.as_ref(), &state);
        out
    }

    /// Increments the loading counter and returns a guard whose drop
    /// decrements it again, so the pairing survives every early return and
    /// error path.
    fn begin_loading(&self) -> LoadingGuard<S> {
        self.commit(|state| state.loading += 1);
        LoadingGuard {
            state: Arc::clone(&self.state),
            store: Arc::clone(&self.store),
        }
    }
}

struct LoadingGuard<S: SnapshotStore> {
    state: Arc<Mutex<AppState>>,
    store: Arc<S>,
}

impl<S: SnapshotStore> Drop for LoadingGuard<S> {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.loading = state.loading.saturating_sub(1);
        persist(self.store.as_ref(), &state);
    }
}

fn lock(state: &Mutex<AppState>) -> MutexGuard<'_, AppState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn persist<S: SnapshotStore>(store: &S, state: &AppState) {
    let snapshot = PersistedState::capture(state);
    match serde_json::to_string(&snapshot) {
        Ok(raw) => {
            if let Err(err) = store.set(STATE_KEY, &raw) {
                warn!(error = %err, "failed to write state snapshot");
            }
        }
        Err(err) => warn!(error = %err, "failed to serialize state snapshot"),
    }
}
