//! Controller tests: fetches, the loading counter, file operations, modals.
mod common;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use tokio::sync::Notify;
use windmill::prelude::*;

fn wml_with_node(filename: &str, node_id: &str) -> serde_json::Value {
    let mut nodes = AHashMap::new();
    nodes.insert(node_id.to_string(), node(node_id, "bash"));
    serde_json::to_value(WmlFile {
        filename: filename.to_string(),
        dag: sample_dag(),
        nodes,
        links: AHashMap::new(),
    })
    .unwrap()
}

async fn wait_for_loading(ctrl: &AppController<FakeApi, MemoryStore>, expected: u32) {
    for _ in 0..200 {
        if ctrl.with_state(|state| state.loading) == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!(
        "loading counter never reached {expected}, is {}",
        ctrl.with_state(|state| state.loading)
    );
}

#[tokio::test]
async fn test_refresh_operators_seeds_defaults_and_counter_returns_to_zero() {
    let ctrl = controller(FakeApi::new().with_catalog(vec![bash_operator()]));
    assert!(ctrl.state().operators.is_none());

    ctrl.refresh_operators().await;

    let state = ctrl.state();
    assert_eq!(state.loading, 0);
    assert!(!state.is_busy());
    let catalog = state.operators.expect("catalog cached");
    assert_eq!(
        catalog[0].properties.parameters[0].value.as_deref(),
        Some("echo hi")
    );
}

#[tokio::test]
async fn test_overlapping_fetches_nest_in_the_counter() {
    let gate = Arc::new(Notify::new());
    let api = FakeApi::new()
        .with_catalog(vec![bash_operator()])
        .with_dag(sample_dag())
        .with_fetch_gate(Arc::clone(&gate));
    let ctrl = Arc::new(controller(api));

    let c1 = Arc::clone(&ctrl);
    let h1 = tokio::spawn(async move { c1.refresh_operators().await });
    let c2 = Arc::clone(&ctrl);
    let h2 = tokio::spawn(async move { c2.refresh_dag().await });

    // Both fetches are in flight and the counter nests.
    wait_for_loading(&ctrl, 2).await;
    assert!(ctrl.is_busy());

    gate.notify_waiters();
    h1.await.unwrap();
    h2.await.unwrap();

    let state = ctrl.state();
    assert_eq!(state.loading, 0);
    assert!(state.operators.is_some());
    assert!(state.dag.is_some());
}

#[tokio::test]
async fn test_failed_fetch_still_decrements_and_leaves_cache_unset() {
    let api = FakeApi::new().with_catalog(vec![bash_operator()]);
    api.fail_all.store(true, Ordering::SeqCst);
    let ctrl = controller(api);

    ctrl.refresh_operators().await;
    ctrl.refresh_dag().await;

    let state = ctrl.state();
    assert_eq!(state.loading, 0);
    assert!(state.operators.is_none());
    assert!(state.dag.is_none());
}

#[tokio::test]
async fn test_open_missing_file_keeps_browser_state() {
    let ctrl = controller(FakeApi::new());
    ctrl.toggle_file_browser();

    let result = ctrl.open_file("missing.wml").await;
    assert!(result.is_err());

    let state = ctrl.state();
    assert_eq!(state.loading, 0);
    // No forced close on failure, only on success.
    assert!(state.file_browser_open);
}

#[tokio::test]
async fn test_open_file_closes_browser_on_success() {
    let ctrl = controller(FakeApi::new().with_dag(sample_dag()));
    ctrl.api().insert_file("etl.wml", wml_with_node("etl", "n1"));
    ctrl.toggle_file_browser();

    ctrl.open_file("etl.wml").await.unwrap();

    let state = ctrl.state();
    assert!(!state.file_browser_open);
    assert_eq!(state.filename, "etl");
    assert!(state.chart.nodes.contains_key("n1"));
    assert!(state.dag.is_some());
}

#[tokio::test]
async fn test_open_file_rejects_unknown_fields() {
    let ctrl = controller(FakeApi::new());
    let mut payload = wml_with_node("etl", "n1");
    payload["selected"] = serde_json::json!({"type": "node", "id": "n1"});
    ctrl.api().insert_file("etl.wml", payload);

    let before = ctrl.state();
    let result = ctrl.open_file("etl.wml").await;

    assert!(matches!(result, Err(WmlError::Parse(_))));
    let after = ctrl.state();
    assert_eq!(after.chart.nodes, before.chart.nodes);
    assert_eq!(after.filename, before.filename);
    assert_eq!(after.loading, 0);
}

#[tokio::test]
async fn test_save_then_open_round_trips_nodes_and_links() {
    let api = FakeApi::new()
        .with_catalog(vec![bash_operator()])
        .with_dag(sample_dag());
    let ctrl = controller(api);
    ctrl.bootstrap().await;

    // Build a two-node chart through the transition table.
    let operator = ctrl.state().operators.unwrap()[0].clone();
    ctrl.apply(ChartEvent::CanvasDrop {
        operator: operator.clone(),
        position: Point::new(100.0, 100.0),
    });
    ctrl.apply(ChartEvent::CanvasDrop {
        operator,
        position: Point::new(100.0, 300.0),
    });
    let ids: Vec<String> = ctrl.with_state(|state| state.chart.nodes.keys().cloned().collect());
    ctrl.apply(ChartEvent::LinkStart {
        link_id: "l1".to_string(),
        from: LinkEndpoint::new(ids[0].clone(), "port2"),
    });
    ctrl.apply(ChartEvent::LinkComplete {
        link_id: "l1".to_string(),
        to: LinkEndpoint::new(ids[1].clone(), "port1"),
    });

    ctrl.rename_file("pipeline");
    ctrl.save_file().await.unwrap();

    let saved_nodes = ctrl.with_state(|state| state.chart.nodes.clone());
    let saved_links = ctrl.with_state(|state| state.chart.links.clone());

    // Disturb the chart, then load the file back.
    ctrl.apply(ChartEvent::Select {
        target: Some(Selection::Node { id: ids[0].clone() }),
    });
    ctrl.apply(ChartEvent::DeleteSelected);
    assert!(ctrl.with_state(|state| state.chart.links.is_empty()));

    ctrl.open_file("pipeline.wml").await.unwrap();

    let state = ctrl.state();
    assert_eq!(state.chart.nodes, saved_nodes);
    assert_eq!(state.chart.links, saved_links);
    assert_eq!(state.filename, "pipeline");
    assert_eq!(state.loading, 0);
}

#[tokio::test]
async fn test_save_file_requires_dag_metadata() {
    let ctrl = controller(FakeApi::new());
    let result = ctrl.save_file().await;
    assert!(matches!(result, Err(WmlError::DagNotLoaded)));
    assert_eq!(ctrl.state().loading, 0);
}

#[tokio::test]
async fn test_save_file_posts_under_suffixed_name() {
    let ctrl = controller(FakeApi::new().with_dag(sample_dag()));
    ctrl.refresh_dag().await;
    ctrl.rename_file("etl");
    ctrl.save_file().await.unwrap();

    let saved = ctrl.api().saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "etl.wml");
    assert_eq!(saved[0].1["filename"], "etl");
    // Transient fields never reach the wire.
    assert!(saved[0].1.get("selected").is_none());
    assert!(saved[0].1.get("isLoading").is_none());
}

#[tokio::test]
async fn test_pending_links_are_skipped_on_save() {
    let ctrl = controller(FakeApi::new().with_dag(sample_dag()));
    ctrl.refresh_dag().await;
    ctrl.apply(ChartEvent::CanvasDrop {
        operator: bash_operator(),
        position: Point::new(0.0, 0.0),
    });
    let id = ctrl.with_state(|state| state.chart.nodes.keys().next().cloned().unwrap());
    ctrl.apply(ChartEvent::LinkStart {
        link_id: "dangling".to_string(),
        from: LinkEndpoint::new(id, "port2"),
    });

    ctrl.save_file().await.unwrap();

    let saved = ctrl.api().saved.lock().unwrap();
    let links = saved[0].1["links"].as_object().unwrap();
    assert!(links.is_empty());
}

#[tokio::test]
async fn test_rename_discards_empty_and_unchanged_names() {
    let ctrl = controller(FakeApi::new());

    ctrl.toggle_rename_box();
    ctrl.rename_file("");
    let state = ctrl.state();
    assert_eq!(state.filename, UNTITLED);
    assert!(!state.rename_box_open);

    ctrl.toggle_rename_box();
    ctrl.rename_file(UNTITLED);
    let state = ctrl.state();
    assert_eq!(state.filename, UNTITLED);
    assert!(!state.rename_box_open);
}

#[tokio::test]
async fn test_rename_updates_filename_and_persists() {
    let ctrl = controller(FakeApi::new());
    ctrl.rename_file("reporting");
    assert_eq!(ctrl.state().filename, "reporting");

    let raw = ctrl.store().get(STATE_KEY).expect("snapshot written");
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["filename"], "reporting");
}

#[tokio::test]
async fn test_update_node_properties_ignores_unknown_ids() {
    let ctrl = controller(FakeApi::new());
    ctrl.apply(ChartEvent::CanvasDrop {
        operator: bash_operator(),
        position: Point::new(0.0, 0.0),
    });
    let count = ctrl.with_state(|state| state.chart.nodes.len());

    ctrl.update_node_properties("ghost", bash_operator().properties);

    let state = ctrl.state();
    assert_eq!(state.chart.nodes.len(), count);
    assert!(!state.chart.nodes.contains_key("ghost"));
}

#[tokio::test]
async fn test_new_file_resets_and_repopulates() {
    let api = FakeApi::new()
        .with_catalog(vec![bash_operator(), bool_operator()])
        .with_dag(sample_dag());
    let ctrl = controller(api);
    ctrl.bootstrap().await;
    ctrl.apply(ChartEvent::CanvasDrop {
        operator: bash_operator(),
        position: Point::new(0.0, 0.0),
    });
    ctrl.rename_file("scratch");

    ctrl.new_file().await;

    let state = ctrl.state();
    assert_eq!(state.filename, UNTITLED);
    assert!(state.chart.nodes.is_empty());
    assert_eq!(state.operators.map(|ops| ops.len()), Some(2));
    assert!(state.dag.is_some());
    assert_eq!(state.loading, 0);
}

#[tokio::test]
async fn test_stale_file_response_is_discarded() {
    let api = FakeApi::new();
    api.insert_file("a.wml", wml_with_node("a", "from-a"));
    api.insert_file("b.wml", wml_with_node("b", "from-b"));
    let gate = Arc::new(Notify::new());
    api.push_wml_gate(Some(Arc::clone(&gate)));
    api.push_wml_gate(None);
    let ctrl = Arc::new(controller(api));

    // First open stalls at the backend...
    let c1 = Arc::clone(&ctrl);
    let first = tokio::spawn(async move { c1.open_file("a.wml").await });
    wait_for_loading(&ctrl, 1).await;

    // ...while a second one supersedes it.
    ctrl.open_file("b.wml").await.unwrap();
    assert_eq!(ctrl.state().filename, "b");

    gate.notify_one();
    first.await.unwrap().unwrap();

    // The late response for "a" was discarded.
    let state = ctrl.state();
    assert_eq!(state.filename, "b");
    assert!(state.chart.nodes.contains_key("from-b"));
    assert!(!state.chart.nodes.contains_key("from-a"));
    assert_eq!(state.loading, 0);
}

#[tokio::test]
async fn test_bootstrap_restores_snapshot_and_fetches_the_rest() {
    let store = MemoryStore::new();
    let mut persisted = AppState::default();
    persisted.chart.nodes.insert("kept".to_string(), node("kept", "bash"));
    persisted.filename = "restored".to_string();
    persisted.dag = Some(sample_dag());
    let raw = serde_json::to_string(&PersistedState::capture(&persisted)).unwrap();
    store.set(STATE_KEY, &raw).unwrap();

    let api = FakeApi::new().with_catalog(vec![bash_operator()]);
    let ctrl = AppController::new(api, store);

    let state = ctrl.state();
    assert_eq!(state.filename, "restored");
    assert!(state.chart.nodes.contains_key("kept"));
    assert!(state.operators.is_none());

    ctrl.bootstrap().await;

    let state = ctrl.state();
    assert!(state.operators.is_some());
    // The restored DAG metadata was kept, not refetched.
    assert_eq!(state.dag, persisted.dag);
    assert_eq!(state.loading, 0);
}

#[tokio::test]
async fn test_corrupted_snapshot_falls_back_to_default() {
    let store = MemoryStore::new();
    store.set(STATE_KEY, "{\"nodes\": 12}").unwrap();

    let ctrl = AppController::new(FakeApi::new(), store);
    assert_eq!(ctrl.state(), AppState::default());
}

#[tokio::test]
async fn test_every_commit_writes_a_snapshot() {
    let ctrl = controller(FakeApi::new());
    ctrl.apply(ChartEvent::DragCanvas {
        offset: Point::new(-42.0, -7.0),
    });

    let raw = ctrl.store().get(STATE_KEY).expect("snapshot written");
    let snapshot: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(snapshot["offset"]["x"], -42.0);
    assert_eq!(snapshot["offset"]["y"], -7.0);
}

#[tokio::test]
async fn test_list_files_is_sorted() {
    let ctrl = controller(FakeApi::new());
    for name in ["b.wml", "a.wml", "c.wml"] {
        ctrl.api().insert_file(name, wml_with_node(name, "n"));
    }
    let files = ctrl.list_files().await.unwrap();
    assert_eq!(files, vec!["a.wml", "b.wml", "c.wml"]);
}

#[tokio::test]
async fn test_overlays_are_independent_and_close_on_outside_click() {
    let ctrl = controller(FakeApi::new());
    ctrl.toggle_file_browser();
    ctrl.toggle_rename_box();

    // Both may be open at once.
    let state = ctrl.state();
    assert!(state.file_browser_open);
    assert!(state.rename_box_open);

    ctrl.overlay_clicked_outside(Overlay::FileBrowser);
    let state = ctrl.state();
    assert!(!state.file_browser_open);
    assert!(state.rename_box_open);

    // Closing an already-closed overlay stays closed.
    ctrl.overlay_clicked_outside(Overlay::FileBrowser);
    assert!(!ctrl.state().file_browser_open);
}
