//! End-to-end scenarios for the document adapter
//!
//! Each test drives the public adapter surface the way an embedding
//! application would: build a state, apply operations, read through the
//! memoized selectors.

use docstate_adapter::{
    create_document_adapter, produce, Document, DocumentAdapter, DocumentDefinition,
    DocumentState, DocumentUpdate, JsonDocument, Payload,
};
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn doc(id: &str, value: &str) -> JsonDocument {
    JsonDocument::with_id(id).with("value", value)
}

fn versioned(id: &str, v: i64) -> JsonDocument {
    JsonDocument::with_id(id).with("v", v)
}

fn v_of(doc: &JsonDocument) -> i64 {
    doc.get("v").and_then(Value::as_i64).unwrap_or_default()
}

fn changes(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn unsorted() -> DocumentAdapter<JsonDocument> {
    create_document_adapter(DocumentDefinition::new())
}

fn by_v() -> DocumentAdapter<JsonDocument> {
    create_document_adapter(DocumentDefinition::new().sort_by_key(v_of))
}

fn seed(
    adapter: &DocumentAdapter<JsonDocument>,
    docs: Vec<JsonDocument>,
) -> DocumentState<JsonDocument> {
    adapter.add_many(&adapter.get_initial_state(()), docs)
}

fn assert_consistent(
    adapter: &DocumentAdapter<JsonDocument>,
    state: &DocumentState<JsonDocument>,
) {
    if let Err(err) = state.check_invariants(adapter.sort_comparer()) {
        panic!("invariant violated: {err}");
    }
}

// ============================================================================
// Insertion
// ============================================================================

#[test]
fn test_add_many_without_comparer_keeps_insertion_order() {
    let adapter = unsorted();
    let selectors = adapter.get_selectors::<()>();

    let state = seed(&adapter, vec![doc("1", "a"), doc("2", "b")]);

    assert_eq!(state.ids(), ["1", "2"]);
    assert_eq!(selectors.select_total(&state), 2);
    assert_consistent(&adapter, &state);
}

#[test]
fn test_add_one_existing_id_is_a_no_op() {
    let adapter = unsorted();
    let selectors = adapter.get_selectors::<()>();
    let state = adapter.add_one(&adapter.get_initial_state(()), doc("1", "a"));

    let next = adapter.add_one(&state, doc("1", "z"));

    let found = selectors.select_by_id(&next, "1").unwrap();
    assert_eq!(*found, doc("1", "a"));
    assert!(Arc::ptr_eq(&state.ids, &next.ids));
    assert!(Arc::ptr_eq(&state.entities, &next.entities));
}

#[test]
fn test_upsert_one_replaces_existing() {
    let adapter = unsorted();
    let selectors = adapter.get_selectors::<()>();
    let state = adapter.add_one(&adapter.get_initial_state(()), doc("1", "a"));

    let next = adapter.upsert_one(&state, doc("1", "z"));

    assert_eq!(*selectors.select_by_id(&next, "1").unwrap(), doc("1", "z"));
    assert_eq!(*selectors.select_by_id(&state, "1").unwrap(), doc("1", "a"));
    assert_eq!(next.ids(), ["1"]);
}

#[test]
fn test_sorted_add_one_lands_in_order() {
    let adapter = by_v();
    let state = seed(&adapter, vec![versioned("1", 3), versioned("2", 1)]);

    let next = adapter.add_one(&state, versioned("3", 2));

    assert_eq!(next.ids(), ["2", "3", "1"]);
    assert_consistent(&adapter, &next);
}

#[test]
fn test_set_all_replaces_collection() {
    let adapter = unsorted();
    let state = seed(&adapter, vec![doc("1", "a"), doc("2", "b")]);

    let next = adapter.set_all(&state, vec![doc("3", "c")]);

    assert_eq!(next.ids(), ["3"]);
    assert!(!next.contains_key("1"));
    assert_consistent(&adapter, &next);
}

// ============================================================================
// Updates
// ============================================================================

#[test]
fn test_update_one_rename() {
    let adapter = unsorted();
    let state = adapter.add_one(&adapter.get_initial_state(()), doc("1", "a"));

    let next = adapter.update_one(
        &state,
        DocumentUpdate::new("1".to_string(), changes(json!({"_id": "9"}))),
    );

    assert!(!next.contains_key("1"));
    assert_eq!(**next.get("9").unwrap(), doc("9", "a"));
    assert_eq!(next.ids(), ["9"]);
    assert_consistent(&adapter, &next);
}

#[test]
fn test_update_many_without_reorder_keeps_ids() {
    let adapter = by_v();
    let state = seed(&adapter, vec![versioned("1", 1), versioned("2", 5)]);

    let next = adapter.update_many(
        &state,
        vec![DocumentUpdate::new("1".to_string(), changes(json!({"v": 2, "note": "x"})))],
    );

    assert!(Arc::ptr_eq(&state.ids, &next.ids));
    assert!(!Arc::ptr_eq(&state.entities, &next.entities));
    assert_eq!(v_of(next.get("1").unwrap()), 2);
}

#[test]
fn test_update_many_with_reorder_replaces_ids() {
    let adapter = by_v();
    let state = seed(&adapter, vec![versioned("1", 1), versioned("2", 5)]);

    let next = adapter.update_many(
        &state,
        vec![DocumentUpdate::new("1".to_string(), changes(json!({"v": 9})))],
    );

    assert!(!Arc::ptr_eq(&state.ids, &next.ids));
    assert_eq!(next.ids(), ["2", "1"]);
    assert_consistent(&adapter, &next);
}

#[test]
fn test_update_many_sees_earlier_rename() {
    let adapter = unsorted();
    let state = seed(&adapter, vec![doc("x", "a"), doc("k", "b")]);

    let next = adapter.update_many(
        &state,
        vec![
            DocumentUpdate::new("x".to_string(), changes(json!({"_id": "y"}))),
            DocumentUpdate::new("y".to_string(), changes(json!({"value": "renamed"}))),
            DocumentUpdate::new("x".to_string(), changes(json!({"value": "lost"}))),
        ],
    );

    assert!(!next.contains_key("x"));
    assert_eq!(**next.get("y").unwrap(), doc("y", "renamed"));
    assert_eq!(next.ids(), ["k", "y"]);
    assert_consistent(&adapter, &next);
}

#[test]
fn test_update_unknown_id_is_a_no_op() {
    let adapter = unsorted();
    let state = adapter.add_one(&adapter.get_initial_state(()), doc("1", "a"));

    let next = adapter.update_one(
        &state,
        DocumentUpdate::new("404".to_string(), changes(json!({"value": "z"}))),
    );

    assert!(Arc::ptr_eq(&state.ids, &next.ids));
    assert!(Arc::ptr_eq(&state.entities, &next.entities));
}

// ============================================================================
// Removal
// ============================================================================

#[test]
fn test_remove_one_twice_equals_once() {
    let adapter = unsorted();
    let state = seed(&adapter, vec![doc("1", "a"), doc("2", "b")]);

    let once = adapter.remove_one(&state, "1".to_string());
    let twice = adapter.remove_one(&once, "1".to_string());

    assert_eq!(once.ids(), twice.ids());
    assert_eq!(once.entities(), twice.entities());
    assert!(Arc::ptr_eq(&once.ids, &twice.ids));
}

#[test]
fn test_remove_all_then_add() {
    let adapter = unsorted();
    let state = seed(&adapter, vec![doc("1", "a"), doc("2", "b")]);

    let cleared = adapter.remove_all(&state);
    assert!(cleared.is_empty());

    let refilled = adapter.add_one(&cleared, doc("1", "c"));
    assert_eq!(**refilled.get("1").unwrap(), doc("1", "c"));
}

// ============================================================================
// Selectors
// ============================================================================

#[test]
fn test_select_all_identity_across_mutations() {
    let adapter = unsorted();
    let selectors = adapter.get_selectors::<()>();
    let state = seed(&adapter, vec![doc("1", "a"), doc("2", "b")]);

    let first = selectors.select_all(&state);
    assert!(Arc::ptr_eq(&first, &selectors.select_all(&state)));

    let edited = adapter.update_one(
        &state,
        DocumentUpdate::new("2".to_string(), changes(json!({"value": "B"}))),
    );
    let after_edit = selectors.select_all(&edited);
    assert!(!Arc::ptr_eq(&first, &after_edit));
    assert_eq!(*after_edit[1], doc("2", "B"));

    let grown = adapter.add_one(&edited, doc("3", "c"));
    assert_eq!(selectors.select_all(&grown).len(), 3);
}

#[test]
fn test_selectors_bound_to_root_state() {
    #[derive(Clone)]
    struct App {
        user: String,
        notes: DocumentState<JsonDocument>,
    }

    let adapter = unsorted();
    let selectors = adapter.get_selectors_for(|app: &App| &app.notes);
    let app = App {
        user: "ada".to_string(),
        notes: adapter.get_initial_state(()),
    };

    let next = produce(&app, |draft| {
        draft.user.push_str(" lovelace");
        let mut notes = draft.project(|app| &mut app.notes);
        let notes = adapter.add_many(&mut notes, vec![doc("n1", "first"), doc("n2", "second")]);
        adapter.remove_one(notes, "n1".to_string());
    });

    assert_eq!(next.user, "ada lovelace");
    assert_eq!(selectors.select_total(&next), 1);
    assert_eq!(selectors.select_ids(&next).as_slice(), ["n2"]);
    assert_eq!(selectors.select_total(&app), 0);
}

// ============================================================================
// Payloads and snapshots
// ============================================================================

#[test]
fn test_action_payload_from_json() {
    let adapter = unsorted();
    let action: Payload<Vec<JsonDocument>> = serde_json::from_value(json!({
        "type": "notes/addMany",
        "payload": [{"_id": "1", "value": "a"}, {"_id": "2", "value": "b"}]
    }))
    .unwrap();
    assert_eq!(action.kind(), Some("notes/addMany"));

    let bare: Payload<Vec<JsonDocument>> =
        serde_json::from_value(json!([{"_id": "1", "value": "a"}, {"_id": "2", "value": "b"}]))
            .unwrap();
    assert_eq!(bare.kind(), None);

    let empty = adapter.get_initial_state(());
    let from_action = adapter.add_many(&empty, action);
    let from_bare = adapter.add_many(&empty, bare);

    assert_eq!(from_action.ids(), ["1", "2"]);
    assert_eq!(from_action.ids(), from_bare.ids());
}

#[test]
fn test_snapshot_round_trip_with_extra() {
    #[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    struct Status {
        loading: bool,
    }

    let adapter = unsorted();
    let state = adapter.add_many(
        &adapter.get_initial_state(Status { loading: true }),
        vec![doc("1", "a"), doc("2", "b")],
    );

    let snapshot = serde_json::to_value(&state).unwrap();
    assert_eq!(snapshot["ids"], json!(["1", "2"]));
    assert_eq!(snapshot["loading"], json!(true));

    let restored: DocumentState<JsonDocument, Status> =
        DocumentState::from_snapshot(snapshot).unwrap();
    assert_eq!(restored.ids(), state.ids());
    assert_eq!(restored.extra(), &Status { loading: true });
    assert_eq!(restored.get("2").map(|d| d.key()), Some("2".to_string()));
}

#[test]
fn test_snapshot_with_mismatched_ids_is_rejected() {
    let snapshot = json!({
        "ids": ["1", "2"],
        "entities": {"1": {"_id": "1"}}
    });

    let restored: docstate_adapter::Result<DocumentState<JsonDocument>> =
        DocumentState::from_snapshot(snapshot);
    assert!(restored.is_err());
}
