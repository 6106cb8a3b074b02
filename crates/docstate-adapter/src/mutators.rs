//! State mutators for the document collection.
//!
//! Each mutator edits a draft `DocumentState` in place. They never fail:
//! adding an id that already exists, or removing or updating one that does
//! not, is a silent skip.
//!
//! After any insert, delete or rename the id index is rebuilt. The rebuilt
//! sequence only replaces `ids` when it differs from the current one, so a
//! mutation that changes document contents but not their order leaves the
//! `ids` allocation, and every cache keyed on it, untouched.

use docstate_core::{Document, DocumentComparer, DocumentKey, DocumentState, DocumentUpdate};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

/// The mutation engine, parameterized by an optional sort order.
pub struct StateMutators<T: Document> {
    sort_comparer: Option<DocumentComparer<T>>,
}

impl<T: Document> Clone for StateMutators<T> {
    fn clone(&self) -> Self {
        Self {
            sort_comparer: self.sort_comparer.clone(),
        }
    }
}

impl<T: Document> StateMutators<T> {
    pub fn new(sort_comparer: Option<DocumentComparer<T>>) -> Self {
        Self { sort_comparer }
    }

    pub fn sort_comparer(&self) -> Option<&DocumentComparer<T>> {
        self.sort_comparer.as_ref()
    }

    /// Insert documents whose id is not present yet.
    pub fn add_many<X>(&self, documents: Vec<T>, state: &mut DocumentState<T, X>) {
        trace!(count = documents.len(), "add_many");
        let models: Vec<(String, T)> = documents
            .into_iter()
            .map(|doc| (doc.key(), doc))
            .filter(|(key, _)| !state.entities.contains_key(key))
            .collect();
        self.merge(models, state);
    }

    pub fn add_one<X>(&self, document: T, state: &mut DocumentState<T, X>) {
        self.add_many(vec![document], state);
    }

    /// Drop every document.
    pub fn remove_all<X>(&self, state: &mut DocumentState<T, X>) {
        trace!(count = state.ids.len(), "remove_all");
        state.ids = Arc::new(Vec::new());
        state.entities = Arc::new(IndexMap::new());
    }

    /// Remove the documents with the given ids; unknown ids are ignored.
    pub fn remove_many<X>(&self, ids: Vec<T::Id>, state: &mut DocumentState<T, X>) {
        let doomed: HashSet<String> = ids
            .iter()
            .map(DocumentKey::canonical)
            .filter(|key| state.entities.contains_key(key))
            .collect();
        trace!(requested = ids.len(), removed = doomed.len(), "remove_many");
        if doomed.is_empty() {
            return;
        }
        Arc::make_mut(&mut state.entities).retain(|key, _| !doomed.contains(key));
        Arc::make_mut(&mut state.ids).retain(|id| !doomed.contains(id));
    }

    pub fn remove_one<X>(&self, id: T::Id, state: &mut DocumentState<T, X>) {
        self.remove_many(vec![id], state);
    }

    /// Insert or fully replace each document.
    pub fn set_many<X>(&self, documents: Vec<T>, state: &mut DocumentState<T, X>) {
        trace!(count = documents.len(), "set_many");
        let models = documents.into_iter().map(|doc| (doc.key(), doc)).collect();
        self.merge(models, state);
    }

    pub fn set_one<X>(&self, document: T, state: &mut DocumentState<T, X>) {
        self.set_many(vec![document], state);
    }

    /// Replace the whole collection with `documents`.
    pub fn set_all<X>(&self, documents: Vec<T>, state: &mut DocumentState<T, X>) {
        state.ids = Arc::new(Vec::new());
        state.entities = Arc::new(IndexMap::new());
        self.add_many(documents, state);
    }

    /// Shallow-update existing documents.
    ///
    /// Updates are computed in order against a staging area before anything
    /// is written, so a later update in the batch sees the result of an
    /// earlier one, including a rename: after `X -> Y`, an update to `Y`
    /// applies to the renamed document and an update to `X` is skipped.
    pub fn update_many<X>(&self, updates: Vec<DocumentUpdate<T>>, state: &mut DocumentState<T, X>) {
        let requested = updates.len();
        let mut staged: IndexMap<String, T> = IndexMap::new();
        let mut vacated: HashSet<String> = HashSet::new();

        for update in updates {
            let key = update.id.canonical();
            let mut model = match staged.shift_remove(&key) {
                Some(model) => model,
                None if vacated.contains(&key) => continue,
                None => match state.entities.get(&key) {
                    Some(original) => T::clone(original),
                    None => continue,
                },
            };
            model.apply_changes(&update.changes);

            let new_key = model.key();
            if new_key != key {
                trace!(from = %key, to = %new_key, "rename");
                vacated.insert(key);
            }
            staged.insert(new_key, model);
        }

        trace!(requested, applied = staged.len(), "update_many");
        if staged.is_empty() {
            return;
        }
        if !vacated.is_empty() {
            Arc::make_mut(&mut state.entities).retain(|key, _| !vacated.contains(key));
        }
        self.merge(staged.into_iter().collect(), state);
    }

    pub fn update_one<X>(&self, update: DocumentUpdate<T>, state: &mut DocumentState<T, X>) {
        self.update_many(vec![update], state);
    }

    /// Insert or overwrite each document; same behavior as `set_many`.
    pub fn upsert_many<X>(&self, documents: Vec<T>, state: &mut DocumentState<T, X>) {
        self.set_many(documents, state);
    }

    pub fn upsert_one<X>(&self, document: T, state: &mut DocumentState<T, X>) {
        self.upsert_many(vec![document], state);
    }

    /// Write keyed documents into the map, overwriting, then reindex.
    fn merge<X>(&self, models: Vec<(String, T)>, state: &mut DocumentState<T, X>) {
        if models.is_empty() {
            return;
        }
        let entities = Arc::make_mut(&mut state.entities);
        for (key, model) in models {
            entities.insert(key, Arc::new(model));
        }
        self.update_ids(state);
    }

    /// Rebuild `ids` from `entities`, keeping the old sequence when equal.
    fn update_ids<X>(&self, state: &mut DocumentState<T, X>) {
        let mut documents: Vec<(&String, &Arc<T>)> = state.entities.iter().collect();
        if let Some(compare) = &self.sort_comparer {
            // Stable: ties keep projection order.
            merge_sort_by(&mut documents, |(_, a), (_, b)| compare(a, b));
        }
        let new_ids: Vec<String> = documents.into_iter().map(|(key, _)| key.clone()).collect();

        if are_ids_equal(&state.ids, &new_ids) {
            trace!(len = new_ids.len(), "ids unchanged");
        } else {
            debug!(old = state.ids.len(), new = new_ids.len(), "ids replaced");
            state.ids = Arc::new(new_ids);
        }
    }
}

/// Stable bottom-up merge sort.
///
/// Unlike `slice::sort_by` this never panics when `compare` is not a total
/// order; the result is then only as ordered as the comparer allows.
fn merge_sort_by<E, F>(items: &mut Vec<E>, mut compare: F)
where
    E: Copy,
    F: FnMut(&E, &E) -> Ordering,
{
    let len = items.len();
    let mut merged = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        merged.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut left, mut right) = (start, mid);
            while left < mid && right < end {
                if compare(&items[right], &items[left]) == Ordering::Less {
                    merged.push(items[right]);
                    right += 1;
                } else {
                    merged.push(items[left]);
                    left += 1;
                }
            }
            merged.extend_from_slice(&items[left..mid]);
            merged.extend_from_slice(&items[right..end]);
            start = end;
        }
        std::mem::swap(items, &mut merged);
        width *= 2;
    }
}

fn are_ids_equal(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).all(|(x, y)| x == y)
}
