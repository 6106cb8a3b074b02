//! Normalized collection state.
//!
//! The canonical storage shape is an ordered list of canonical ids plus a map
//! from canonical id to document. Both halves sit behind `Arc` so a new state
//! can share every part a mutation did not touch with the previous one, and
//! so downstream caches can detect change by pointer identity alone.

use crate::document::{Document, DocumentComparer, DocumentKey};
use crate::error::{DocStateError, Result};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

/// Documents keyed by canonical id, in insertion order.
pub type Entities<T> = IndexMap<String, Arc<T>>;

/// A normalized document collection plus caller-supplied extra state.
///
/// `ids` and the keys of `entities` always hold the same set of canonical
/// ids. Mutate through the adapter operations to keep it that way.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentState<T, X = ()> {
    /// Canonical ids in sort order (or projection order without a comparer).
    pub ids: Arc<Vec<String>>,
    /// Documents keyed by canonical id.
    pub entities: Arc<Entities<T>>,
    /// Extra fields the embedding application stores next to the collection.
    #[serde(flatten)]
    pub extra: X,
}

// Manual impl: cloning only bumps the `Arc`s, `T` itself need not be `Clone`.
impl<T, X: Clone> Clone for DocumentState<T, X> {
    fn clone(&self) -> Self {
        Self {
            ids: Arc::clone(&self.ids),
            entities: Arc::clone(&self.entities),
            extra: self.extra.clone(),
        }
    }
}

impl<T, X: Default> Default for DocumentState<T, X> {
    fn default() -> Self {
        Self::with_extra(X::default())
    }
}

impl<T> DocumentState<T> {
    /// An empty collection without extra state.
    pub fn new() -> Self {
        Self::with_extra(())
    }
}

impl<T, X> DocumentState<T, X> {
    /// An empty collection carrying `extra`.
    ///
    /// `ids` and `entities` always start empty.
    pub fn with_extra(extra: X) -> Self {
        Self {
            ids: Arc::new(Vec::new()),
            entities: Arc::new(IndexMap::new()),
            extra,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn entities(&self) -> &Entities<T> {
        &self.entities
    }

    pub fn extra(&self) -> &X {
        &self.extra
    }

    pub fn extra_mut(&mut self) -> &mut X {
        &mut self.extra
    }

    /// Number of documents.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Look up a document by id.
    pub fn get<K: DocumentKey + ?Sized>(&self, id: &K) -> Option<&Arc<T>> {
        self.entities.get(&id.canonical())
    }

    pub fn contains_key<K: DocumentKey + ?Sized>(&self, id: &K) -> bool {
        self.entities.contains_key(&id.canonical())
    }

    /// Documents in `ids` order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<T>> + '_ {
        self.ids.iter().filter_map(move |id| self.entities.get(id))
    }
}

impl<T: Document, X> DocumentState<T, X> {
    /// Verify the structural invariants of the collection.
    ///
    /// Checks that `ids` has no duplicates, that it names exactly the keys of
    /// `entities`, that every document is stored under its own canonical id,
    /// and, given a comparer, that `ids` is sorted by it.
    pub fn check_invariants(&self, comparer: Option<&DocumentComparer<T>>) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.ids.len());
        for id in self.ids.iter() {
            if !seen.insert(id.as_str()) {
                return Err(DocStateError::InvariantViolation(format!(
                    "duplicate id {id} in ids"
                )));
            }
            if !self.entities.contains_key(id) {
                return Err(DocStateError::InvariantViolation(format!(
                    "id {id} has no entity"
                )));
            }
        }

        if self.ids.len() != self.entities.len() {
            return Err(DocStateError::InvariantViolation(format!(
                "{} ids but {} entities",
                self.ids.len(),
                self.entities.len()
            )));
        }

        for (key, doc) in self.entities.iter() {
            let actual = doc.key();
            if &actual != key {
                return Err(DocStateError::InvariantViolation(format!(
                    "entity stored under {key} has id {actual}"
                )));
            }
        }

        if let Some(compare) = comparer {
            for pair in self.ids.windows(2) {
                let (a, b) = (&self.entities[&pair[0]], &self.entities[&pair[1]]);
                if compare(a, b) == Ordering::Greater {
                    return Err(DocStateError::InvariantViolation(format!(
                        "ids out of order at {} / {}",
                        pair[0], pair[1]
                    )));
                }
            }
        }

        Ok(())
    }
}

impl<T, X> DocumentState<T, X>
where
    T: Document + DeserializeOwned,
    X: DeserializeOwned,
{
    /// Load a snapshot (`{"ids": [...], "entities": {...}, ...extra}`) and
    /// validate it.
    pub fn from_snapshot(value: serde_json::Value) -> Result<Self> {
        let state: Self = serde_json::from_value(value)?;
        state.check_invariants(None)?;
        Ok(state)
    }
}
