//! The document adapter: the public surface handed to embedding code.
//!
//! An adapter bundles the state factory, every collection operation and the
//! selector factory for one document type and sort order.

use crate::draft::StateTarget;
use crate::mutators::StateMutators;
use crate::selectors::DocumentSelectors;
use docstate_core::{Document, DocumentComparer, DocumentState, DocumentUpdate, Payload};
use std::cmp::Ordering;
use std::sync::Arc;

/// How a collection is configured.
pub struct DocumentDefinition<T> {
    /// Keeps `ids` sorted when set; otherwise `ids` follows insertion order.
    pub sort_comparer: Option<DocumentComparer<T>>,
}

impl<T> DocumentDefinition<T> {
    pub fn new() -> Self {
        Self {
            sort_comparer: None,
        }
    }

    /// Sort with a comparison function.
    pub fn sort_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.sort_comparer = Some(Arc::new(compare));
        self
    }

    /// Sort by a key extracted from each document.
    pub fn sort_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + Send + Sync + 'static,
    {
        self.sort_by(move |a, b| key(a).cmp(&key(b)))
    }
}

impl<T> Default for DocumentDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Create an adapter for documents of type `T`.
pub fn create_document_adapter<T: Document>(
    definition: DocumentDefinition<T>,
) -> DocumentAdapter<T> {
    DocumentAdapter {
        mutators: StateMutators::new(definition.sort_comparer),
    }
}

/// State factory, operations and selectors for one kind of document.
///
/// Every operation takes either a state (and returns its successor, sharing
/// every part the operation did not touch) or a draft (mutated in place and
/// returned, for composing inside a larger mutation). Payloads may be bare or
/// wrapped in a `PayloadAction`.
pub struct DocumentAdapter<T: Document> {
    mutators: StateMutators<T>,
}

impl<T: Document> Clone for DocumentAdapter<T> {
    fn clone(&self) -> Self {
        Self {
            mutators: self.mutators.clone(),
        }
    }
}

impl<T: Document> DocumentAdapter<T> {
    /// The configured sort order, if any.
    pub fn sort_comparer(&self) -> Option<&DocumentComparer<T>> {
        self.mutators.sort_comparer()
    }

    /// An empty collection carrying `extra`.
    pub fn get_initial_state<X>(&self, extra: X) -> DocumentState<T, X> {
        DocumentState::with_extra(extra)
    }

    pub fn add_many<S: StateTarget<T>>(
        &self,
        state: S,
        documents: impl Into<Payload<Vec<T>>>,
    ) -> S::Output {
        let documents = documents.into().into_inner();
        state.apply(|draft| self.mutators.add_many(documents, draft))
    }

    pub fn add_one<S: StateTarget<T>>(
        &self,
        state: S,
        document: impl Into<Payload<T>>,
    ) -> S::Output {
        let document = document.into().into_inner();
        state.apply(|draft| self.mutators.add_one(document, draft))
    }

    pub fn remove_all<S: StateTarget<T>>(&self, state: S) -> S::Output {
        state.apply(|draft| self.mutators.remove_all(draft))
    }

    pub fn remove_many<S: StateTarget<T>>(
        &self,
        state: S,
        ids: impl Into<Payload<Vec<T::Id>>>,
    ) -> S::Output {
        let ids = ids.into().into_inner();
        state.apply(|draft| self.mutators.remove_many(ids, draft))
    }

    pub fn remove_one<S: StateTarget<T>>(
        &self,
        state: S,
        id: impl Into<Payload<T::Id>>,
    ) -> S::Output {
        let id = id.into().into_inner();
        state.apply(|draft| self.mutators.remove_one(id, draft))
    }

    pub fn set_all<S: StateTarget<T>>(
        &self,
        state: S,
        documents: impl Into<Payload<Vec<T>>>,
    ) -> S::Output {
        let documents = documents.into().into_inner();
        state.apply(|draft| self.mutators.set_all(documents, draft))
    }

    pub fn set_many<S: StateTarget<T>>(
        &self,
        state: S,
        documents: impl Into<Payload<Vec<T>>>,
    ) -> S::Output {
        let documents = documents.into().into_inner();
        state.apply(|draft| self.mutators.set_many(documents, draft))
    }

    pub fn set_one<S: StateTarget<T>>(
        &self,
        state: S,
        document: impl Into<Payload<T>>,
    ) -> S::Output {
        let document = document.into().into_inner();
        state.apply(|draft| self.mutators.set_one(document, draft))
    }

    pub fn update_many<S: StateTarget<T>>(
        &self,
        state: S,
        updates: impl Into<Payload<Vec<DocumentUpdate<T>>>>,
    ) -> S::Output {
        let updates = updates.into().into_inner();
        state.apply(|draft| self.mutators.update_many(updates, draft))
    }

    pub fn update_one<S: StateTarget<T>>(
        &self,
        state: S,
        update: impl Into<Payload<DocumentUpdate<T>>>,
    ) -> S::Output {
        let update = update.into().into_inner();
        state.apply(|draft| self.mutators.update_one(update, draft))
    }

    pub fn upsert_many<S: StateTarget<T>>(
        &self,
        state: S,
        documents: impl Into<Payload<Vec<T>>>,
    ) -> S::Output {
        let documents = documents.into().into_inner();
        state.apply(|draft| self.mutators.upsert_many(documents, draft))
    }

    pub fn upsert_one<S: StateTarget<T>>(
        &self,
        state: S,
        document: impl Into<Payload<T>>,
    ) -> S::Output {
        let document = document.into().into_inner();
        state.apply(|draft| self.mutators.upsert_one(document, draft))
    }
}

impl<T: Document + Send + Sync + 'static> DocumentAdapter<T> {
    /// Fresh memoized selectors over a `DocumentState<T, X>`.
    pub fn get_selectors<X: 'static>(&self) -> DocumentSelectors<T, DocumentState<T, X>> {
        DocumentSelectors::for_state()
    }

    /// Fresh memoized selectors over a root state `R` that embeds the
    /// collection.
    pub fn get_selectors_for<R, X, F>(&self, select_state: F) -> DocumentSelectors<T, R>
    where
        R: 'static,
        X: 'static,
        F: for<'a> Fn(&'a R) -> &'a DocumentState<T, X> + Send + Sync + 'static,
    {
        DocumentSelectors::new(select_state)
    }
}
