//! Memoized read selectors over the collection.
//!
//! Selectors take the state they were built for: the `DocumentState` itself,
//! or any larger root state paired with a projection down to the embedded
//! collection. Derived values are recomputed only when the `Arc`s they
//! depend on change identity.

use crate::memo::{create_selector, MemoizedSelector};
use docstate_core::{DocumentKey, DocumentState, Entities};
use std::sync::Arc;

type Ids = Arc<Vec<String>>;
type Projection<S, O> = Box<dyn Fn(&S) -> O + Send + Sync>;

/// Selectors for a collection reachable from state `S`.
pub struct DocumentSelectors<T, S> {
    ids: Projection<S, Ids>,
    entities: Projection<S, Arc<Entities<T>>>,
    all: MemoizedSelector<S, (), (Ids, Arc<Entities<T>>), Arc<Vec<Arc<T>>>>,
    total: MemoizedSelector<S, (), Ids, usize>,
    by_id: MemoizedSelector<S, String, (Arc<Entities<T>>, String), Option<Arc<T>>>,
}

impl<T, S> DocumentSelectors<T, S>
where
    T: Send + Sync + 'static,
    S: 'static,
{
    /// Build selectors for the collection that `select_state` finds in `S`.
    pub fn new<X, F>(select_state: F) -> Self
    where
        X: 'static,
        F: for<'a> Fn(&'a S) -> &'a DocumentState<T, X> + Send + Sync + 'static,
    {
        let select_state = Arc::new(select_state);

        let ids = {
            let select_state = Arc::clone(&select_state);
            move |root: &S| Arc::clone(&select_state(root).ids)
        };
        let entities = {
            let select_state = Arc::clone(&select_state);
            move |root: &S| Arc::clone(&select_state(root).entities)
        };

        let all = create_selector(
            {
                let (ids, entities) = (ids.clone(), entities.clone());
                move |root: &S, _: &()| (ids(root), entities(root))
            },
            |(ids, entities): &(Ids, Arc<Entities<T>>)| {
                Arc::new(
                    ids.iter()
                        .filter_map(|id| entities.get(id).cloned())
                        .collect::<Vec<_>>(),
                )
            },
        );

        let total = create_selector(
            {
                let ids = ids.clone();
                move |root: &S, _: &()| ids(root)
            },
            |ids: &Ids| ids.len(),
        );

        let by_id = create_selector(
            {
                let entities = entities.clone();
                move |root: &S, id: &String| (entities(root), id.clone())
            },
            |(entities, id): &(Arc<Entities<T>>, String)| entities.get(id).cloned(),
        );

        Self {
            ids: Box::new(ids),
            entities: Box::new(entities),
            all,
            total,
            by_id,
        }
    }

    /// The `ids` sequence, as stored.
    pub fn select_ids(&self, state: &S) -> Ids {
        (self.ids)(state)
    }

    /// The `entities` map, as stored.
    pub fn select_entities(&self, state: &S) -> Arc<Entities<T>> {
        (self.entities)(state)
    }

    /// Documents in `ids` order. Identical `Arc` while neither `ids` nor
    /// `entities` changed.
    pub fn select_all(&self, state: &S) -> Arc<Vec<Arc<T>>> {
        self.all.select(state, &())
    }

    /// Number of documents.
    pub fn select_total(&self, state: &S) -> usize {
        self.total.select(state, &())
    }

    /// The document with the given id, if any.
    pub fn select_by_id<K: DocumentKey + ?Sized>(&self, state: &S, id: &K) -> Option<Arc<T>> {
        self.by_id.select(state, &id.canonical())
    }

    /// How many times `select_all` has rebuilt its array.
    pub fn all_recomputations(&self) -> u64 {
        self.all.recomputations()
    }

    pub fn total_recomputations(&self) -> u64 {
        self.total.recomputations()
    }
}

impl<T, X> DocumentSelectors<T, DocumentState<T, X>>
where
    T: Send + Sync + 'static,
    X: 'static,
{
    /// Selectors that take the collection state directly.
    pub fn for_state() -> Self {
        Self::new(whole_state::<T, X>)
    }
}

fn whole_state<T, X>(state: &DocumentState<T, X>) -> &DocumentState<T, X> {
    state
}
