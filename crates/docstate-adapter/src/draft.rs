//! Scoped copy-on-write mutation.
//!
//! `produce` hands a recipe a [`Draft`]: a mutable working copy of the base
//! value. Because the collection keeps its parts behind `Arc`, the working
//! copy starts as a handful of refcount bumps; writes go through
//! `Arc::make_mut`, which clones a part only the first time it is touched
//! while still shared with the base. Every part the recipe leaves alone stays
//! pointer-equal to the base's.
//!
//! Whether a value is a draft is carried in its type. Operations take a
//! [`StateTarget`]: a plain `&DocumentState` produces a new state, while a
//! `&mut Draft` is mutated in place and handed back, so operations compose
//! inside a larger mutation.

use docstate_core::DocumentState;
use std::ops::{Deref, DerefMut};

/// A mutable working copy of a value inside a scoped mutation.
#[derive(Debug)]
pub struct Draft<'a, S> {
    current: &'a mut S,
}

impl<'a, S> Draft<'a, S> {
    pub(crate) fn new(current: &'a mut S) -> Self {
        Self { current }
    }

    /// Narrow the draft to a part of the value, e.g. the collection embedded
    /// in a larger application state.
    pub fn project<U>(&mut self, part: impl FnOnce(&mut S) -> &mut U) -> Draft<'_, U> {
        Draft::new(part(self.current))
    }
}

impl<S> Deref for Draft<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.current
    }
}

impl<S> DerefMut for Draft<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.current
    }
}

/// Run `recipe` against a working copy of `base` and return the result.
///
/// `base` itself is never modified.
pub fn produce<S, F>(base: &S, recipe: F) -> S
where
    S: Clone,
    F: FnOnce(&mut Draft<'_, S>),
{
    let mut working = base.clone();
    recipe(&mut Draft::new(&mut working));
    working
}

/// Something a collection operation can be applied to.
pub trait StateTarget<T> {
    /// Extra state stored next to the collection.
    type Extra;
    /// What the operation returns.
    type Output;

    /// Apply `mutator` to the collection.
    fn apply<F>(self, mutator: F) -> Self::Output
    where
        F: FnOnce(&mut DocumentState<T, Self::Extra>);
}

/// A finished state: the operation produces its successor.
impl<'s, T, X: Clone> StateTarget<T> for &'s DocumentState<T, X> {
    type Extra = X;
    type Output = DocumentState<T, X>;

    fn apply<F>(self, mutator: F) -> DocumentState<T, X>
    where
        F: FnOnce(&mut DocumentState<T, X>),
    {
        produce(self, |draft| mutator(draft))
    }
}

/// A draft: already inside a mutation, so mutate it directly and return it.
impl<'d, 'a, T, X> StateTarget<T> for &'d mut Draft<'a, DocumentState<T, X>> {
    type Extra = X;
    type Output = &'d mut Draft<'a, DocumentState<T, X>>;

    fn apply<F>(self, mutator: F) -> Self::Output
    where
        F: FnOnce(&mut DocumentState<T, X>),
    {
        mutator(self.current);
        self
    }
}
