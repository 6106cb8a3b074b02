//! Single-slot memoization keyed on input identity.
//!
//! A [`Memo`] remembers the most recent key and result. Keys are compared
//! with [`Identity`]: shared values (`Arc`) by pointer, plain values by
//! equality. The cache holds a clone of the key, so a pointer it remembers
//! cannot be freed and reused while cached, and an `Arc` it remembers is
//! never uniquely owned, so `Arc::make_mut` on a draft always copies it
//! instead of changing it under the cache.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Identity comparison used for memo keys.
pub trait Identity {
    fn is_identical(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn is_identical(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

macro_rules! identity_by_value {
    ($($ty:ty),*) => {
        $(
            impl Identity for $ty {
                fn is_identical(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!((), bool, usize, u64, i64, String);

impl<A: Identity> Identity for (A,) {
    fn is_identical(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
    }
}

impl<A: Identity, B: Identity> Identity for (A, B) {
    fn is_identical(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0) && self.1.is_identical(&other.1)
    }
}

impl<A: Identity, B: Identity, C: Identity> Identity for (A, B, C) {
    fn is_identical(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
            && self.1.is_identical(&other.1)
            && self.2.is_identical(&other.2)
    }
}

impl<A: Identity, B: Identity, C: Identity, D: Identity> Identity for (A, B, C, D) {
    fn is_identical(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
            && self.1.is_identical(&other.1)
            && self.2.is_identical(&other.2)
            && self.3.is_identical(&other.3)
    }
}

/// Cache of the last `(key, value)` pair.
pub struct Memo<K, V> {
    slot: Mutex<Option<(K, V)>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K: Identity, V: Clone> Memo<K, V> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value if `key` is identical to the cached key,
    /// otherwise compute, cache and return a new one.
    pub fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce(&K) -> V,
    {
        let mut slot = self.slot.lock();
        if let Some((cached, value)) = slot.as_ref() {
            if cached.is_identical(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("memo hit");
                return value.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!("memo miss");
        let value = compute(&key);
        *slot = Some((key, value.clone()));
        value
    }

    /// Forget the cached pair.
    pub fn clear(&self) {
        *self.slot.lock() = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<K: Identity, V: Clone> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

type InputFn<S, A, I> = Box<dyn Fn(&S, &A) -> I + Send + Sync>;
type CombinerFn<I, O> = Box<dyn Fn(&I) -> O + Send + Sync>;

/// A selector built from input selectors and a combiner.
///
/// The input function extracts a tuple of identity-comparable values from
/// the state (and an optional argument); the combiner only runs when that
/// tuple differs from the previous call's.
pub struct MemoizedSelector<S, A, I, O> {
    input: InputFn<S, A, I>,
    combiner: CombinerFn<I, O>,
    memo: Memo<I, O>,
}

impl<S, A, I: Identity, O: Clone> MemoizedSelector<S, A, I, O> {
    pub fn select(&self, state: &S, arg: &A) -> O {
        let inputs = (self.input)(state, arg);
        self.memo.get_or_compute(inputs, |inputs| (self.combiner)(inputs))
    }

    /// Number of times the combiner has run.
    pub fn recomputations(&self) -> u64 {
        self.memo.misses()
    }

    pub fn reset(&self) {
        self.memo.clear();
    }
}

/// Build a memoized selector from an input function and a combiner.
pub fn create_selector<S, A, I, O, In, Comb>(
    input: In,
    combiner: Comb,
) -> MemoizedSelector<S, A, I, O>
where
    I: Identity,
    O: Clone,
    In: Fn(&S, &A) -> I + Send + Sync + 'static,
    Comb: Fn(&I) -> O + Send + Sync + 'static,
{
    MemoizedSelector {
        input: Box::new(input),
        combiner: Box::new(combiner),
        memo: Memo::new(),
    }
}
