//! Documents and their identity.
//!
//! A document is any record with exactly one identity attribute. Identity is
//! decided by the canonical string encoding of that attribute only: two
//! documents whose ids encode to the same string are the same entity.

use crate::error::DocStateError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use ulid::Ulid;

/// An opaque identifier with a canonical string encoding.
///
/// Map keys and `ids` entries are always the canonical string, never the id
/// value itself, so structurally equal ids collapse to one key.
pub trait DocumentKey {
    /// The canonical string encoding of this id.
    fn canonical(&self) -> String;
}

impl DocumentKey for str {
    fn canonical(&self) -> String {
        self.to_owned()
    }
}

impl DocumentKey for String {
    fn canonical(&self) -> String {
        self.clone()
    }
}

impl DocumentKey for u64 {
    fn canonical(&self) -> String {
        self.to_string()
    }
}

impl DocumentKey for i64 {
    fn canonical(&self) -> String {
        self.to_string()
    }
}

impl DocumentKey for Ulid {
    fn canonical(&self) -> String {
        self.to_string()
    }
}

impl<K: DocumentKey + ?Sized> DocumentKey for &K {
    fn canonical(&self) -> String {
        (**self).canonical()
    }
}

/// Globally unique document identifier backed by a ULID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(Ulid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DocStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(Self)
            .map_err(|e| DocStateError::InvalidId(format!("{s}: {e}")))
    }
}

impl DocumentKey for DocumentId {
    fn canonical(&self) -> String {
        self.0.to_string()
    }
}

// Serialized as the canonical string so snapshots stay readable.
impl Serialize for DocumentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.canonical())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A record with a unique id that can be stored in a collection.
pub trait Document: Clone {
    /// The identity attribute.
    type Id: DocumentKey + Clone + fmt::Debug;

    /// Partial field changes, applied as a shallow merge.
    type Changes: Clone + fmt::Debug;

    /// The identity attribute of this document.
    fn id(&self) -> &Self::Id;

    /// Shallow-merge `changes` into this document.
    ///
    /// The id itself may be among the changes, in which case the caller
    /// treats the result as a rename.
    fn apply_changes(&mut self, changes: &Self::Changes);

    /// Canonical key of this document.
    fn key(&self) -> String {
        self.id().canonical()
    }
}

/// A shallow update targeting one existing document.
#[derive(Clone, Debug)]
pub struct DocumentUpdate<T: Document> {
    /// Id of the document to update.
    pub id: T::Id,
    /// Changes to merge into it.
    pub changes: T::Changes,
}

impl<T: Document> DocumentUpdate<T> {
    pub fn new(id: T::Id, changes: T::Changes) -> Self {
        Self { id, changes }
    }
}

/// Ordering used to keep `ids` sorted.
pub type DocumentComparer<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;
