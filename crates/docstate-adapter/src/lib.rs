//! # docstate-adapter
//!
//! Copy-on-write mutation engine and memoized selectors for the
//! `docstate-core` document collection.
//!
//! An adapter is created once per document type and hands out:
//! - an empty state factory (`get_initial_state`)
//! - twelve collection operations (add, set, upsert, update, remove, ...)
//!   that accept either a finished state or a draft inside a larger mutation
//! - memoized selectors (`select_ids`, `select_entities`, `select_all`,
//!   `select_total`, `select_by_id`)
//!
//! ## Example
//!
//! ```rust
//! use docstate_adapter::{create_document_adapter, DocumentDefinition, JsonDocument};
//! use std::sync::Arc;
//!
//! let adapter = create_document_adapter(
//!     DocumentDefinition::<JsonDocument>::new()
//!         .sort_by_key(|doc| doc.get("v").and_then(|v| v.as_i64())),
//! );
//! let empty = adapter.get_initial_state(());
//!
//! let state = adapter.add_many(
//!     &empty,
//!     vec![
//!         JsonDocument::with_id("1").with("v", 3),
//!         JsonDocument::with_id("2").with("v", 1),
//!     ],
//! );
//! assert_eq!(state.ids(), ["2", "1"]);
//!
//! let selectors = adapter.get_selectors::<()>();
//! let all = selectors.select_all(&state);
//! assert!(Arc::ptr_eq(&all, &selectors.select_all(&state)));
//! assert_eq!(selectors.select_total(&state), 2);
//! ```

pub mod adapter;
pub mod draft;
pub mod memo;
pub mod mutators;
pub mod selectors;

pub use adapter::{create_document_adapter, DocumentAdapter, DocumentDefinition};
pub use draft::{produce, Draft, StateTarget};
pub use memo::{create_selector, Identity, Memo, MemoizedSelector};
pub use mutators::StateMutators;
pub use selectors::DocumentSelectors;

pub use docstate_core::{
    DocStateError, Document, DocumentComparer, DocumentId, DocumentKey, DocumentState,
    DocumentUpdate, Entities, JsonDocument, Payload, PayloadAction, Result,
};
