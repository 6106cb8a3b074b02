//! # docstate-core
//!
//! Data model for a normalized, in-memory document collection meant to live
//! inside a larger immutable application state.
//!
//! This crate provides:
//! - Document identity via canonical id encodings (`DocumentKey`, `DocumentId`)
//! - The `Document` trait and shallow `DocumentUpdate`s
//! - A schemaless `JsonDocument`
//! - Payload action envelopes accepted by every collection operation
//! - The canonical `{ids, entities}` collection state
//!
//! ## Example
//!
//! ```rust
//! use docstate_core::{Document, DocumentState, JsonDocument};
//!
//! let state: DocumentState<JsonDocument> = DocumentState::new();
//! assert!(state.is_empty());
//!
//! let doc = JsonDocument::with_id("1").with("title", "Hello");
//! assert_eq!(doc.key(), "1");
//! ```

pub mod document;
pub mod error;
pub mod json;
pub mod payload;
pub mod state;

pub use document::{Document, DocumentComparer, DocumentId, DocumentKey, DocumentUpdate};
pub use error::{DocStateError, Result};
pub use json::JsonDocument;
pub use payload::{Payload, PayloadAction};
pub use state::{DocumentState, Entities};
