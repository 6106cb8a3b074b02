//! Payload actions.
//!
//! Every collection operation accepts either the bare payload or a tagged
//! action envelope carrying it. Both are normalized with
//! [`Payload::into_inner`] before the collection is touched.

use serde::{Deserialize, Serialize};

/// A tagged action envelope `{ "type": ..., "payload": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadAction<P> {
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: P,
}

impl<P> PayloadAction<P> {
    pub fn new(kind: impl Into<String>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }
}

/// Either a bare payload or an action carrying one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload<P> {
    /// Wrapped in an action envelope.
    Action(PayloadAction<P>),
    /// Passed directly.
    Bare(P),
}

impl<P> Payload<P> {
    /// Unwrap to the bare payload.
    pub fn into_inner(self) -> P {
        match self {
            Payload::Bare(payload) => payload,
            Payload::Action(action) => action.payload,
        }
    }

    /// The action type, if this payload came in an envelope.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Payload::Bare(_) => None,
            Payload::Action(action) => Some(&action.kind),
        }
    }
}

impl<P> From<P> for Payload<P> {
    fn from(payload: P) -> Self {
        Payload::Bare(payload)
    }
}

impl<P> From<PayloadAction<P>> for Payload<P> {
    fn from(action: PayloadAction<P>) -> Self {
        Payload::Action(action)
    }
}
