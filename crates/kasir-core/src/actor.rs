//! Actor identity supplied by the embedding application.
//!
//! Authentication is not this engine's concern: callers hand in an opaque,
//! already-authenticated identity, and the engine only records it on
//! transactions and removal records. Role gating of which operations an
//! actor may call is likewise the caller's responsibility.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identity of the operator performing an action.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    /// Creates an actor identity from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Role of an operator, as asserted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Full access, including catalog management.
    Admin,
    /// Day-to-day sales operation.
    Cashier,
}
