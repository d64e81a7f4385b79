//! Strongly-typed identifiers for ReactorSync entities
//!
//! Reactor ids originate in the relational registry as integer primary keys,
//! so the newtype wraps an `i64` rather than a UUID.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a reactor in the fleet registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactorId(i64);

impl ReactorId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ReactorId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ReactorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reactor:{}", self.0)
    }
}
