//! Session and per-comparison identifiers shared between server and client.

use std::fmt;
use uuid::Uuid;

/// Identifies one `Session` (a matched server/client pair), carried on every
/// wire message so a transport can multiplex several sessions if needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh, random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner `Uuid`.
    pub fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A per-session, strictly increasing counter distinguishing concurrent
/// comparisons and detecting replayed or reordered messages.
///
/// The client rejects any message whose counter does not strictly increase
/// relative to the last one seen for its session as a protocol violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ComparisonCounter(u64);

impl ComparisonCounter {
    /// The counter value used by the first comparison in a session.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the next counter value.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw counter value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComparisonCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
