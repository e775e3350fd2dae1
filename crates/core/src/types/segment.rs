//! Customer segment (membership group) type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A membership group such as `"Club Gold"` or `"VIP"`.
///
/// The segment selects the discount policy applied to a shopper's order.
/// An empty segment means the shopper has not been classified yet. Keys are
/// case-sensitive and compared exactly as stored in the profile store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment(String);

impl Segment {
    /// Create a segment from a key. Surrounding whitespace is not significant.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        let key: String = key.into();
        Self(key.trim().to_owned())
    }

    /// The unresolved segment.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self(String::new())
    }

    /// Whether the segment has not been resolved yet.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the segment key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}
