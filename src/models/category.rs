//! Category addressing.

use std::fmt;

/// A category code together with the form the feed addresses it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryQuery {
    /// Human category code, e.g. `cs.AI`
    pub code: String,
    /// Feed-specific selector, e.g. `cs:cs:AI`
    pub set: String,
}

impl fmt::Display for CategoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.set)
    }
}
