//! Fact identifiers.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a fact inside a factbase.
///
/// The factbase is append-only, so an id is simply the position at which
/// the fact was inserted. Ids are dense and start at zero.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FactId(pub u64);

impl FactId {
    /// Creates a fact ID from its position.
    #[must_use]
    pub const fn new(index: u64) -> Self {
        Self(index)
    }

    /// Returns a sentinel value representing "not inserted yet".
    ///
    /// Drafts built before insertion carry this id. `u64::MAX` is never
    /// allocated.
    #[must_use]
    pub const fn null() -> Self {
        Self(u64::MAX)
    }

    /// Returns true if this is the null sentinel value.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Returns the position of the fact in the factbase.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0
    }

    /// Returns the id as the integer stored in `cause` fields.
    ///
    /// Ids above `i64::MAX` cannot occur in practice (they would need that
    /// many facts), so the conversion saturates.
    #[must_use]
    pub fn as_i64(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "FactId(null)")
        } else {
            write!(f, "FactId({})", self.0)
        }
    }
}

impl fmt::Display for FactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#draft")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}
