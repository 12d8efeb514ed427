//! Error types shared by both map implementations.
//!
//! Every fallible operation on [`BucketMap`](crate::collections::BucketMap)
//! and [`OrderedMap`](crate::collections::OrderedMap) reports one of the
//! [`MapError`] variants. Errors are contract violations or caller-input
//! errors, never transient faults: they are returned immediately and the
//! map is left exactly as it was before the call.
//!
//! # Examples
//!
//! ```rust
//! use twinmap::collections::OrderedMap;
//! use twinmap::error::MapError;
//!
//! let mut map: OrderedMap<i32, String> = OrderedMap::new();
//! assert_eq!(map.value_of(&7), Err(MapError::NotFound));
//! assert_eq!(map.remove_at(map.begin()), Err(MapError::EmptyMap));
//! ```

use std::error::Error;
use std::fmt;

// =============================================================================
// Cursor Faults
// =============================================================================

/// Why a cursor was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorFault {
    /// The cursor is the end sentinel, or advancing would move past it.
    End,

    /// Retreating would move before the first entry.
    BeforeBegin,

    /// The map was structurally modified after the cursor was produced.
    ///
    /// Inserting a new key, removing an entry and clearing all count as
    /// structural modifications. Assigning through an existing entry does not.
    Stale,

    /// The cursor was produced by a different map.
    ForeignMap,
}

impl fmt::Display for CursorFault {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::End => write!(formatter, "cursor is at the end position"),
            Self::BeforeBegin => write!(formatter, "cursor cannot move before the first entry"),
            Self::Stale => write!(
                formatter,
                "cursor was invalidated by a structural modification of its map"
            ),
            Self::ForeignMap => write!(formatter, "cursor belongs to a different map"),
        }
    }
}

// =============================================================================
// MapError
// =============================================================================

/// Errors reported by map operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapError {
    /// The requested key is not present in the map.
    NotFound,

    /// A cursor could not be used for the requested operation.
    InvalidCursor(CursorFault),

    /// The operation needs at least one entry but the map is empty.
    EmptyMap,
}

impl MapError {
    /// Returns the cursor fault if this is an [`MapError::InvalidCursor`].
    #[must_use]
    pub const fn cursor_fault(&self) -> Option<CursorFault> {
        match self {
            Self::InvalidCursor(fault) => Some(*fault),
            _ => None,
        }
    }
}

impl fmt::Display for MapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(formatter, "key not found"),
            Self::InvalidCursor(fault) => write!(formatter, "invalid cursor: {fault}"),
            Self::EmptyMap => write!(formatter, "operation requires a non-empty map"),
        }
    }
}

impl Error for MapError {}

impl From<CursorFault> for MapError {
    fn from(fault: CursorFault) -> Self {
        Self::InvalidCursor(fault)
    }
}

/// Result type used by map operations.
pub type Result<T> = std::result::Result<T, MapError>;

static_assertions::assert_impl_all!(MapError: Error, Send, Sync, Copy);
