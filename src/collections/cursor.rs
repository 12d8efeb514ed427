//! Checked positions into a map.
//!
//! A [`Cursor`] is a plain `Copy` value naming one entry of one map (or that
//! map's end position). It does not borrow the map: every operation that
//! takes a cursor validates it against the map first, so a cursor that
//! outlived a structural change of its map is reported as
//! [`CursorFault::Stale`] instead of silently reading the wrong entry.
//!
//! Validation uses two stamps carried by the cursor:
//!
//! - the identity of the map that produced it ([`CursorFault::ForeignMap`]
//!   otherwise), and
//! - the map's structural version at that time. The version is bumped on
//!   every insertion of a new key, every removal and every `clear`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::arena::NodeHandle;
use crate::error::{CursorFault, MapError, Result};

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one map instance.
///
/// Every constructed map, every clone and every `Default` value gets a new
/// identity. Moving a map keeps its identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapId(u64);

impl MapId {
    fn fresh() -> Self {
        Self(NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for MapId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "map#{}", self.0)
    }
}

/// A checked position inside a map.
///
/// Obtain cursors with `begin`, `end` and `find`, move them with `advance`
/// and `retreat`, and read or remove through them with `entry_at`,
/// `value_at_mut` and `remove_at`.
///
/// Two cursors are equal when they come from the same map, at the same
/// structural version, and point at the same position.
///
/// # Examples
///
/// ```rust
/// use twinmap::collections::OrderedMap;
///
/// let mut map = OrderedMap::from([(2, "two"), (1, "one")]);
/// let cursor = map.begin();
/// assert_eq!(map.entry_at(cursor), Ok((&1, &"one")));
///
/// let cursor = map.advance(cursor).unwrap();
/// assert_eq!(map.entry_at(cursor), Ok((&2, &"two")));
/// assert_eq!(map.advance(cursor), Ok(map.end()));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    owner: MapId,
    version: u64,
    position: Option<NodeHandle>,
}

impl Cursor {
    /// Returns `true` if this is the end position of its map.
    #[inline]
    #[must_use]
    pub const fn is_end(&self) -> bool {
        self.position.is_none()
    }

    /// Identity of the map that produced this cursor.
    #[inline]
    #[must_use]
    pub const fn owner(&self) -> MapId {
        self.owner
    }
}

impl fmt::Debug for Cursor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = formatter.debug_struct("Cursor");
        debug.field("owner", &self.owner).field("version", &self.version);
        match self.position {
            Some(handle) => debug.field("position", &handle),
            None => debug.field("position", &"end"),
        };
        debug.finish()
    }
}

// =============================================================================
// Cursor Stamp
// =============================================================================

/// The identity and structural version a map stamps onto its cursors.
#[derive(Debug)]
pub(crate) struct CursorStamp {
    owner: MapId,
    version: u64,
}

impl CursorStamp {
    pub(crate) fn fresh() -> Self {
        Self {
            owner: MapId::fresh(),
            version: 0,
        }
    }

    /// Invalidates every cursor issued so far.
    #[inline]
    pub(crate) const fn bump(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    #[inline]
    pub(crate) const fn cursor(&self, position: Option<NodeHandle>) -> Cursor {
        Cursor {
            owner: self.owner,
            version: self.version,
            position,
        }
    }

    /// Checks that `cursor` was issued by this map at its current version.
    ///
    /// Returns the cursor's position, `None` meaning the end position.
    pub(crate) fn check(&self, cursor: Cursor) -> Result<Option<NodeHandle>> {
        if cursor.owner != self.owner {
            Err(self.reject(cursor, CursorFault::ForeignMap))
        } else if cursor.version != self.version {
            Err(self.reject(cursor, CursorFault::Stale))
        } else {
            Ok(cursor.position)
        }
    }

    /// Like [`check`](Self::check), but the end position is rejected too.
    pub(crate) fn check_entry(&self, cursor: Cursor) -> Result<NodeHandle> {
        self.check(cursor)?
            .ok_or_else(|| self.reject(cursor, CursorFault::End))
    }

    /// Validates a cursor passed to `remove_at`.
    ///
    /// The end cursor of an empty map (which is also its `begin()`) reports
    /// [`MapError::EmptyMap`]; the end cursor of a non-empty map reports
    /// [`CursorFault::End`].
    pub(crate) fn check_removal(&self, cursor: Cursor, map_is_empty: bool) -> Result<NodeHandle> {
        match self.check(cursor)? {
            Some(handle) => Ok(handle),
            None if map_is_empty => {
                tracing::debug!(?cursor, map = ?self.owner, "rejected removal from an empty map");
                Err(MapError::EmptyMap)
            }
            None => Err(self.reject(cursor, CursorFault::End)),
        }
    }

    /// Logs a rejected cursor and builds the matching error.
    pub(crate) fn reject(&self, cursor: Cursor, fault: CursorFault) -> MapError {
        tracing::debug!(?cursor, map = ?self.owner, current_version = self.version, %fault, "rejected cursor");
        MapError::InvalidCursor(fault)
    }
}
