//! Mutable maps with checked cursors.
//!
//! - [`BucketMap`]: hash map with a fixed number of chained buckets
//! - [`OrderedMap`]: ordered map backed by an unbalanced binary search tree
//!
//! Both implement [`Mapping`](crate::mapping::Mapping) and hand out
//! [`Cursor`] values for positional access. Iterator types live in the
//! per-map submodules, as in `std::collections`.
//!
//! # Examples
//!
//! ## `BucketMap`
//!
//! ```rust
//! use twinmap::collections::BucketMap;
//!
//! let mut map = BucketMap::new();
//! map.insert("apple", 3);
//! *map.get_or_insert("pear") += 2;
//!
//! assert_eq!(map.value_of("apple"), Ok(&3));
//! assert_eq!(map.value_of("pear"), Ok(&2));
//! assert_eq!(map.bucket_count(), 20);
//! ```
//!
//! ## `OrderedMap`
//!
//! ```rust
//! use twinmap::collections::OrderedMap;
//!
//! let map = OrderedMap::from([(3, "three"), (1, "one"), (2, "two")]);
//!
//! // Entries are always in sorted order
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! // Walking backwards from the end visits the greatest key first
//! let last = map.retreat(map.end()).unwrap();
//! assert_eq!(map.entry_at(last), Ok((&3, &"three")));
//! ```

pub(crate) mod arena;
mod cursor;

#[cfg(feature = "bucket-map")]
pub mod bucket_map;
#[cfg(feature = "ordered-map")]
pub mod ordered_map;

#[cfg(feature = "bucket-map")]
pub use bucket_map::BucketMap;
pub use cursor::Cursor;
pub use cursor::MapId;
#[cfg(feature = "ordered-map")]
pub use ordered_map::OrderedMap;
