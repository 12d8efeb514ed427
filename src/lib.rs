//! # twinmap
//!
//! Two mutable associative containers with one shared contract.
//!
//! ## Overview
//!
//! - **`BucketMap`**: hash map with a fixed number of chained buckets (20 by
//!   default), iterated bucket by bucket
//! - **`OrderedMap`**: unbalanced binary search tree, iterated in ascending
//!   key order
//! - **`Mapping`**: the trait both implement, so client code can be written
//!   once
//! - **`Cursor`**: checked bidirectional positions that report misuse
//!   (end, stale, foreign) as errors instead of reading the wrong entry
//!
//! ## Feature Flags
//!
//! - `bucket-map`: `BucketMap`
//! - `ordered-map`: `OrderedMap`
//! - `fxhash`: use `rustc-hash` as the default `BucketMap` hasher
//! - `ahash`: use `ahash` as the default `BucketMap` hasher
//! - `full`: enable both maps
//!
//! ## Logging
//!
//! Structural changes emit `tracing` events at `TRACE` level and rejected
//! cursors at `DEBUG` level. Nothing is printed unless the application
//! installs a subscriber.
//!
//! ## Example
//!
//! ```rust
//! use twinmap::prelude::*;
//!
//! let mut ordered: OrderedMap<i32, u32> = OrderedMap::new();
//! let mut bucket: BucketMap<i32, u32> = BucketMap::new();
//! for key in [5, 3, 8, 1, 4] {
//!     *ordered.get_or_insert(key) += 1;
//!     *bucket.get_or_insert(key) += 1;
//! }
//!
//! assert_eq!(ordered.len(), bucket.len());
//! assert_eq!(ordered.remove(&3), Ok(1));
//! assert_eq!(ordered.remove(&3), Err(MapError::NotFound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the containers, the `Mapping` trait and the error types.
///
/// # Usage
///
/// ```rust
/// use twinmap::prelude::*;
/// ```
pub mod prelude {
    #[cfg(feature = "bucket-map")]
    pub use crate::collections::BucketMap;
    #[cfg(feature = "ordered-map")]
    pub use crate::collections::OrderedMap;

    pub use crate::collections::Cursor;
    pub use crate::error::{CursorFault, MapError};
    pub use crate::mapping::Mapping;
}

pub mod collections;
pub mod error;
pub mod hash;
pub mod mapping;
