//! Hashing configuration for [`BucketMap`](crate::collections::BucketMap).
//!
//! The hash builder used by default is chosen at compile time through Cargo
//! features:
//!
//! | Feature   | `DefaultHashBuilder`                         |
//! |-----------|----------------------------------------------|
//! | (none)    | `BuildHasherDefault<DefaultHasher>`          |
//! | `fxhash`  | `rustc_hash::FxBuildHasher`                  |
//! | `ahash`   | `ahash::RandomState`                         |
//!
//! When both `fxhash` and `ahash` are enabled, `fxhash` wins.
//!
//! The default builder is deterministic: two maps built from the same keys
//! lay their entries out identically, across runs as well.

use std::hash::{BuildHasher, Hasher};

/// Number of buckets a [`BucketMap`](crate::collections::BucketMap) uses
/// when the const parameter is not given.
pub const DEFAULT_BUCKET_COUNT: usize = 20;

static_assertions::const_assert!(DEFAULT_BUCKET_COUNT > 0);

#[cfg(feature = "fxhash")]
/// Hash builder used by maps that do not name one.
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
/// Hash builder used by maps that do not name one.
pub type DefaultHashBuilder = ahash::RandomState;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
/// Hash builder used by maps that do not name one.
pub type DefaultHashBuilder =
    std::hash::BuildHasherDefault<std::collections::hash_map::DefaultHasher>;

/// Reduces a full hash to a bucket index.
#[inline]
pub(crate) const fn bucket_index(hash: u64, buckets: usize) -> usize {
    (hash % buckets as u64) as usize
}

// =============================================================================
// Identity Hasher
// =============================================================================

/// A hasher that hashes an integer to its own value.
///
/// Signed integers are sign-extended to `u64`, so `-1` hashes to
/// `u64::MAX`. Each further integer written shifts the state left by 32
/// bits before being xored in, so every field of a composite key such as
/// `(u32, u32)` reaches the hash. Byte slices (strings) are folded in
/// little-endian order, so non-integer keys still hash deterministically,
/// just without any mixing.
///
/// # Examples
///
/// ```rust
/// use std::hash::{BuildHasher, Hash, Hasher};
/// use twinmap::hash::BuildIdentityHasher;
///
/// let mut hasher = BuildIdentityHasher.build_hasher();
/// 42_i32.hash(&mut hasher);
/// assert_eq!(hasher.finish(), 42);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityHasher(u64);

impl IdentityHasher {
    #[inline]
    const fn fold(&mut self, value: u64) {
        self.0 = (self.0 << 32) ^ value;
    }
}

impl Hasher for IdentityHasher {
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes.iter().rev() {
            self.0 = (self.0 << 8) | u64::from(*byte);
        }
    }

    fn write_u8(&mut self, value: u8) {
        self.0 = (self.0 << 8) | u64::from(value);
    }

    fn write_u16(&mut self, value: u16) {
        self.fold(u64::from(value));
    }

    fn write_u32(&mut self, value: u32) {
        self.fold(u64::from(value));
    }

    fn write_u64(&mut self, value: u64) {
        self.fold(value);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn write_u128(&mut self, value: u128) {
        self.fold(value as u64);
    }

    fn write_usize(&mut self, value: usize) {
        self.fold(value as u64);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i8(&mut self, value: i8) {
        self.fold(i64::from(value) as u64);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i16(&mut self, value: i16) {
        self.fold(i64::from(value) as u64);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i32(&mut self, value: i32) {
        self.fold(i64::from(value) as u64);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_i64(&mut self, value: i64) {
        self.fold(value as u64);
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn write_i128(&mut self, value: i128) {
        self.fold(value as u64);
    }

    #[allow(clippy::cast_sign_loss)]
    fn write_isize(&mut self, value: isize) {
        self.fold(value as u64);
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

/// Builds [`IdentityHasher`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildIdentityHasher;

impl BuildHasher for BuildIdentityHasher {
    type Hasher = IdentityHasher;

    fn build_hasher(&self) -> Self::Hasher {
        IdentityHasher::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::hash::Hash;

    fn identity_hash<T: Hash>(value: &T) -> u64 {
        BuildIdentityHasher.hash_one(value)
    }

    #[rstest]
    #[case(0, 0)]
    #[case(5, 5)]
    #[case(19, 19)]
    #[case(1_000, 1_000)]
    fn test_identity_hash_of_i32(#[case] key: i32, #[case] expected: u64) {
        assert_eq!(identity_hash(&key), expected);
    }

    #[rstest]
    fn test_identity_hash_of_negative_is_sign_extended() {
        assert_eq!(identity_hash(&-1_i32), u64::MAX);
    }

    #[rstest]
    fn test_identity_hash_of_u64_is_unchanged() {
        assert_eq!(identity_hash(&0xc8c8_c8c8_c8c8_c8c8_u64), 0xc8c8_c8c8_c8c8_c8c8);
    }

    #[rstest]
    fn test_identity_hash_of_tuple_counts_every_field() {
        assert_ne!(identity_hash(&(1_u32, 5_u32)), identity_hash(&(2_u32, 5_u32)));
        assert_eq!(identity_hash(&(1_u32, 5_u32)), (1 << 32) ^ 5);
    }

    #[rstest]
    fn test_identity_write_folds_bytes_little_endian() {
        let mut hasher = IdentityHasher::default();
        hasher.write(&[0x01, 0x02]);
        assert_eq!(hasher.finish(), 0x0201);
    }

    #[rstest]
    fn test_identity_hash_of_strings_differs() {
        assert_ne!(identity_hash(&"a"), identity_hash(&"b"));
    }

    #[rstest]
    #[case(0, 20, 0)]
    #[case(21, 20, 1)]
    #[case(u64::MAX, 20, 15)]
    #[case(7, 1, 0)]
    fn test_bucket_index(#[case] hash: u64, #[case] buckets: usize, #[case] expected: usize) {
        assert_eq!(bucket_index(hash, buckets), expected);
    }

    #[rstest]
    fn test_default_hash_builder_is_deterministic_within_a_builder() {
        let builder = DefaultHashBuilder::default();
        assert_eq!(builder.hash_one("key"), builder.hash_one("key"));
    }
}
