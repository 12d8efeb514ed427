#![cfg(feature = "ordered-map")]
//! Property-based tests for OrderedMap.
//!
//! A `std::collections::BTreeMap` serves as the model: after any sequence of
//! operations both must hold the same entries in the same order.

use proptest::prelude::*;
use std::collections::BTreeMap;
use twinmap::collections::OrderedMap;
use twinmap::error::MapError;

// =============================================================================
// Strategies for Generating Test Data
// =============================================================================

fn arbitrary_entries() -> impl Strategy<Value = Vec<(i16, i32)>> {
    prop::collection::vec((any::<i16>(), any::<i32>()), 0..64)
}

/// Keys drawn from a small range so that removals often hit.
fn arbitrary_dense_keys() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(0..48u8, 1..64)
}

#[derive(Debug, Clone)]
enum Operation {
    GetOrInsert(u8, i32),
    Remove(u8),
    RemoveFirst,
    PopLast,
}

fn arbitrary_operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        4 => (0..48u8, any::<i32>()).prop_map(|(key, value)| Operation::GetOrInsert(key, value)),
        3 => (0..48u8).prop_map(Operation::Remove),
        1 => Just(Operation::RemoveFirst),
        1 => Just(Operation::PopLast),
    ]
}

fn assert_strictly_ascending<K: Ord, V>(map: &OrderedMap<K, V>) -> Result<(), TestCaseError> {
    let keys: Vec<&K> = map.keys().collect();
    prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    prop_assert_eq!(keys.len(), map.len());
    Ok(())
}

// =============================================================================
// Uniqueness Law: len == number of distinct keys
// =============================================================================

proptest! {
    #[test]
    fn prop_len_counts_distinct_keys(entries in arbitrary_entries()) {
        let map: OrderedMap<i16, i32> = entries.iter().copied().collect();
        let model: BTreeMap<i16, i32> = entries.into_iter().collect();

        prop_assert_eq!(map.len(), model.len());
    }
}

// =============================================================================
// Ordering Law: iteration is the model's ascending order
// =============================================================================

proptest! {
    #[test]
    fn prop_iteration_matches_sorted_model(entries in arbitrary_entries()) {
        let map: OrderedMap<i16, i32> = entries.iter().copied().collect();
        let model: BTreeMap<i16, i32> = entries.into_iter().collect();

        let actual: Vec<(i16, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
        let expected: Vec<(i16, i32)> = model.into_iter().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_reverse_iteration_is_descending(entries in arbitrary_entries()) {
        let map: OrderedMap<i16, i32> = entries.into_iter().collect();

        let mut backward: Vec<i16> = map.keys().rev().copied().collect();
        backward.reverse();
        let forward: Vec<i16> = map.keys().copied().collect();
        prop_assert_eq!(forward, backward);
    }
}

// =============================================================================
// Round-Trip Law: get_or_insert(k) = v => value_of(k) == v
// =============================================================================

proptest! {
    #[test]
    fn prop_get_or_insert_round_trip(
        entries in arbitrary_entries(),
        key: i16,
        value: i32
    ) {
        let mut map: OrderedMap<i16, i32> = entries.into_iter().collect();
        *map.get_or_insert(key) = value;

        prop_assert_eq!(map.value_of(&key), Ok(&value));
    }
}

// =============================================================================
// Removal Law: remove(k) => find(k) == end && value_of(k) == NotFound
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_erases_key(entries in arbitrary_entries(), index: prop::sample::Index) {
        prop_assume!(!entries.is_empty());
        let mut map: OrderedMap<i16, i32> = entries.iter().copied().collect();
        let key = entries[index.index(entries.len())].0;
        let length = map.len();

        prop_assert!(map.remove(&key).is_ok());
        prop_assert_eq!(map.find(&key), map.end());
        prop_assert_eq!(map.value_of(&key), Err(MapError::NotFound));
        prop_assert_eq!(map.len(), length - 1);
        assert_strictly_ascending(&map)?;
    }
}

// =============================================================================
// Remove-Reinsert Law: in-order key sequence is restored
// =============================================================================

proptest! {
    #[test]
    fn prop_remove_then_reinsert_restores_key_sequence(
        keys in arbitrary_dense_keys(),
        index: prop::sample::Index,
        value: i32
    ) {
        let mut map: OrderedMap<u8, i32> = keys.iter().map(|&key| (key, 0)).collect();
        let original: Vec<u8> = map.keys().copied().collect();
        let key = keys[index.index(keys.len())];

        map.remove(&key).unwrap();
        assert_strictly_ascending(&map)?;
        *map.get_or_insert(key) = value;

        let restored: Vec<u8> = map.keys().copied().collect();
        prop_assert_eq!(restored, original);
        prop_assert_eq!(map.value_of(&key), Ok(&value));
        assert_strictly_ascending(&map)?;
    }
}

// =============================================================================
// Randomized Stress: every operation agrees with the model
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_random_operations_agree_with_model(
        operations in prop::collection::vec(arbitrary_operation(), 1..200)
    ) {
        let mut map: OrderedMap<u8, i32> = OrderedMap::new();
        let mut model: BTreeMap<u8, i32> = BTreeMap::new();

        for operation in operations {
            match operation {
                Operation::GetOrInsert(key, value) => {
                    *map.get_or_insert(key) = value;
                    model.insert(key, value);
                }
                Operation::Remove(key) => {
                    let expected = model.remove(&key).ok_or(MapError::NotFound);
                    prop_assert_eq!(map.remove(&key), expected);
                }
                Operation::RemoveFirst => {
                    let expected = model.pop_first().ok_or(MapError::EmptyMap);
                    prop_assert_eq!(map.remove_at(map.begin()), expected);
                }
                Operation::PopLast => {
                    let expected = model.pop_last().ok_or(MapError::EmptyMap);
                    prop_assert_eq!(map.pop_last(), expected);
                }
            }

            assert_strictly_ascending(&map)?;
            let actual: Vec<(u8, i32)> = map.iter().map(|(key, value)| (*key, *value)).collect();
            let expected: Vec<(u8, i32)> = model.iter().map(|(key, value)| (*key, *value)).collect();
            prop_assert_eq!(actual, expected);
        }

        prop_assert!(map.height() <= map.len());
    }
}

// =============================================================================
// Equality Law: same entries => equal, whatever the insertion order
// =============================================================================

proptest! {
    #[test]
    fn prop_equality_ignores_insertion_order(keys in arbitrary_dense_keys()) {
        let forward: OrderedMap<u8, u8> = keys.iter().map(|&key| (key, key)).collect();
        let backward: OrderedMap<u8, u8> = keys.iter().rev().map(|&key| (key, key)).collect();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn prop_clone_equals_original(entries in arbitrary_entries()) {
        let map: OrderedMap<i16, i32> = entries.into_iter().collect();
        let copy = map.clone();

        prop_assert_eq!(copy.height(), map.height());
        prop_assert_eq!(copy, map);
    }
}
