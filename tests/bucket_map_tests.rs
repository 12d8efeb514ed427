#![cfg(feature = "bucket-map")]
//! Unit tests for BucketMap.

use rstest::rstest;
use twinmap::collections::BucketMap;
use twinmap::error::{CursorFault, MapError};
use twinmap::hash::BuildIdentityHasher;

type IdentityMap<V> = BucketMap<i32, V, BuildIdentityHasher>;

fn identity_map(keys: &[i32]) -> IdentityMap<String> {
    let mut map = IdentityMap::default();
    for &key in keys {
        *map.get_or_insert(key) = format!("v{key}");
    }
    map
}

// =============================================================================
// Basic Construction Tests
// =============================================================================

#[rstest]
fn test_new_creates_empty_map() {
    let map: BucketMap<i32, String> = BucketMap::new();
    assert!(map.is_empty());
    assert_eq!(map.len(), 0);
    assert_eq!(map.bucket_count(), 20);
    assert_eq!(map.begin(), map.end());
}

#[rstest]
fn test_default_creates_empty_map() {
    let map: BucketMap<i32, String> = BucketMap::default();
    assert!(map.is_empty());
    assert_eq!(map.iter().count(), 0);
}

#[rstest]
fn test_custom_bucket_count() {
    let map: BucketMap<i32, (), BuildIdentityHasher, 7> = BucketMap::default();
    assert_eq!(map.bucket_count(), 7);
    assert_eq!(map.bucket_of(&15), 1);
    assert_eq!(map.bucket_len(6), Some(0));
    assert_eq!(map.bucket_len(7), None);
}

// =============================================================================
// get_or_insert Tests
// =============================================================================

#[rstest]
fn test_get_or_insert_default_value_then_assign() {
    let mut map: BucketMap<&str, i32> = BucketMap::new();
    assert_eq!(*map.get_or_insert("a"), 0);
    *map.get_or_insert("a") = 7;

    assert_eq!(map.len(), 1);
    assert_eq!(map.value_of("a"), Ok(&7));
}

#[rstest]
fn test_get_or_insert_existing_key_does_not_grow() {
    let mut map = identity_map(&[1, 2, 3]);
    let before: Vec<i32> = map.keys().copied().collect();

    map.get_or_insert(2).push('!');

    assert_eq!(map.len(), 3);
    assert_eq!(map.value_of(&2), Ok(&"v2!".to_string()));
    let after: Vec<i32> = map.keys().copied().collect();
    assert_eq!(before, after);
}

#[rstest]
fn test_get_or_insert_keeps_cursor_valid_for_existing_key() {
    let mut map = identity_map(&[1, 2, 3]);
    let cursor = map.find(&2);
    map.get_or_insert(3).push('x');
    assert_eq!(map.entry_at(cursor).map(|(key, _)| *key), Ok(2));
}

#[rstest]
fn test_insert_returns_replaced_value() {
    let mut map = identity_map(&[4]);
    assert_eq!(map.insert(4, "four".to_string()), Some("v4".to_string()));
    assert_eq!(map.insert(5, "five".to_string()), None);
    assert_eq!(map.len(), 2);
}

// =============================================================================
// Iteration Order Tests
// =============================================================================

#[rstest]
fn test_iteration_visits_buckets_in_index_order() {
    let map = identity_map(&[5, 3, 8, 1, 4]);
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![1, 3, 4, 5, 8]);
}

#[rstest]
fn test_colliding_keys_keep_append_order() {
    // 0, 20 and 40 share bucket 0; 1 and 21 share bucket 1.
    let map = identity_map(&[40, 21, 0, 1, 20]);
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![40, 0, 20, 21, 1]);
    assert_eq!(map.bucket_len(0), Some(3));
    assert_eq!(map.bucket_len(1), Some(2));
}

#[rstest]
fn test_negative_keys_use_wrapped_bucket() {
    let map = identity_map(&[-1, 0]);
    assert_eq!(map.bucket_of(&-1), 15);
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![0, -1]);
}

#[rstest]
fn test_reverse_iteration_mirrors_forward() {
    let map = identity_map(&[5, 25, 3, 8, 1, 4]);
    let forward: Vec<i32> = map.keys().copied().collect();
    let mut backward: Vec<i32> = map.keys().rev().copied().collect();
    backward.reverse();
    assert_eq!(forward, backward);
}

#[rstest]
fn test_iter_meets_in_the_middle() {
    let map = identity_map(&[1, 2, 3, 4]);
    let mut iter = map.keys();
    assert_eq!(iter.next(), Some(&1));
    assert_eq!(iter.next_back(), Some(&4));
    assert_eq!(iter.len(), 2);
    assert_eq!(iter.next(), Some(&2));
    assert_eq!(iter.next_back(), Some(&3));
    assert_eq!(iter.next(), None);
    assert_eq!(iter.next_back(), None);
}

#[rstest]
fn test_iter_mut_updates_every_value() {
    let mut map = identity_map(&[1, 21, 2]);
    for (key, value) in &mut map {
        value.push_str(&key.to_string());
    }
    assert_eq!(map.value_of(&21), Ok(&"v2121".to_string()));
    for value in map.values_mut() {
        value.clear();
    }
    assert!(map.values().all(String::is_empty));
}

#[rstest]
fn test_into_iter_yields_bucket_order() {
    let map = identity_map(&[3, 23, 1]);
    let entries: Vec<(i32, String)> = map.into_iter().collect();
    assert_eq!(
        entries,
        vec![
            (1, "v1".to_string()),
            (3, "v3".to_string()),
            (23, "v23".to_string())
        ]
    );
}

// =============================================================================
// Lookup and Removal Tests
// =============================================================================

#[rstest]
fn test_value_of_missing_key_is_not_found() {
    let map = identity_map(&[1]);
    assert_eq!(map.value_of(&2), Err(MapError::NotFound));
    assert!(!map.contains_key(&2));
    assert!(map.find(&2).is_end());
}

#[rstest]
fn test_lookup_scans_every_chain_position() {
    let map = identity_map(&[0, 20, 40, 60]);
    for key in [0, 20, 40, 60] {
        assert_eq!(map.value_of(&key), Ok(&format!("v{key}")));
    }
}

#[rstest]
#[case(0)]
#[case(20)]
#[case(40)]
fn test_remove_from_chain(#[case] removed: i32) {
    let mut map = identity_map(&[0, 20, 40, 7]);
    assert_eq!(map.remove(&removed), Ok(format!("v{removed}")));
    assert_eq!(map.len(), 3);
    assert_eq!(map.bucket_len(0), Some(2));
    assert!(!map.contains_key(&removed));

    let expected: Vec<i32> = [0, 20, 40, 7]
        .into_iter()
        .filter(|&key| key != removed)
        .collect();
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, expected);
}

#[rstest]
fn test_remove_missing_key_leaves_map_unchanged() {
    let mut map = identity_map(&[1, 2]);
    let cursor = map.begin();
    assert_eq!(map.remove(&3), Err(MapError::NotFound));
    assert_eq!(map.len(), 2);
    assert_eq!(map.entry_at(cursor).map(|(key, _)| *key), Ok(1));
}

#[rstest]
fn test_remove_then_reinsert_appends_to_tail() {
    let mut map = identity_map(&[0, 20, 40]);
    map.remove(&0).unwrap();
    map.get_or_insert(0);
    let keys: Vec<i32> = map.keys().copied().collect();
    assert_eq!(keys, vec![20, 40, 0]);
}

#[rstest]
fn test_drain_through_begin() {
    let mut map = identity_map(&[9, 3, 29, 0]);
    let mut drained = Vec::new();
    while !map.is_empty() {
        let (key, _) = map.remove_at(map.begin()).unwrap();
        drained.push(key);
    }
    assert_eq!(drained, vec![0, 3, 9, 29]);
    assert_eq!(map.remove_at(map.begin()), Err(MapError::EmptyMap));
}

#[rstest]
fn test_clear_invalidates_cursors() {
    let mut map = identity_map(&[1, 2]);
    let cursor = map.begin();
    map.clear();
    assert!(map.is_empty());
    assert_eq!(
        map.entry_at(cursor),
        Err(MapError::InvalidCursor(CursorFault::Stale))
    );
    map.get_or_insert(5);
    assert_eq!(map.len(), 1);
}

// =============================================================================
// Equality Tests
// =============================================================================

#[rstest]
fn test_equality_ignores_chain_order() {
    let first = identity_map(&[1, 21, 41]);
    let second = identity_map(&[41, 1, 21]);
    assert_eq!(first, second);
    assert!(!first.sequence_eq(&second));
}

#[rstest]
fn test_equality_compares_values() {
    let first = identity_map(&[1, 2]);
    let mut second = identity_map(&[1, 2]);
    assert!(first.sequence_eq(&second));
    second.get_or_insert(2).push('x');
    assert_ne!(first, second);
    assert!(!first.sequence_eq(&second));
}

#[rstest]
fn test_equality_requires_same_length() {
    let first = identity_map(&[1, 2]);
    let second = identity_map(&[1, 2, 3]);
    assert_ne!(first, second);
    assert_ne!(second, first);
}

#[rstest]
fn test_sequence_eq_across_bucket_counts() {
    let twenty: IdentityMap<()> = [(1, ()), (2, ())].into_iter().collect();
    let seven: BucketMap<i32, (), BuildIdentityHasher, 7> =
        [(1, ()), (2, ())].into_iter().collect();
    assert!(twenty.sequence_eq(&seven));
}

// =============================================================================
// Standard Trait Tests
// =============================================================================

#[rstest]
fn test_clone_is_independent_and_foreign() {
    let original = identity_map(&[1, 2]);
    let mut copy = original.clone();
    copy.get_or_insert(3);

    assert_eq!(original.len(), 2);
    assert_eq!(copy.len(), 3);
    assert_eq!(
        copy.entry_at(original.begin()),
        Err(MapError::InvalidCursor(CursorFault::ForeignMap))
    );
}

#[rstest]
fn test_take_leaves_empty_usable_source() {
    let mut source = identity_map(&[1, 21, 2]);
    let cursor = source.find(&21);
    let moved = std::mem::take(&mut source);

    assert!(source.is_empty());
    assert_eq!(source.begin(), source.end());
    assert_eq!(
        source.entry_at(cursor),
        Err(MapError::InvalidCursor(CursorFault::ForeignMap))
    );

    assert_eq!(moved.len(), 3);
    assert_eq!(moved.entry_at(cursor), Ok((&21, &"v21".to_string())));

    *source.get_or_insert(4) = "again".to_string();
    assert_eq!(source.len(), 1);
    assert_eq!(source.value_of(&4), Ok(&"again".to_string()));
}

#[rstest]
fn test_replace_moves_entries_into_target() {
    let mut source = identity_map(&[5, 6]);
    let mut target = identity_map(&[7]);
    assert!(target.contains_key(&7));
    target = std::mem::replace(&mut source, IdentityMap::default());

    assert!(source.is_empty());
    assert_eq!(target.len(), 2);
    assert!(target.contains_key(&5));
    assert!(!target.contains_key(&7));
}

#[rstest]
fn test_from_array_last_duplicate_wins() {
    let map = BucketMap::from([("a", 1), ("b", 2), ("a", 3)]);
    assert_eq!(map.len(), 2);
    assert_eq!(map["a"], 3);
}

#[rstest]
#[should_panic(expected = "key not found")]
fn test_index_missing_key_panics() {
    let map = BucketMap::from([("a", 1)]);
    let _value = map["b"];
}

#[rstest]
fn test_extend_adds_entries() {
    let mut map = identity_map(&[1]);
    map.extend([(2, "two".to_string()), (1, "one".to_string())]);
    assert_eq!(map.len(), 2);
    assert_eq!(map[&1], "one");
}

#[rstest]
fn test_debug_lists_entries_in_iteration_order() {
    let map: IdentityMap<i32> = [(2, 20), (1, 10)].into_iter().collect();
    assert_eq!(format!("{map:?}"), "{1: 10, 2: 20}");
}

#[rstest]
fn test_string_keys_with_default_hasher() {
    let mut map: BucketMap<String, usize> = BucketMap::new();
    for word in "the quick brown fox jumps over the lazy dog the end".split(' ') {
        *map.get_or_insert(word.to_string()) += 1;
    }
    assert_eq!(map.value_of("the"), Ok(&3));
    assert_eq!(map.len(), 9);
    let total: usize = (0..map.bucket_count())
        .filter_map(|index| map.bucket_len(index))
        .sum();
    assert_eq!(total, map.len());
}
