#![cfg(feature = "serde")]

//! Integration tests for serde support in detmap.
//!
//! Serialization must follow key order so that the encoded bytes are identical
//! on every node holding the same entries.

use detmap::asset::{AssetPair, PairMap};
use detmap::map::{Maintenance, OrderedMap, StringMap};
use detmap::order::{Lexicographic, Natural};
use rstest::rstest;

// =============================================================================
// OrderedMap Tests
// =============================================================================

#[rstest]
fn test_serializes_in_key_order() {
    let mut map: StringMap<u32> = StringMap::new();
    map.insert("zeta".to_string(), 3);
    map.insert("alpha".to_string(), 1);
    map.insert("mu".to_string(), 2);

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"alpha":1,"mu":2,"zeta":3}"#);
}

#[rstest]
fn test_stale_map_serializes_in_key_order() {
    let mut map: StringMap<u32> =
        StringMap::with_order_and_maintenance(Lexicographic, Maintenance::Deferred);
    map.insert("b".to_string(), 2);
    map.insert("a".to_string(), 1);
    assert!(!map.is_ordered());

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"a":1,"b":2}"#);
}

#[rstest]
fn test_identical_contents_serialize_identically() {
    let mut left: OrderedMap<u32, &str, Natural> = OrderedMap::new();
    let mut right: OrderedMap<u32, &str, Natural> = OrderedMap::new();
    for (key, value) in [(3, "c"), (1, "a"), (2, "b")] {
        left.insert(key, value);
    }
    for (key, value) in [(2, "b"), (3, "c"), (1, "a")] {
        right.insert(key, value);
    }

    assert_eq!(
        serde_json::to_vec(&left).unwrap(),
        serde_json::to_vec(&right).unwrap()
    );
}

#[rstest]
fn test_json_roundtrip() {
    let map: StringMap<Vec<u8>> = [("b", vec![2]), ("a", vec![1, 1])]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    let json = serde_json::to_string(&map).unwrap();
    let mut restored: StringMap<Vec<u8>> = serde_json::from_str(&json).unwrap();

    assert_eq!(map, restored);
    assert!(restored.is_ordered());
    assert_eq!(restored.keys(), ["a", "b"]);
}

#[rstest]
fn test_deserialize_rejects_non_map() {
    let result: Result<StringMap<u8>, _> = serde_json::from_str("[1, 2, 3]");
    assert!(result.is_err());
}

// =============================================================================
// AssetPair Tests
// =============================================================================

#[rstest]
fn test_pair_map_serializes_pairs_as_strings() {
    let mut map: PairMap<u8> = PairMap::new();
    map.insert(AssetPair::try_new("uusd", "ubtc").unwrap(), 2);
    map.insert(AssetPair::try_new("ubtc", "uusd").unwrap(), 1);

    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"ubtc:uusd":1,"uusd:ubtc":2}"#);

    let restored: PairMap<u8> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
}

#[rstest]
#[case("ibc/27394FB0", "uusd")]
#[case("u", "x")]
#[case("factory/nibi1/uatom", "ibc/A1B2")]
fn test_constructed_pair_map_survives_round_trip(#[case] base: &str, #[case] quote: &str) {
    let pair = AssetPair::try_new(base, quote).unwrap();
    let mut map: PairMap<u8> = PairMap::new();
    map.insert(pair.inverse(), 2);
    map.insert(pair, 1);

    let json = serde_json::to_string(&map).unwrap();
    let restored: PairMap<u8> = serde_json::from_str(&json).unwrap();
    assert_eq!(map, restored);
}

#[rstest]
#[case("ibc:x", "uusd")]
#[case("", "x")]
fn test_pairs_that_cannot_round_trip_are_never_built(#[case] base: &str, #[case] quote: &str) {
    assert!(AssetPair::try_new(base, quote).is_err());
}

#[rstest]
fn test_pair_deserialize_rejects_malformed_pair() {
    let result: Result<AssetPair, _> = serde_json::from_str(r#""ubtc""#);
    let error = result.unwrap_err();
    assert!(error.to_string().contains("missing ':' separator"));
}

#[rstest]
fn test_maintenance_roundtrip() {
    let json = serde_json::to_string(&Maintenance::Deferred).unwrap();
    let restored: Maintenance = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, Maintenance::Deferred);
}
