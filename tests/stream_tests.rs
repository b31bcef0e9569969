#![cfg(feature = "async")]

//! Tests for consuming ordered keys as a `futures::Stream`.

use detmap::map::{Maintenance, OrderedMap};
use detmap::order::Natural;
use futures::{Stream, StreamExt};
use futures::executor::block_on;
use rstest::rstest;

fn sample(maintenance: Maintenance) -> OrderedMap<u32, u32, Natural> {
    let mut map = OrderedMap::with_order_and_maintenance(Natural, maintenance);
    for key in [4, 1, 3, 2] {
        map.insert(key, key * 10);
    }
    map
}

#[rstest]
#[case(Maintenance::Incremental)]
#[case(Maintenance::Deferred)]
fn test_stream_yields_keys_in_order(#[case] maintenance: Maintenance) {
    let mut map = sample(maintenance);
    let keys: Vec<u32> = block_on(map.stream().map(|key| *key).collect());
    assert_eq!(keys, vec![1, 2, 3, 4]);
}

#[rstest]
fn test_abandoned_stream_does_not_block() {
    let mut map = sample(Maintenance::Incremental);
    let first = block_on(async {
        let mut stream = map.stream();
        stream.next().await.copied()
    });
    assert_eq!(first, Some(1));

    map.remove(&1);
    let keys: Vec<u32> = block_on(map.stream().map(|key| *key).collect());
    assert_eq!(keys, vec![2, 3, 4]);
}

#[rstest]
fn test_stream_size_hint_is_exact() {
    let mut map = sample(Maintenance::Rebuild);
    let stream = map.stream();
    assert_eq!(stream.size_hint(), (4, Some(4)));
}
