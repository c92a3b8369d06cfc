//! Multi-threaded tests for `ShardedMap`

use memcab::{ShardedMap, ShardedMapConfig};
use rand::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Barrier};
use std::thread;

const NUM_THREADS: usize = 8;

#[test]
fn test_concurrent_disjoint_writers() {
    let map = Arc::new(ShardedMap::new());
    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let mut handles = Vec::new();

    for t in 0..NUM_THREADS {
        let map = Arc::clone(&map);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            let mut rng = StdRng::seed_from_u64(t as u64);
            let mut written = HashMap::new();
            barrier.wait();
            for i in 0..500 {
                let key = format!("t{}-{}", t, i);
                let len = rng.gen_range(0..32);
                let value: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
                map.put(&key, &value);
                written.insert(key, value);
            }
            written
        }));
    }

    let mut expected = HashMap::new();
    for handle in handles {
        expected.extend(handle.join().unwrap());
    }
    assert_eq!(map.rnum(), NUM_THREADS * 500);
    for (key, value) in &expected {
        assert_eq!(map.get(key).as_ref(), Some(value));
    }
}

#[test]
fn test_concurrent_counter() {
    let map = Arc::new(ShardedMap::with_shards(4).unwrap());
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let map = Arc::clone(&map);
            thread::spawn(move || {
                for _ in 0..1000 {
                    map.add_int("hits", 1);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(map.add_int("hits", 0), (NUM_THREADS * 1000) as i32);
}

#[test]
fn test_mixed_readers_and_writers() {
    let map = Arc::new(
        ShardedMap::with_config(ShardedMapConfig {
            shard_count: 16,
            bucket_count: 4096,
        })
        .unwrap(),
    );
    for i in 0..1000 {
        map.put(i.to_string(), "seed");
    }

    let barrier = Arc::new(Barrier::new(NUM_THREADS));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|t| {
            let map = Arc::clone(&map);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(1000 + t as u64);
                barrier.wait();
                for _ in 0..2000 {
                    let key = rng.gen_range(0..1000).to_string();
                    match rng.gen_range(0..4) {
                        0 => map.putcat(&key, "+"),
                        1 => {
                            map.get3(&key);
                        }
                        _ => {
                            let value = map.get(&key).expect("seeded keys are never removed");
                            assert!(value.starts_with(b"seed"));
                        }
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.rnum(), 1000);
    let mut seen = 0;
    map.iter_init();
    while let Some(key) = map.iter_next() {
        assert!(map.get(&key).is_some());
        seen += 1;
    }
    assert_eq!(seen, 1000);
}

#[test]
fn test_iteration_while_writing_elsewhere() {
    let map = Arc::new(ShardedMap::new());
    for i in 0..200 {
        map.put(format!("fixed{}", i), "v");
    }

    let writer = {
        let map = Arc::clone(&map);
        thread::spawn(move || {
            for i in 0..2000 {
                map.put(format!("extra{}", i), "w");
                if i % 3 == 0 {
                    map.out(format!("extra{}", i / 2));
                }
            }
        })
    };

    let mut fixed = 0;
    map.iter_init();
    while let Some(key) = map.iter_next() {
        if key.starts_with(b"fixed") {
            fixed += 1;
        }
    }
    writer.join().unwrap();

    assert_eq!(fixed, 200);
    assert_eq!(map.fwmkeys("fixed", None).len(), 200);
}

#[test]
fn test_cut_front_and_vanish() {
    let map = ShardedMap::with_shards(4).unwrap();
    for i in 0..400 {
        map.put(i.to_string(), "x");
    }
    map.cut_front(40);
    // each shard drops 40 / 4 + 1 records
    assert_eq!(map.rnum(), 400 - 4 * 11);
    map.vanish();
    assert_eq!(map.rnum(), 0);
    assert_eq!(map.msiz(), 0);
}
