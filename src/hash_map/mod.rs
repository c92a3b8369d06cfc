//! Byte-string record maps
//!
//! - [`OrderedMap`]: single-threaded map keeping insertion order, with
//!   move-to-tail promotion, front trimming and a compact dump format
//! - [`ShardedMap`]: thread-safe map made of `OrderedMap` shards behind
//!   per-shard reader-writer locks

pub mod hash_functions;
pub mod ordered_map;
pub mod sharded_map;

pub use hash_functions::{bucket_hash, shard_hash, tree_hash};
pub use ordered_map::{Iter, OrderedMap};
pub use sharded_map::ShardedMap;
