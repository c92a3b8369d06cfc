//! ShardedMap: concurrent record map built from independently locked shards
//!
//! Each key is routed by [`shard_hash`] to one [`OrderedMap`] shard guarded
//! by its own reader-writer lock. Single-key operations lock exactly one
//! shard for their duration. Whole-map operations (`rnum`, `vanish`,
//! `cut_front`, `fwmkeys`) visit the shards one at a time and are not atomic
//! as a whole.
//!
//! Values are returned as owned copies because the shard lock is released
//! before the call returns.

use super::hash_functions::shard_hash;
use super::ordered_map::OrderedMap;
use crate::config::{Config, ShardedMapConfig};
use crate::containers::ArrayList;
use crate::error::Result;
use crossbeam_utils::CachePadded;
use parking_lot::{Mutex, RwLock};
use std::fmt;

/// Thread-safe map of byte strings partitioned into shards
///
/// # Examples
///
/// ```rust
/// use memcab::hash_map::ShardedMap;
/// use std::sync::Arc;
/// use std::thread;
///
/// let map = Arc::new(ShardedMap::new());
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let map = Arc::clone(&map);
///         thread::spawn(move || {
///             for i in 0..100 {
///                 map.put(format!("{}-{}", t, i), "v");
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
/// assert_eq!(map.rnum(), 400);
/// assert_eq!(map.get("2-42"), Some(b"v".to_vec()));
/// ```
pub struct ShardedMap {
    shards: Vec<CachePadded<RwLock<OrderedMap>>>,
    shard_mask: usize,
    /// Shard the cursor is currently walking
    iter_shard: Mutex<usize>,
}

impl ShardedMap {
    /// Create a map with the default shard and bucket counts
    pub fn new() -> Self {
        Self::build(&ShardedMapConfig::default())
    }

    /// Create a map with `shard_count` shards
    pub fn with_shards(shard_count: usize) -> Result<Self> {
        Self::with_config(ShardedMapConfig {
            shard_count,
            ..ShardedMapConfig::default()
        })
    }

    /// Create a map from a configuration
    pub fn with_config(config: ShardedMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(&config))
    }

    fn build(config: &ShardedMapConfig) -> Self {
        let buckets = config.buckets_per_shard();
        log::debug!(
            "creating sharded map: shards={}, buckets_per_shard={}",
            config.shard_count,
            buckets
        );
        let shards = (0..config.shard_count)
            .map(|_| CachePadded::new(RwLock::new(OrderedMap::with_buckets(buckets))))
            .collect();
        Self {
            shards,
            shard_mask: config.shard_count - 1,
            iter_shard: Mutex::new(0),
        }
    }

    /// Number of shards
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Shard that `key` is routed to
    #[inline]
    pub fn shard_of(&self, key: impl AsRef<[u8]>) -> usize {
        shard_hash(key.as_ref(), self.shard_mask + 1)
    }

    #[inline]
    fn shard(&self, key: &[u8]) -> &RwLock<OrderedMap> {
        &self.shards[shard_hash(key, self.shard_mask + 1)]
    }

    /// Store a record, overwriting an existing value
    pub fn put(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        let key = key.as_ref();
        self.shard(key).write().put(key, value);
    }

    /// Store a record whose value is `head` followed by `tail`
    pub fn put3(&self, key: impl AsRef<[u8]>, head: impl AsRef<[u8]>, tail: impl AsRef<[u8]>) {
        let key = key.as_ref();
        self.shard(key).write().put3(key, head, tail);
    }

    /// Store a record only if the key is absent
    pub fn putkeep(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        self.shard(key).write().putkeep(key, value)
    }

    /// Append to the value of a record, creating it when absent
    pub fn putcat(&self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        let key = key.as_ref();
        self.shard(key).write().putcat(key, value);
    }

    /// Remove a record
    pub fn out(&self, key: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        self.shard(key).write().out(key)
    }

    /// Copy of the value of a record
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        let key = key.as_ref();
        self.shard(key).read().get(key).map(<[u8]>::to_vec)
    }

    /// Copy of the value of a record, moving the record to the end of its
    /// shard's order
    pub fn get3(&self, key: impl AsRef<[u8]>) -> Option<Vec<u8>> {
        let key = key.as_ref();
        self.shard(key).write().get3(key).map(<[u8]>::to_vec)
    }

    /// Size of the value of a record
    pub fn value_size(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        let key = key.as_ref();
        self.shard(key).read().value_size(key)
    }

    /// Add to a 32-bit counter record, returning the new value
    pub fn add_int(&self, key: impl AsRef<[u8]>, delta: i32) -> i32 {
        let key = key.as_ref();
        self.shard(key).write().add_int(key, delta)
    }

    /// Reset the cursor to the first record of the first shard
    pub fn iter_init(&self) {
        let mut iter_shard = self.iter_shard.lock();
        for shard in &self.shards {
            shard.write().iter_init();
        }
        *iter_shard = 0;
    }

    /// Copy of the key under the cursor, advancing the cursor
    ///
    /// Shards are walked in index order, each in its own record order.
    pub fn iter_next(&self) -> Option<Vec<u8>> {
        let mut iter_shard = self.iter_shard.lock();
        while *iter_shard < self.shards.len() {
            let mut shard = self.shards[*iter_shard].write();
            if let Some(key) = shard.iter_next() {
                return Some(key.to_vec());
            }
            drop(shard);
            *iter_shard += 1;
        }
        None
    }

    /// Keys starting with `prefix`, at most `max` of them
    ///
    /// Scans every record, locking one shard at a time.
    pub fn fwmkeys(&self, prefix: impl AsRef<[u8]>, max: Option<usize>) -> ArrayList {
        let prefix = prefix.as_ref();
        let max = max.unwrap_or(usize::MAX);
        let mut keys = ArrayList::new();
        for shard in &self.shards {
            if keys.len() >= max {
                break;
            }
            let shard = shard.read();
            for (key, _) in shard.iter() {
                if keys.len() >= max {
                    break;
                }
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys
    }

    /// Number of records over all shards
    pub fn rnum(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().rnum()).sum()
    }

    /// Key and value bytes over all shards
    pub fn msiz(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().msiz()).sum()
    }

    /// Number of records in each shard
    pub fn shard_sizes(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.read().rnum()).collect()
    }

    /// Remove every record
    pub fn vanish(&self) {
        for shard in &self.shards {
            shard.write().clear();
        }
    }

    /// Serialize every record in the [`OrderedMap::dump`] format
    ///
    /// Shards are dumped in index order, each under its own reader lock, so
    /// the result is not a snapshot of the whole map.
    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for shard in &self.shards {
            shard.read().dump_into(&mut out);
        }
        out
    }

    /// Rebuild a sharded map from dump output
    ///
    /// Accepts the output of either [`ShardedMap::dump`] or
    /// [`OrderedMap::dump`]. Repeated keys keep their first value.
    pub fn load(data: &[u8], config: ShardedMapConfig) -> Result<Self> {
        let map = Self::with_config(config)?;
        let mut pos = 0;
        while pos < data.len() {
            let (key, value) = OrderedMap::read_record(data, &mut pos)?;
            map.putkeep(key, value);
        }
        log::debug!("loaded {} records into {} shards", map.rnum(), map.shard_count());
        Ok(map)
    }

    /// Remove about `count` of the oldest records
    ///
    /// Every shard drops its `count / shard_count + 1` oldest records.
    pub fn cut_front(&self, count: usize) {
        let per_shard = count / self.shards.len() + 1;
        for shard in &self.shards {
            shard.write().cut_front(per_shard);
        }
    }
}

impl Default for ShardedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ShardedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedMap")
            .field("shard_count", &self.shards.len())
            .field("shard_sizes", &self.shard_sizes())
            .finish()
    }
}
