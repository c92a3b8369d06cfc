//! Configuration of the record maps.

use super::{load_json, parse_env_var, save_json, Config};
use crate::error::{MemcabError, Result};
use crate::hash_map::ordered_map::{DEFAULT_BUCKET_COUNT, LARGE_CAT_UNIT, SMALL_CAT_UNIT};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default total bucket count of a sharded map
pub const DEFAULT_SHARDED_BUCKET_COUNT: usize = 65536;

/// Default number of shards
pub const DEFAULT_SHARD_COUNT: usize = 8;

/// Largest shard count accepted
pub const MAX_SHARD_COUNT: usize = 256;

/// Extra buckets given to every shard on top of its share
const SHARD_BUCKET_PAD: usize = 17;

/// Configuration of an [`OrderedMap`](crate::hash_map::OrderedMap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Number of hash buckets
    pub bucket_count: usize,
    /// Allocation unit for concatenated values of up to this many bytes
    pub small_cat_unit: usize,
    /// Allocation unit for longer concatenated values
    pub large_cat_unit: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            small_cat_unit: SMALL_CAT_UNIT,
            large_cat_unit: LARGE_CAT_UNIT,
        }
    }
}

impl Config for MapConfig {
    fn validate(&self) -> Result<()> {
        if self.bucket_count == 0 {
            return Err(MemcabError::configuration("bucket_count must be greater than 0"));
        }
        if self.small_cat_unit == 0 {
            return Err(MemcabError::configuration("small_cat_unit must be greater than 0"));
        }
        if self.large_cat_unit < self.small_cat_unit {
            return Err(MemcabError::configuration(format!(
                "large_cat_unit ({}) must not be smaller than small_cat_unit ({})",
                self.large_cat_unit, self.small_cat_unit
            )));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.bucket_count =
            parse_env_var(&format!("{}MAP_BUCKET_COUNT", prefix), config.bucket_count);
        config.small_cat_unit =
            parse_env_var(&format!("{}MAP_SMALL_CAT_UNIT", prefix), config.small_cat_unit);
        config.large_cat_unit =
            parse_env_var(&format!("{}MAP_LARGE_CAT_UNIT", prefix), config.large_cat_unit);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            bucket_count: 65521,
            small_cat_unit: 128,
            large_cat_unit: 1024,
        }
    }

    fn memory_preset() -> Self {
        Self {
            bucket_count: 509,
            small_cat_unit: 16,
            large_cat_unit: 64,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            bucket_count: 16381,
            small_cat_unit: 64,
            large_cat_unit: 512,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path, "map")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = load_json(path, "map")?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration of a [`ShardedMap`](crate::hash_map::ShardedMap).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardedMapConfig {
    /// Number of shards, a power of two
    pub shard_count: usize,
    /// Total bucket count spread over the shards; 0 selects the default
    pub bucket_count: usize,
}

impl ShardedMapConfig {
    /// Buckets allocated to each shard
    pub fn buckets_per_shard(&self) -> usize {
        let total = if self.bucket_count == 0 {
            DEFAULT_SHARDED_BUCKET_COUNT
        } else {
            self.bucket_count
        };
        total / self.shard_count.max(1) + SHARD_BUCKET_PAD
    }
}

impl Default for ShardedMapConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            bucket_count: DEFAULT_SHARDED_BUCKET_COUNT,
        }
    }
}

impl Config for ShardedMapConfig {
    fn validate(&self) -> Result<()> {
        if self.shard_count == 0 || self.shard_count > MAX_SHARD_COUNT {
            return Err(MemcabError::configuration(format!(
                "shard_count must be between 1 and {}",
                MAX_SHARD_COUNT
            )));
        }
        if !self.shard_count.is_power_of_two() {
            return Err(MemcabError::configuration("shard_count must be a power of 2"));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.shard_count =
            parse_env_var(&format!("{}SHARDED_SHARD_COUNT", prefix), config.shard_count);
        config.bucket_count =
            parse_env_var(&format!("{}SHARDED_BUCKET_COUNT", prefix), config.bucket_count);
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            shard_count: 32,
            bucket_count: 1 << 20,
        }
    }

    fn memory_preset() -> Self {
        Self {
            shard_count: 4,
            bucket_count: 4096,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            shard_count: 16,
            bucket_count: DEFAULT_SHARDED_BUCKET_COUNT,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path, "sharded map")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = load_json(path, "sharded map")?;
        config.validate()?;
        Ok(config)
    }
}
