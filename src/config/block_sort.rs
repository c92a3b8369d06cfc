//! Configuration of the block-sorting codec.

use super::{load_json, parse_env_var, save_json, Config};
use crate::error::{MemcabError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default BWT block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Largest block size whose primary index fits the 16-bit block header
pub const MAX_BLOCK_SIZE: usize = u16::MAX as usize;

/// Configuration of a [`BlockSortCodec`](crate::compression::BlockSortCodec).
///
/// The encoder and the decoder of a stream must use the same `block_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSortConfig {
    /// Bytes per BWT block
    pub block_size: usize,
    /// Buckets at least this large are split by counting sort
    pub count_sort_threshold: usize,
    /// Byte positions refined by counting sort before falling back
    pub count_sort_levels: usize,
}

impl Default for BlockSortConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            count_sort_threshold: 64,
            count_sort_levels: 4,
        }
    }
}

impl Config for BlockSortConfig {
    fn validate(&self) -> Result<()> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(MemcabError::configuration(format!(
                "block_size must be between 1 and {}",
                MAX_BLOCK_SIZE
            )));
        }
        if self.count_sort_threshold < 2 {
            return Err(MemcabError::configuration("count_sort_threshold must be at least 2"));
        }
        if self.count_sort_levels > 16 {
            return Err(MemcabError::configuration("count_sort_levels must be at most 16"));
        }
        Ok(())
    }

    fn from_env_with_prefix(prefix: &str) -> Result<Self> {
        let mut config = Self::default();
        config.block_size =
            parse_env_var(&format!("{}BLOCK_SORT_BLOCK_SIZE", prefix), config.block_size);
        config.count_sort_threshold = parse_env_var(
            &format!("{}BLOCK_SORT_COUNT_SORT_THRESHOLD", prefix),
            config.count_sort_threshold,
        );
        config.count_sort_levels = parse_env_var(
            &format!("{}BLOCK_SORT_COUNT_SORT_LEVELS", prefix),
            config.count_sort_levels,
        );
        config.validate()?;
        Ok(config)
    }

    fn performance_preset() -> Self {
        Self {
            block_size: 32768,
            count_sort_threshold: 32,
            count_sort_levels: 6,
        }
    }

    fn memory_preset() -> Self {
        Self {
            block_size: 4096,
            count_sort_threshold: 64,
            count_sort_levels: 2,
        }
    }

    fn realtime_preset() -> Self {
        Self {
            block_size: 2048,
            count_sort_threshold: 32,
            count_sort_levels: 4,
        }
    }

    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(self, path, "block sort")
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = load_json(path, "block sort")?;
        config.validate()?;
        Ok(config)
    }
}
