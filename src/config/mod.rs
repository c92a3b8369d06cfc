//! Configuration APIs for memcab
//!
//! Every tunable component has a configuration struct implementing the
//! [`Config`] trait, which provides validation, initialization from
//! environment variables, presets, and JSON persistence.
//!
//! # Configuration Types
//!
//! - [`MapConfig`]: bucket count and concatenation units of an ordered map
//! - [`ShardedMapConfig`]: shard count and bucket budget of a sharded map
//! - [`BlockSortConfig`]: block size and sort tuning of the BWT codec
//!
//! # Preset Configurations
//!
//! ```rust
//! use memcab::config::{Config, ShardedMapConfig};
//!
//! let config = ShardedMapConfig::performance_preset();
//! assert!(config.validate().is_ok());
//! assert!(config.shard_count.is_power_of_two());
//! ```
//!
//! # Environment Initialization
//!
//! ```rust
//! use memcab::config::{BlockSortConfig, Config};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // reads MEMCAB_BLOCK_SORT_BLOCK_SIZE and friends
//! let config = BlockSortConfig::from_env()?;
//!
//! // same variables under another prefix
//! let config = BlockSortConfig::from_env_with_prefix("MYAPP_")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{MemcabError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::env;
use std::fmt;
use std::path::Path;

pub mod block_sort;
pub mod map;

#[cfg(test)]
mod tests;

pub use block_sort::BlockSortConfig;
pub use map::{MapConfig, ShardedMapConfig};

/// Prefix of the environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "MEMCAB_";

/// Common configuration trait providing validation, environment initialization,
/// and preset management functionality.
pub trait Config: Clone + fmt::Debug {
    /// Validate the configuration for correctness and consistency.
    fn validate(&self) -> Result<()>;

    /// Initialize configuration from environment variables.
    ///
    /// Variables use the format `MEMCAB_{COMPONENT}_{FIELD}`, for example
    /// `MEMCAB_SHARDED_SHARD_COUNT=16`. Unset or unparsable variables keep
    /// their default value.
    fn from_env() -> Result<Self>
    where
        Self: Default,
    {
        Self::from_env_with_prefix(ENV_PREFIX)
    }

    /// Initialize configuration from environment variables with a custom prefix.
    fn from_env_with_prefix(prefix: &str) -> Result<Self>
    where
        Self: Default;

    /// Preset favouring throughput over memory.
    fn performance_preset() -> Self;

    /// Preset favouring a small footprint.
    fn memory_preset() -> Self;

    /// Preset favouring short, predictable operations.
    fn realtime_preset() -> Self;

    /// Balanced preset, the default configuration.
    fn balanced_preset() -> Self
    where
        Self: Default,
    {
        Self::default()
    }

    /// Save configuration to a JSON file.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Load and validate configuration from a JSON file.
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self>;
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or does not parse.
pub fn parse_env_var<T>(var_name: &str, default: T) -> T
where
    T: std::str::FromStr + Clone,
{
    env::var(var_name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean environment variable.
///
/// Accepts "true", "1", "yes", "on" (case-insensitive) as true and everything
/// else as false.
pub fn parse_env_bool(var_name: &str, default: bool) -> bool {
    env::var(var_name)
        .ok()
        .map(|s| {
            let s = s.to_lowercase();
            matches!(s.as_str(), "true" | "1" | "yes" | "on")
        })
        .unwrap_or(default)
}

pub(crate) fn save_json<T: Serialize, P: AsRef<Path>>(
    config: &T,
    path: P,
    what: &str,
) -> Result<()> {
    let serialized = serde_json::to_string_pretty(config).map_err(|e| {
        MemcabError::configuration(format!("Failed to serialize {} config: {}", what, e))
    })?;
    std::fs::write(path, serialized).map_err(|e| {
        MemcabError::configuration(format!("Failed to write {} config file: {}", what, e))
    })?;
    Ok(())
}

pub(crate) fn load_json<T: DeserializeOwned, P: AsRef<Path>>(path: P, what: &str) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        MemcabError::configuration(format!("Failed to read {} config file: {}", what, e))
    })?;
    let config = serde_json::from_str(&content).map_err(|e| {
        MemcabError::configuration(format!("Failed to parse {} config file: {}", what, e))
    })?;
    log::debug!("loaded {} config from {}", what, path.display());
    Ok(config)
}
