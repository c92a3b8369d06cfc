//! Integration tests for the configuration system.

use super::*;
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_all_config_defaults() {
    assert!(MapConfig::default().validate().is_ok());
    assert!(ShardedMapConfig::default().validate().is_ok());
    assert!(BlockSortConfig::default().validate().is_ok());

    assert_eq!(MapConfig::default().bucket_count, 4093);
    assert_eq!(ShardedMapConfig::default().shard_count, 8);
    assert_eq!(BlockSortConfig::default().block_size, 8192);
}

#[test]
fn test_all_presets_valid() {
    assert!(MapConfig::performance_preset().validate().is_ok());
    assert!(MapConfig::memory_preset().validate().is_ok());
    assert!(MapConfig::realtime_preset().validate().is_ok());
    assert!(MapConfig::balanced_preset().validate().is_ok());

    assert!(ShardedMapConfig::performance_preset().validate().is_ok());
    assert!(ShardedMapConfig::memory_preset().validate().is_ok());
    assert!(ShardedMapConfig::realtime_preset().validate().is_ok());
    assert!(ShardedMapConfig::balanced_preset().validate().is_ok());

    assert!(BlockSortConfig::performance_preset().validate().is_ok());
    assert!(BlockSortConfig::memory_preset().validate().is_ok());
    assert!(BlockSortConfig::realtime_preset().validate().is_ok());
    assert!(BlockSortConfig::balanced_preset().validate().is_ok());
}

#[test]
fn test_preset_characteristics() {
    let perf = ShardedMapConfig::performance_preset();
    let mem = ShardedMapConfig::memory_preset();
    assert!(perf.shard_count > mem.shard_count);
    assert!(perf.bucket_count > mem.bucket_count);

    assert!(
        MapConfig::memory_preset().bucket_count < MapConfig::performance_preset().bucket_count
    );
    assert!(
        BlockSortConfig::realtime_preset().block_size
            < BlockSortConfig::performance_preset().block_size
    );
}

#[test]
fn test_map_config_validation() {
    let mut config = MapConfig::default();
    config.bucket_count = 0;
    assert!(config.validate().is_err());

    let mut config = MapConfig::default();
    config.large_cat_unit = config.small_cat_unit - 1;
    let err = config.validate().unwrap_err();
    assert_eq!(err.category(), "config");
}

#[test]
fn test_sharded_config_validation() {
    for bad in [0usize, 3, 12, 512] {
        let config = ShardedMapConfig {
            shard_count: bad,
            bucket_count: 0,
        };
        assert!(config.validate().is_err(), "shard_count {} accepted", bad);
    }
    for good in [1usize, 2, 8, 256] {
        let config = ShardedMapConfig {
            shard_count: good,
            bucket_count: 0,
        };
        assert!(config.validate().is_ok());
    }
}

#[test]
fn test_buckets_per_shard() {
    let config = ShardedMapConfig::default();
    assert_eq!(config.buckets_per_shard(), 65536 / 8 + 17);

    let config = ShardedMapConfig {
        shard_count: 2,
        bucket_count: 0,
    };
    assert_eq!(config.buckets_per_shard(), 65536 / 2 + 17);
}

#[test]
fn test_block_sort_validation() {
    let mut config = BlockSortConfig::default();
    config.block_size = 65536;
    assert!(config.validate().is_err());
    config.block_size = 65535;
    assert!(config.validate().is_ok());
    config.block_size = 0;
    assert!(config.validate().is_err());

    let mut config = BlockSortConfig::default();
    config.count_sort_threshold = 1;
    assert!(config.validate().is_err());
}

#[test]
fn test_environment_variable_parsing() {
    env::set_var("CFGTEST_MAP_BUCKET_COUNT", "1021");
    env::set_var("CFGTEST_SHARDED_SHARD_COUNT", "16");
    env::set_var("CFGTEST_BLOCK_SORT_BLOCK_SIZE", " 4096 ");
    env::set_var("CFGTEST_BLOCK_SORT_COUNT_SORT_LEVELS", "not a number");

    let map = MapConfig::from_env_with_prefix("CFGTEST_").unwrap();
    assert_eq!(map.bucket_count, 1021);
    assert_eq!(map.small_cat_unit, 52);

    let sharded = ShardedMapConfig::from_env_with_prefix("CFGTEST_").unwrap();
    assert_eq!(sharded.shard_count, 16);

    let block = BlockSortConfig::from_env_with_prefix("CFGTEST_").unwrap();
    assert_eq!(block.block_size, 4096);
    assert_eq!(block.count_sort_levels, 4);

    env::remove_var("CFGTEST_MAP_BUCKET_COUNT");
    env::remove_var("CFGTEST_SHARDED_SHARD_COUNT");
    env::remove_var("CFGTEST_BLOCK_SORT_BLOCK_SIZE");
    env::remove_var("CFGTEST_BLOCK_SORT_COUNT_SORT_LEVELS");
}

#[test]
fn test_environment_rejects_invalid() {
    env::set_var("CFGBAD_SHARDED_SHARD_COUNT", "6");
    assert!(ShardedMapConfig::from_env_with_prefix("CFGBAD_").is_err());
    env::remove_var("CFGBAD_SHARDED_SHARD_COUNT");
}

#[test]
fn test_parse_env_bool() {
    env::set_var("CFGBOOL_ON", "Yes");
    env::set_var("CFGBOOL_OFF", "nope");
    assert!(parse_env_bool("CFGBOOL_ON", false));
    assert!(!parse_env_bool("CFGBOOL_OFF", true));
    assert!(parse_env_bool("CFGBOOL_UNSET", true));
    env::remove_var("CFGBOOL_ON");
    env::remove_var("CFGBOOL_OFF");
}

#[test]
fn test_file_round_trip() {
    let dir = tempdir().unwrap();

    let path = dir.path().join("map.json");
    let config = MapConfig::performance_preset();
    config.save_to_file(&path).unwrap();
    assert_eq!(MapConfig::load_from_file(&path).unwrap(), config);

    let path = dir.path().join("sharded.json");
    let config = ShardedMapConfig::memory_preset();
    config.save_to_file(&path).unwrap();
    assert_eq!(ShardedMapConfig::load_from_file(&path).unwrap(), config);

    let path = dir.path().join("block.json");
    let config = BlockSortConfig::realtime_preset();
    config.save_to_file(&path).unwrap();
    assert_eq!(BlockSortConfig::load_from_file(&path).unwrap(), config);
}

#[test]
fn test_file_errors() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(MapConfig::load_from_file(&missing).is_err());

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{ not json").unwrap();
    let err = BlockSortConfig::load_from_file(&garbage).unwrap_err();
    assert_eq!(err.category(), "config");

    let invalid = dir.path().join("invalid.json");
    fs::write(&invalid, r#"{"shard_count": 3, "bucket_count": 0}"#).unwrap();
    assert!(ShardedMapConfig::load_from_file(&invalid).is_err());
}
