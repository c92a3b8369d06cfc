//! Multiplicative string hashes used by the record maps
//!
//! Three independent hashes are used:
//!
//! - [`bucket_hash`] picks the bucket of an [`OrderedMap`](super::OrderedMap)
//! - [`tree_hash`] orders records inside a bucket tree; it runs over the key
//!   in reverse so keys sharing a bucket rarely share a tree hash
//! - [`shard_hash`] routes a key to a shard of a
//!   [`ShardedMap`](super::ShardedMap), also over the reversed key
//!
//! All of them are plain 32-bit wrapping arithmetic and therefore stable
//! across platforms and runs.
//!
//! # Usage
//!
//! ```rust
//! use memcab::hash_map::{bucket_hash, shard_hash};
//!
//! let bucket = bucket_hash(b"apple") as usize % 4093;
//! assert!(bucket < 4093);
//! assert_eq!(shard_hash(b"apple", 8), shard_hash(b"apple", 8));
//! ```

/// Seed of [`bucket_hash`]
pub const BUCKET_HASH_SEED: u32 = 19_780_211;

/// Seed of [`tree_hash`]
pub const TREE_HASH_SEED: u32 = 0x1357_9bdf;

/// Seed of [`shard_hash`]
pub const SHARD_HASH_SEED: u32 = 0x2007_1123;

/// Forward hash with multiplier 37
#[inline]
pub fn bucket_hash(key: &[u8]) -> u32 {
    key.iter()
        .fold(BUCKET_HASH_SEED, |h, &b| h.wrapping_mul(37).wrapping_add(b as u32))
}

/// Reverse hash with multiplier 31
#[inline]
pub fn tree_hash(key: &[u8]) -> u32 {
    key.iter()
        .rev()
        .fold(TREE_HASH_SEED, |h, &b| h.wrapping_mul(31).wrapping_add(b as u32))
}

/// Shard index of `key` among `shard_count` shards
///
/// `shard_count` must be a power of two; the hash is masked, not reduced.
#[inline]
pub fn shard_hash(key: &[u8], shard_count: usize) -> usize {
    debug_assert!(shard_count.is_power_of_two());
    let h = key
        .iter()
        .rev()
        .fold(SHARD_HASH_SEED, |h, &b| h.wrapping_mul(33).wrapping_add(b as u32));
    h as usize & (shard_count - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_is_seed() {
        assert_eq!(bucket_hash(b""), BUCKET_HASH_SEED);
        assert_eq!(tree_hash(b""), TREE_HASH_SEED);
        assert_eq!(shard_hash(b"", 1), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(bucket_hash(b"a"), BUCKET_HASH_SEED.wrapping_mul(37) + 97);
        assert_eq!(
            tree_hash(b"ab"),
            (TREE_HASH_SEED.wrapping_mul(31).wrapping_add(98))
                .wrapping_mul(31)
                .wrapping_add(97)
        );
    }

    #[test]
    fn test_direction() {
        // the tree hash reads the key backwards, the bucket hash forwards
        assert_ne!(tree_hash(b"xy"), tree_hash(b"yx"));
        assert_eq!(tree_hash(b"xy"), {
            let mut h = TREE_HASH_SEED;
            for &b in b"yx" {
                h = h.wrapping_mul(31).wrapping_add(b as u32);
            }
            h
        });
    }

    #[test]
    fn test_shard_hash_in_range() {
        for shards in [1usize, 2, 8, 64] {
            for i in 0..500 {
                let key = format!("key-{}", i);
                assert!(shard_hash(key.as_bytes(), shards) < shards);
            }
        }
    }

    #[test]
    fn test_shard_hash_spreads() {
        let mut counts = [0usize; 8];
        for i in 0..8000 {
            counts[shard_hash(i.to_string().as_bytes(), 8)] += 1;
        }
        assert!(counts.iter().all(|&c| c > 250), "{:?}", counts);
    }
}
