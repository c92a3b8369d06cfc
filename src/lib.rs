//! # Memcab: On-Memory Record Maps and Byte Codecs
//!
//! This crate provides byte-string record maps for caches and on-memory
//! databases, together with the compression and text codecs used to persist
//! or ship their contents.
//!
//! ## Key Features
//!
//! - **Ordered Hash Map**: insertion-ordered map with tree-chained buckets,
//!   move-to-tail promotion, front trimming and a compact dump format
//! - **Sharded Concurrent Map**: the same map split over reader-writer locked
//!   shards for use from many threads
//! - **Containers**: an extensible byte buffer and a double-ended byte list
//! - **Block-Sort Compression**: BWT, move-to-front and Elias gamma coding
//! - **Simple Codecs**: Packbits, Base64, Quoted-Printable, MIME words, URL,
//!   BER integers and XML
//! - **Optional Backends**: deflate, gzip and CRC-32 behind the `zlib` feature
//!
//! ## Quick Start
//!
//! ```rust
//! use memcab::{BlockSortCodec, OrderedMap, ShardedMap};
//!
//! // Ordered map of byte strings
//! let mut map = OrderedMap::new();
//! map.put("apple", "red");
//! map.put("banana", "yellow");
//! assert_eq!(map.get("apple"), Some(&b"red"[..]));
//!
//! // Dump and reload
//! let restored = OrderedMap::load(&map.dump()).unwrap();
//! assert_eq!(restored.len(), 2);
//!
//! // Shared between threads
//! let shared = ShardedMap::new();
//! shared.put("counter", "");
//! assert_eq!(shared.add_int("counter", 5), 5);
//!
//! // Block-sort compression
//! let codec = BlockSortCodec::new();
//! let packed = codec.encode(&map.dump());
//! assert_eq!(codec.decode(&packed), map.dump());
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod compression;
pub mod config;
pub mod containers;
pub mod encoding;
pub mod error;
pub mod hash_map;
pub mod io;
pub mod system;

// Re-export core types
pub use containers::{ArrayList, ExtensibleBuffer};
pub use error::{MemcabError, Result};
pub use hash_map::{OrderedMap, ShardedMap};
pub use io::VarNum;

// Re-export configuration
pub use config::block_sort::BlockSortConfig;
pub use config::map::{MapConfig, ShardedMapConfig};
pub use config::Config;

// Re-export compression
pub use compression::{
    bwt_decode, bwt_encode, crc32, Algorithm, BlockSortCodec, BlockSortCompressor,
    CompressionStats, Compressor, CompressorFactory, DeflateCompressor, GzipCompressor,
    NoCompressor, PackbitsCompressor,
};

pub use system::{Context, FatalHandler};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether the deflate, gzip and CRC-32 backends were compiled in
pub fn has_zlib_support() -> bool {
    cfg!(feature = "zlib")
}

/// Initialize the library
///
/// Forces the process-wide [`Context`] into existence.
pub fn init() {
    let _ = Context::global();
    log::debug!("Initializing memcab v{}", VERSION);
}
