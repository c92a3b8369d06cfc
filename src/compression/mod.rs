//! Compression codecs behind a common interface
//!
//! The block-sorting codec ([`BlockSortCodec`]) and Packbits always exist.
//! Deflate, gzip and CRC-32 come from `flate2`/`crc32fast` and are only
//! compiled with the `zlib` feature; without it their entry points report
//! [`MemcabError::NotSupported`] instead of disappearing, so callers can
//! probe for them at run time.

pub mod block_sort;

pub use block_sort::{bwt_decode, bwt_encode, BlockSortCodec};

use crate::config::block_sort::BlockSortConfig;
use crate::encoding::{pack_decode, pack_encode};
use crate::error::{MemcabError, Result};
use std::fmt;

/// Compression algorithm types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// No compression
    None,
    /// BWT, move-to-front and gamma coding
    BlockSort,
    /// Run-length Packbits
    Packbits,
    /// zlib-wrapped deflate
    Deflate,
    /// gzip-wrapped deflate
    Gzip,
}

impl Algorithm {
    /// Whether this build can run the algorithm
    pub fn is_available(&self) -> bool {
        match self {
            Algorithm::None | Algorithm::BlockSort | Algorithm::Packbits => true,
            Algorithm::Deflate | Algorithm::Gzip => cfg!(feature = "zlib"),
        }
    }

    /// Short lowercase name
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::None => "none",
            Algorithm::BlockSort => "bwt",
            Algorithm::Packbits => "packbits",
            Algorithm::Deflate => "deflate",
            Algorithm::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Running totals over compress calls
#[derive(Debug, Clone, Default)]
pub struct CompressionStats {
    /// Total operations performed
    pub operations: u64,
    /// Total bytes processed
    pub bytes_processed: u64,
    /// Total bytes after compression
    pub bytes_compressed: u64,
}

impl CompressionStats {
    /// Output bytes per input byte, 0.0 before any input
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_processed == 0 {
            0.0
        } else {
            self.bytes_compressed as f64 / self.bytes_processed as f64
        }
    }

    /// Record one operation
    pub fn update(&mut self, input_size: usize, output_size: usize) {
        self.operations += 1;
        self.bytes_processed += input_size as u64;
        self.bytes_compressed += output_size as u64;
    }
}

/// Base trait for compression algorithms
pub trait Compressor: Send + Sync {
    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Decompress data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Get the algorithm type
    fn algorithm(&self) -> Algorithm;

    /// Compressed size over input size for a sample of `data`
    fn estimate_ratio(&self, data: &[u8]) -> f64 {
        if data.is_empty() {
            return 1.0;
        }
        let sample = &data[..data.len().min(4096)];
        match self.compress(sample) {
            Ok(compressed) => compressed.len() as f64 / sample.len() as f64,
            Err(_) => 1.0,
        }
    }
}

/// No-op compressor (pass-through)
pub struct NoCompressor;

impl Compressor for NoCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(data.to_vec())
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::None
    }
}

/// [`BlockSortCodec`] as a [`Compressor`]
#[derive(Debug, Clone, Default)]
pub struct BlockSortCompressor {
    codec: BlockSortCodec,
}

impl BlockSortCompressor {
    /// Compressor with the default block size
    pub fn new() -> Self {
        Self::default()
    }

    /// Compressor with a validated configuration
    pub fn with_config(config: BlockSortConfig) -> Result<Self> {
        Ok(Self {
            codec: BlockSortCodec::with_config(config)?,
        })
    }
}

impl Compressor for BlockSortCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.codec.encode(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.codec.decode(data))
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::BlockSort
    }
}

/// Packbits as a [`Compressor`]
pub struct PackbitsCompressor;

impl Compressor for PackbitsCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(pack_encode(data))
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(pack_decode(data))
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Packbits
    }
}

/// Default deflate level
pub const DEFAULT_DEFLATE_LEVEL: u32 = 6;

fn check_level(level: u32) -> Result<u32> {
    if level > 9 {
        return Err(MemcabError::invalid_parameter(format!(
            "deflate level must be 0..=9, got {}",
            level
        )));
    }
    Ok(level)
}

/// zlib stream compressor
#[derive(Debug, Clone, Copy)]
pub struct DeflateCompressor {
    #[cfg_attr(not(feature = "zlib"), allow(dead_code))]
    level: u32,
}

impl DeflateCompressor {
    /// Compressor at `level` (0..=9)
    pub fn new(level: u32) -> Result<Self> {
        Ok(Self {
            level: check_level(level)?,
        })
    }
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self {
            level: DEFAULT_DEFLATE_LEVEL,
        }
    }
}

impl Compressor for DeflateCompressor {
    fn compress(
        &self,
        #[cfg_attr(not(feature = "zlib"), allow(unused_variables))] data: &[u8],
    ) -> Result<Vec<u8>> {
        #[cfg(feature = "zlib")]
        {
            use flate2::write::ZlibEncoder;
            use std::io::Write;
            let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::new(self.level));
            encoder
                .write_all(data)
                .and_then(|_| encoder.finish())
                .map_err(|e| MemcabError::compression(format!("deflate compression failed: {}", e)))
        }
        #[cfg(not(feature = "zlib"))]
        {
            Err(MemcabError::not_supported("deflate compression not enabled"))
        }
    }

    fn decompress(
        &self,
        #[cfg_attr(not(feature = "zlib"), allow(unused_variables))] data: &[u8],
    ) -> Result<Vec<u8>> {
        #[cfg(feature = "zlib")]
        {
            use flate2::read::ZlibDecoder;
            use std::io::Read;
            let mut out = Vec::with_capacity(data.len() * 3);
            ZlibDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| {
                    MemcabError::compression(format!("deflate decompression failed: {}", e))
                })?;
            Ok(out)
        }
        #[cfg(not(feature = "zlib"))]
        {
            Err(MemcabError::not_supported("deflate decompression not enabled"))
        }
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Deflate
    }
}

/// gzip member compressor
#[derive(Debug, Clone, Copy)]
pub struct GzipCompressor {
    #[cfg_attr(not(feature = "zlib"), allow(dead_code))]
    level: u32,
}

impl GzipCompressor {
    /// Compressor at `level` (0..=9)
    pub fn new(level: u32) -> Result<Self> {
        Ok(Self {
            level: check_level(level)?,
        })
    }
}

impl Default for GzipCompressor {
    fn default() -> Self {
        Self {
            level: DEFAULT_DEFLATE_LEVEL,
        }
    }
}

impl Compressor for GzipCompressor {
    fn compress(
        &self,
        #[cfg_attr(not(feature = "zlib"), allow(unused_variables))] data: &[u8],
    ) -> Result<Vec<u8>> {
        #[cfg(feature = "zlib")]
        {
            use flate2::write::GzEncoder;
            use std::io::Write;
            let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::new(self.level));
            encoder
                .write_all(data)
                .and_then(|_| encoder.finish())
                .map_err(|e| MemcabError::compression(format!("gzip compression failed: {}", e)))
        }
        #[cfg(not(feature = "zlib"))]
        {
            Err(MemcabError::not_supported("gzip compression not enabled"))
        }
    }

    fn decompress(
        &self,
        #[cfg_attr(not(feature = "zlib"), allow(unused_variables))] data: &[u8],
    ) -> Result<Vec<u8>> {
        #[cfg(feature = "zlib")]
        {
            use flate2::read::GzDecoder;
            use std::io::Read;
            let mut out = Vec::with_capacity(data.len() * 3);
            GzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| {
                    MemcabError::compression(format!("gzip decompression failed: {}", e))
                })?;
            Ok(out)
        }
        #[cfg(not(feature = "zlib"))]
        {
            Err(MemcabError::not_supported("gzip decompression not enabled"))
        }
    }

    fn algorithm(&self) -> Algorithm {
        Algorithm::Gzip
    }
}

/// CRC-32 (IEEE) checksum of `data`
pub fn crc32(
    #[cfg_attr(not(feature = "zlib"), allow(unused_variables))] data: &[u8],
) -> Result<u32> {
    #[cfg(feature = "zlib")]
    {
        Ok(crc32fast::hash(data))
    }
    #[cfg(not(feature = "zlib"))]
    {
        Err(MemcabError::not_supported("crc32 not enabled"))
    }
}

/// Factory for creating compressors
pub struct CompressorFactory;

impl CompressorFactory {
    /// Create a compressor for the given algorithm
    pub fn create(algorithm: Algorithm) -> Result<Box<dyn Compressor>> {
        if !algorithm.is_available() {
            return Err(MemcabError::not_supported(format!(
                "algorithm not compiled in: {}",
                algorithm
            )));
        }
        match algorithm {
            Algorithm::None => Ok(Box::new(NoCompressor)),
            Algorithm::BlockSort => Ok(Box::new(BlockSortCompressor::new())),
            Algorithm::Packbits => Ok(Box::new(PackbitsCompressor)),
            Algorithm::Deflate => Ok(Box::new(DeflateCompressor::default())),
            Algorithm::Gzip => Ok(Box::new(GzipCompressor::default())),
        }
    }

    /// Algorithms this build can create
    pub fn available_algorithms() -> Vec<Algorithm> {
        [
            Algorithm::None,
            Algorithm::BlockSort,
            Algorithm::Packbits,
            Algorithm::Deflate,
            Algorithm::Gzip,
        ]
        .into_iter()
        .filter(Algorithm::is_available)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<u8> {
        b"test data that should compress well with repeated patterns ".repeat(40)
    }

    #[test]
    fn test_no_compressor() {
        let compressor = NoCompressor;
        let data = b"test data";

        let compressed = compressor.compress(data).unwrap();
        assert_eq!(compressed, data);

        let decompressed = compressor.decompress(&compressed).unwrap();
        assert_eq!(decompressed, data);

        assert_eq!(compressor.algorithm(), Algorithm::None);
    }

    #[test]
    fn test_in_crate_compressors() {
        let data = sample();
        for compressor in [
            Box::new(BlockSortCompressor::new()) as Box<dyn Compressor>,
            Box::new(PackbitsCompressor),
        ] {
            let compressed = compressor.compress(&data).unwrap();
            assert_eq!(compressor.decompress(&compressed).unwrap(), data);
        }
        assert!(BlockSortCompressor::new().estimate_ratio(&data) < 0.5);
    }

    #[test]
    fn test_compression_stats() {
        let mut stats = CompressionStats::default();
        assert_eq!(stats.compression_ratio(), 0.0);

        stats.update(1000, 500);
        assert_eq!(stats.operations, 1);
        assert_eq!(stats.compression_ratio(), 0.5);

        stats.update(2000, 800);
        assert_eq!(stats.operations, 2);
        assert!(stats.compression_ratio() < 0.5);
    }

    #[test]
    fn test_compressor_factory() {
        let algorithms = CompressorFactory::available_algorithms();
        assert!(algorithms.contains(&Algorithm::None));
        assert!(algorithms.contains(&Algorithm::BlockSort));
        assert!(algorithms.contains(&Algorithm::Packbits));
        for algorithm in algorithms {
            let compressor = CompressorFactory::create(algorithm).unwrap();
            assert_eq!(compressor.algorithm(), algorithm);
        }
    }

    #[test]
    fn test_invalid_level() {
        assert!(DeflateCompressor::new(10).is_err());
        assert!(GzipCompressor::new(9).is_ok());
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_zlib_backends() {
        let data = sample();
        for compressor in [
            Box::new(DeflateCompressor::default()) as Box<dyn Compressor>,
            Box::new(GzipCompressor::new(9).unwrap()),
        ] {
            let compressed = compressor.compress(&data).unwrap();
            assert!(compressed.len() < data.len());
            assert_eq!(compressor.decompress(&compressed).unwrap(), data);
        }
        let gz = GzipCompressor::default().compress(b"x").unwrap();
        assert_eq!(&gz[..2], &[0x1f, 0x8b]);
        assert!(DeflateCompressor::default().decompress(b"not zlib").is_err());
    }

    #[cfg(feature = "zlib")]
    #[test]
    fn test_crc32() {
        assert_eq!(crc32(b"").unwrap(), 0);
        assert_eq!(crc32(b"123456789").unwrap(), 0xcbf4_3926);
    }

    #[cfg(not(feature = "zlib"))]
    #[test]
    fn test_zlib_not_supported() {
        assert!(matches!(
            crc32(b"abc"),
            Err(MemcabError::NotSupported { .. })
        ));
        assert!(CompressorFactory::create(Algorithm::Gzip).is_err());
        assert!(DeflateCompressor::default().compress(b"abc").is_err());
    }
}
