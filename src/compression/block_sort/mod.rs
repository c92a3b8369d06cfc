//! Block-sorting compression
//!
//! [`BlockSortCodec`] runs three stages over the input:
//!
//! 1. every block of `block_size` bytes is replaced by a two-byte big-endian
//!    primary index followed by the last column of its Burrows-Wheeler
//!    transform ([`bwt`])
//! 2. the whole staged buffer goes through a move-to-front transform
//!    ([`mtf`]), turning local repetition into runs of small ranks
//! 3. the ranks are Elias gamma coded into a bit stream ([`gamma`])
//!
//! Decoding runs the stages backwards. The output carries no header, so
//! both sides must use the same block size.
//!
//! # Examples
//!
//! ```rust
//! use memcab::compression::BlockSortCodec;
//!
//! let codec = BlockSortCodec::new();
//! let text = b"abracadabra abracadabra abracadabra".repeat(20);
//! let packed = codec.encode(&text);
//! assert!(packed.len() < text.len());
//! assert_eq!(codec.decode(&packed), text);
//! ```

pub mod bwt;
pub mod gamma;
pub mod mtf;

pub use bwt::{bwt_decode, bwt_encode};
pub use gamma::{gamma_decode, gamma_encode};
pub use mtf::{mtf_decode, mtf_encode};

use crate::config::block_sort::BlockSortConfig;
use crate::config::Config;
use crate::error::Result;

/// Size of the primary index written before each block
const INDEX_LEN: usize = 2;

/// BWT, move-to-front and gamma pipeline
#[derive(Debug, Clone, Default)]
pub struct BlockSortCodec {
    config: BlockSortConfig,
}

impl BlockSortCodec {
    /// Codec with 8192-byte blocks
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with a validated configuration
    pub fn with_config(config: BlockSortConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "block sort codec: block_size={} threshold={} levels={}",
            config.block_size,
            config.count_sort_threshold,
            config.count_sort_levels
        );
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &BlockSortConfig {
        &self.config
    }

    /// Compress `input`
    pub fn encode(&self, input: &[u8]) -> Vec<u8> {
        let block_size = self.config.block_size;
        let blocks = input.len() / block_size + 1;
        let mut staged = Vec::with_capacity(input.len() + blocks * INDEX_LEN);
        for block in input.chunks(block_size) {
            let at = staged.len();
            staged.extend_from_slice(&[0; INDEX_LEN]);
            let primary = bwt::encode_block(block, &mut staged, &self.config, true);
            // block_size is capped at u16::MAX by validation
            staged[at..at + INDEX_LEN].copy_from_slice(&(primary as u16).to_be_bytes());
        }
        mtf::mtf_encode(&mut staged);
        gamma::gamma_encode(&staged)
    }

    /// Decompress data produced by [`encode`](Self::encode)
    ///
    /// Corrupt input yields a best-effort result rather than an error.
    pub fn decode(&self, input: &[u8]) -> Vec<u8> {
        let mut staged = gamma::gamma_decode(input);
        mtf::mtf_decode(&mut staged);

        let mut out = Vec::with_capacity(staged.len());
        let mut rest = staged.as_slice();
        while !rest.is_empty() {
            if rest.len() < INDEX_LEN {
                log::warn!("block sort stream ends inside a primary index");
                break;
            }
            let primary = u16::from_be_bytes([rest[0], rest[1]]) as usize;
            let body = &rest[INDEX_LEN..];
            let usiz = body.len().min(self.config.block_size);
            out.extend_from_slice(&bwt::decode_block(
                &body[..usiz],
                primary,
                self.config.count_sort_threshold,
            ));
            rest = &body[usiz..];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let codec = BlockSortCodec::new();
        let packed = codec.encode(b"");
        assert!(codec.decode(&packed).is_empty());
    }

    #[test]
    fn test_round_trip_text() {
        let codec = BlockSortCodec::new();
        let text = b"It was the best of times, it was the worst of times. ".repeat(50);
        let packed = codec.encode(&text);
        assert!(packed.len() < text.len() / 2);
        assert_eq!(codec.decode(&packed), text);
    }

    #[test]
    fn test_multiple_blocks() {
        let codec = BlockSortCodec::new();
        let data: Vec<u8> = (0..20_000u32).map(|i| (i % 97 + i / 1000) as u8).collect();
        assert_eq!(codec.decode(&codec.encode(&data)), data);
    }

    #[test]
    fn test_exact_block_boundary() {
        let codec = BlockSortCodec::new();
        let data = vec![b'z'; 8192 * 2];
        assert_eq!(codec.decode(&codec.encode(&data)), data);
    }

    #[test]
    fn test_small_block_size() {
        let codec = BlockSortCodec::with_config(BlockSortConfig {
            block_size: 7,
            ..BlockSortConfig::default()
        })
        .unwrap();
        let text = b"a small block size splits this into many pieces";
        assert_eq!(codec.decode(&codec.encode(text)), text.to_vec());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = BlockSortConfig {
            block_size: 0,
            ..BlockSortConfig::default()
        };
        assert!(BlockSortCodec::with_config(bad).is_err());
    }

    #[test]
    fn test_binary_data() {
        let codec = BlockSortCodec::new();
        let data: Vec<u8> = (0..3000u32)
            .map(|i| (i.wrapping_mul(2_654_435_761) >> 13) as u8)
            .collect();
        assert_eq!(codec.decode(&codec.encode(&data)), data);
    }

    #[test]
    fn test_truncated_stream_does_not_panic() {
        let codec = BlockSortCodec::new();
        let packed = codec.encode(&b"truncate me please ".repeat(30));
        let decoded = codec.decode(&packed[..packed.len() / 2]);
        assert!(decoded.len() <= 19 * 30);
    }
}
