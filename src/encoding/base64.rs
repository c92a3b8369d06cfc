//! Base64 encoding on top of the `base64` crate
//!
//! Encoding is standard RFC 4648. Decoding comes in two flavours: the strict
//! [`Base64Codec::decode`] that rejects malformed input, and the lenient
//! [`base64_decode`] used by the MIME layer, which ignores characters outside
//! the alphabet and stops at the first padding group.

use crate::error::{MemcabError, Result};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

/// Base64 alphabet and padding selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Base64Config {
    /// Use the URL-safe alphabet (RFC 4648 Section 5)
    pub url_safe: bool,
    /// Emit `=` padding when encoding
    pub padding: bool,
}

impl Default for Base64Config {
    fn default() -> Self {
        Self {
            url_safe: false,
            padding: true,
        }
    }
}

/// Configured Base64 encoder/decoder
#[derive(Debug, Clone)]
pub struct Base64Codec {
    config: Base64Config,
    engine: GeneralPurpose,
}

impl Base64Codec {
    /// Standard alphabet with padding
    pub fn new() -> Self {
        Self::with_config(Base64Config::default())
    }

    /// Codec with an explicit alphabet and padding choice
    pub fn with_config(config: Base64Config) -> Self {
        let chars = if config.url_safe {
            &alphabet::URL_SAFE
        } else {
            &alphabet::STANDARD
        };
        let engine_config = GeneralPurposeConfig::new()
            .with_encode_padding(config.padding)
            .with_decode_padding_mode(if config.padding {
                DecodePaddingMode::RequireCanonical
            } else {
                DecodePaddingMode::RequireNone
            });
        Self {
            config,
            engine: GeneralPurpose::new(chars, engine_config),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &Base64Config {
        &self.config
    }

    /// Encode binary data
    pub fn encode(&self, input: &[u8]) -> String {
        self.engine.encode(input)
    }

    /// Decode, rejecting anything that is not canonical Base64
    pub fn decode(&self, input: &str) -> Result<Vec<u8>> {
        self.engine
            .decode(input)
            .map_err(|e| MemcabError::invalid_data(format!("base64 decode error: {}", e)))
    }
}

impl Default for Base64Codec {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine used for lenient decoding: padding optional, trailing bits ignored
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode with the standard alphabet and padding
///
/// ```rust
/// use memcab::encoding::{base64_decode, base64_encode};
///
/// assert_eq!(base64_encode(b"hello"), "aGVsbG8=");
/// assert_eq!(base64_decode("aGVs\r\nbG8="), b"hello".to_vec());
/// ```
pub fn base64_encode(input: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(input)
}

/// Decode leniently
///
/// Characters outside `A-Z a-z 0-9 + /` are skipped. Decoding ends at the
/// first `=`, and a trailing symbol that cannot form a byte is dropped.
pub fn base64_decode(input: &str) -> Vec<u8> {
    let mut symbols = Vec::with_capacity(input.len());
    for &c in input.as_bytes() {
        match c {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => symbols.push(c),
            b'=' => break,
            _ => {}
        }
    }
    if symbols.len() % 4 == 1 {
        symbols.pop();
    }
    match LENIENT.decode(&symbols) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("lenient base64 decode failed: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_vectors() {
        let cases: [(&[u8], &str); 7] = [
            (b"", ""),
            (b"f", "Zg=="),
            (b"fo", "Zm8="),
            (b"foo", "Zm9v"),
            (b"foob", "Zm9vYg=="),
            (b"fooba", "Zm9vYmE="),
            (b"foobar", "Zm9vYmFy"),
        ];
        for (plain, encoded) in cases {
            assert_eq!(base64_encode(plain), encoded);
            assert_eq!(base64_decode(encoded), plain.to_vec());
        }
    }

    #[test]
    fn test_lenient_decode() {
        assert_eq!(base64_decode("Zm9v\nYmFy"), b"foobar".to_vec());
        assert_eq!(base64_decode(" Zm9vYg "), b"foob".to_vec());
        assert_eq!(base64_decode("Zm8=ignored"), b"fo".to_vec());
        assert_eq!(base64_decode("Zm9vY"), b"foo".to_vec());
        assert_eq!(base64_decode("!!!"), Vec::<u8>::new());
    }

    #[test]
    fn test_binary_round_trip() {
        let data: Vec<u8> = (0..=255u8).rev().collect();
        assert_eq!(base64_decode(&base64_encode(&data)), data);
    }

    #[test]
    fn test_codec_url_safe() {
        let codec = Base64Codec::with_config(Base64Config {
            url_safe: true,
            padding: false,
        });
        let encoded = codec.encode(&[0xfb, 0xff]);
        assert_eq!(encoded, "-_8");
        assert_eq!(codec.decode(&encoded).unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_codec_strict_rejects_garbage() {
        let codec = Base64Codec::new();
        assert!(codec.decode("Zm9v!").is_err());
        assert_eq!(codec.decode("Zm9v").unwrap(), b"foo".to_vec());
    }
}
