//! Variable-length numbers for dump formats
//!
//! Numbers are written in little-endian groups of 7 bits. Every byte except
//! the last carries its group as `-(group) - 1` interpreted as a signed byte,
//! so the high bit doubles as the continuation flag. The last byte holds its
//! group unchanged. Zero is a single `0x00` byte.

use crate::error::{MemcabError, Result};
use std::io::Write;

/// Encoder/decoder for the length prefixes used by map and list dumps
pub struct VarNum;

impl VarNum {
    /// Maximum number of bytes needed to encode a u64
    pub const MAX_ENCODED_LEN: usize = 10;

    /// Append `value` to `buffer`, returning the number of bytes written
    pub fn write_to_vec(buffer: &mut Vec<u8>, mut value: u64) -> usize {
        if value == 0 {
            buffer.push(0);
            return 1;
        }
        let mut written = 0;
        while value > 0 {
            let group = (value & 0x7f) as u8;
            value >>= 7;
            if value > 0 {
                buffer.push(0xff - group);
            } else {
                buffer.push(group);
            }
            written += 1;
        }
        written
    }

    /// Write `value` to an arbitrary writer
    pub fn write_to<W: Write>(writer: &mut W, value: u64) -> Result<usize> {
        let mut scratch = Vec::with_capacity(Self::MAX_ENCODED_LEN);
        let written = Self::write_to_vec(&mut scratch, value);
        writer.write_all(&scratch)?;
        Ok(written)
    }

    /// Encode `value` into a fresh buffer
    pub fn encode(value: u64) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(Self::MAX_ENCODED_LEN);
        Self::write_to_vec(&mut buffer, value);
        buffer
    }

    /// Number of bytes `value` occupies once encoded
    pub fn encoded_len(value: u64) -> usize {
        if value == 0 {
            return 1;
        }
        let bits = 64 - value.leading_zeros() as usize;
        (bits + 6) / 7
    }

    /// Decode a number from the front of `data`
    ///
    /// Returns the value and the number of bytes consumed.
    pub fn decode(data: &[u8]) -> Result<(u64, usize)> {
        let mut value = 0u64;
        let mut base = 1u64;
        for (i, &byte) in data.iter().enumerate().take(Self::MAX_ENCODED_LEN) {
            if (byte as i8) >= 0 {
                value = (byte as u64)
                    .checked_mul(base)
                    .and_then(|part| value.checked_add(part))
                    .ok_or_else(|| {
                        MemcabError::invalid_data("variable-length number overflows u64")
                    })?;
                return Ok((value, i + 1));
            }
            let group = (0xff - byte) as u64;
            value = group
                .checked_mul(base)
                .and_then(|part| value.checked_add(part))
                .ok_or_else(|| MemcabError::invalid_data("variable-length number overflows u64"))?;
            base = base.saturating_mul(0x80);
        }
        Err(MemcabError::invalid_data("truncated variable-length number"))
    }

    /// Append a length-prefixed byte region
    pub fn write_prefixed(buffer: &mut Vec<u8>, bytes: &[u8]) {
        Self::write_to_vec(buffer, bytes.len() as u64);
        buffer.extend_from_slice(bytes);
    }

    /// Read a length-prefixed byte region from the front of `data`
    ///
    /// Returns the region and the total number of bytes consumed.
    pub fn read_prefixed(data: &[u8]) -> Result<(&[u8], usize)> {
        let (len, step) = Self::decode(data)?;
        let len = usize::try_from(len)
            .map_err(|_| MemcabError::invalid_data("region length exceeds address space"))?;
        let end = step
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| MemcabError::invalid_data(format!(
                "region of {} bytes truncated at {} available",
                len,
                data.len() - step
            )))?;
        Ok((&data[step..end], end))
    }
}
