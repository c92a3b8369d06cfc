//! Elias gamma coding of byte values
//!
//! Each byte `c` is coded as `c + 1`: a value of zero is a single `1` bit,
//! anything else is `n` zero bits followed by the `n + 1` binary digits of
//! `c + 1`, most significant first.
//!
//! The bit stream is packed LSB-first. The low three bits of the first byte
//! hold the bit position at which the last byte ends, so the payload starts
//! at bit 3 of byte 0 and the exact bit count can be recovered on decode.

/// Bit offset of the first payload bit
const HEADER_BITS: usize = 3;

struct BitWriter {
    buf: Vec<u8>,
    idx: usize,
}

impl BitWriter {
    fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::with_capacity(capacity.max(1));
        buf.push(0);
        Self {
            buf,
            idx: HEADER_BITS,
        }
    }

    #[inline]
    fn push(&mut self, bit: bool) {
        if self.idx >= 8 {
            self.buf.push(0);
            self.idx = 0;
        }
        if bit {
            // buf always holds at least the header byte
            let last = self.buf.len() - 1;
            self.buf[last] |= 1 << self.idx;
        }
        self.idx += 1;
    }

    fn finish(mut self) -> Vec<u8> {
        if self.idx >= 8 {
            self.buf.push(0);
            self.idx = 0;
        }
        self.buf[0] |= (self.idx & 7) as u8;
        self.buf
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    idx: usize,
    remaining: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        let remaining = match data.first() {
            Some(&head) => ((data.len() - 1) * 8 + (head & 7) as usize).saturating_sub(HEADER_BITS),
            None => 0,
        };
        Self {
            data,
            pos: 0,
            idx: HEADER_BITS,
            remaining,
        }
    }

    #[inline]
    fn next_bit(&mut self) -> Option<bool> {
        if self.remaining == 0 {
            return None;
        }
        if self.idx >= 8 {
            self.pos += 1;
            self.idx = 0;
        }
        let byte = *self.data.get(self.pos)?;
        let bit = byte & (1 << self.idx) != 0;
        self.idx += 1;
        self.remaining -= 1;
        Some(bit)
    }
}

/// Gamma-code every byte of `input`
pub fn gamma_encode(input: &[u8]) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(input.len() + 1);
    for &b in input {
        if b == 0 {
            writer.push(true);
            continue;
        }
        let c = b as u32 + 1;
        let width = 31 - c.leading_zeros();
        for _ in 0..width {
            writer.push(false);
        }
        for bit in (0..=width).rev() {
            writer.push(c & (1 << bit) != 0);
        }
    }
    writer.finish()
}

/// Decode a gamma-coded stream
///
/// A code cut short by the end of the stream still yields a byte built
/// from the digits that were read.
pub fn gamma_decode(input: &[u8]) -> Vec<u8> {
    let mut reader = BitReader::new(input);
    let mut out = Vec::with_capacity(input.len() * 2);
    while let Some(bit) = reader.next_bit() {
        if bit {
            out.push(0);
            continue;
        }
        let mut width = 1;
        while let Some(bit) = reader.next_bit() {
            if bit {
                break;
            }
            width += 1;
        }
        let mut c: u32 = 1;
        for _ in 0..width {
            match reader.next_bit() {
                Some(bit) => c = (c << 1) | bit as u32,
                None => break,
            }
        }
        out.push(c.wrapping_sub(1) as u8);
    }
    out
}
