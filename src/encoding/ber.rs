//! BER compressed unsigned integers
//!
//! Each number is written big-endian in 7-bit groups; every byte except the
//! last of a number has its high bit set.

/// Encode a sequence of numbers
///
/// ```rust
/// use memcab::encoding::{ber_decode, ber_encode};
///
/// let bytes = ber_encode(&[0, 127, 128, 16_384]);
/// assert_eq!(bytes, vec![0x00, 0x7f, 0x81, 0x00, 0x81, 0x80, 0x00]);
/// assert_eq!(ber_decode(&bytes), vec![0, 127, 128, 16_384]);
/// ```
pub fn ber_encode(numbers: &[u32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(numbers.len() * 2);
    for &num in numbers {
        let groups = match num {
            0..=0x7f => 1,
            0x80..=0x3fff => 2,
            0x4000..=0x1f_ffff => 3,
            0x20_0000..=0x0fff_ffff => 4,
            _ => 5,
        };
        for shift in (1..groups).rev() {
            out.push(((num >> (7 * shift)) & 0x7f) as u8 | 0x80);
        }
        out.push((num & 0x7f) as u8);
    }
    out
}

/// Decode a byte sequence into numbers
///
/// A number cut off by the end of input is still emitted with the groups
/// read so far. Overlong numbers wrap around.
pub fn ber_decode(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter();
    while let Some(&first) = iter.next() {
        let mut num = (first & 0x7f) as u32;
        let mut c = first;
        while c >= 0x80 {
            match iter.next() {
                Some(&next) => {
                    c = next;
                    num = num.wrapping_mul(0x80).wrapping_add((c & 0x7f) as u32);
                }
                None => break,
            }
        }
        out.push(num);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_boundaries() {
        let numbers = [
            0,
            0x7f,
            0x80,
            0x3fff,
            0x4000,
            0x1f_ffff,
            0x20_0000,
            0x0fff_ffff,
            0x1000_0000,
            u32::MAX,
        ];
        let bytes = ber_encode(&numbers);
        assert_eq!(bytes.len(), 1 + 1 + 2 + 2 + 3 + 3 + 4 + 4 + 5 + 5);
        assert_eq!(ber_decode(&bytes), numbers.to_vec());
    }

    #[test]
    fn test_max_value_layout() {
        assert_eq!(ber_encode(&[u32::MAX]), vec![0x8f, 0xff, 0xff, 0xff, 0x7f]);
    }

    #[test]
    fn test_truncated_input() {
        assert_eq!(ber_decode(&[0x81]), vec![1]);
        assert_eq!(ber_decode(&[]), Vec::<u32>::new());
    }
}
