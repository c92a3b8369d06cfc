//! Packbits run-length encoding
//!
//! The stream is a sequence of control bytes read as `i8`. A negative count
//! `-n` is followed by one byte repeated `n` times; a non-negative count `n`
//! is followed by `n` literal bytes. Both kinds cover at most 127 bytes.

/// Longest run or literal section a single control byte describes
pub const MAX_SECTION: usize = 0x7f;

/// Compress `input`
///
/// ```rust
/// use memcab::encoding::{pack_decode, pack_encode};
///
/// let packed = pack_encode(b"aaaabcd");
/// assert_eq!(packed, vec![0xfc, b'a', 3, b'b', b'c', b'd']);
/// assert_eq!(pack_decode(&packed), b"aaaabcd".to_vec());
/// ```
pub fn pack_encode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / MAX_SECTION + 2);
    let end = input.len();
    let mut pos = 0;
    while pos < end {
        let mut rp = pos + 1;
        let mut step = 1;
        while rp < end && step < MAX_SECTION && input[rp] == input[pos] {
            step += 1;
            rp += 1;
        }
        if step == 1 && rp < end {
            let header = out.len();
            out.push(0);
            out.push(input[pos]);
            while rp < end && step < MAX_SECTION && input[rp] != input[rp - 1] {
                out.push(input[rp]);
                step += 1;
                rp += 1;
            }
            // leave the first byte of an upcoming run to the next section
            if rp < end && input[rp - 1] == input[rp] {
                out.pop();
                step -= 1;
            }
            out[header] = step as u8;
        } else if step == 1 {
            out.push(1);
            out.push(input[pos]);
        } else {
            out.push((step as i8).wrapping_neg() as u8);
            out.push(input[pos]);
        }
        pos += step;
    }
    out
}

/// Expand a Packbits stream
///
/// A literal section cut short by the end of input yields the bytes that are
/// present; a run header with no byte after it is ignored.
pub fn pack_decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() * 3);
    let mut pos = 0;
    while pos < input.len() {
        let count = input[pos] as i8;
        pos += 1;
        if count < 0 {
            let Some(&byte) = input.get(pos) else { break };
            let len = count.unsigned_abs() as usize;
            out.resize(out.len() + len, byte);
            pos += 1;
        } else {
            let len = (count as usize).min(input.len() - pos);
            out.extend_from_slice(&input[pos..pos + len]);
            pos += len;
        }
    }
    out
}
