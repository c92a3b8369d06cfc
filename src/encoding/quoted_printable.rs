//! Quoted-Printable encoding
//!
//! The encoder never inserts soft line breaks, so its output decodes back to
//! the exact input. The decoder still understands `=\r\n` soft breaks written
//! by other producers.

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Encode bytes as Quoted-Printable
///
/// `=`, control bytes other than CR, LF and TAB, and bytes above `0x7e` are
/// written as `=XX` with uppercase hex.
///
/// ```rust
/// use memcab::encoding::{quote_decode, quote_encode};
///
/// let encoded = quote_encode("caf\u{e9} = 1".as_bytes());
/// assert_eq!(encoded, "caf=C3=A9 =3D 1");
/// assert_eq!(quote_decode(&encoded), "caf\u{e9} = 1".as_bytes());
/// ```
pub fn quote_encode(input: &[u8]) -> String {
    let mut out = Vec::with_capacity(input.len() + input.len() / 2);
    for &c in input {
        if c == b'=' || (c < 0x20 && !matches!(c, b'\r' | b'\n' | b'\t')) || c > 0x7e {
            out.push(b'=');
            out.push(HEX_UPPER[(c >> 4) as usize]);
            out.push(HEX_UPPER[(c & 0x0f) as usize]);
        } else {
            out.push(c);
        }
    }
    // every byte written is ASCII
    String::from_utf8(out).unwrap_or_default()
}

/// Decode a Quoted-Printable string
///
/// A `=` at the end of input, or an escape missing its second digit, ends
/// decoding. `=` followed by a line break is a soft break and produces
/// nothing. Digits outside the hex range are folded with wrapping arithmetic.
pub fn quote_decode(input: &str) -> Vec<u8> {
    let s = input.as_bytes();
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i] != b'=' {
            out.push(s[i]);
            i += 1;
            continue;
        }
        i += 1;
        match s.get(i) {
            None => break,
            Some(b'\r') if s.get(i + 1) == Some(&b'\n') => i += 2,
            Some(b'\r') | Some(b'\n') => i += 1,
            Some(&hi) => {
                let Some(&lo) = s.get(i + 1) else { break };
                out.push(nibble(hi).wrapping_mul(16).wrapping_add(nibble(lo)));
                i += 2;
            }
        }
    }
    out
}

#[inline]
fn nibble(c: u8) -> u8 {
    match c {
        b'A'..=b'Z' => c - b'A' + 10,
        b'a'..=b'z' => c - b'a' + 10,
        _ => c.wrapping_sub(b'0'),
    }
}
