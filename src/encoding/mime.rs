//! MIME encoded-words (RFC 2047 style `=?charset?B|Q?data?=`)

use super::base64::{base64_decode, base64_encode};
use super::quoted_printable::{quote_decode, quote_encode};

/// Charset reported when the input holds no encoded-word
pub const DEFAULT_CHARSET: &str = "US-ASCII";

/// Charset names of this length or longer are not reported
const MAX_CHARSET_LEN: usize = 32;

/// Wrap `text` in a single encoded-word
///
/// `base64` selects the `B` encoding; otherwise Quoted-Printable (`Q`) is used,
/// with `?` escaped as well so the word stays parseable.
///
/// ```rust
/// use memcab::encoding::{mime_decode, mime_encode};
///
/// let word = mime_encode("h\u{e9}llo".as_bytes(), "UTF-8", true);
/// assert_eq!(word, "=?UTF-8?B?aMOpbGxv?=");
///
/// let (text, charset) = mime_decode(&word);
/// assert_eq!(text, "h\u{e9}llo".as_bytes());
/// assert_eq!(charset, "UTF-8");
/// ```
pub fn mime_encode(text: &[u8], charset: &str, base64: bool) -> String {
    let (tag, body) = if base64 {
        ('B', base64_encode(text))
    } else {
        ('Q', quote_encode(text).replace('?', "=3F"))
    };
    format!("=?{}?{}?{}?=", charset, tag, body)
}

/// Decode every encoded-word in `input`
///
/// Text outside encoded-words is copied through unchanged. Returns the
/// decoded bytes together with the charset of the last encoded-word seen.
pub fn mime_decode(input: &str) -> (Vec<u8>, String) {
    let s = input.as_bytes();
    let mut out = Vec::with_capacity(s.len());
    let mut charset = DEFAULT_CHARSET.to_string();
    let mut pos = 0;
    while pos < s.len() {
        if !s[pos..].starts_with(b"=?") {
            out.push(s[pos]);
            pos += 1;
            continue;
        }
        pos += 2;
        let Some(name_end) = find_question(s, pos) else { continue };
        if name_end - pos < MAX_CHARSET_LEN {
            charset = String::from_utf8_lossy(&s[pos..name_end]).into_owned();
        }
        let mut data = name_end + 1;
        let quoted = matches!(s.get(data), Some(b'Q') | Some(b'q'));
        data = (data + 2).min(s.len());
        let Some(data_end) = find_question(s, data) else { continue };
        let payload = String::from_utf8_lossy(&s[data..data_end]);
        if quoted {
            out.extend_from_slice(&quote_decode(&payload));
        } else {
            out.extend_from_slice(&base64_decode(&payload));
        }
        pos = data_end + 1;
        if pos < s.len() {
            pos += 1;
        }
    }
    (out, charset)
}

fn find_question(s: &[u8], from: usize) -> Option<usize> {
    s[from..].iter().position(|&c| c == b'?').map(|p| p + from)
}
