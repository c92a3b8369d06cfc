//! URL percent-encoding and URL decomposition

use crate::hash_map::OrderedMap;

/// Punctuation left unescaped by [`url_encode`]
const UNRESERVED_MARKS: &[u8] = b"_-.!~*'()";

/// Bucket count for the small maps produced by [`url_break`]
const URL_ELEMENT_BUCKETS: usize = 31;

/// Schemes recognised by [`url_break`] as having a server part
const SERVER_SCHEMES: &[&str] = &[
    "http", "https", "ftp", "sftp", "ftps", "tftp", "ldap", "ldaps", "file",
];

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encode every byte outside `A-Z a-z 0-9 _-.!~*'()`
pub fn url_encode(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len() * 3);
    encode_into(&mut out, bytes, UNRESERVED_MARKS);
    // only ASCII is ever written
    String::from_utf8(out).unwrap_or_default()
}

/// Append `bytes` to `out`, escaping all but alphanumerics and `marks`
pub(crate) fn encode_into(out: &mut Vec<u8>, bytes: &[u8], marks: &[u8]) {
    for &c in bytes {
        if c.is_ascii_alphanumeric() || marks.contains(&c) {
            out.push(c);
        } else {
            out.push(b'%');
            out.push(HEX_UPPER[(c >> 4) as usize]);
            out.push(HEX_UPPER[(c & 0x0f) as usize]);
        }
    }
}

/// Decode a percent-encoded string
///
/// `+` decodes to a space. Decoding stops at the first `%` that is not
/// followed by two hex digits; everything decoded before it is returned.
pub fn url_decode(input: impl AsRef<[u8]>) -> Vec<u8> {
    let input = input.as_ref();
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        match input[pos] {
            b'%' => {
                let hi = input.get(pos + 1).and_then(|&c| hex_value(c));
                let lo = input.get(pos + 2).and_then(|&c| hex_value(c));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => break,
                }
                pos += 3;
            }
            b'+' => {
                out.push(b' ');
                pos += 1;
            }
            c => {
                out.push(c);
                pos += 1;
            }
        }
    }
    out
}

#[inline]
pub(crate) fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Split a URL into its elements
///
/// The returned map holds, in this order when present: `self` (the trimmed
/// input), `scheme`, `fragment`, `query`, `path`, `authority`, `port`,
/// `host` and `file`. URLs without a recognised scheme are treated as a
/// bare path.
///
/// ```rust
/// use memcab::encoding::url_break;
///
/// let elems = url_break("http://user@example.com:8080/a/b.html?q=1#top");
/// assert_eq!(elems.get("host"), Some(&b"example.com"[..]));
/// assert_eq!(elems.get("port"), Some(&b"8080"[..]));
/// assert_eq!(elems.get("file"), Some(&b"b.html"[..]));
/// ```
pub fn url_break(url: &str) -> OrderedMap {
    let mut map = OrderedMap::with_buckets(URL_ELEMENT_BUCKETS);
    let trimmed = url.trim_matches(|c: char| c <= ' ');
    map.put("self", trimmed);

    let mut rest = trimmed;
    let mut server = false;
    for scheme in SERVER_SCHEMES {
        let prefix_len = scheme.len() + 3;
        if rest.len() >= prefix_len
            && rest.as_bytes()[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
            && &rest.as_bytes()[scheme.len()..prefix_len] == b"://"
        {
            map.put("scheme", *scheme);
            rest = &rest[prefix_len..];
            server = true;
            break;
        }
    }

    if let Some(at) = rest.find('#') {
        map.put("fragment", &rest[at + 1..]);
        rest = &rest[..at];
    }
    if let Some(at) = rest.find('?') {
        map.put("query", &rest[at + 1..]);
        rest = &rest[..at];
    }

    if server {
        match rest.find('/') {
            Some(at) => {
                map.put("path", &rest[at..]);
                rest = &rest[..at];
            }
            None => map.put("path", "/"),
        }
        if let Some(at) = rest.find('@') {
            if at > 0 {
                map.put("authority", &rest[..at]);
            }
            rest = &rest[at + 1..];
        }
        if let Some(at) = rest.find(':') {
            if at + 1 < rest.len() {
                map.put("port", &rest[at + 1..]);
            }
            rest = &rest[..at];
        }
        if !rest.is_empty() {
            map.put("host", rest);
        }
    } else {
        map.put("path", rest);
    }

    let file = map.get("path").map(|path| match path.iter().rposition(|&c| c == b'/') {
        Some(at) => path[at + 1..].to_vec(),
        None => path.to_vec(),
    });
    if let Some(file) = file {
        if !file.is_empty() && file != b"." && file != b".." {
            map.put("file", file);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encode_reserved() {
        assert_eq!(url_encode(b"abc XYZ 019"), "abc%20XYZ%20019");
        assert_eq!(url_encode(b"_-.!~*'()"), "_-.!~*'()");
        assert_eq!(url_encode(b"a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(url_encode(&[0x00, 0xff]), "%00%FF");
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("a%2fb%2Fc"), b"a/b/c".to_vec());
        assert_eq!(url_decode("one+two"), b"one two".to_vec());
        assert_eq!(url_decode("%E3%81%82"), "\u{3042}".as_bytes().to_vec());
    }

    #[test]
    fn test_url_decode_stops_at_bad_escape() {
        assert_eq!(url_decode("ok%zzrest"), b"ok".to_vec());
        assert_eq!(url_decode("tail%4"), b"tail".to_vec());
        assert_eq!(url_decode("%"), Vec::<u8>::new());
    }

    #[test]
    fn test_url_round_trip_binary() {
        let data: Vec<u8> = (0..=255u8).collect();
        assert_eq!(url_decode(url_encode(&data)), data);
    }

    #[test]
    fn test_url_break_full() {
        let map = url_break("  HTTP://joe:pw@www.example.org:8080/dir/index.html?x=1&y=2#frag ");
        assert_eq!(
            map.get("self"),
            Some(&b"HTTP://joe:pw@www.example.org:8080/dir/index.html?x=1&y=2#frag"[..])
        );
        assert_eq!(map.get("scheme"), Some(&b"http"[..]));
        assert_eq!(map.get("authority"), Some(&b"joe:pw"[..]));
        assert_eq!(map.get("host"), Some(&b"www.example.org"[..]));
        assert_eq!(map.get("port"), Some(&b"8080"[..]));
        assert_eq!(map.get("path"), Some(&b"/dir/index.html"[..]));
        assert_eq!(map.get("file"), Some(&b"index.html"[..]));
        assert_eq!(map.get("query"), Some(&b"x=1&y=2"[..]));
        assert_eq!(map.get("fragment"), Some(&b"frag"[..]));
    }

    #[test]
    fn test_url_break_host_only() {
        let map = url_break("ftp://example.com");
        assert_eq!(map.get("path"), Some(&b"/"[..]));
        assert_eq!(map.get("host"), Some(&b"example.com"[..]));
        assert_eq!(map.get("file"), None);
        assert_eq!(map.get("port"), None);
    }

    #[test]
    fn test_url_break_relative() {
        let map = url_break("docs/../readme.txt?v=2");
        assert_eq!(map.get("scheme"), None);
        assert_eq!(map.get("path"), Some(&b"docs/../readme.txt"[..]));
        assert_eq!(map.get("file"), Some(&b"readme.txt"[..]));

        let dots = url_break("a/..");
        assert_eq!(dots.get("file"), None);
    }
}
