//! XML entity escaping and a tolerant tag splitter
//!
//! Only the four entities `&amp;`, `&lt;`, `&gt;` and `&quot;` are produced
//! and understood. Unknown entity references pass through unchanged.

use crate::containers::ArrayList;
use crate::hash_map::OrderedMap;

/// Bucket count for attribute maps
const XML_ATTR_BUCKETS: usize = 31;

/// Replace `& < > "` with their entity references
///
/// ```rust
/// use memcab::encoding::{xml_escape, xml_unescape};
///
/// let escaped = xml_escape("a < b && \"c\"");
/// assert_eq!(escaped, "a &lt; b &amp;&amp; &quot;c&quot;");
/// assert_eq!(xml_unescape(&escaped), "a < b && \"c\"");
/// ```
pub fn xml_escape(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len() + text.len() / 8);
    escape_into(&mut out, text.as_bytes());
    // entities are ASCII and every other byte is copied unchanged
    String::from_utf8(out).unwrap_or_default()
}

/// Append `bytes` to `out` with XML meta characters escaped
pub(crate) fn escape_into(out: &mut Vec<u8>, bytes: &[u8]) {
    for &c in bytes {
        match c {
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            b'"' => out.extend_from_slice(b"&quot;"),
            _ => out.push(c),
        }
    }
}

/// Resolve the entity references produced by [`xml_escape`]
pub fn xml_unescape(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        if bytes[pos] == b'&' {
            let rest = &bytes[pos..];
            if rest.starts_with(b"&amp;") {
                out.push(b'&');
                pos += 5;
                continue;
            } else if rest.starts_with(b"&lt;") {
                out.push(b'<');
                pos += 4;
                continue;
            } else if rest.starts_with(b"&gt;") {
                out.push(b'>');
                pos += 4;
                continue;
            } else if rest.starts_with(b"&quot;") {
                out.push(b'"');
                pos += 6;
                continue;
            }
        }
        out.push(bytes[pos]);
        pos += 1;
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Split an XML document into tags and text sections
///
/// Comments are kept as single elements. CDATA sections become text with
/// their `& < >` escaped. A comment or CDATA section with no terminator is
/// treated as an ordinary tag.
pub fn xml_break(text: &str) -> ArrayList {
    let s = text.as_bytes();
    let mut list = ArrayList::new();
    let mut i = 0;
    let mut pv = 0;
    let mut in_tag = false;
    while i < s.len() {
        if !in_tag && s[i] == b'<' {
            if s[i + 1..].starts_with(b"!--") {
                if let Some(end) = find(s, i, b"-->") {
                    if i > pv {
                        list.push(&s[pv..i]);
                    }
                    list.push(&s[i..end + 3]);
                    i = end + 3;
                    pv = i;
                    continue;
                }
            } else if s.len() - i >= 9 && s[i..i + 9].eq_ignore_ascii_case(b"<![CDATA[") {
                if let Some(end) = find(s, i, b"]]>") {
                    if i > pv {
                        list.push(&s[pv..i]);
                    }
                    let mut section = Vec::with_capacity(end - i);
                    for &c in &s[i + 9..end] {
                        match c {
                            b'&' => section.extend_from_slice(b"&amp;"),
                            b'<' => section.extend_from_slice(b"&lt;"),
                            b'>' => section.extend_from_slice(b"&gt;"),
                            _ => section.push(c),
                        }
                    }
                    if !section.is_empty() {
                        list.push_vec(section);
                    }
                    i = end + 3;
                    pv = i;
                    continue;
                }
            }
            if i > pv {
                list.push(&s[pv..i]);
            }
            in_tag = true;
            pv = i;
        } else if in_tag && s[i] == b'>' {
            list.push(&s[pv..=i]);
            in_tag = false;
            pv = i + 1;
        }
        i += 1;
    }
    if s.len() > pv {
        list.push(&s[pv..]);
    }
    list
}

fn find(haystack: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Parse the attributes of a tag
///
/// The tag name is stored under the empty key. Attribute values are
/// unescaped; the first occurrence of a repeated attribute wins.
///
/// ```rust
/// use memcab::encoding::xml_attrs;
///
/// let attrs = xml_attrs("<img src=\"a.png\" alt='x &amp; y' hidden>");
/// assert_eq!(attrs.get(""), Some(&b"img"[..]));
/// assert_eq!(attrs.get("alt"), Some(&b"x & y"[..]));
/// assert_eq!(attrs.get("hidden"), Some(&b""[..]));
/// ```
pub fn xml_attrs(tag: &str) -> OrderedMap {
    let s = tag.as_bytes();
    let mut map = OrderedMap::with_buckets(XML_ATTR_BUCKETS);
    let mut rp = 0;
    while rp < s.len() && matches!(s[rp], b'<' | b'/' | b'?' | b'!' | b' ') {
        rp += 1;
    }
    let name_start = rp;
    while rp < s.len() && s[rp] > 0x20 && s[rp] != b'/' && s[rp] != b'>' {
        rp += 1;
    }
    map.putkeep("", &s[name_start..rp]);

    while rp < s.len() {
        while rp < s.len() && (s[rp] <= 0x20 || matches!(s[rp], b'/' | b'?' | b'>')) {
            rp += 1;
        }
        let key_start = rp;
        while rp < s.len() && s[rp] > 0x20 && !matches!(s[rp], b'/' | b'>' | b'=') {
            rp += 1;
        }
        let key = &s[key_start..rp];
        while rp < s.len() && (s[rp] == b'=' || s[rp] <= 0x20) {
            rp += 1;
        }
        let value = match s.get(rp) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                rp += 1;
                let start = rp;
                while rp < s.len() && s[rp] != quote {
                    rp += 1;
                }
                &s[start..rp]
            }
            _ => {
                let start = rp;
                while rp < s.len() && s[rp] > 0x20 && !matches!(s[rp], b'"' | b'\'' | b'>') {
                    rp += 1;
                }
                &s[start..rp]
            }
        };
        if rp < s.len() {
            rp += 1;
        }
        if !key.is_empty() {
            let raw = xml_unescape(&String::from_utf8_lossy(value));
            map.putkeep(key, raw);
        }
    }
    map
}
