//! # Text and Binary Codecs
//!
//! Stateless encode/decode pairs. Every pair round-trips exactly for the
//! inputs its encoder accepts; decoders are best effort and stop quietly at
//! the first malformed token instead of failing.
//!
//! ## Features
//!
//! - **Packbits**: run-length encoding with signed control bytes
//! - **Base64**: standard alphabet encoding with a lenient decoder
//! - **Quoted-Printable**: `=XX` escapes, soft line breaks on decode
//! - **MIME**: `=?charset?B|Q?data?=` encoded-words
//! - **URL**: percent-encoding and URL decomposition
//! - **BER**: 7-bit group variable-length unsigned integers
//! - **XML**: entity escaping, tag splitting and attribute parsing

pub mod base64;
pub mod ber;
pub mod mime;
pub mod packbits;
pub mod quoted_printable;
pub mod url;
pub mod xml;

pub use self::base64::{base64_decode, base64_encode, Base64Codec, Base64Config};
pub use ber::{ber_decode, ber_encode};
pub use mime::{mime_decode, mime_encode};
pub use packbits::{pack_decode, pack_encode};
pub use quoted_printable::{quote_decode, quote_encode};
pub use url::{url_break, url_decode, url_encode};
pub use xml::{xml_attrs, xml_break, xml_escape, xml_unescape};
