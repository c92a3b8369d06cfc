//! ExtensibleBuffer: growable byte buffer used to assemble results
//!
//! Capacity starts at a small unit and doubles whenever an append would not
//! fit, so long sequences of small appends reallocate only logarithmically.

use crate::encoding::url::encode_into;
use crate::encoding::xml::escape_into;
use crate::system::reserve_or_die;
use std::fmt;
use std::io;
use std::ops::Deref;

/// Initial capacity of a buffer
pub const XSTR_UNIT: usize = 12;

/// Bytes left unescaped by [`ExtensibleBuffer::cat_url_encoded`] besides alphanumerics
const URL_PARAM_SAFE: &[u8] = b"_-.";

/// Growable, binary-safe byte buffer
///
/// # Examples
///
/// ```rust
/// use memcab::containers::ExtensibleBuffer;
/// use std::fmt::Write;
///
/// let mut buf = ExtensibleBuffer::new();
/// buf.cat(b"id=");
/// write!(buf, "{}", 42).unwrap();
/// assert_eq!(buf.as_bytes(), b"id=42");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ExtensibleBuffer {
    data: Vec<u8>,
}

impl ExtensibleBuffer {
    /// Create an empty buffer with the default unit capacity
    pub fn new() -> Self {
        Self::with_capacity(XSTR_UNIT)
    }

    /// Create an empty buffer able to hold `capacity` bytes without growing
    pub fn with_capacity(capacity: usize) -> Self {
        let mut data = Vec::new();
        reserve_or_die(&mut data, capacity.max(XSTR_UNIT));
        Self { data }
    }

    /// Create a buffer holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buf = Self::with_capacity(bytes.len() + 1);
        buf.data.extend_from_slice(bytes);
        buf
    }

    /// Take ownership of an existing allocation
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Append a byte region
    pub fn cat(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append a string
    pub fn cat_str(&mut self, s: &str) {
        self.cat(s.as_bytes());
    }

    /// Append a single byte
    pub fn push(&mut self, byte: u8) {
        self.grow_for(1);
        self.data.push(byte);
    }

    /// Append `bytes` with XML meta characters replaced by entity references
    pub fn cat_xml_escaped(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        escape_into(&mut self.data, bytes);
    }

    /// Append `bytes` percent-encoded for use inside a query parameter
    pub fn cat_url_encoded(&mut self, bytes: &[u8]) {
        self.grow_for(bytes.len());
        encode_into(&mut self.data, bytes, URL_PARAM_SAFE);
    }

    /// Contents of the buffer
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Number of bytes stored
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes that fit before the next reallocation
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Drop the contents, keeping the allocation
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Shorten the buffer to `len` bytes
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Release the buffer as a plain vector
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Contents as UTF-8 with invalid sequences replaced
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    fn grow_for(&mut self, additional: usize) {
        let needed = self.data.len() + additional + 1;
        let mut capacity = self.data.capacity().max(XSTR_UNIT);
        if capacity >= needed {
            return;
        }
        capacity = capacity.saturating_mul(2).max(needed);
        let additional = capacity - self.data.len();
        reserve_or_die(&mut self.data, additional);
    }
}

impl Default for ExtensibleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for ExtensibleBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for ExtensibleBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<&[u8]> for ExtensibleBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<&str> for ExtensibleBuffer {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl From<ExtensibleBuffer> for Vec<u8> {
    fn from(buf: ExtensibleBuffer) -> Self {
        buf.data
    }
}

impl fmt::Write for ExtensibleBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.cat_str(s);
        Ok(())
    }
}

impl io::Write for ExtensibleBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.cat(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl fmt::Debug for ExtensibleBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensibleBuffer")
            .field("len", &self.data.len())
            .field("data", &String::from_utf8_lossy(&self.data))
            .finish()
    }
}
