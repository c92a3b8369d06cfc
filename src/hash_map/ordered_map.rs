//! OrderedMap: insertion-ordered byte map with tree-chained buckets
//!
//! Records live in a single arena and are addressed by `u32` index. Each
//! record sits in two structures at once:
//!
//! - a binary search tree hanging off its bucket, ordered by a secondary
//!   hash and then by key (shorter keys first, then bytewise)
//! - a doubly linked list through the whole map that keeps insertion order
//!
//! The list order is what iteration, [`OrderedMap::cut_front`] and
//! [`OrderedMap::dump`] observe. [`OrderedMap::get3`] and
//! [`OrderedMap::move_to`] reposition a record in the list without touching
//! its tree slot.

use super::hash_functions::{bucket_hash, tree_hash};
use crate::config::{Config, MapConfig};
use crate::containers::ArrayList;
use crate::error::{MemcabError, Result};
use crate::io::var_num::VarNum;
use crate::system::{reserve_or_die, Context};
use std::cmp::Ordering;
use std::fmt;
use std::mem;

/// Default number of buckets
pub const DEFAULT_BUCKET_COUNT: usize = 4093;

/// Allocation unit for concatenated values up to this size
pub const SMALL_CAT_UNIT: usize = 52;

/// Allocation unit for larger concatenated values
pub const LARGE_CAT_UNIT: usize = 252;

/// Invalid node index marker
const INVALID_NODE: u32 = u32::MAX;

#[derive(Debug, Clone, Default)]
struct Record {
    key: Vec<u8>,
    value: Vec<u8>,
    hash: u32,
    left: u32,
    right: u32,
    prev: u32,
    next: u32,
}

impl Record {
    fn new(key: Vec<u8>, value: Vec<u8>, hash: u32) -> Self {
        Self {
            key,
            value,
            hash,
            left: INVALID_NODE,
            right: INVALID_NODE,
            prev: INVALID_NODE,
            next: INVALID_NODE,
        }
    }
}

/// Slot holding a child index: a bucket head or one side of a record
#[derive(Debug, Clone, Copy)]
enum Link {
    Bucket(usize),
    Left(u32),
    Right(u32),
}

/// Tree order within a bucket: length first, then bytes
#[inline]
fn compare_keys(a: &[u8], b: &[u8]) -> Ordering {
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Insertion-ordered hash map from byte strings to byte strings
///
/// The map is not thread safe; wrap it in a lock or use
/// [`ShardedMap`](super::ShardedMap) for concurrent access.
///
/// # Examples
///
/// ```rust
/// use memcab::hash_map::OrderedMap;
///
/// let mut map = OrderedMap::new();
/// map.put("a", "1");
/// map.put("b", "2");
/// map.putcat("a", "23");
/// assert_eq!(map.get("a"), Some(&b"123"[..]));
/// assert_eq!(map.rnum(), 2);
///
/// let keys: Vec<&[u8]> = map.iter().map(|(k, _)| k).collect();
/// assert_eq!(keys, vec![&b"a"[..], &b"b"[..]]);
/// ```
pub struct OrderedMap {
    nodes: Vec<Record>,
    free_nodes: Vec<u32>,
    buckets: Vec<u32>,
    first: u32,
    last: u32,
    cur: u32,
    iter_last: u32,
    rnum: usize,
    msiz: usize,
    small_cat_unit: usize,
    large_cat_unit: usize,
}

impl OrderedMap {
    /// Create a map with the default bucket count
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKET_COUNT)
    }

    /// Create a map with `bucket_count` buckets (at least one)
    pub fn with_buckets(bucket_count: usize) -> Self {
        if bucket_count == 0 {
            log::warn!("bucket count 0 clamped to 1");
        }
        let bucket_count = bucket_count.max(1);
        let mut buckets = Vec::new();
        reserve_or_die(&mut buckets, bucket_count);
        buckets.resize(bucket_count, INVALID_NODE);
        Self {
            nodes: Vec::new(),
            free_nodes: Vec::new(),
            buckets,
            first: INVALID_NODE,
            last: INVALID_NODE,
            cur: INVALID_NODE,
            iter_last: INVALID_NODE,
            rnum: 0,
            msiz: 0,
            small_cat_unit: SMALL_CAT_UNIT,
            large_cat_unit: LARGE_CAT_UNIT,
        }
    }

    /// Create a map from a validated configuration
    pub fn with_config(config: MapConfig) -> Result<Self> {
        config.validate()?;
        log::debug!(
            "creating ordered map: buckets={}, cat_units={}/{}",
            config.bucket_count,
            config.small_cat_unit,
            config.large_cat_unit
        );
        let mut map = Self::with_buckets(config.bucket_count);
        map.small_cat_unit = config.small_cat_unit;
        map.large_cat_unit = config.large_cat_unit;
        Ok(map)
    }

    /// Number of records
    #[inline]
    pub fn rnum(&self) -> usize {
        self.rnum
    }

    /// Number of records
    #[inline]
    pub fn len(&self) -> usize {
        self.rnum
    }

    /// Whether the map holds no records
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rnum == 0
    }

    /// Total bytes of all keys and values
    #[inline]
    pub fn msiz(&self) -> usize {
        self.msiz
    }

    /// Number of buckets
    #[inline]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Store a record, overwriting the value of an existing key in place
    pub fn put(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        let (key, value) = (key.as_ref(), value.as_ref());
        match self.search(key) {
            (_, Some(idx)) => self.replace_value(idx, value),
            (link, None) => self.insert_at(link, key, value.to_vec()),
        }
    }

    /// Store a record whose value is `head` followed by `tail`
    pub fn put3(&mut self, key: impl AsRef<[u8]>, head: impl AsRef<[u8]>, tail: impl AsRef<[u8]>) {
        let (head, tail) = (head.as_ref(), tail.as_ref());
        let mut value = Vec::new();
        reserve_or_die(&mut value, head.len() + tail.len());
        value.extend_from_slice(head);
        value.extend_from_slice(tail);
        self.put(key, value);
    }

    /// Store a record only if the key is absent
    ///
    /// Returns `false` and leaves the map untouched when the key exists.
    pub fn putkeep(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> bool {
        let key = key.as_ref();
        match self.search(key) {
            (_, Some(_)) => false,
            (link, None) => {
                self.insert_at(link, key, value.as_ref().to_vec());
                true
            }
        }
    }

    /// Append to the value of a record, creating it when absent
    pub fn putcat(&mut self, key: impl AsRef<[u8]>, value: impl AsRef<[u8]>) {
        let (key, value) = (key.as_ref(), value.as_ref());
        match self.search(key) {
            (_, Some(idx)) => {
                let (small, large) = (self.small_cat_unit, self.large_cat_unit);
                let stored = &mut self.nodes[idx as usize].value;
                let needed = stored.len() + value.len();
                if needed > stored.capacity() {
                    let unit = if needed <= small { small } else { large };
                    let target = (needed - 1) + unit - (needed - 1) % unit;
                    let additional = target - stored.len();
                    reserve_or_die(stored, additional);
                }
                stored.extend_from_slice(value);
                self.msiz += value.len();
            }
            (link, None) => self.insert_at(link, key, value.to_vec()),
        }
    }

    /// Remove a record
    ///
    /// Returns `false` if the key is absent.
    pub fn out(&mut self, key: impl AsRef<[u8]>) -> bool {
        match self.search(key.as_ref()) {
            (link, Some(idx)) => {
                self.remove_at(link, idx);
                true
            }
            (_, None) => false,
        }
    }

    /// Value of a record
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        match self.search(key.as_ref()) {
            (_, Some(idx)) => Some(&self.nodes[idx as usize].value),
            (_, None) => None,
        }
    }

    /// Value of a record, moving the record to the end of the order
    pub fn get3(&mut self, key: impl AsRef<[u8]>) -> Option<&[u8]> {
        let (_, found) = self.search(key.as_ref());
        let idx = found?;
        self.move_node(idx, false);
        Some(&self.nodes[idx as usize].value)
    }

    /// Size of the value of a record
    pub fn value_size(&self, key: impl AsRef<[u8]>) -> Option<usize> {
        self.get(key).map(<[u8]>::len)
    }

    /// Whether a record exists for `key`
    pub fn contains_key(&self, key: impl AsRef<[u8]>) -> bool {
        self.search(key.as_ref()).1.is_some()
    }

    /// Move a record to the front (`head`) or back of the order
    ///
    /// Returns `false` if the key is absent.
    pub fn move_to(&mut self, key: impl AsRef<[u8]>, head: bool) -> bool {
        match self.search(key.as_ref()) {
            (_, Some(idx)) => {
                self.move_node(idx, head);
                true
            }
            (_, None) => false,
        }
    }

    /// Reset the internal cursor to the first record
    pub fn iter_init(&mut self) {
        self.cur = self.first;
        self.iter_last = INVALID_NODE;
    }

    /// Key under the cursor, advancing the cursor
    ///
    /// Mutating the map between calls is allowed; removed records are
    /// skipped, and records moved by [`get3`](Self::get3) may be visited
    /// again at their new position.
    pub fn iter_next(&mut self) -> Option<&[u8]> {
        if self.cur == INVALID_NODE {
            self.iter_last = INVALID_NODE;
            return None;
        }
        let idx = self.cur;
        let rec = &self.nodes[idx as usize];
        self.cur = rec.next;
        self.iter_last = idx;
        Some(&rec.key)
    }

    /// Value of the record last returned by [`iter_next`](Self::iter_next)
    pub fn iter_value(&self) -> Option<&[u8]> {
        if self.iter_last == INVALID_NODE {
            return None;
        }
        Some(&self.nodes[self.iter_last as usize].value)
    }

    /// Borrowing iterator over `(key, value)` in order
    ///
    /// Independent of the internal cursor.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            map: self,
            next: self.first,
            remaining: self.rnum,
        }
    }

    /// All keys in order
    pub fn keys(&self) -> ArrayList {
        let mut list = ArrayList::with_capacity(self.rnum);
        for (key, _) in self.iter() {
            list.push(key);
        }
        list
    }

    /// All values in order
    pub fn values(&self) -> ArrayList {
        let mut list = ArrayList::with_capacity(self.rnum);
        for (_, value) in self.iter() {
            list.push(value);
        }
        list
    }

    /// Add `delta` to a native-endian 32-bit counter stored as the value
    ///
    /// A missing record is created holding `delta`. A value shorter than
    /// four bytes is zero-extended first. Returns the new counter value.
    pub fn add_int(&mut self, key: impl AsRef<[u8]>, delta: i32) -> i32 {
        let key = key.as_ref();
        match self.search(key) {
            (_, Some(idx)) => {
                let stored = &mut self.nodes[idx as usize].value;
                if stored.len() < 4 {
                    let grow = 4 - stored.len();
                    stored.resize(4, 0);
                    self.msiz += grow;
                }
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&stored[..4]);
                let sum = i32::from_ne_bytes(raw).wrapping_add(delta);
                stored[..4].copy_from_slice(&sum.to_ne_bytes());
                sum
            }
            (link, None) => {
                self.insert_at(link, key, delta.to_ne_bytes().to_vec());
                delta
            }
        }
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free_nodes.clear();
        self.buckets.fill(INVALID_NODE);
        self.first = INVALID_NODE;
        self.last = INVALID_NODE;
        self.cur = INVALID_NODE;
        self.iter_last = INVALID_NODE;
        self.rnum = 0;
        self.msiz = 0;
    }

    /// Remove the `count` oldest records
    ///
    /// Resets the internal cursor to the new first record.
    pub fn cut_front(&mut self, count: usize) {
        for _ in 0..count {
            if self.first == INVALID_NODE {
                break;
            }
            let key = self.nodes[self.first as usize].key.clone();
            self.out(&key);
        }
        self.iter_init();
    }

    /// Serialize all records in order
    ///
    /// Each record is written as a length-prefixed key followed by a
    /// length-prefixed value.
    pub fn dump(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.dump_into(&mut out);
        out
    }

    /// Append the dump of every record to `out`
    pub(crate) fn dump_into(&self, out: &mut Vec<u8>) {
        reserve_or_die(out, self.msiz + self.rnum * 4);
        for (key, value) in self.iter() {
            VarNum::write_prefixed(out, key);
            VarNum::write_prefixed(out, value);
        }
    }

    /// Decode the record starting at `*pos` of a dump, advancing `pos`
    pub(crate) fn read_record<'a>(
        data: &'a [u8],
        pos: &mut usize,
    ) -> Result<(&'a [u8], &'a [u8])> {
        let (key, step) = VarNum::read_prefixed(&data[*pos..])?;
        *pos += step;
        let (value, step) = VarNum::read_prefixed(&data[*pos..])
            .map_err(|_| MemcabError::invalid_data("dump ends inside a record"))?;
        *pos += step;
        Ok((key, value))
    }

    /// Rebuild a map from [`dump`](Self::dump) output
    ///
    /// Repeated keys keep their first value.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut map = Self::new();
        let mut pos = 0;
        while pos < data.len() {
            let (key, value) = Self::read_record(data, &mut pos)?;
            map.putkeep(key, value);
        }
        Ok(map)
    }

    /// Find the value of one key in [`dump`](Self::dump) output without
    /// building a map
    pub fn load_one<'a>(data: &'a [u8], key: impl AsRef<[u8]>) -> Result<Option<&'a [u8]>> {
        let key = key.as_ref();
        let mut pos = 0;
        while pos < data.len() {
            let (stored_key, value) = Self::read_record(data, &mut pos)?;
            if stored_key == key {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn search(&self, key: &[u8]) -> (Link, Option<u32>) {
        let bucket = bucket_hash(key) as usize % self.buckets.len();
        let hash = tree_hash(key);
        let mut link = Link::Bucket(bucket);
        loop {
            let idx = self.link_get(link);
            if idx == INVALID_NODE {
                return (link, None);
            }
            let rec = &self.nodes[idx as usize];
            link = match hash.cmp(&rec.hash) {
                Ordering::Greater => Link::Left(idx),
                Ordering::Less => Link::Right(idx),
                Ordering::Equal => match compare_keys(key, &rec.key) {
                    Ordering::Less => Link::Left(idx),
                    Ordering::Greater => Link::Right(idx),
                    Ordering::Equal => return (link, Some(idx)),
                },
            };
        }
    }

    #[inline]
    fn link_get(&self, link: Link) -> u32 {
        match link {
            Link::Bucket(b) => self.buckets[b],
            Link::Left(n) => self.nodes[n as usize].left,
            Link::Right(n) => self.nodes[n as usize].right,
        }
    }

    #[inline]
    fn link_set(&mut self, link: Link, idx: u32) {
        match link {
            Link::Bucket(b) => self.buckets[b] = idx,
            Link::Left(n) => self.nodes[n as usize].left = idx,
            Link::Right(n) => self.nodes[n as usize].right = idx,
        }
    }

    fn replace_value(&mut self, idx: u32, value: &[u8]) {
        let stored = &mut self.nodes[idx as usize].value;
        self.msiz = self.msiz - stored.len() + value.len();
        stored.clear();
        if value.len() > stored.capacity() {
            reserve_or_die(stored, value.len());
        }
        stored.extend_from_slice(value);
    }

    fn insert_at(&mut self, link: Link, key: &[u8], value: Vec<u8>) {
        self.msiz += key.len() + value.len();
        let record = Record::new(key.to_vec(), value, tree_hash(key));
        let idx = self.allocate_node(record);
        self.link_set(link, idx);
        self.link_tail(idx);
        self.rnum += 1;
    }

    fn allocate_node(&mut self, record: Record) -> u32 {
        if let Some(idx) = self.free_nodes.pop() {
            self.nodes[idx as usize] = record;
            return idx;
        }
        if self.nodes.len() >= INVALID_NODE as usize {
            Context::global().fatal("ordered map record arena exhausted");
        }
        reserve_or_die(&mut self.nodes, 1);
        self.nodes.push(record);
        (self.nodes.len() - 1) as u32
    }

    fn remove_at(&mut self, link: Link, idx: u32) {
        let (left, right) = {
            let rec = &self.nodes[idx as usize];
            (rec.left, rec.right)
        };
        let replacement = if left == INVALID_NODE {
            right
        } else if right == INVALID_NODE {
            left
        } else {
            // the left subtree takes the slot; the right one hangs off its maximum
            let mut tail = left;
            while self.nodes[tail as usize].right != INVALID_NODE {
                tail = self.nodes[tail as usize].right;
            }
            self.nodes[tail as usize].right = right;
            left
        };
        self.link_set(link, replacement);

        let next = self.nodes[idx as usize].next;
        self.unlink(idx);
        if self.cur == idx {
            self.cur = next;
        }
        if self.iter_last == idx {
            self.iter_last = INVALID_NODE;
        }

        let rec = mem::take(&mut self.nodes[idx as usize]);
        self.msiz -= rec.key.len() + rec.value.len();
        self.rnum -= 1;
        if self.rnum == 0 {
            self.nodes.clear();
            self.free_nodes.clear();
        } else {
            self.free_nodes.push(idx);
        }
    }

    fn move_node(&mut self, idx: u32, head: bool) {
        if (head && self.first == idx) || (!head && self.last == idx) {
            return;
        }
        if self.cur == idx {
            self.cur = self.nodes[idx as usize].next;
        }
        self.unlink(idx);
        if head {
            self.link_head(idx);
        } else {
            self.link_tail(idx);
        }
    }

    fn unlink(&mut self, idx: u32) {
        let (prev, next) = {
            let rec = &self.nodes[idx as usize];
            (rec.prev, rec.next)
        };
        if prev == INVALID_NODE {
            self.first = next;
        } else {
            self.nodes[prev as usize].next = next;
        }
        if next == INVALID_NODE {
            self.last = prev;
        } else {
            self.nodes[next as usize].prev = prev;
        }
        let rec = &mut self.nodes[idx as usize];
        rec.prev = INVALID_NODE;
        rec.next = INVALID_NODE;
    }

    fn link_tail(&mut self, idx: u32) {
        let last = self.last;
        {
            let rec = &mut self.nodes[idx as usize];
            rec.prev = last;
            rec.next = INVALID_NODE;
        }
        if last == INVALID_NODE {
            self.first = idx;
        } else {
            self.nodes[last as usize].next = idx;
        }
        self.last = idx;
    }

    fn link_head(&mut self, idx: u32) {
        let first = self.first;
        {
            let rec = &mut self.nodes[idx as usize];
            rec.prev = INVALID_NODE;
            rec.next = first;
        }
        if first == INVALID_NODE {
            self.last = idx;
        } else {
            self.nodes[first as usize].prev = idx;
        }
        self.first = idx;
    }
}

impl Default for OrderedMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for OrderedMap {
    fn clone(&self) -> Self {
        let bucket_count = self.buckets.len().max(self.rnum).max(DEFAULT_BUCKET_COUNT);
        let mut map = Self::with_buckets(bucket_count);
        map.small_cat_unit = self.small_cat_unit;
        map.large_cat_unit = self.large_cat_unit;
        reserve_or_die(&mut map.nodes, self.rnum);
        for (key, value) in self.iter() {
            map.put(key, value);
        }
        map
    }
}

impl fmt::Debug for OrderedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.iter()
                    .map(|(k, v)| (String::from_utf8_lossy(k), String::from_utf8_lossy(v))),
            )
            .finish()
    }
}

impl<K: AsRef<[u8]>, V: AsRef<[u8]>> Extend<(K, V)> for OrderedMap {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: AsRef<[u8]>, V: AsRef<[u8]>> FromIterator<(K, V)> for OrderedMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a> IntoIterator for &'a OrderedMap {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Iterator over the records of an [`OrderedMap`] in order
pub struct Iter<'a> {
    map: &'a OrderedMap,
    next: u32,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == INVALID_NODE {
            return None;
        }
        let rec = &self.map.nodes[self.next as usize];
        self.next = rec.next;
        self.remaining -= 1;
        Some((&rec.key, &rec.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}
