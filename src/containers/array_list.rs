//! ArrayList: double-ended array of variable-length byte elements
//!
//! Elements live in a slot array with a movable window `start..start + num`.
//! Pushing past the end grows the array, unshifting at slot zero regrows it
//! and slides the window to the back, and shifting periodically slides the
//! window back to the front so the dead prefix does not grow forever.

use crate::error::{MemcabError, Result};
use crate::io::var_num::VarNum;
use crate::system::reserve_or_die;
use std::cmp::Ordering;
use std::fmt;

/// Slot count of a list created with [`ArrayList::new`]
pub const LIST_UNIT: usize = 64;

/// Ordered list of byte strings with cheap operations at both ends
#[derive(Clone)]
pub struct ArrayList {
    array: Vec<Vec<u8>>,
    start: usize,
    num: usize,
}

impl ArrayList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::with_capacity(LIST_UNIT)
    }

    /// Create an empty list with `anum` preallocated slots (at least one)
    pub fn with_capacity(anum: usize) -> Self {
        let anum = anum.max(1);
        let mut array = Vec::new();
        reserve_or_die(&mut array, anum);
        array.resize_with(anum, Vec::new);
        Self {
            array,
            start: 0,
            num: 0,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.num
    }

    /// Whether the list holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num == 0
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        if index >= self.num {
            return None;
        }
        Some(&self.array[self.start + index])
    }

    /// Element at `index` as UTF-8, if it is valid UTF-8
    pub fn get_str(&self, index: usize) -> Option<&str> {
        self.get(index).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Append an element at the end
    pub fn push(&mut self, value: impl AsRef<[u8]>) {
        self.push_vec(value.as_ref().to_vec());
    }

    /// Append an owned element at the end without copying it
    pub fn push_vec(&mut self, value: Vec<u8>) {
        let index = self.start + self.num;
        if index >= self.array.len() {
            self.grow(self.num + 1);
        }
        self.array[index] = value;
        self.num += 1;
    }

    /// Remove and return the last element
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        if self.num == 0 {
            return None;
        }
        let index = self.start + self.num - 1;
        self.num -= 1;
        Some(std::mem::take(&mut self.array[index]))
    }

    /// Prepend an element at the front
    pub fn unshift(&mut self, value: impl AsRef<[u8]>) {
        if self.start < 1 {
            if self.start + self.num >= self.array.len() {
                self.grow(self.num + 1);
            }
            let new_start = self.array.len() - self.num;
            self.array.rotate_right(new_start);
            self.start = new_start;
        }
        self.start -= 1;
        self.array[self.start] = value.as_ref().to_vec();
        self.num += 1;
    }

    /// Remove and return the first element
    pub fn shift(&mut self) -> Option<Vec<u8>> {
        if self.num == 0 {
            return None;
        }
        let index = self.start;
        self.start += 1;
        self.num -= 1;
        let value = std::mem::take(&mut self.array[index]);
        if (self.start & 0xff) == 0 && self.start > self.num / 2 {
            self.array[..self.start + self.num].rotate_left(self.start);
            self.start = 0;
        }
        Some(value)
    }

    /// Insert an element before `index`; ignored when `index > len`
    pub fn insert(&mut self, index: usize, value: impl AsRef<[u8]>) {
        if index > self.num {
            return;
        }
        if self.start + self.num >= self.array.len() {
            self.grow(self.num + 1);
        }
        let at = self.start + index;
        let end = self.start + self.num;
        self.array[end] = value.as_ref().to_vec();
        self.array[at..=end].rotate_right(1);
        self.num += 1;
    }

    /// Remove and return the element at `index`
    pub fn remove(&mut self, index: usize) -> Option<Vec<u8>> {
        if index >= self.num {
            return None;
        }
        let at = self.start + index;
        let end = self.start + self.num;
        let value = std::mem::take(&mut self.array[at]);
        self.array[at..end].rotate_left(1);
        self.num -= 1;
        Some(value)
    }

    /// Overwrite the element at `index`; ignored when out of range
    pub fn over(&mut self, index: usize, value: impl AsRef<[u8]>) {
        if index >= self.num {
            return;
        }
        self.array[self.start + index] = value.as_ref().to_vec();
    }

    /// Sort in lexical byte order, shorter element first on a common prefix
    pub fn sort(&mut self) {
        self.window_mut().sort_unstable();
    }

    /// Sort with ASCII case folded, upper case first among otherwise equal bytes
    pub fn sort_ci(&mut self) {
        self.window_mut().sort_unstable_by(|a, b| compare_ci(a, b));
    }

    /// Sort with a caller-supplied comparison
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&[u8], &[u8]) -> Ordering,
    {
        self.window_mut().sort_unstable_by(|a, b| compare(a, b));
    }

    /// Index of the first element equal to `value`
    pub fn lsearch(&self, value: impl AsRef<[u8]>) -> Option<usize> {
        let value = value.as_ref();
        self.window().iter().position(|e| e.as_slice() == value)
    }

    /// Index of an element equal to `value` in a list sorted with [`ArrayList::sort`]
    pub fn bsearch(&self, value: impl AsRef<[u8]>) -> Option<usize> {
        let value = value.as_ref();
        self.window().binary_search_by(|e| e.as_slice().cmp(value)).ok()
    }

    /// Remove every element
    pub fn clear(&mut self) {
        for slot in self.window_mut() {
            *slot = Vec::new();
        }
        self.start = 0;
        self.num = 0;
    }

    /// Serialize as a sequence of length-prefixed elements
    pub fn dump(&self) -> Vec<u8> {
        let total: usize = self.iter().map(|e| e.len() + VarNum::encoded_len(e.len() as u64)).sum();
        let mut buf = Vec::with_capacity(total);
        for elem in self.iter() {
            VarNum::write_prefixed(&mut buf, elem);
        }
        buf
    }

    /// Rebuild a list from the output of [`ArrayList::dump`]
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut list = Self::new();
        let mut pos = 0;
        while pos < data.len() {
            let (elem, step) = VarNum::read_prefixed(&data[pos..]).map_err(|e| {
                MemcabError::invalid_data(format!("list dump truncated at offset {}: {}", pos, e))
            })?;
            list.push(elem);
            pos += step;
        }
        Ok(list)
    }

    /// Iterate over the elements front to back
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &[u8]> + ExactSizeIterator + '_ {
        self.window().iter().map(Vec::as_slice)
    }

    /// Collect the elements into owned vectors
    pub fn to_vec(&self) -> Vec<Vec<u8>> {
        self.window().to_vec()
    }

    fn window(&self) -> &[Vec<u8>] {
        &self.array[self.start..self.start + self.num]
    }

    fn window_mut(&mut self) -> &mut [Vec<u8>] {
        &mut self.array[self.start..self.start + self.num]
    }

    fn grow(&mut self, additional: usize) {
        reserve_or_die(&mut self.array, additional);
        let anum = self.array.len() + additional;
        self.array.resize_with(anum, Vec::new);
    }
}

fn compare_ci(a: &[u8], b: &[u8]) -> Ordering {
    for (&ac, &bc) in a.iter().zip(b.iter()) {
        let (al, bl) = (ac.to_ascii_lowercase(), bc.to_ascii_lowercase());
        match al.cmp(&bl) {
            Ordering::Equal => {}
            other => return other,
        }
        match (ac.is_ascii_uppercase(), bc.is_ascii_uppercase()) {
            (false, true) => return Ordering::Greater,
            (true, false) => return Ordering::Less,
            _ => {}
        }
    }
    a.len().cmp(&b.len())
}

impl Default for ArrayList {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ArrayList {
    fn eq(&self, other: &Self) -> bool {
        self.window() == other.window()
    }
}

impl Eq for ArrayList {}

impl fmt::Debug for ArrayList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.iter().map(String::from_utf8_lossy))
            .finish()
    }
}

impl<T: AsRef<[u8]>> FromIterator<T> for ArrayList {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut list = Self::with_capacity(iter.size_hint().0.max(LIST_UNIT));
        for item in iter {
            list.push(item);
        }
        list
    }
}

impl<T: AsRef<[u8]>> Extend<T> for ArrayList {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}
