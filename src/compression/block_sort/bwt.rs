//! Burrows-Wheeler transform of a single block
//!
//! Rotations are addressed by their start offset into a doubled copy of the
//! block, so rotation `r` is simply `text[r..r + len]`. Sorting is a most
//! significant byte first counting sort that refines large buckets for a
//! bounded number of byte positions; small buckets go to insertion sort and
//! large buckets below the refinement depth go to heap sort.

use crate::config::block_sort::BlockSortConfig;
use std::cmp::Ordering;

/// Rotation sorter over one doubled block
struct RotationSorter<'a> {
    text: &'a [u8],
    len: usize,
    threshold: usize,
    levels: usize,
}

impl<'a> RotationSorter<'a> {
    #[inline]
    fn compare(&self, a: u32, b: u32, skip: usize) -> Ordering {
        let (a, b) = (a as usize, b as usize);
        self.text[a + skip..a + self.len].cmp(&self.text[b + skip..b + self.len])
    }

    /// Bucket by the byte at `level` (byte 0 when `level` is `None`)
    ///
    /// `None` sorts the first byte only and finishes every bucket without
    /// further counting passes.
    fn count_sort(&self, rots: &mut [u32], level: Option<usize>) {
        let skip = level.unwrap_or(0);
        let mut count = [0usize; 256];
        for &r in rots.iter() {
            count[self.text[r as usize + skip] as usize] += 1;
        }
        let mut offsets = [0usize; 256];
        let mut total = 0;
        for (offset, &c) in offsets.iter_mut().zip(count.iter()) {
            *offset = total;
            total += c;
        }
        let mut bucketed = vec![0u32; rots.len()];
        for &r in rots.iter() {
            let slot = &mut offsets[self.text[r as usize + skip] as usize];
            bucketed[*slot] = r;
            *slot += 1;
        }
        rots.copy_from_slice(&bucketed);

        let next = skip + 1;
        if next >= self.len {
            return;
        }
        let refine = matches!(level, Some(l) if l < self.levels);
        let mut off = 0;
        for &c in count.iter() {
            if c > 1 {
                let bucket = &mut rots[off..off + c];
                if c < self.threshold {
                    self.insertion_sort(bucket, next);
                } else if refine {
                    self.count_sort(bucket, Some(next));
                } else {
                    self.heap_sort(bucket, next);
                }
            }
            off += c;
        }
    }

    fn insertion_sort(&self, rots: &mut [u32], skip: usize) {
        for i in 1..rots.len() {
            let current = rots[i];
            let mut j = i;
            while j > 0 && self.compare(rots[j - 1], current, skip) == Ordering::Greater {
                rots[j] = rots[j - 1];
                j -= 1;
            }
            rots[j] = current;
        }
    }

    fn heap_sort(&self, rots: &mut [u32], skip: usize) {
        let n = rots.len();
        for start in (0..n / 2).rev() {
            self.sift_down(rots, start, n, skip);
        }
        for end in (1..n).rev() {
            rots.swap(0, end);
            self.sift_down(rots, 0, end, skip);
        }
    }

    fn sift_down(&self, rots: &mut [u32], mut root: usize, end: usize, skip: usize) {
        loop {
            let mut child = root * 2 + 1;
            if child >= end {
                return;
            }
            if child + 1 < end
                && self.compare(rots[child], rots[child + 1], skip) == Ordering::Less
            {
                child += 1;
            }
            if self.compare(rots[root], rots[child], skip) != Ordering::Less {
                return;
            }
            rots.swap(root, child);
            root = child;
        }
    }
}

/// Append the last column of `block` to `out` and return the primary index
///
/// With `refine` unset the rotations are bucketed on their first byte only.
pub(crate) fn encode_block(
    block: &[u8],
    out: &mut Vec<u8>,
    config: &BlockSortConfig,
    refine: bool,
) -> usize {
    let len = block.len();
    if len == 0 {
        return 0;
    }
    let mut text = Vec::with_capacity(len * 2);
    text.extend_from_slice(block);
    text.extend_from_slice(block);

    let sorter = RotationSorter {
        text: &text,
        len,
        threshold: config.count_sort_threshold,
        levels: config.count_sort_levels,
    };
    let mut rots: Vec<u32> = (0..len as u32).collect();
    if len >= config.count_sort_threshold {
        sorter.count_sort(&mut rots, refine.then_some(0));
    } else if len > 1 {
        sorter.insertion_sort(&mut rots, 0);
    }

    let mut primary = 0;
    out.reserve(len);
    for (i, &r) in rots.iter().enumerate() {
        if r == 0 {
            primary = i;
            out.push(block[len - 1]);
        } else {
            out.push(block[r as usize - 1]);
        }
    }
    primary
}

/// Column code: symbol in the high half, occurrence rank in the low half
#[derive(Debug, Clone, Copy)]
struct ColumnRecord {
    first: u64,
    last: u64,
}

#[inline]
fn column_code(symbol: u8, rank: &mut [u32; 256]) -> u64 {
    let code = ((symbol as u64) << 32) | rank[symbol as usize] as u64;
    rank[symbol as usize] += 1;
    code
}

fn sort_symbols(symbols: &mut [u8], threshold: usize) {
    if symbols.len() >= threshold {
        let mut count = [0usize; 256];
        for &b in symbols.iter() {
            count[b as usize] += 1;
        }
        let mut pos = 0;
        for (b, &c) in count.iter().enumerate() {
            symbols[pos..pos + c].fill(b as u8);
            pos += c;
        }
    } else {
        for i in 1..symbols.len() {
            let current = symbols[i];
            let mut j = i;
            while j > 0 && symbols[j - 1] > current {
                symbols[j] = symbols[j - 1];
                j -= 1;
            }
            symbols[j] = current;
        }
    }
}

/// Order records by their last-column code
///
/// Ranks grow with position, so a stable bucket pass on the symbol alone
/// leaves each bucket already ordered by rank.
fn sort_records(records: &mut Vec<ColumnRecord>, threshold: usize) {
    if records.len() >= threshold {
        let mut count = [0usize; 256];
        for r in records.iter() {
            count[(r.last >> 32) as usize] += 1;
        }
        let mut offsets = [0usize; 256];
        let mut total = 0;
        for (offset, &c) in offsets.iter_mut().zip(count.iter()) {
            *offset = total;
            total += c;
        }
        let mut sorted = vec![ColumnRecord { first: 0, last: 0 }; records.len()];
        for r in records.iter() {
            let slot = &mut offsets[(r.last >> 32) as usize];
            sorted[*slot] = *r;
            *slot += 1;
        }
        *records = sorted;
    } else {
        for i in 1..records.len() {
            let current = records[i];
            let mut j = i;
            while j > 0 && records[j - 1].last > current.last {
                records[j] = records[j - 1];
                j -= 1;
            }
            records[j] = current;
        }
    }
}

/// Rebuild a block from its last column and primary index
///
/// A primary index past the end of the block is read as 0.
pub(crate) fn decode_block(last: &[u8], primary: usize, threshold: usize) -> Vec<u8> {
    let len = last.len();
    if len == 0 {
        return Vec::new();
    }
    let primary = if primary >= len {
        log::warn!("primary index {} out of range for block of {}, using 0", primary, len);
        0
    } else {
        primary
    };

    let mut first = last.to_vec();
    sort_symbols(&mut first, threshold);

    let mut first_rank = [0u32; 256];
    let mut last_rank = [0u32; 256];
    let mut records: Vec<ColumnRecord> = first
        .iter()
        .zip(last.iter())
        .map(|(&f, &l)| ColumnRecord {
            first: column_code(f, &mut first_rank),
            last: column_code(l, &mut last_rank),
        })
        .collect();

    let start = records[primary].first;
    sort_records(&mut records, threshold);
    let mut pos = records.iter().position(|r| r.first == start).unwrap_or(0);

    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let code = records[pos].first;
        out.push((code >> 32) as u8);
        match records.binary_search_by(|r| r.last.cmp(&code)) {
            Ok(next) => pos = next,
            Err(_) => break,
        }
    }
    out
}

/// Transform `input` as one block
///
/// Returns the last column and the primary index. Rotations are bucketed on
/// the first byte only; [`BlockSortCodec`](super::BlockSortCodec) refines
/// deeper.
///
/// ```rust
/// use memcab::compression::{bwt_decode, bwt_encode};
///
/// let (column, primary) = bwt_encode(b"banana");
/// assert_eq!(column, b"nnbaaa".to_vec());
/// assert_eq!(primary, 3);
/// assert_eq!(bwt_decode(&column, primary), b"banana".to_vec());
/// ```
pub fn bwt_encode(input: &[u8]) -> (Vec<u8>, usize) {
    let mut out = Vec::with_capacity(input.len());
    let primary = encode_block(input, &mut out, &BlockSortConfig::default(), false);
    (out, primary)
}

/// Invert [`bwt_encode`]
pub fn bwt_decode(input: &[u8], primary: usize) -> Vec<u8> {
    decode_block(input, primary, BlockSortConfig::default().count_sort_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_bwt(input: &[u8]) -> (Vec<u8>, usize) {
        let n = input.len();
        let mut rots: Vec<usize> = (0..n).collect();
        rots.sort_by(|&a, &b| {
            let ra = input[a..].iter().chain(input[..a].iter());
            let rb = input[b..].iter().chain(input[..b].iter());
            ra.cmp(rb)
        });
        let column = rots.iter().map(|&r| input[(r + n - 1) % n]).collect();
        let primary = rots.iter().position(|&r| r == 0).unwrap_or(0);
        (column, primary)
    }

    #[test]
    fn test_banana() {
        let (column, primary) = bwt_encode(b"banana");
        assert_eq!(column, b"nnbaaa");
        assert_eq!(primary, 3);
        assert_eq!(bwt_decode(&column, primary), b"banana");
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(bwt_encode(b""), (Vec::new(), 0));
        assert!(bwt_decode(b"", 0).is_empty());
        assert_eq!(bwt_encode(b"x"), (b"x".to_vec(), 0));
        assert_eq!(bwt_decode(b"x", 0), b"x");
    }

    #[test]
    fn test_matches_naive_transform() {
        let text = b"the quick brown fox jumps over the lazy dog, the end. ".repeat(6);
        let config = BlockSortConfig::default();
        let (expected, _) = naive_bwt(&text);
        let mut refined = Vec::new();
        let primary = encode_block(&text, &mut refined, &config, true);
        assert_eq!(refined, expected);
        assert_eq!(decode_block(&refined, primary, 64), text);
        // equal rotations may trade places, the column cannot change
        let (shallow, primary) = bwt_encode(&text);
        assert_eq!(shallow, expected);
        assert_eq!(bwt_decode(&shallow, primary), text);
    }

    #[test]
    fn test_deep_buckets_use_heap_sort() {
        let config = BlockSortConfig {
            count_sort_levels: 0,
            count_sort_threshold: 4,
            ..BlockSortConfig::default()
        };
        let text: Vec<u8> = (0..500u32).map(|i| b"ab"[(i * i % 7 % 2) as usize]).collect();
        let mut column = Vec::new();
        let primary = encode_block(&text, &mut column, &config, true);
        assert_eq!(column, naive_bwt(&text).0);
        assert_eq!(decode_block(&column, primary, 4), text);
    }

    #[test]
    fn test_periodic_input() {
        let text = b"abab".repeat(40);
        let (column, primary) = bwt_encode(&text);
        assert_eq!(bwt_decode(&column, primary), text);
        let same = vec![7u8; 300];
        let (column, primary) = bwt_encode(&same);
        assert_eq!(column, same);
        assert_eq!(bwt_decode(&column, primary), same);
    }

    #[test]
    fn test_bad_primary_index_is_clamped() {
        let (column, _) = bwt_encode(b"mississippi");
        let decoded = bwt_decode(&column, 1000);
        assert_eq!(decoded.len(), column.len());
    }

    #[test]
    fn test_small_blocks_insertion_path() {
        for text in [&b"ba"[..], b"cab", b"zyxwvutsr", b"hello world"] {
            let (column, primary) = bwt_encode(text);
            assert_eq!((column.clone(), primary), naive_bwt(text));
            assert_eq!(bwt_decode(&column, primary), text);
        }
    }
}
