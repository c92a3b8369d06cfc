//! Move-to-front transform
//!
//! The symbol table starts in identity order. Every step rebuilds it into a
//! second buffer with the current symbol in front and the two buffers swap
//! roles, so no element is shifted in place.

/// Symbol table pair used by both directions
struct MtfTables {
    front: [u8; 256],
    back: [u8; 256],
}

impl MtfTables {
    fn new() -> Self {
        let mut front = [0u8; 256];
        for (i, slot) in front.iter_mut().enumerate() {
            *slot = i as u8;
        }
        Self {
            front,
            back: [0u8; 256],
        }
    }

    #[inline]
    fn rank_of(&self, symbol: u8) -> usize {
        // every byte is in the table
        self.front.iter().position(|&s| s == symbol).unwrap_or(0)
    }

    #[inline]
    fn promote(&mut self, rank: usize) {
        if rank == 0 {
            return;
        }
        let symbol = self.front[rank];
        self.back[0] = symbol;
        self.back[1..=rank].copy_from_slice(&self.front[..rank]);
        self.back[rank + 1..].copy_from_slice(&self.front[rank + 1..]);
        std::mem::swap(&mut self.front, &mut self.back);
    }
}

/// Replace each byte with its rank in the symbol table, in place
pub fn mtf_encode(data: &mut [u8]) {
    let mut tables = MtfTables::new();
    for b in data.iter_mut() {
        let rank = tables.rank_of(*b);
        *b = rank as u8;
        tables.promote(rank);
    }
}

/// Replace each rank with the symbol it names, in place
pub fn mtf_decode(data: &mut [u8]) {
    let mut tables = MtfTables::new();
    for b in data.iter_mut() {
        let rank = *b as usize;
        *b = tables.front[rank];
        tables.promote(rank);
    }
}
