//! Bitmap container: a fixed 1024-word (65536-bit) bitmap.
//!
//! Used once an array container's cardinality crosses
//! [`ARRAY_TO_BITMAP_THRESHOLD`](crate::limits::ARRAY_TO_BITMAP_THRESHOLD).
//! Cardinality is tracked explicitly rather than recomputed by popcount on
//! every query, though union/intersection do recompute it after the
//! bitwise pass.

use crate::error::Result;
use crate::limits::BITMAP_CONTAINER_WORDS;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Fixed-size 65536-bit bitmap over the low 16 bits of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapContainer {
    words: Box<[u64; BITMAP_CONTAINER_WORDS]>,
    cardinality: usize,
}

impl Default for BitmapContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl BitmapContainer {
    /// An all-zero bitmap container.
    pub fn new() -> Self {
        BitmapContainer {
            words: Box::new([0u64; BITMAP_CONTAINER_WORDS]),
            cardinality: 0,
        }
    }

    fn word_index(v: u16) -> usize {
        (v >> 6) as usize
    }

    fn bit_mask(v: u16) -> u64 {
        1u64 << (v & 0x3f)
    }

    /// Number of set bits.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Set bit `v`. Increments the cached cardinality only on a 0->1
    /// transition.
    pub fn add(&mut self, v: u16) -> bool {
        let idx = Self::word_index(v);
        let mask = Self::bit_mask(v);
        if self.words[idx] & mask == 0 {
            self.words[idx] |= mask;
            self.cardinality += 1;
            true
        } else {
            false
        }
    }

    /// Whether bit `v` is set.
    pub fn contains(&self, v: u16) -> bool {
        self.words[Self::word_index(v)] & Self::bit_mask(v) != 0
    }

    /// Count of set bits at positions `<= v`: full popcount of every word
    /// strictly before `word(v)`, plus the masked popcount of `word(v)`
    /// itself.
    pub fn rank(&self, v: u16) -> usize {
        let word_idx = Self::word_index(v);
        let mut count = 0usize;
        for word in &self.words[..word_idx] {
            count += word.count_ones() as usize;
        }
        let bit_in_word = v & 0x3f;
        // Mask keeping bits [0, bit_in_word] inclusive.
        let mask = if bit_in_word == 63 {
            u64::MAX
        } else {
            (1u64 << (bit_in_word + 1)) - 1
        };
        count += (self.words[word_idx] & mask).count_ones() as usize;
        count
    }

    /// Bitwise OR, recomputing cardinality by popcount.
    pub fn union(&self, other: &BitmapContainer) -> BitmapContainer {
        let mut words = Box::new([0u64; BITMAP_CONTAINER_WORDS]);
        let mut cardinality = 0usize;
        for i in 0..BITMAP_CONTAINER_WORDS {
            words[i] = self.words[i] | other.words[i];
            cardinality += words[i].count_ones() as usize;
        }
        BitmapContainer { words, cardinality }
    }

    /// Bitwise AND, recomputing cardinality by popcount.
    pub fn intersection(&self, other: &BitmapContainer) -> BitmapContainer {
        let mut words = Box::new([0u64; BITMAP_CONTAINER_WORDS]);
        let mut cardinality = 0usize;
        for i in 0..BITMAP_CONTAINER_WORDS {
            words[i] = self.words[i] & other.words[i];
            cardinality += words[i].count_ones() as usize;
        }
        BitmapContainer { words, cardinality }
    }

    /// The raw words, for iteration and array conversion.
    pub fn words(&self) -> &[u64; BITMAP_CONTAINER_WORDS] {
        &self.words
    }

    /// Walk set bits and collect their positions.
    pub fn to_array_values(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(self.cardinality);
        for (word_idx, &word) in self.words.iter().enumerate() {
            let mut remaining = word;
            while remaining != 0 {
                let bit = remaining.trailing_zeros();
                out.push((word_idx * 64 + bit as usize) as u16);
                remaining &= remaining - 1;
            }
        }
        out
    }

    /// Serialize as `length:u32 words:[u64; length] cardinality:u32`.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(BITMAP_CONTAINER_WORDS as u32)?;
        for &word in self.words.iter() {
            w.write_u64::<LittleEndian>(word)?;
        }
        w.write_u32::<LittleEndian>(self.cardinality as u32)?;
        Ok(())
    }

    /// Deserialize a container previously written by [`Self::serialize`].
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let length = r.read_u32::<LittleEndian>()? as usize;
        let mut words = Box::new([0u64; BITMAP_CONTAINER_WORDS]);
        for slot in words.iter_mut().take(length.min(BITMAP_CONTAINER_WORDS)) {
            *slot = r.read_u64::<LittleEndian>()?;
        }
        for _ in BITMAP_CONTAINER_WORDS..length {
            r.read_u64::<LittleEndian>()?;
        }
        let stored_cardinality = r.read_u32::<LittleEndian>()? as usize;
        let computed: usize = words.iter().map(|w| w.count_ones() as usize).sum();
        debug_assert_eq!(stored_cardinality, computed);
        Ok(BitmapContainer {
            words,
            cardinality: computed,
        })
    }
}
