//! A single contiguous chunk of a term's posting list.
//!
//! A block pairs a [`RoaringBitmap`] of doc ids with a parallel vector of
//! term frequencies aligned by the bitmap's rank order: `tfs[i]` is the
//! term frequency for the i-th doc id when the bitmap is walked in
//! ascending order. Blocks roll over once they reach
//! [`MAX_DOCS_PER_BLOCK`](crate::limits::MAX_DOCS_PER_BLOCK).

use crate::error::{InvError, Result};
use crate::limits::MAX_DOCS_PER_BLOCK;
use crate::roaring::RoaringBitmap;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// One posting-list chunk: a bitmap of doc ids plus aligned term
/// frequencies.
#[derive(Debug, Clone)]
pub struct Block {
    min_doc_id: u32,
    max_doc_id: u32,
    bitmap: RoaringBitmap,
    tfs: Vec<f32>,
}

impl Block {
    /// Start a new, empty block whose range is seeded with `doc_id` (the
    /// id that triggered its creation). Both `min_doc_id` and
    /// `max_doc_id` start at `doc_id`; the caller is expected to follow up
    /// with [`Self::add`] to actually insert the triggering posting.
    pub fn new(doc_id: u32) -> Self {
        Block {
            min_doc_id: doc_id,
            max_doc_id: doc_id,
            bitmap: RoaringBitmap::new(),
            tfs: Vec::new(),
        }
    }

    /// Whether this block already holds `MAX_DOCS_PER_BLOCK` documents and
    /// must not accept any more.
    pub fn is_full(&self) -> bool {
        self.cardinality() >= MAX_DOCS_PER_BLOCK
    }

    /// Number of documents held in this block.
    pub fn cardinality(&self) -> usize {
        self.bitmap.cardinality()
    }

    /// Lowest doc id ever added to this block.
    pub fn min_doc_id(&self) -> u32 {
        self.min_doc_id
    }

    /// Highest doc id ever added to this block.
    pub fn max_doc_id(&self) -> u32 {
        self.max_doc_id
    }

    /// Whether `doc_id` is present in this block.
    pub fn contains(&self, doc_id: u32) -> bool {
        self.bitmap.contains(doc_id)
    }

    /// Read-only access to the block's doc-id bitmap, for iteration.
    pub fn bitmap(&self) -> &RoaringBitmap {
        &self.bitmap
    }

    /// Add `(doc_id, tf)` to this block. Callers must have already
    /// checked `!contains(doc_id)` and `!is_full()`; this only re-asserts
    /// the bitmap/tfs alignment invariant after the write.
    ///
    /// `tfs` is kept aligned with the bitmap's ascending rank order, not
    /// insertion order: a doc id added out of order is inserted into
    /// `tfs` at the rank position its bitmap membership now occupies.
    pub fn add(&mut self, doc_id: u32, tf: f32) -> Result<()> {
        self.bitmap.add(doc_id);
        let pos = self.bitmap.rank(doc_id);
        self.tfs.insert(pos - 1, tf);
        if self.bitmap.cardinality() != self.tfs.len() {
            return Err(InvError::InvariantViolation(format!(
                "block bitmap cardinality {} diverged from tfs length {}",
                self.bitmap.cardinality(),
                self.tfs.len()
            )));
        }
        self.min_doc_id = self.min_doc_id.min(doc_id);
        self.max_doc_id = self.max_doc_id.max(doc_id);
        Ok(())
    }

    /// Term frequency for `doc_id`, found by ranking it within the
    /// block's bitmap. Fails with [`InvError::OutOfRange`] if `doc_id` is
    /// absent (rank 0) or the rank exceeds the tf vector.
    pub fn tf_at(&self, doc_id: u32) -> Result<f32> {
        let rank = self.bitmap.rank(doc_id);
        if rank == 0 || rank > self.tfs.len() {
            return Err(InvError::OutOfRange(format!(
                "doc id {doc_id} has no term frequency in this block (rank {rank})"
            )));
        }
        Ok(self.tfs[rank - 1])
    }

    /// Serialize as `min_doc_id:u32 max_doc_id:u32 bitmap num_tfs:u32
    /// tf_delta:[f32; num_tfs]`, using the delta-float tf encoding: the
    /// first value is absolute, the rest are successive differences.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.min_doc_id)?;
        w.write_u32::<LittleEndian>(self.max_doc_id)?;
        self.bitmap.serialize(w)?;
        w.write_u32::<LittleEndian>(self.tfs.len() as u32)?;
        let mut prev = 0.0f32;
        for &tf in &self.tfs {
            w.write_f32::<LittleEndian>(tf - prev)?;
            prev = tf;
        }
        Ok(())
    }

    /// Deserialize a block previously written by [`Self::serialize`].
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let min_doc_id = r.read_u32::<LittleEndian>()?;
        let max_doc_id = r.read_u32::<LittleEndian>()?;
        let bitmap = RoaringBitmap::deserialize(r)?;
        let num_tfs = r.read_u32::<LittleEndian>()? as usize;
        let mut tfs = Vec::with_capacity(num_tfs);
        let mut running = 0.0f32;
        for _ in 0..num_tfs {
            let delta = r.read_f32::<LittleEndian>()?;
            running += delta;
            tfs.push(running);
        }
        if bitmap.cardinality() != tfs.len() {
            return Err(InvError::InvariantViolation(format!(
                "deserialized block bitmap cardinality {} diverged from tfs length {}",
                bitmap.cardinality(),
                tfs.len()
            )));
        }
        Ok(Block {
            min_doc_id,
            max_doc_id,
            bitmap,
            tfs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn new_block_has_min_eq_max_eq_seed_doc_but_is_empty() {
        let b = Block::new(42);
        assert_eq!(b.min_doc_id(), 42);
        assert_eq!(b.max_doc_id(), 42);
        assert_eq!(b.cardinality(), 0);
    }

    #[test]
    fn add_updates_min_max_and_tf_lookup() {
        let mut b = Block::new(5);
        b.add(5, 1.0).unwrap();
        b.add(10, 2.0).unwrap();
        b.add(1, 0.5).unwrap();
        assert_eq!(b.min_doc_id(), 1);
        assert_eq!(b.max_doc_id(), 10);
        assert_eq!(b.cardinality(), 3);
        assert_eq!(b.tf_at(1).unwrap(), 0.5);
        assert_eq!(b.tf_at(5).unwrap(), 1.0);
        assert_eq!(b.tf_at(10).unwrap(), 2.0);
    }

    #[test]
    fn tf_at_missing_doc_is_out_of_range() {
        let mut b = Block::new(5);
        b.add(5, 1.0).unwrap();
        let err = b.tf_at(999).unwrap_err();
        assert!(matches!(err, InvError::OutOfRange(_)));
    }

    #[test]
    fn is_full_at_max_docs_per_block() {
        let mut b = Block::new(0);
        for doc_id in 0..MAX_DOCS_PER_BLOCK as u32 {
            assert!(!b.is_full());
            b.add(doc_id, 1.0).unwrap();
        }
        assert!(b.is_full());
        assert_eq!(b.cardinality(), MAX_DOCS_PER_BLOCK);
    }

    #[test]
    fn serialize_roundtrip_preserves_tfs_and_range() {
        let mut b = Block::new(3);
        b.add(3, 1.25).unwrap();
        b.add(7, 2.5).unwrap();
        b.add(100, 0.1).unwrap();

        let mut buf = Vec::new();
        b.serialize(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let restored = Block::deserialize(&mut cursor).unwrap();

        assert_eq!(restored.min_doc_id(), b.min_doc_id());
        assert_eq!(restored.max_doc_id(), b.max_doc_id());
        assert_eq!(restored.cardinality(), b.cardinality());
        for doc_id in [3u32, 7, 100] {
            assert!((restored.tf_at(doc_id).unwrap() - b.tf_at(doc_id).unwrap()).abs() < 1e-6);
        }
    }
}
