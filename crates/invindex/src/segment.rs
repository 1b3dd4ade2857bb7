//! Immutable segment: header, global doc-id bitmap, and per-term posting
//! metadata.
//!
//! A segment is built incrementally via [`Segment::bulk_index`],
//! serialized once, and thereafter treated as read-only. Ownership is
//! strictly tree-shaped: the segment owns its term metadata, which owns
//! its blocks, which own their bitmaps and tf vectors. Query iterators
//! only ever borrow from a segment.

use crate::block::Block;
use crate::error::{InvError, Result};
use crate::iterator::{EmptyIterator, PostingIterator};
use crate::limits::{SEGMENT_FORMAT_VERSION, SEGMENT_MAGIC};
use crate::roaring::RoaringBitmap;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::{debug, warn};

/// One `(term, doc_id, tf)` input record consumed by [`Segment::bulk_index`].
#[derive(Debug, Clone, PartialEq)]
pub struct TermPosting {
    /// The term this posting belongs to.
    pub term: String,
    /// The document this posting occurs in.
    pub doc_id: u32,
    /// The term's frequency within that document.
    pub tf: f32,
}

impl TermPosting {
    /// Construct a posting.
    pub fn new(term: impl Into<String>, doc_id: u32, tf: f32) -> Self {
        TermPosting {
            term: term.into(),
            doc_id,
            tf,
        }
    }
}

/// Per-term posting-list metadata within one segment.
#[derive(Debug, Clone, Default)]
pub struct TermMetadata {
    total_docs: u32,
    blocks: Vec<Block>,
}

impl TermMetadata {
    /// Document frequency of this term within the owning segment: the sum
    /// of every block's cardinality.
    pub fn total_docs(&self) -> u32 {
        self.total_docs
    }

    /// Blocks in insertion order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

/// An immutable, self-contained posting-list store for a subset of
/// documents.
#[derive(Debug, Clone)]
pub struct Segment {
    doc_ids: RoaringBitmap,
    terms: HashMap<String, TermMetadata>,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

impl Segment {
    /// An empty, unsealed segment ready for [`Self::bulk_index`].
    pub fn new() -> Self {
        Segment {
            doc_ids: RoaringBitmap::new(),
            terms: HashMap::new(),
        }
    }

    /// Number of distinct documents indexed by this segment.
    pub fn doc_count(&self) -> usize {
        self.doc_ids.cardinality()
    }

    /// Number of distinct terms indexed by this segment.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    /// Whether `term` has any postings in this segment.
    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    /// The segment-wide doc-id bitmap: the union of every term's postings.
    pub fn doc_ids(&self) -> &RoaringBitmap {
        &self.doc_ids
    }

    /// Metadata for `term`, if present.
    pub fn term_metadata(&self, term: &str) -> Option<&TermMetadata> {
        self.terms.get(term)
    }

    /// Bulk-ingest an ordered sequence of postings.
    ///
    /// For each posting: the doc id is added to the segment-wide bitmap
    /// if new; the term's metadata is fetched or created; the last block
    /// is reused if present and not yet full, otherwise a fresh block is
    /// appended; the posting is added to that block unless it is already
    /// present there, in which case the duplicate `(term, doc_id)` pair is
    /// silently ignored.
    pub fn bulk_index<I>(&mut self, postings: I) -> Result<()>
    where
        I: IntoIterator<Item = TermPosting>,
    {
        for posting in postings {
            self.doc_ids.add(posting.doc_id);

            let metadata = self.terms.entry(posting.term.clone()).or_default();

            let needs_new_block = match metadata.blocks.last() {
                None => true,
                Some(block) => block.is_full(),
            };
            if needs_new_block {
                metadata.blocks.push(Block::new(posting.doc_id));
            }

            let block = metadata
                .blocks
                .last_mut()
                .expect("a block was just ensured to exist");
            if !block.contains(posting.doc_id) {
                block.add(posting.doc_id, posting.tf)?;
                metadata.total_docs += 1;
            }
        }

        debug!(
            doc_count = self.doc_count(),
            term_count = self.term_count(),
            "bulk_index complete"
        );
        Ok(())
    }

    /// A posting-list iterator over `term`'s blocks, or an empty iterator
    /// if the term has no postings in this segment.
    pub fn term_iterator(&self, term: &str) -> PostingIterator<'_> {
        match self.terms.get(term) {
            Some(metadata) if !metadata.blocks.is_empty() => {
                PostingIterator::over_blocks(term.to_string(), &metadata.blocks)
            }
            _ => PostingIterator::Empty(EmptyIterator::new(term.to_string())),
        }
    }

    /// Serialize as `magic:u32 version:u8 doc_id_bitmap num_terms:u32
    /// term*`, each term as `term_len:u16 term_bytes total_docs:u32
    /// num_blocks:u32 block*`.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(SEGMENT_MAGIC)?;
        w.write_u8(SEGMENT_FORMAT_VERSION)?;
        self.doc_ids.serialize(w)?;
        w.write_u32::<LittleEndian>(self.terms.len() as u32)?;

        for (term, metadata) in self.terms.iter() {
            let term_bytes = term.as_bytes();
            w.write_u16::<LittleEndian>(term_bytes.len() as u16)?;
            w.write_all(term_bytes)?;
            w.write_u32::<LittleEndian>(metadata.total_docs)?;
            w.write_u32::<LittleEndian>(metadata.blocks.len() as u32)?;
            for block in &metadata.blocks {
                block.serialize(w)?;
            }
        }

        debug!(
            doc_count = self.doc_count(),
            term_count = self.term_count(),
            "segment serialized"
        );
        Ok(())
    }

    /// Deserialize a segment previously written by [`Self::serialize`].
    /// Fails with [`InvError::MalformedEncoding`] on a magic or version
    /// mismatch, and with [`InvError::Corruption`] if trailing bytes
    /// remain after the last term.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let magic = r.read_u32::<LittleEndian>()?;
        if magic != SEGMENT_MAGIC {
            warn!(magic, expected = SEGMENT_MAGIC, "segment magic mismatch");
            return Err(InvError::MalformedEncoding(format!(
                "bad segment magic: {magic:#010x}"
            )));
        }
        let version = r.read_u8()?;
        if version != SEGMENT_FORMAT_VERSION {
            return Err(InvError::MalformedEncoding(format!(
                "unsupported segment format version: {version}"
            )));
        }

        let doc_ids = RoaringBitmap::deserialize(r)?;
        let num_terms = r.read_u32::<LittleEndian>()?;

        let mut terms = HashMap::with_capacity(num_terms as usize);
        for _ in 0..num_terms {
            let term_len = r.read_u16::<LittleEndian>()? as usize;
            let mut term_bytes = vec![0u8; term_len];
            r.read_exact(&mut term_bytes)?;
            let term = String::from_utf8(term_bytes)
                .map_err(|e| InvError::MalformedEncoding(format!("non-utf8 term: {e}")))?;

            let total_docs = r.read_u32::<LittleEndian>()?;
            let num_blocks = r.read_u32::<LittleEndian>()?;
            let mut blocks = Vec::with_capacity(num_blocks as usize);
            for _ in 0..num_blocks {
                blocks.push(Block::deserialize(r)?);
            }

            terms.insert(term, TermMetadata { total_docs, blocks });
        }

        let mut probe = [0u8; 1];
        match r.read(&mut probe) {
            Ok(0) => {}
            Ok(_) => {
                return Err(InvError::Corruption(
                    "trailing bytes after last term".to_string(),
                ));
            }
            Err(e) => return Err(InvError::Io(e)),
        }

        debug!(
            doc_count = doc_ids.cardinality(),
            term_count = terms.len(),
            "segment deserialized"
        );
        Ok(Segment { doc_ids, terms })
    }
}
