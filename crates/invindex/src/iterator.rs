//! Posting-list iteration over a term's blocks.
//!
//! Unlike [`crate::roaring::BitmapIterator`], which walks the raw doc ids
//! of one bitmap, a [`PostingIterator`] walks the blocks of a single
//! term's posting list in order, yielding `(doc_id, tf)` pairs lazily —
//! one block's bitmap is iterated at a time rather than materializing the
//! whole posting list up front.

use crate::block::Block;
use crate::error::{InvError, Result};
use crate::roaring::BitmapIterator;

/// Iterates the postings of a single term, block by block, in ascending
/// doc-id order within each block.
///
/// Two blocks of the same term may overlap in doc-id range if the input
/// to `bulk_index` was not sorted by doc id; this iterator does not merge
/// or re-sort across blocks, it simply walks them in storage order.
pub enum PostingIterator<'a> {
    /// A term with at least one block of postings.
    NonEmpty(NonEmptyIterator<'a>),
    /// A term absent from the segment, or with no blocks.
    Empty(EmptyIterator),
}

impl<'a> PostingIterator<'a> {
    pub(crate) fn over_blocks(term: String, blocks: &'a [Block]) -> Self {
        PostingIterator::NonEmpty(NonEmptyIterator::new(term, blocks))
    }

    /// Advance to the next posting. Returns `Ok(true)` if one was found,
    /// `Ok(false)` if the iterator is exhausted.
    pub fn next(&mut self) -> Result<bool> {
        match self {
            PostingIterator::NonEmpty(it) => Ok(it.advance()),
            PostingIterator::Empty(_) => Ok(false),
        }
    }

    /// The term this iterator walks.
    pub fn term(&self) -> &str {
        match self {
            PostingIterator::NonEmpty(it) => &it.term,
            PostingIterator::Empty(it) => &it.term,
        }
    }

    /// The doc id at the current position. Fails with
    /// [`InvError::ExhaustedIterator`] before the first `next()` call or
    /// after the iterator is exhausted.
    pub fn doc_id(&self) -> Result<u32> {
        match self {
            PostingIterator::NonEmpty(it) => it.current_doc_id.ok_or(InvError::ExhaustedIterator),
            PostingIterator::Empty(_) => Err(InvError::ExhaustedIterator),
        }
    }

    /// The term frequency at the current position.
    pub fn term_frequency(&self) -> Result<f32> {
        match self {
            PostingIterator::NonEmpty(it) => it.current_tf.ok_or(InvError::ExhaustedIterator),
            PostingIterator::Empty(_) => Err(InvError::ExhaustedIterator),
        }
    }

    /// Index of the block the current position belongs to.
    pub fn current_block(&self) -> Result<usize> {
        match self {
            PostingIterator::NonEmpty(it) => {
                if it.current_doc_id.is_some() {
                    Ok(it.block_idx)
                } else {
                    Err(InvError::ExhaustedIterator)
                }
            }
            PostingIterator::Empty(_) => Err(InvError::ExhaustedIterator),
        }
    }
}

/// Iterator state for a term with at least one block.
pub struct NonEmptyIterator<'a> {
    term: String,
    blocks: &'a [Block],
    block_idx: usize,
    block_iter: Option<BitmapIterator<'a>>,
    current_doc_id: Option<u32>,
    current_tf: Option<f32>,
}

impl<'a> NonEmptyIterator<'a> {
    fn new(term: String, blocks: &'a [Block]) -> Self {
        NonEmptyIterator {
            term,
            blocks,
            block_idx: 0,
            block_iter: None,
            current_doc_id: None,
            current_tf: None,
        }
    }

    fn advance(&mut self) -> bool {
        loop {
            if self.block_iter.is_none() {
                match self.blocks.get(self.block_idx) {
                    Some(block) => self.block_iter = Some(block.bitmap().iter()),
                    None => {
                        self.current_doc_id = None;
                        self.current_tf = None;
                        return false;
                    }
                }
            }

            let iter = self.block_iter.as_mut().expect("just ensured present");
            match iter.next() {
                Some(doc_id) => {
                    let block = &self.blocks[self.block_idx];
                    let tf = block
                        .tf_at(doc_id)
                        .expect("doc id yielded by this block's own bitmap iterator");
                    self.current_doc_id = Some(doc_id);
                    self.current_tf = Some(tf);
                    return true;
                }
                None => {
                    self.block_iter = None;
                    self.block_idx += 1;
                }
            }
        }
    }
}

/// Iterator state for a term with no postings in a segment.
pub struct EmptyIterator {
    term: String,
}

impl EmptyIterator {
    pub(crate) fn new(term: String) -> Self {
        EmptyIterator { term }
    }
}
