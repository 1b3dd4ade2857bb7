//! Immutable inverted-index segment store with a multi-term TF-IDF
//! ranked query engine over roaring-bitmap-compressed posting lists.
//!
//! A [`Segment`](segment::Segment) is an append-only posting-list store
//! built via [`Segment::bulk_index`](segment::Segment::bulk_index) and
//! thereafter treated as read-only. Segments serialize to a normative
//! binary wire format and can be queried individually or together
//! through a [`QueryEngine`](query::QueryEngine).
//!
//! ```text
//! varint -> array codecs -> roaring containers -> roaring bitmap
//!        -> block -> segment -> posting iterators -> query engine
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod block;
pub mod codec;
pub mod error;
pub mod ingest;
pub mod iterator;
pub mod limits;
pub mod query;
pub mod roaring;
pub mod segment;
pub mod varint;

pub use error::{InvError, Result};
pub use ingest::{JsonPosting, SegmentPostings};
pub use iterator::PostingIterator;
pub use query::{QueryEngine, ScoredDoc};
pub use roaring::RoaringBitmap;
pub use segment::{Segment, TermMetadata, TermPosting};
