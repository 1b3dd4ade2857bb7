//! Error types for the inverted-index segment store.
//!
//! This module defines every error kind the crate can surface, following
//! the error taxonomy from the segment-store design: invalid arguments,
//! out-of-range accesses, invariant violations inside a block, malformed
//! wire encodings, stream corruption, unresolved query terms, and
//! underlying I/O failures. We use `thiserror` for `Display`/`Error`.

use std::io;
use thiserror::Error;

/// Result type alias for inverted-index operations.
pub type Result<T> = std::result::Result<T, InvError>;

/// Unified error type for the inverted-index segment store.
#[derive(Debug, Error)]
pub enum InvError {
    /// A caller-supplied argument was invalid (empty segment list, zero
    /// `total_docs`, a `total_docs` that disagrees with the segments, etc).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A rank or positional lookup fell outside the valid range.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// An in-memory structural invariant was violated (e.g. a block's
    /// bitmap cardinality diverged from its term-frequency vector length).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A wire encoding could not be parsed: varint overflow, unknown
    /// container type tag, magic number or version mismatch.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// The stream did not end where the logical format said it should:
    /// trailing bytes after the last term, or a truncated read.
    #[error("corruption: {0}")]
    Corruption(String),

    /// None of the loaded segments had any postings for a queried term.
    #[error("term not found: {0:?}")]
    TermNotFound(String),

    /// Accessor called on an iterator that has not been advanced, or has
    /// been exhausted.
    #[error("iterator exhausted")]
    ExhaustedIterator,

    /// The underlying byte stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
