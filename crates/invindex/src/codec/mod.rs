//! 16-bit array codecs.
//!
//! Two interchangeable encodings for a sequence of `u16`s: [`plain`] (raw
//! little-endian) and [`delta`] (first value raw, remainder as
//! varint-encoded successive differences, with a minimum-length fallback
//! to plain). Both operate over a caller-provided byte stream so they can
//! be used directly against a segment file or an in-memory buffer.

pub mod delta;
pub mod plain;

use crate::error::Result;
use std::io::{Read, Write};

/// A codec for a sequence of `u16` values.
///
/// This is the seam between container storage and its wire
/// representation: roaring array containers call through this trait
/// rather than hand-rolling byte layout inline.
pub trait ArrayCodec {
    /// Encode `values` to `w`.
    fn encode<W: Write>(&self, w: &mut W, values: &[u16]) -> Result<()>;

    /// Decode exactly `length` values from `r`.
    fn decode<R: Read>(&self, r: &mut R, length: usize) -> Result<Vec<u16>>;
}

pub use delta::DeltaVarintCodec;
pub use plain::PlainCodec;
