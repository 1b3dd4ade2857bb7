//! Delta+varint `u16` array codec.

use super::plain::PlainCodec;
use super::ArrayCodec;
use crate::error::Result;
use crate::varint::{read_varint, write_varint};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Writes `values[0]` raw, then each successive element as a varint of its
/// modular-u16 delta from the previous element. Below `min_length`
/// elements this delegates byte-for-byte to [`PlainCodec`], since the
/// varint header overhead isn't reliably smaller than the raw 2
/// bytes/element at small sizes.
///
/// The subtraction wraps modulo 2^16; decode reconstructs by running the
/// sum back up modulo 2^16. Callers get correct round-trips regardless of
/// whether `values` is sorted, though delta encoding only *compresses*
/// well for non-decreasing sequences.
#[derive(Debug, Clone, Copy)]
pub struct DeltaVarintCodec {
    min_length: usize,
}

impl DeltaVarintCodec {
    /// Construct a codec that falls back to plain encoding at or below
    /// `min_length` elements.
    pub fn new(min_length: usize) -> Self {
        DeltaVarintCodec { min_length }
    }
}

impl ArrayCodec for DeltaVarintCodec {
    fn encode<W: Write>(&self, w: &mut W, values: &[u16]) -> Result<()> {
        if values.len() <= self.min_length {
            return PlainCodec.encode(w, values);
        }

        w.write_u16::<LittleEndian>(values[0])?;
        for window in values.windows(2) {
            let delta = window[1].wrapping_sub(window[0]);
            write_varint(w, delta as u64)?;
        }
        Ok(())
    }

    fn decode<R: Read>(&self, r: &mut R, length: usize) -> Result<Vec<u16>> {
        if length <= self.min_length {
            return PlainCodec.decode(r, length);
        }

        let mut out = Vec::with_capacity(length);
        let first = r.read_u16::<LittleEndian>()?;
        out.push(first);
        let mut running = first;
        for _ in 1..length {
            let delta = read_varint(r)? as u16;
            running = running.wrapping_add(delta);
            out.push(running);
        }
        Ok(out)
    }
}
