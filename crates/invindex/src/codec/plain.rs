//! Plain (raw little-endian) `u16` array codec.

use super::ArrayCodec;
use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Writes each element as 2 raw little-endian bytes, no compression.
///
/// This is the fallback codec for short sequences, and is always
/// byte-for-byte what [`super::DeltaVarintCodec`] delegates to when a
/// sequence is at or below its minimum length.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl ArrayCodec for PlainCodec {
    fn encode<W: Write>(&self, w: &mut W, values: &[u16]) -> Result<()> {
        for &v in values {
            w.write_u16::<LittleEndian>(v)?;
        }
        Ok(())
    }

    fn decode<R: Read>(&self, r: &mut R, length: usize) -> Result<Vec<u16>> {
        let mut out = Vec::with_capacity(length);
        for _ in 0..length {
            out.push(r.read_u16::<LittleEndian>()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrips_empty() {
        let codec = PlainCodec;
        let mut buf = Vec::new();
        codec.encode(&mut buf, &[]).unwrap();
        let mut cursor = Cursor::new(buf);
        assert_eq!(codec.decode(&mut cursor, 0).unwrap(), Vec::<u16>::new());
    }

    #[test]
    fn roundtrips_values() {
        let codec = PlainCodec;
        let values = vec![0u16, 1, 65535, 300, 12345];
        let mut buf = Vec::new();
        codec.encode(&mut buf, &values).unwrap();
        assert_eq!(buf.len(), values.len() * 2);
        let mut cursor = Cursor::new(buf);
        assert_eq!(codec.decode(&mut cursor, values.len()).unwrap(), values);
    }
}
