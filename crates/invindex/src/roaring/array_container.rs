//! Array container: a sorted, unique sequence of 16-bit values.
//!
//! Used while a container's cardinality is at or below
//! [`ARRAY_TO_BITMAP_THRESHOLD`](crate::limits::ARRAY_TO_BITMAP_THRESHOLD).
//! Conversion to a bitmap container on crossing the threshold is handled
//! one level up, in [`super::container::Container`].

use super::bitmap_container::BitmapContainer;
use crate::codec::{ArrayCodec, PlainCodec};
use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// Sorted, deduplicated set of `u16` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayContainer {
    values: Vec<u16>,
}

impl ArrayContainer {
    /// An empty array container.
    pub fn new() -> Self {
        ArrayContainer { values: Vec::new() }
    }

    /// Construct from a slice already known to be sorted and
    /// deduplicated, skipping the per-element binary-search insert.
    pub(crate) fn from_sorted_unchecked(values: Vec<u16>) -> Self {
        ArrayContainer { values }
    }

    /// Number of distinct values stored.
    pub fn cardinality(&self) -> usize {
        self.values.len()
    }

    /// Insert `v` if not already present. No-op if already present.
    /// Returns `true` if the value was newly inserted.
    pub fn add(&mut self, v: u16) -> bool {
        match self.values.binary_search(&v) {
            Ok(_) => false,
            Err(idx) => {
                self.values.insert(idx, v);
                true
            }
        }
    }

    /// Whether `v` is present.
    pub fn contains(&self, v: u16) -> bool {
        self.values.binary_search(&v).is_ok()
    }

    /// Count of stored values `<= v`.
    pub fn rank(&self, v: u16) -> usize {
        match self.values.binary_search(&v) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// The underlying sorted values.
    pub fn values(&self) -> &[u16] {
        &self.values
    }

    /// Merge-walk union with another array container.
    pub fn union_array(&self, other: &ArrayContainer) -> ArrayContainer {
        let mut out = Vec::with_capacity(self.values.len() + other.values.len());
        let (mut i, mut j) = (0, 0);
        while i < self.values.len() && j < other.values.len() {
            let (a, b) = (self.values[i], other.values[j]);
            match a.cmp(&b) {
                std::cmp::Ordering::Less => {
                    out.push(a);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    out.push(b);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    out.push(a);
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.values[i..]);
        out.extend_from_slice(&other.values[j..]);
        ArrayContainer { values: out }
    }

    /// Merge-walk intersection with another array container.
    pub fn intersection_array(&self, other: &ArrayContainer) -> ArrayContainer {
        let mut out = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.values.len() && j < other.values.len() {
            let (a, b) = (self.values[i], other.values[j]);
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    out.push(a);
                    i += 1;
                    j += 1;
                }
            }
        }
        ArrayContainer { values: out }
    }

    /// Intersection with a bitmap container: probe each element of this
    /// array against the bitmap.
    pub fn intersection_bitmap(&self, other: &BitmapContainer) -> ArrayContainer {
        ArrayContainer {
            values: self
                .values
                .iter()
                .copied()
                .filter(|&v| other.contains(v))
                .collect(),
        }
    }

    /// Convert to a fresh bitmap container with the same value set.
    pub fn to_bitmap(&self) -> BitmapContainer {
        let mut bitmap = BitmapContainer::new();
        for &v in &self.values {
            bitmap.add(v);
        }
        bitmap
    }

    /// Serialize as `length:u16 values:[u16; length]`, raw little-endian,
    /// per the normative wire format (spec §6.1). The delta+varint codec
    /// is a decode-time/in-memory concern elsewhere in the crate; on the
    /// wire, array container bodies are always plain.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u16::<LittleEndian>(self.values.len() as u16)?;
        PlainCodec.encode(w, &self.values)
    }

    /// Deserialize a container previously written by [`Self::serialize`].
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let length = r.read_u16::<LittleEndian>()? as usize;
        let values = PlainCodec.decode(r, length)?;
        Ok(ArrayContainer { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn add_keeps_sorted_unique() {
        let mut c = ArrayContainer::new();
        for v in [5, 1, 3, 1, 5, 2] {
            c.add(v);
        }
        assert_eq!(c.values(), &[1, 2, 3, 5]);
        assert_eq!(c.cardinality(), 4);
    }

    #[test]
    fn add_duplicate_returns_false() {
        let mut c = ArrayContainer::new();
        assert!(c.add(10));
        assert!(!c.add(10));
    }

    #[test]
    fn rank_matches_spec_definition() {
        let mut c = ArrayContainer::new();
        for v in [10, 20, 30] {
            c.add(v);
        }
        assert_eq!(c.rank(5), 0);
        assert_eq!(c.rank(10), 1);
        assert_eq!(c.rank(15), 1);
        assert_eq!(c.rank(30), 3);
        assert_eq!(c.rank(100), 3);
    }

    #[test]
    fn union_and_intersection() {
        let mut a = ArrayContainer::new();
        for v in [1, 2, 3, 4] {
            a.add(v);
        }
        let mut b = ArrayContainer::new();
        for v in [3, 4, 5, 6] {
            b.add(v);
        }
        assert_eq!(a.union_array(&b).values(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(a.intersection_array(&b).values(), &[3, 4]);
    }

    #[test]
    fn to_bitmap_preserves_values() {
        let mut a = ArrayContainer::new();
        for v in [1, 100, 5000] {
            a.add(v);
        }
        let bitmap = a.to_bitmap();
        for v in [1u16, 100, 5000] {
            assert!(bitmap.contains(v));
        }
        assert_eq!(bitmap.cardinality(), 3);
    }

    #[test]
    fn serialize_roundtrip() {
        let mut a = ArrayContainer::new();
        for v in 0..50u16 {
            a.add(v * 7);
        }
        let mut buf = Vec::new();
        a.serialize(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let b = ArrayContainer::deserialize(&mut cursor).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serialize_uses_plain_wire_layout() {
        let mut a = ArrayContainer::new();
        a.add(5);
        a.add(9000);
        let mut buf = Vec::new();
        a.serialize(&mut buf).unwrap();
        // length:u16 then raw little-endian u16 values, per spec §6.1.
        assert_eq!(buf.len(), 2 + 2 * a.cardinality());
        assert_eq!(&buf[0..2], &2u16.to_le_bytes());
        assert_eq!(&buf[2..4], &5u16.to_le_bytes());
        assert_eq!(&buf[4..6], &9000u16.to_le_bytes());

        let mut cursor = Cursor::new(buf);
        let b = ArrayContainer::deserialize(&mut cursor).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn serialize_roundtrip_empty() {
        let a = ArrayContainer::new();
        let mut buf = Vec::new();
        a.serialize(&mut buf).unwrap();
        let mut cursor = Cursor::new(buf);
        let b = ArrayContainer::deserialize(&mut cursor).unwrap();
        assert_eq!(a, b);
    }
}
