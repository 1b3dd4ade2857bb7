//! Polymorphic container: array or bitmap, dispatched on a tag.
//!
//! The container choice is a pure storage decision; the logical value set
//! is identical under either representation. Conversion from array to
//! bitmap happens automatically inside [`Container::add`] the moment
//! cardinality would cross [`ARRAY_TO_BITMAP_THRESHOLD`]; conversion back
//! down is never performed.

use super::array_container::ArrayContainer;
use super::bitmap_container::BitmapContainer;
use crate::error::{InvError, Result};
use crate::limits::{ARRAY_TO_BITMAP_THRESHOLD, CONTAINER_TYPE_ARRAY, CONTAINER_TYPE_BITMAP};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

/// A single container: either a sorted array or a fixed bitmap, for the
/// low 16 bits of values sharing a common high-16-bit key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// Sorted array representation (cardinality <= threshold).
    Array(ArrayContainer),
    /// Bitmap representation (used once cardinality exceeds threshold).
    Bitmap(BitmapContainer),
}

impl Container {
    /// A fresh, empty array container.
    pub fn new() -> Self {
        Container::Array(ArrayContainer::new())
    }

    /// Number of values stored.
    pub fn cardinality(&self) -> usize {
        match self {
            Container::Array(a) => a.cardinality(),
            Container::Bitmap(b) => b.cardinality(),
        }
    }

    /// Whether `v` is present.
    pub fn contains(&self, v: u16) -> bool {
        match self {
            Container::Array(a) => a.contains(v),
            Container::Bitmap(b) => b.contains(v),
        }
    }

    /// Count of stored values `<= v`.
    pub fn rank(&self, v: u16) -> usize {
        match self {
            Container::Array(a) => a.rank(v),
            Container::Bitmap(b) => b.rank(v),
        }
    }

    /// Insert `v`. Converts this container from array to bitmap in place
    /// if the insertion would push cardinality past the threshold.
    pub fn add(&mut self, v: u16) -> bool {
        if let Container::Array(a) = self {
            if a.contains(v) {
                return false;
            }
            if a.cardinality() + 1 > ARRAY_TO_BITMAP_THRESHOLD {
                let mut bitmap = a.to_bitmap();
                bitmap.add(v);
                *self = Container::Bitmap(bitmap);
                return true;
            }
            return a.add(v);
        }
        match self {
            Container::Bitmap(b) => b.add(v),
            Container::Array(_) => unreachable!(),
        }
    }

    /// Union with another container, choosing the representation-specific
    /// fast path and falling back through array conversion for
    /// mixed-variant pairs.
    pub fn union(&self, other: &Container) -> Container {
        match (self, other) {
            (Container::Array(a), Container::Array(b)) => {
                let merged = a.union_array(b);
                if merged.cardinality() > ARRAY_TO_BITMAP_THRESHOLD {
                    Container::Bitmap(merged.to_bitmap())
                } else {
                    Container::Array(merged)
                }
            }
            (Container::Bitmap(a), Container::Bitmap(b)) => Container::Bitmap(a.union(b)),
            (Container::Array(a), Container::Bitmap(b))
            | (Container::Bitmap(b), Container::Array(a)) => {
                Container::Bitmap(a.to_bitmap().union(b))
            }
        }
    }

    /// Intersection with another container.
    pub fn intersection(&self, other: &Container) -> Container {
        match (self, other) {
            (Container::Array(a), Container::Array(b)) => {
                Container::Array(a.intersection_array(b))
            }
            (Container::Bitmap(a), Container::Bitmap(b)) => {
                let bitmap = a.intersection(b);
                if bitmap.cardinality() <= ARRAY_TO_BITMAP_THRESHOLD {
                    Container::Array(ArrayContainer::from_sorted_unchecked(
                        bitmap.to_array_values(),
                    ))
                } else {
                    Container::Bitmap(bitmap)
                }
            }
            (Container::Array(a), Container::Bitmap(b))
            | (Container::Bitmap(b), Container::Array(a)) => {
                Container::Array(a.intersection_bitmap(b))
            }
        }
    }

    /// Borrow the array representation, if this container is one.
    pub fn as_array(&self) -> Option<&ArrayContainer> {
        match self {
            Container::Array(a) => Some(a),
            Container::Bitmap(_) => None,
        }
    }

    /// Borrow the bitmap representation, if this container is one.
    pub fn as_bitmap(&self) -> Option<&BitmapContainer> {
        match self {
            Container::Array(_) => None,
            Container::Bitmap(b) => Some(b),
        }
    }

    /// Ascending sorted values held by this container.
    pub fn to_sorted_values(&self) -> Vec<u16> {
        match self {
            Container::Array(a) => a.values().to_vec(),
            Container::Bitmap(b) => b.to_array_values(),
        }
    }

    /// Serialize as `key:u16 type:u8 body`.
    pub fn serialize<W: Write>(&self, w: &mut W, key: u16) -> Result<()> {
        w.write_u16::<LittleEndian>(key)?;
        match self {
            Container::Array(a) => {
                w.write_u8(CONTAINER_TYPE_ARRAY)?;
                a.serialize(w)
            }
            Container::Bitmap(b) => {
                w.write_u8(CONTAINER_TYPE_BITMAP)?;
                b.serialize(w)
            }
        }
    }

    /// Deserialize the container body given an already-read `type` tag.
    pub fn deserialize_body<R: Read>(r: &mut R, type_tag: u8) -> Result<Self> {
        match type_tag {
            t if t == CONTAINER_TYPE_ARRAY => Ok(Container::Array(ArrayContainer::deserialize(r)?)),
            t if t == CONTAINER_TYPE_BITMAP => {
                Ok(Container::Bitmap(BitmapContainer::deserialize(r)?))
            }
            other => Err(InvError::MalformedEncoding(format!(
                "unknown container type tag {other}"
            ))),
        }
    }

    /// Read the `key:u16 type:u8` prefix and the container body that
    /// follows it.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<(u16, Self)> {
        let key = r.read_u16::<LittleEndian>()?;
        let type_tag = r.read_u8()?;
        let container = Self::deserialize_body(r, type_tag)?;
        Ok((key, container))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::ARRAY_TO_BITMAP_THRESHOLD;

    #[test]
    fn starts_as_array_and_converts_on_threshold_crossing() {
        let mut c = Container::new();
        for v in 0..ARRAY_TO_BITMAP_THRESHOLD as u16 {
            c.add(v);
        }
        assert!(matches!(c, Container::Array(_)));
        assert_eq!(c.cardinality(), ARRAY_TO_BITMAP_THRESHOLD);

        c.add(ARRAY_TO_BITMAP_THRESHOLD as u16);
        assert!(matches!(c, Container::Bitmap(_)));
        assert_eq!(c.cardinality(), ARRAY_TO_BITMAP_THRESHOLD + 1);
    }

    #[test]
    fn conversion_preserves_logical_values() {
        let mut c = Container::new();
        for v in 0..=(ARRAY_TO_BITMAP_THRESHOLD as u16) {
            c.add(v);
        }
        for v in 0..=(ARRAY_TO_BITMAP_THRESHOLD as u16) {
            assert!(c.contains(v));
        }
        assert!(!c.contains(ARRAY_TO_BITMAP_THRESHOLD as u16 + 1));
    }

    #[test]
    fn union_mixed_variants() {
        let mut array = Container::new();
        array.add(1);
        array.add(2);

        let mut bitmap_backed = Container::new();
        for v in 0..=(ARRAY_TO_BITMAP_THRESHOLD as u16) {
            bitmap_backed.add(v);
        }

        let union = array.union(&bitmap_backed);
        assert!(matches!(union, Container::Bitmap(_)));
        assert_eq!(union.cardinality(), bitmap_backed.cardinality());
    }

    #[test]
    fn intersection_mixed_variants() {
        let mut array = Container::new();
        for v in [1u16, 2, 50000] {
            array.add(v);
        }

        let mut bitmap_backed = Container::new();
        for v in 0..=(ARRAY_TO_BITMAP_THRESHOLD as u16) {
            bitmap_backed.add(v);
        }

        let intersection = array.intersection(&bitmap_backed);
        assert_eq!(intersection.to_sorted_values(), vec![1, 2]);
    }

    #[test]
    fn serialize_roundtrip_array() {
        let mut c = Container::new();
        for v in [3u16, 1, 4, 1, 5] {
            c.add(v);
        }
        let mut buf = Vec::new();
        c.serialize(&mut buf, 7).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let (key, restored) = Container::deserialize(&mut cursor).unwrap();
        assert_eq!(key, 7);
        assert_eq!(restored.to_sorted_values(), c.to_sorted_values());
    }

    #[test]
    fn serialize_roundtrip_bitmap() {
        let mut c = Container::new();
        for v in 0..=(ARRAY_TO_BITMAP_THRESHOLD as u16) {
            c.add(v);
        }
        let mut buf = Vec::new();
        c.serialize(&mut buf, 3).unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let (key, restored) = Container::deserialize(&mut cursor).unwrap();
        assert_eq!(key, 3);
        assert_eq!(restored.cardinality(), c.cardinality());
    }

    #[test]
    fn unknown_type_tag_is_malformed_encoding() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.push(99);
        let mut cursor = std::io::Cursor::new(buf);
        let err = Container::deserialize(&mut cursor).unwrap_err();
        assert!(matches!(err, InvError::MalformedEncoding(_)));
    }
}
