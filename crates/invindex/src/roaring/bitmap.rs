//! `RoaringBitmap`: a two-level compressed set of 32-bit integers.
//!
//! Values are split into a 16-bit high `key` (`v >> 16`) selecting a
//! container, and a 16-bit `low` (`v & 0xFFFF`) position within it.
//! Containers are kept in ascending key order so iteration and
//! serialization walk the bitmap the same way.

use super::container::Container;
use super::iterator::BitmapIterator;
use crate::error::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::collections::BTreeMap;
use std::io::{Read, Write};

/// Split a 32-bit value into its container key and in-container position.
fn split(v: u32) -> (u16, u16) {
    ((v >> 16) as u16, (v & 0xFFFF) as u16)
}

/// A compressed set of `u32` doc ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoaringBitmap {
    containers: BTreeMap<u16, Container>,
    cardinality: usize,
}

impl RoaringBitmap {
    /// An empty bitmap.
    pub fn new() -> Self {
        RoaringBitmap {
            containers: BTreeMap::new(),
            cardinality: 0,
        }
    }

    /// Number of distinct values stored. Equal to the sum of each
    /// container's cardinality.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Whether the bitmap holds no values.
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Insert `v`. Returns `true` if `v` was newly added.
    pub fn add(&mut self, v: u32) -> bool {
        let (key, low) = split(v);
        let container = self.containers.entry(key).or_default();
        let inserted = container.add(low);
        if inserted {
            self.cardinality += 1;
        }
        inserted
    }

    /// Whether `v` is present.
    pub fn contains(&self, v: u32) -> bool {
        let (key, low) = split(v);
        self.containers
            .get(&key)
            .map(|c| c.contains(low))
            .unwrap_or(false)
    }

    /// Count of stored values `<= v`: full cardinality of every container
    /// keyed below `key(v)`, plus that container's own rank of `low(v)`
    /// (0 if the key is absent).
    pub fn rank(&self, v: u32) -> usize {
        let (key, low) = split(v);
        let mut count = 0usize;
        for (&k, container) in self.containers.iter() {
            if k < key {
                count += container.cardinality();
            } else if k == key {
                count += container.rank(low);
                break;
            } else {
                break;
            }
        }
        count
    }

    /// Union with another bitmap. Containers present in only one side are
    /// cloned through unchanged; containers sharing a key are unioned.
    pub fn union(&self, other: &RoaringBitmap) -> RoaringBitmap {
        let mut containers = BTreeMap::new();
        let mut cardinality = 0usize;

        for key in self
            .containers
            .keys()
            .chain(other.containers.keys())
            .collect::<std::collections::BTreeSet<_>>()
        {
            let merged = match (self.containers.get(key), other.containers.get(key)) {
                (Some(a), Some(b)) => a.union(b),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => unreachable!("key came from one of the two maps"),
            };
            cardinality += merged.cardinality();
            containers.insert(*key, merged);
        }

        RoaringBitmap {
            containers,
            cardinality,
        }
    }

    /// Intersection with another bitmap. Only keys present on both sides
    /// can contribute values; empty containers are dropped entirely so no
    /// empty container survives in the result.
    pub fn intersection(&self, other: &RoaringBitmap) -> RoaringBitmap {
        let mut containers = BTreeMap::new();
        let mut cardinality = 0usize;

        for (key, a) in self.containers.iter() {
            if let Some(b) = other.containers.get(key) {
                let merged = a.intersection(b);
                if merged.cardinality() > 0 {
                    cardinality += merged.cardinality();
                    containers.insert(*key, merged);
                }
            }
        }

        RoaringBitmap {
            containers,
            cardinality,
        }
    }

    /// An iterator over every stored value in ascending order.
    pub fn iter(&self) -> BitmapIterator<'_> {
        BitmapIterator::new(&self.containers)
    }

    /// Serialize as `count:u32` containers, each `key:u16 type:u8 body`.
    pub fn serialize<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.containers.len() as u32)?;
        for (&key, container) in self.containers.iter() {
            container.serialize(w, key)?;
        }
        Ok(())
    }

    /// Deserialize a bitmap previously written by [`Self::serialize`].
    /// Cached cardinality is recomputed by summing container
    /// cardinalities, not trusted from the stream.
    pub fn deserialize<R: Read>(r: &mut R) -> Result<Self> {
        let count = r.read_u32::<LittleEndian>()? as usize;
        let mut containers = BTreeMap::new();
        let mut cardinality = 0usize;
        for _ in 0..count {
            let (key, container) = Container::deserialize(r)?;
            cardinality += container.cardinality();
            containers.insert(key, container);
        }
        Ok(RoaringBitmap {
            containers,
            cardinality,
        })
    }
}
