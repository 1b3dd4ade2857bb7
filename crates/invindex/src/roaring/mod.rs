//! Roaring-style compressed bitmap of 32-bit document ids.
//!
//! Values are partitioned by their high 16 bits into per-key containers,
//! each stored as whichever of [`array_container::ArrayContainer`] or
//! [`bitmap_container::BitmapContainer`] suits its cardinality. See
//! [`container::Container`] for the dispatch and [`bitmap::RoaringBitmap`]
//! for the top-level map.

pub mod array_container;
pub mod bitmap;
pub mod bitmap_container;
pub mod container;
pub mod iterator;

pub use array_container::ArrayContainer;
pub use bitmap::RoaringBitmap;
pub use bitmap_container::BitmapContainer;
pub use container::Container;
pub use iterator::BitmapIterator;
