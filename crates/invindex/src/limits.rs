//! Tunable constants for the inverted-index segment store.
//!
//! These values are normative for wire compatibility: changing
//! `ARRAY_TO_BITMAP_THRESHOLD` or `MAX_DOCS_PER_BLOCK` changes the byte
//! layout segments produce and must bump [`SEGMENT_FORMAT_VERSION`].

/// Cardinality above which an array container converts to a bitmap
/// container. Conversion on crossing this threshold upward is mandatory;
/// conversion back down is never performed.
pub const ARRAY_TO_BITMAP_THRESHOLD: usize = 4096;

/// Maximum number of documents held in a single posting-list block. A
/// term's posting list that grows past this rolls over into a new block.
pub const MAX_DOCS_PER_BLOCK: usize = 16 * 1024;

/// Below this element count, the delta+varint array codec falls back to
/// the plain codec: varint header overhead is not reliably smaller than
/// two raw bytes per element at small lengths.
pub const DELTA_CODEC_MIN_LENGTH: usize = 4;

/// Magic bytes identifying a segment file.
pub const SEGMENT_MAGIC: u32 = 0x007E_8B11;

/// Current segment format version. Bump on any wire-incompatible change
/// to container layout, block layout, or tf encoding.
pub const SEGMENT_FORMAT_VERSION: u8 = 1;

/// Container type tag for an array container in the wire format.
pub const CONTAINER_TYPE_ARRAY: u8 = 1;

/// Container type tag for a bitmap container in the wire format.
pub const CONTAINER_TYPE_BITMAP: u8 = 2;

/// Number of 64-bit words in a bitmap container (1024 * 64 = 65536 bits).
pub const BITMAP_CONTAINER_WORDS: usize = 1024;
