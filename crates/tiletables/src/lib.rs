//! Table building blocks for point-cloud tile payloads.
//!
//! A tile payload carries two paired sections, each made of a JSON
//! descriptor and a contiguous binary buffer:
//!
//! - feature table: per-point render attributes (positions, colors,
//!   normals, batch ids) plus scalar fields (POINTS_LENGTH, BATCH_LENGTH,
//!   RTC_CENTER or QUANTIZED_VOLUME_OFFSET/SCALE, CONSTANT_RGBA),
//! - batch table: per-entity metadata, either JSON-only arrays or binary
//!   properties referenced by byte offset.
//!
//! Binary section layout (little-endian):
//!
//!   - an optional compressed-geometry blob first, at offset 0,
//!   - then one segment per uncompressed attribute, in generation order,
//!     each preceded by zero padding so its first byte lands on a multiple
//!     of its component size.
//!
//! Every recorded byte offset is therefore aligned to its own component
//! size; the descriptor records offsets, never sizes, because each
//! [`AttributeBuffer`] carries its own component type and arity.
//!
//! The compression engine itself is external; [`PointCompressor`] is the
//! port it is consumed through.

mod attribute;
mod component;
mod compression;
mod section;
mod table;

pub use attribute::AttributeBuffer;
pub use component::{ComponentType, ElementType};
pub use compression::{
    CompressedGeometry, CompressionError, CompressorAttribute, CompressorInput, PointCompressor,
};
pub use section::BinarySection;
pub use table::{TableBuilder, TableKind, DRACO_EXTENSION};
