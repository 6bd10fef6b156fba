//! Port to the external point-cloud compression engine.
//!
//! The engine itself (a native module in production) is consumed through
//! [`PointCompressor`]: typed attribute arrays in, one blob plus a
//! per-attribute stream id out. Keeping the boundary this narrow lets the
//! assembly logic run against a fake engine in tests.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::component::{ComponentType, ElementType};

/// One attribute array handed to the compressor.
#[derive(Debug, Clone, Copy)]
pub struct CompressorAttribute<'a> {
    pub property: &'a str,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub data: &'a [u8],
}

/// Everything the engine needs for one compression call.
#[derive(Debug, Clone, Copy)]
pub struct CompressorInput<'a> {
    pub point_count: usize,
    /// Keep point order stable across encode/decode. Required when
    /// oct-decoded normals are in the stream, and whenever compressed and
    /// uncompressed attributes must stay index-aligned.
    pub preserve_order: bool,
    pub attributes: &'a [CompressorAttribute<'a>],
}

/// Result of one successful compression call.
#[derive(Debug, Clone)]
pub struct CompressedGeometry {
    pub data: Vec<u8>,
    /// Stream id per compressed property, as reported by the engine.
    pub attribute_ids: BTreeMap<String, u32>,
}

#[derive(Debug, Error)]
pub enum CompressionError {
    /// The engine reported success but produced no bytes. Fatal: the whole
    /// generation call aborts and nothing partial is returned.
    #[error("compressor produced no output")]
    EmptyOutput,
    /// The engine reported a failure of its own.
    #[error("compressor failed: {0}")]
    Backend(String),
}

/// The compression engine boundary. Implementations run exactly once per
/// generation call and must be deterministic for identical input.
pub trait PointCompressor {
    fn compress(&self, input: &CompressorInput<'_>) -> Result<CompressedGeometry, CompressionError>;
}
