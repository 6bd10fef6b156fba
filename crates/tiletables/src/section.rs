//! Alignment-aware binary section assembly.

use crate::attribute::AttributeBuffer;

/// One growing binary section (feature-table or batch-table binary).
///
/// Built by repeated aligned appends; never shrinks. The section owns its
/// bytes exclusively while under construction, and attribute buffers are
/// moved into it.
#[derive(Debug, Default)]
pub struct BinarySection {
    bytes: Vec<u8>,
}

impl BinarySection {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Append raw bytes with no alignment and return their byte offset.
    ///
    /// Compressed-geometry blobs use this; they are appended first, so the
    /// recorded offset is 0 and no padding logic applies.
    pub fn push_blob(&mut self, blob: &[u8]) -> usize {
        let offset = self.bytes.len();
        self.bytes.extend_from_slice(blob);
        offset
    }

    /// Append one attribute, padding with zero bytes so its first byte
    /// lands on a multiple of its component size. Returns the attribute's
    /// byte offset within the section.
    pub fn push(&mut self, buffer: AttributeBuffer) -> usize {
        let alignment = buffer.component_type.size();
        let offset = (self.bytes.len() + alignment - 1) / alignment * alignment;
        self.bytes.resize(offset, 0);
        self.bytes.extend_from_slice(&buffer.data);
        offset
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
