//! JSON descriptor builders for the feature and batch tables.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::component::{ComponentType, ElementType};

/// Extension identifier emitted when a table carries compressed properties.
pub const DRACO_EXTENSION: &str = "3DTILES_draco_point_compression";

/// Which table a builder produces. The two differ in how much layout
/// metadata a binary property entry carries: feature-table properties have
/// format-pinned types and record only `byteOffset` (BATCH_ID additionally
/// records `componentType`), while batch-table properties always record
/// `byteOffset`, `componentType` and `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Feature,
    Batch,
}

/// Accumulates property entries and scalar fields in insertion order and
/// produces the final descriptor JSON.
#[derive(Debug)]
pub struct TableBuilder {
    kind: TableKind,
    root: Map<String, Value>,
    draco: Option<Value>,
}

impl TableBuilder {
    pub fn new(kind: TableKind) -> Self {
        Self {
            kind,
            root: Map::new(),
            draco: None,
        }
    }

    /// Top-level scalar field (POINTS_LENGTH, BATCH_LENGTH, RTC_CENTER,
    /// QUANTIZED_VOLUME_OFFSET/SCALE, CONSTANT_RGBA).
    pub fn scalar(&mut self, name: &str, value: Value) {
        self.root.insert(name.to_owned(), value);
    }

    /// Binary property whose layout is pinned by the format: only the byte
    /// offset is recorded.
    pub fn property(&mut self, name: &str, byte_offset: usize) {
        self.root
            .insert(name.to_owned(), json!({ "byteOffset": byte_offset }));
    }

    /// Binary property with explicit layout metadata. On the feature table
    /// this records `componentType` next to the offset (the BATCH_ID case);
    /// on the batch table it records `componentType` and `type` as well.
    pub fn typed_property(
        &mut self,
        name: &str,
        byte_offset: usize,
        component_type: ComponentType,
        element_type: ElementType,
    ) {
        let entry = match self.kind {
            TableKind::Feature => json!({
                "byteOffset": byte_offset,
                "componentType": component_type.name(),
            }),
            TableKind::Batch => json!({
                "byteOffset": byte_offset,
                "componentType": component_type.name(),
                "type": element_type.name(),
            }),
        };
        self.root.insert(name.to_owned(), entry);
    }

    /// JSON-only property (per-batch metadata arrays with no binary body).
    pub fn json_property(&mut self, name: &str, value: Value) {
        self.root.insert(name.to_owned(), value);
    }

    /// Nest the compressed-property id map under `extensions`. The blob
    /// range is recorded on the feature-table side only; the batch table
    /// shares the blob stored in the feature-table binary.
    pub fn draco_extension(
        &mut self,
        properties: &BTreeMap<String, u32>,
        blob_range: Option<(usize, usize)>,
    ) {
        let mut ext = Map::new();
        ext.insert("properties".to_owned(), json!(properties));
        if let Some((byte_offset, byte_length)) = blob_range {
            ext.insert("byteOffset".to_owned(), json!(byte_offset));
            ext.insert("byteLength".to_owned(), json!(byte_length));
        }
        self.draco = Some(Value::Object(ext));
    }

    /// True when nothing was recorded (an absent batch table serializes as
    /// an empty object).
    pub fn is_empty(&self) -> bool {
        self.root.is_empty() && self.draco.is_none()
    }

    pub fn build(self) -> Value {
        let mut root = self.root;
        if let Some(ext) = self.draco {
            root.insert("extensions".to_owned(), json!({ DRACO_EXTENSION: ext }));
        }
        Value::Object(root)
    }
}
