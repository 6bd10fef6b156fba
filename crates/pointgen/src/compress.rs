//! Compression adapter: decides which attributes go through the external
//! engine, in which mode, and routes the per-attribute stream ids back to
//! the table each attribute belongs to.

use std::collections::BTreeMap;

use tiletables::{
    AttributeBuffer, CompressionError, CompressorAttribute, CompressorInput, PointCompressor,
};

/// Outcome of one compression call, split by destination table.
#[derive(Debug)]
pub struct DracoResult {
    pub blob: Vec<u8>,
    /// Stream ids for compressed feature-table properties.
    pub feature_ids: BTreeMap<String, u32>,
    /// Stream ids for compressed batch-table properties.
    pub batch_ids: BTreeMap<String, u32>,
}

impl DracoResult {
    /// True when the named feature-table attribute was consumed by the
    /// blob and must not be raw-encoded again.
    pub fn covers_feature(&self, property: &str) -> bool {
        self.feature_ids.contains_key(property)
    }

    pub fn covers_batch(&self, property: &str) -> bool {
        self.batch_ids.contains_key(property)
    }
}

/// Run the engine once over the selected feature-table attributes plus all
/// per-point batch-table attributes.
///
/// `semantics` of `None` selects every feature-table attribute. The call
/// forces order-preserving mode when normals are among the compressed
/// attributes (oct-style decoding depends on point order) and whenever the
/// selection is mixed, so compressed and uncompressed attributes stay
/// index-aligned.
pub fn compress_attributes(
    engine: &dyn PointCompressor,
    point_count: usize,
    feature: &[AttributeBuffer],
    batch: &[AttributeBuffer],
    semantics: Option<&[String]>,
) -> Result<DracoResult, CompressionError> {
    let selected: Vec<&AttributeBuffer> = feature
        .iter()
        .filter(|attr| match semantics {
            None => true,
            Some(names) => names.iter().any(|name| name == &attr.property),
        })
        .collect();

    let mixed = selected.len() < feature.len();
    let has_normals = selected.iter().any(|attr| attr.property == "NORMAL");
    let preserve_order = mixed || has_normals;

    let attributes: Vec<CompressorAttribute<'_>> = selected
        .iter()
        .copied()
        .chain(batch.iter())
        .map(|attr| CompressorAttribute {
            property: &attr.property,
            component_type: attr.component_type,
            element_type: attr.element_type,
            data: &attr.data,
        })
        .collect();

    let geometry = engine.compress(&CompressorInput {
        point_count,
        preserve_order,
        attributes: &attributes,
    })?;

    // Non-positive output is fatal regardless of what the engine claims.
    if geometry.data.is_empty() {
        return Err(CompressionError::EmptyOutput);
    }

    let mut feature_ids = BTreeMap::new();
    for attr in &selected {
        let id = require_id(&geometry.attribute_ids, &attr.property)?;
        feature_ids.insert(attr.property.clone(), id);
    }

    let mut batch_ids = BTreeMap::new();
    for attr in batch {
        let id = require_id(&geometry.attribute_ids, &attr.property)?;
        batch_ids.insert(attr.property.clone(), id);
    }

    Ok(DracoResult {
        blob: geometry.data,
        feature_ids,
        batch_ids,
    })
}

fn require_id(ids: &BTreeMap<String, u32>, property: &str) -> Result<u32, CompressionError> {
    ids.get(property).copied().ok_or_else(|| {
        CompressionError::Backend(format!("engine reported no stream id for '{property}'"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tiletables::CompressedGeometry;

    /// Fake engine: one byte per attribute, ids in submission order.
    struct FakeEngine {
        saw_preserve_order: Cell<bool>,
    }

    impl FakeEngine {
        fn new() -> Self {
            Self {
                saw_preserve_order: Cell::new(false),
            }
        }
    }

    impl PointCompressor for FakeEngine {
        fn compress(
            &self,
            input: &CompressorInput<'_>,
        ) -> Result<CompressedGeometry, CompressionError> {
            self.saw_preserve_order.set(input.preserve_order);
            let mut attribute_ids = BTreeMap::new();
            for (i, attr) in input.attributes.iter().enumerate() {
                attribute_ids.insert(attr.property.to_owned(), i as u32);
            }
            Ok(CompressedGeometry {
                data: vec![0xAB; input.attributes.len()],
                attribute_ids,
            })
        }
    }

    struct EmptyEngine;

    impl PointCompressor for EmptyEngine {
        fn compress(
            &self,
            input: &CompressorInput<'_>,
        ) -> Result<CompressedGeometry, CompressionError> {
            let mut attribute_ids = BTreeMap::new();
            for (i, attr) in input.attributes.iter().enumerate() {
                attribute_ids.insert(attr.property.to_owned(), i as u32);
            }
            Ok(CompressedGeometry {
                data: Vec::new(),
                attribute_ids,
            })
        }
    }

    fn position_and_rgb() -> Vec<AttributeBuffer> {
        vec![
            AttributeBuffer::positions("POSITION", &[[0.0; 3]; 4]),
            AttributeBuffer::colors_rgb("RGB", &[[0.5; 4]; 4]),
        ]
    }

    #[test]
    fn full_selection_keeps_sequential_mode() {
        let engine = FakeEngine::new();
        let result = compress_attributes(&engine, 4, &position_and_rgb(), &[], None).unwrap();
        assert!(!engine.saw_preserve_order.get());
        assert!(result.covers_feature("POSITION"));
        assert!(result.covers_feature("RGB"));
    }

    #[test]
    fn mixed_selection_forces_order_preservation() {
        let engine = FakeEngine::new();
        let semantics = vec!["POSITION".to_owned()];
        let result =
            compress_attributes(&engine, 4, &position_and_rgb(), &[], Some(&semantics)).unwrap();
        assert!(engine.saw_preserve_order.get());
        assert!(result.covers_feature("POSITION"));
        assert!(!result.covers_feature("RGB"));
    }

    #[test]
    fn normals_force_order_preservation() {
        let engine = FakeEngine::new();
        let feature = vec![
            AttributeBuffer::positions("POSITION", &[[0.0; 3]; 4]),
            AttributeBuffer::normals("NORMAL", &[[1.0, 0.0, 0.0]; 4]),
        ];
        compress_attributes(&engine, 4, &feature, &[], None).unwrap();
        assert!(engine.saw_preserve_order.get());
    }

    #[test]
    fn batch_attributes_route_to_batch_ids() {
        let engine = FakeEngine::new();
        let batch = vec![AttributeBuffer::scalars_f32("temperature", &[0.5; 4])];
        let result = compress_attributes(&engine, 4, &position_and_rgb(), &batch, None).unwrap();
        assert!(result.covers_batch("temperature"));
        assert!(!result.covers_feature("temperature"));
    }

    #[test]
    fn empty_output_is_fatal() {
        let result = compress_attributes(&EmptyEngine, 4, &position_and_rgb(), &[], None);
        assert!(matches!(result, Err(CompressionError::EmptyOutput)));
    }
}
