//! End-to-end payload assembly: generate samples, encode attributes,
//! optionally compress a subset, merge everything into aligned binary
//! sections and emit the table descriptors.
//!
//! The pipeline is strictly sequential and synchronous; the compression
//! call is the dominant cost and runs as one opaque blocking step.

use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde_json::{json, Value};

use tiletables::{
    AttributeBuffer, BinarySection, PointCompressor, TableBuilder, TableKind, DRACO_EXTENSION,
};

use crate::compress::{self, DracoResult};
use crate::error::GenerateError;
use crate::options::{ColorMode, GenerateOptions};
use crate::source;

/// Assembled tile payload: two JSON descriptors and their binary sections.
/// A plain value object; generation has no other side effects.
#[derive(Debug)]
pub struct TilePayload {
    pub feature_table_json: Value,
    pub feature_table_binary: Vec<u8>,
    pub batch_table_json: Value,
    pub batch_table_binary: Vec<u8>,
    /// Extension identifiers used by this tile, each at most once.
    pub extensions_used: Vec<String>,
}

/// Run one generation call. Pass a compressor whenever the options route
/// attributes through draco; the engine is invoked exactly once.
pub fn generate_tile(
    options: &GenerateOptions,
    compressor: Option<&dyn PointCompressor>,
) -> Result<TilePayload, GenerateError> {
    options.validate(compressor.is_some())?;

    // Fresh generator per call: identical options give identical bytes.
    let mut rng = StdRng::seed_from_u64(options.seed);
    let samples = source::generate_points(options, &mut rng);
    let point_count = samples.len();
    debug!("generated {point_count} samples ({})", options.shape);

    let translation = options.transform.w_axis.truncate();
    let radius = options.radius();

    // Whether a feature-table property is headed into the compressed blob.
    let compressing = |property: &str| match &options.draco {
        None => false,
        Some(draco) => match &draco.semantics {
            None => true,
            Some(names) => names.iter().any(|name| name == property),
        },
    };

    // ---- Encode feature-table attributes in generation order ------------
    let mut feature_attrs: Vec<AttributeBuffer> = Vec::new();

    let positions: Vec<[f32; 3]> = samples
        .iter()
        .map(|s| [s.position.x as f32, s.position.y as f32, s.position.z as f32])
        .collect();

    // The engine does its own position quantization; only raw-encoded
    // positions use the explicit UNSIGNED_SHORT path.
    let quantized = options.quantize_positions && !compressing("POSITION");
    if quantized {
        feature_attrs.push(AttributeBuffer::quantized_positions(
            "POSITION_QUANTIZED",
            &positions,
            radius as f32,
        ));
    } else {
        feature_attrs.push(AttributeBuffer::positions("POSITION", &positions));
    }

    if let Some(property) = options.color_mode.property() {
        let colors: Vec<[f64; 4]> = samples.iter().filter_map(|s| s.color).collect();
        let buffer = match options.color_mode {
            ColorMode::Rgb => AttributeBuffer::colors_rgb(property, &colors),
            ColorMode::Rgba => AttributeBuffer::colors_rgba(property, &colors),
            ColorMode::Rgb565 => AttributeBuffer::colors_rgb565(property, &colors),
            ColorMode::Constant | ColorMode::None => unreachable!("no per-point property"),
        };
        feature_attrs.push(buffer);
    }

    if options.normals {
        let normals: Vec<[f32; 3]> = samples
            .iter()
            .map(|s| [s.normal.x as f32, s.normal.y as f32, s.normal.z as f32])
            .collect();
        if options.oct_encode_normals {
            feature_attrs.push(AttributeBuffer::oct_encoded_normals(
                "NORMAL_OCT16P",
                &normals,
            ));
        } else {
            feature_attrs.push(AttributeBuffer::normals("NORMAL", &normals));
        }
    }

    let mut batch_length = 0_u32;
    if options.batched {
        let ids: Vec<u32> = samples.iter().map(|s| s.batch_id).collect();
        batch_length = ids.iter().max().copied().unwrap_or(0) + 1;
        feature_attrs.push(AttributeBuffer::batch_ids("BATCH_ID", &ids, batch_length));
    }

    // ---- Per-point batch-table attributes --------------------------------
    let mut batch_attrs: Vec<AttributeBuffer> = Vec::new();
    if options.per_entity_properties {
        let temperatures: Vec<f32> = samples.iter().map(|s| s.noise as f32).collect();
        batch_attrs.push(AttributeBuffer::scalars_f32("temperature", &temperatures));

        // Drawn after generation, so the draw order is part of the fixed
        // global random sequence.
        let secondary: Vec<[f32; 3]> = (0..point_count)
            .map(|_| [rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()])
            .collect();
        batch_attrs.push(AttributeBuffer::vectors_f32("secondaryColor", &secondary));

        let ids: Vec<u16> = (0..point_count).map(|i| i as u16).collect();
        batch_attrs.push(AttributeBuffer::scalars_u16("id", &ids));
    }

    // ---- Compression (one call, fatal on empty output) -------------------
    let mut draco_result: Option<DracoResult> = None;
    let mut extensions_used = Vec::new();
    if let Some(draco) = &options.draco {
        // validate() guarantees an engine whenever draco is requested.
        if let Some(engine) = compressor {
            let result = compress::compress_attributes(
                engine,
                point_count,
                &feature_attrs,
                &batch_attrs,
                draco.semantics.as_deref(),
            )?;
            debug!(
                "compressed {} feature / {} batch properties into {} bytes",
                result.feature_ids.len(),
                result.batch_ids.len(),
                result.blob.len()
            );
            extensions_used.push(DRACO_EXTENSION.to_owned());
            draco_result = Some(result);
        }
    }

    // ---- Feature table ----------------------------------------------------
    let mut feature = TableBuilder::new(TableKind::Feature);
    let mut feature_section = BinarySection::new();

    feature.scalar("POINTS_LENGTH", json!(point_count));
    if options.batched {
        feature.scalar("BATCH_LENGTH", json!(batch_length));
    }
    if quantized {
        // Quantization takes precedence over relative-to-center.
        let offset = translation - glam::DVec3::splat(radius);
        feature.scalar(
            "QUANTIZED_VOLUME_OFFSET",
            json!([offset.x, offset.y, offset.z]),
        );
        feature.scalar(
            "QUANTIZED_VOLUME_SCALE",
            json!([options.tile_width, options.tile_width, options.tile_width]),
        );
    } else if options.relative_to_center || options.quantize_positions {
        // Reaching here with quantize_positions set means the engine took
        // POSITION into the blob as floats; the positions are still
        // center-relative and need RTC_CENTER to decode.
        feature.scalar(
            "RTC_CENTER",
            json!([translation.x, translation.y, translation.z]),
        );
    }
    if options.color_mode == ColorMode::Constant {
        feature.scalar("CONSTANT_RGBA", json!(options.constant_color));
    }

    if let Some(result) = &draco_result {
        let blob_offset = feature_section.push_blob(&result.blob);
        feature.draco_extension(
            &result.feature_ids,
            Some((blob_offset, result.blob.len())),
        );
    }

    for attr in feature_attrs {
        if draco_result
            .as_ref()
            .is_some_and(|result| result.covers_feature(&attr.property))
        {
            continue;
        }
        let property = attr.property.clone();
        let component_type = attr.component_type;
        let element_type = attr.element_type;
        let offset = feature_section.push(attr);
        if property == "BATCH_ID" {
            feature.typed_property(&property, offset, component_type, element_type);
        } else {
            feature.property(&property, offset);
        }
    }

    // ---- Batch table ------------------------------------------------------
    let mut batch = TableBuilder::new(TableKind::Batch);
    let mut batch_section = BinarySection::new();

    if let Some(result) = &draco_result {
        if !result.batch_ids.is_empty() {
            batch.draco_extension(&result.batch_ids, None);
        }
    }

    for attr in batch_attrs {
        if draco_result
            .as_ref()
            .is_some_and(|result| result.covers_batch(&attr.property))
        {
            continue;
        }
        let property = attr.property.clone();
        let component_type = attr.component_type;
        let element_type = attr.element_type;
        let offset = batch_section.push(attr);
        batch.typed_property(&property, offset, component_type, element_type);
    }

    if options.batched {
        append_per_batch_metadata(&mut batch, batch_length, &mut rng);
    }

    debug!(
        "feature table binary {} bytes, batch table binary {} bytes",
        feature_section.len(),
        batch_section.len()
    );

    Ok(TilePayload {
        feature_table_json: feature.build(),
        feature_table_binary: feature_section.into_bytes(),
        batch_table_json: batch.build(),
        batch_table_binary: batch_section.into_bytes(),
        extensions_used,
    })
}

/// JSON-only per-batch metadata arrays for batched tiles: a name, random
/// dimensions and an id per octant batch.
fn append_per_batch_metadata(batch: &mut TableBuilder, batch_length: u32, rng: &mut StdRng) {
    let names: Vec<String> = (0..batch_length).map(|i| format!("section{i}")).collect();
    let dimensions: Vec<[f64; 3]> = (0..batch_length)
        .map(|_| [rng.gen(), rng.gen(), rng.gen()])
        .collect();
    let ids: Vec<u32> = (0..batch_length).collect();

    batch.json_property("name", json!(names));
    batch.json_property("dimensions", json!(dimensions));
    batch.json_property("id", json!(ids));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ColorStrategy, DracoOptions, Shape};

    #[test]
    fn eight_point_box_scenario() {
        let options = GenerateOptions {
            point_count: 8,
            shape: Shape::Box,
            color_mode: ColorMode::Rgb,
            color_strategy: ColorStrategy::Random,
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();

        assert_eq!(payload.feature_table_json["POINTS_LENGTH"], json!(8));
        // 8 x VEC3 floats, then 8 x 3 color bytes; both segments start
        // 4-byte aligned so no padding is needed.
        assert_eq!(payload.feature_table_binary.len(), 8 * 3 * 4 + 8 * 3);
        assert_eq!(payload.feature_table_json["POSITION"]["byteOffset"], json!(0));
        assert_eq!(payload.feature_table_json["RGB"]["byteOffset"], json!(96));
        assert!(payload.extensions_used.is_empty());
        assert_eq!(payload.batch_table_json, json!({}));
        assert!(payload.batch_table_binary.is_empty());
    }

    #[test]
    fn generation_is_byte_identical_across_calls() {
        let options = GenerateOptions {
            point_count: 500,
            shape: Shape::Sphere,
            color_mode: ColorMode::Rgba,
            per_entity_properties: true,
            seed: 42,
            ..Default::default()
        };
        let a = generate_tile(&options, None).unwrap();
        let b = generate_tile(&options, None).unwrap();
        assert_eq!(a.feature_table_binary, b.feature_table_binary);
        assert_eq!(a.batch_table_binary, b.batch_table_binary);
        assert_eq!(a.feature_table_json, b.feature_table_json);
        assert_eq!(a.batch_table_json, b.batch_table_json);
    }

    #[test]
    fn quantization_replaces_rtc_center() {
        let options = GenerateOptions {
            point_count: 27,
            quantize_positions: true,
            relative_to_center: true,
            color_mode: ColorMode::None,
            tile_width: 20.0,
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();
        let table = &payload.feature_table_json;

        assert_eq!(
            table["QUANTIZED_VOLUME_OFFSET"],
            json!([-10.0, -10.0, -10.0])
        );
        assert_eq!(table["QUANTIZED_VOLUME_SCALE"], json!([20.0, 20.0, 20.0]));
        assert!(table.get("RTC_CENTER").is_none());
        assert!(table.get("POSITION").is_none());
        assert_eq!(table["POSITION_QUANTIZED"]["byteOffset"], json!(0));
    }

    #[test]
    fn rtc_center_reflects_transform_translation() {
        let options = GenerateOptions {
            point_count: 8,
            relative_to_center: true,
            color_mode: ColorMode::None,
            transform: glam::DMat4::from_translation(glam::DVec3::new(100.0, 200.0, 300.0)),
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();
        assert_eq!(
            payload.feature_table_json["RTC_CENTER"],
            json!([100.0, 200.0, 300.0])
        );
    }

    #[test]
    fn constant_color_emits_scalar_only() {
        let options = GenerateOptions {
            point_count: 4,
            color_mode: ColorMode::Constant,
            constant_color: [10, 20, 30, 40],
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();
        let table = &payload.feature_table_json;
        assert_eq!(table["CONSTANT_RGBA"], json!([10, 20, 30, 40]));
        assert!(table.get("RGB").is_none());
        // Positions only.
        assert_eq!(payload.feature_table_binary.len(), 4 * 12);
    }

    #[test]
    fn batched_tile_gets_batch_ids_and_metadata() {
        let options = GenerateOptions {
            point_count: 64,
            batched: true,
            color_mode: ColorMode::None,
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();
        let table = &payload.feature_table_json;

        assert_eq!(table["BATCH_LENGTH"], json!(8));
        assert_eq!(
            table["BATCH_ID"]["componentType"],
            json!("UNSIGNED_BYTE")
        );

        let batch = &payload.batch_table_json;
        assert_eq!(batch["name"][0], json!("section0"));
        assert_eq!(batch["name"].as_array().unwrap().len(), 8);
        assert_eq!(batch["dimensions"].as_array().unwrap().len(), 8);
        assert_eq!(batch["id"], json!([0, 1, 2, 3, 4, 5, 6, 7]));
        // Per-batch metadata is JSON-only.
        assert!(payload.batch_table_binary.is_empty());
    }

    #[test]
    fn oct_encoded_normals_use_two_bytes() {
        let options = GenerateOptions {
            point_count: 8,
            normals: true,
            oct_encode_normals: true,
            color_mode: ColorMode::None,
            ..Default::default()
        };
        let payload = generate_tile(&options, None).unwrap();
        assert!(payload.feature_table_json["NORMAL_OCT16P"]["byteOffset"].is_number());
        assert_eq!(payload.feature_table_binary.len(), 8 * 12 + 8 * 2);
    }

    #[test]
    fn draco_without_compressor_is_invalid() {
        let options = GenerateOptions {
            draco: Some(DracoOptions::default()),
            ..Default::default()
        };
        assert!(matches!(
            generate_tile(&options, None),
            Err(GenerateError::InvalidConfiguration(_))
        ));
    }
}
