//! Generation options. Shape, color mode and color strategy are closed
//! enums so an unrecognized value is unrepresentable; the combinations
//! that remain invalid are rejected eagerly by [`GenerateOptions::validate`]
//! before any points are generated.

use clap::ValueEnum;
use glam::DMat4;

use crate::error::GenerateError;

/// Point distribution of the generated tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shape {
    /// Near-cubic lattice filling the tile cube. Purely index-derived;
    /// consumes no random state.
    Box,
    /// Points on the tile sphere, two random angles per point.
    Sphere,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Shape::Box => "box",
            Shape::Sphere => "sphere",
        };
        f.write_str(s)
    }
}

/// How per-point colors are stored, if at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// 3x UNSIGNED_BYTE per point.
    Rgb,
    /// 4x UNSIGNED_BYTE per point (alpha on the deliberate 128 scale).
    Rgba,
    /// One UNSIGNED_SHORT per point, 5/6/5 packed.
    Rgb565,
    /// No per-point buffer; a single CONSTANT_RGBA scalar instead.
    Constant,
    /// No color output at all.
    None,
}

impl ColorMode {
    /// True when the mode produces a per-point color buffer.
    pub fn has_per_point_colors(self) -> bool {
        matches!(self, ColorMode::Rgb | ColorMode::Rgba | ColorMode::Rgb565)
    }

    /// Feature-table property name for the per-point buffer, if any.
    pub fn property(self) -> Option<&'static str> {
        match self {
            ColorMode::Rgb => Some("RGB"),
            ColorMode::Rgba => Some("RGBA"),
            ColorMode::Rgb565 => Some("RGB565"),
            ColorMode::Constant | ColorMode::None => None,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColorMode::Rgb => "rgb",
            ColorMode::Rgba => "rgba",
            ColorMode::Rgb565 => "rgb565",
            ColorMode::Constant => "constant",
            ColorMode::None => "none",
        };
        f.write_str(s)
    }
}

/// How per-point color values are chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorStrategy {
    /// Uniformly random color per point; consumes random state.
    Random,
    /// Unit-cube coordinates mapped linearly to RGB.
    Gradient,
    /// 4-D deterministic noise at (position, time) replicated across RGB.
    Noise,
}

impl std::fmt::Display for ColorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ColorStrategy::Random => "random",
            ColorStrategy::Gradient => "gradient",
            ColorStrategy::Noise => "noise",
        };
        f.write_str(s)
    }
}

/// Routes attributes through the external compression engine.
#[derive(Clone, Debug, Default)]
pub struct DracoOptions {
    /// Feature-table property names to compress (`POSITION`, `RGB`,
    /// `RGBA`, `RGB565`, `NORMAL`, `BATCH_ID`). `None` compresses all of
    /// them. Per-point batch-table properties are always included.
    pub semantics: Option<Vec<String>>,
}

/// Options for one generation call. All toggles are independent unless
/// [`GenerateOptions::validate`] says otherwise.
#[derive(Clone, Debug)]
pub struct GenerateOptions {
    pub point_count: usize,
    pub shape: Shape,
    pub color_mode: ColorMode,
    pub color_strategy: ColorStrategy,
    /// RGBA bytes emitted as CONSTANT_RGBA when `color_mode` is `constant`.
    pub constant_color: [u8; 4],
    /// Edge length of the tile cube; the tile radius is half of this.
    pub tile_width: f64,
    /// World transform of the tile. Its translation column is the tile
    /// center used for RTC and quantization offsets.
    pub transform: DMat4,
    /// Noise time coordinate.
    pub time: f64,
    /// Seed for the per-call random generator and the noise function.
    pub seed: u64,
    /// Express positions relative to the tile center (RTC_CENTER).
    pub relative_to_center: bool,
    /// Quantize positions to UNSIGNED_SHORT; takes precedence over
    /// `relative_to_center` in the descriptor.
    pub quantize_positions: bool,
    /// Emit per-point normals.
    pub normals: bool,
    /// Oct-encode the normals; mutually exclusive with draco.
    pub oct_encode_normals: bool,
    pub draco: Option<DracoOptions>,
    /// Batch points by octant: BATCH_ID attribute plus a per-batch JSON
    /// batch table.
    pub batched: bool,
    /// Per-point batch-table metadata (temperature, secondaryColor, id).
    /// Mutually exclusive with `batched`.
    pub per_entity_properties: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            point_count: 1000,
            shape: Shape::Box,
            color_mode: ColorMode::Rgb,
            color_strategy: ColorStrategy::Random,
            constant_color: [255, 255, 0, 51],
            tile_width: 10.0,
            transform: DMat4::IDENTITY,
            time: 0.0,
            seed: 0,
            relative_to_center: false,
            quantize_positions: false,
            normals: false,
            oct_encode_normals: false,
            draco: None,
            batched: false,
            per_entity_properties: false,
        }
    }
}

impl GenerateOptions {
    /// Half the tile width; bounds every generated position.
    pub fn radius(&self) -> f64 {
        self.tile_width * 0.5
    }

    /// Fail fast on incompatible or degenerate combinations instead of
    /// letting them surface as an undefined step mid-pipeline.
    pub fn validate(&self, has_compressor: bool) -> Result<(), GenerateError> {
        if self.point_count == 0 {
            return Err(GenerateError::InvalidConfiguration(
                "point_count must be at least 1".to_owned(),
            ));
        }
        if !(self.tile_width > 0.0) {
            return Err(GenerateError::InvalidConfiguration(
                "tile_width must be positive".to_owned(),
            ));
        }
        if self.oct_encode_normals && self.draco.is_some() {
            return Err(GenerateError::InvalidConfiguration(
                "oct-encoded normals cannot be combined with draco compression".to_owned(),
            ));
        }
        if self.batched && self.per_entity_properties {
            return Err(GenerateError::InvalidConfiguration(
                "batched and per_entity_properties are mutually exclusive".to_owned(),
            ));
        }
        if self.draco.is_some() && !has_compressor {
            return Err(GenerateError::InvalidConfiguration(
                "draco compression requested but no compressor was supplied".to_owned(),
            ));
        }
        Ok(())
    }
}
