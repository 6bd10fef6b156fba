//! Attribute encoders: one named per-point array in, one typed byte
//! buffer out. Each buffer carries its own component type and arity so
//! downstream stages never re-derive size metadata.

use crate::component::{ComponentType, ElementType};

/// One encoded attribute, ready for aligned placement in a binary section.
///
/// Invariant: `data.len() == count * element_type.components() *
/// component_type.size()`. The constructors below uphold it; the buffer is
/// consumed (moved) when appended to a section and never reused.
#[derive(Debug, Clone)]
pub struct AttributeBuffer {
    pub property: String,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub data: Vec<u8>,
}

impl AttributeBuffer {
    /// Number of elements (points/entities) encoded in this buffer.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.data.len() / (self.element_type.components() * self.component_type.size())
    }

    /// FLOAT VEC3 positions.
    pub fn positions(property: &str, positions: &[[f32; 3]]) -> Self {
        let mut data = Vec::with_capacity(positions.len() * 12);
        for p in positions {
            for c in p {
                data.extend_from_slice(&c.to_le_bytes());
            }
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::Float,
            element_type: ElementType::Vec3,
            data,
        }
    }

    /// UNSIGNED_SHORT VEC3 positions, each axis mapped linearly from
    /// `[-radius, radius]` to `[0, 65535]`.
    ///
    /// Inputs outside the radius are not clamped: the caller guarantees the
    /// tile radius bounds every position, otherwise the cast overflows.
    pub fn quantized_positions(property: &str, positions: &[[f32; 3]], radius: f32) -> Self {
        let scale = 65535.0 / (2.0 * radius);
        let mut data = Vec::with_capacity(positions.len() * 6);
        for p in positions {
            for c in p {
                let q = ((c + radius) * scale).round() as u16;
                data.extend_from_slice(&q.to_le_bytes());
            }
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedShort,
            element_type: ElementType::Vec3,
            data,
        }
    }

    /// FLOAT VEC3 unit normals.
    pub fn normals(property: &str, normals: &[[f32; 3]]) -> Self {
        Self::positions(property, normals)
    }

    /// UNSIGNED_BYTE VEC2 octahedral-encoded unit normals.
    pub fn oct_encoded_normals(property: &str, normals: &[[f32; 3]]) -> Self {
        let mut data = Vec::with_capacity(normals.len() * 2);
        for n in normals {
            data.extend_from_slice(&oct_encode(*n));
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedByte,
            element_type: ElementType::Vec2,
            data,
        }
    }

    /// Batch ids in the narrowest integer type that holds `batch_length`
    /// distinct values: up to 256 ids fit UNSIGNED_BYTE, up to 65536 fit
    /// UNSIGNED_SHORT, everything else takes UNSIGNED_INT.
    ///
    /// `batch_length` is the true id cardinality (`max(id) + 1`), not the
    /// largest id value seen in `ids`.
    pub fn batch_ids(property: &str, ids: &[u32], batch_length: u32) -> Self {
        let (component_type, data) = if batch_length as u64 <= 256 {
            let mut data = Vec::with_capacity(ids.len());
            for &id in ids {
                data.push(id as u8);
            }
            (ComponentType::UnsignedByte, data)
        } else if batch_length as u64 <= 65536 {
            let mut data = Vec::with_capacity(ids.len() * 2);
            for &id in ids {
                data.extend_from_slice(&(id as u16).to_le_bytes());
            }
            (ComponentType::UnsignedShort, data)
        } else {
            let mut data = Vec::with_capacity(ids.len() * 4);
            for &id in ids {
                data.extend_from_slice(&id.to_le_bytes());
            }
            (ComponentType::UnsignedInt, data)
        };
        Self {
            property: property.to_owned(),
            component_type,
            element_type: ElementType::Scalar,
            data,
        }
    }

    /// 3x UNSIGNED_BYTE colors, channels in [0, 1] scaled by 255.
    pub fn colors_rgb(property: &str, colors: &[[f64; 4]]) -> Self {
        let mut data = Vec::with_capacity(colors.len() * 3);
        for c in colors {
            data.push(channel_byte(c[0], 255.0));
            data.push(channel_byte(c[1], 255.0));
            data.push(channel_byte(c[2], 255.0));
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedByte,
            element_type: ElementType::Vec3,
            data,
        }
    }

    /// 4x UNSIGNED_BYTE colors. Alpha is scaled by 128, not 255: every
    /// generated alpha stays below the 0.5 threshold so partial
    /// transparency is visually obvious in the output. Consumers diff
    /// against fixtures built with this factor, so it must not change.
    pub fn colors_rgba(property: &str, colors: &[[f64; 4]]) -> Self {
        let mut data = Vec::with_capacity(colors.len() * 4);
        for c in colors {
            data.push(channel_byte(c[0], 255.0));
            data.push(channel_byte(c[1], 255.0));
            data.push(channel_byte(c[2], 255.0));
            data.push(channel_byte(c[3], 128.0));
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedByte,
            element_type: ElementType::Vec4,
            data,
        }
    }

    /// Single UNSIGNED_SHORT per color: red in the top 5 bits, green in the
    /// middle 6, blue in the low 5.
    pub fn colors_rgb565(property: &str, colors: &[[f64; 4]]) -> Self {
        let mut data = Vec::with_capacity(colors.len() * 2);
        for c in colors {
            let r = (c[0].clamp(0.0, 1.0) * 31.0).round() as u16;
            let g = (c[1].clamp(0.0, 1.0) * 63.0).round() as u16;
            let b = (c[2].clamp(0.0, 1.0) * 31.0).round() as u16;
            let packed = (r << 11) | (g << 5) | b;
            data.extend_from_slice(&packed.to_le_bytes());
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedShort,
            element_type: ElementType::Scalar,
            data,
        }
    }

    /// FLOAT SCALAR values (per-entity metadata such as temperature).
    pub fn scalars_f32(property: &str, values: &[f32]) -> Self {
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::Float,
            element_type: ElementType::Scalar,
            data,
        }
    }

    /// UNSIGNED_SHORT SCALAR values (per-entity ids).
    pub fn scalars_u16(property: &str, values: &[u16]) -> Self {
        let mut data = Vec::with_capacity(values.len() * 2);
        for v in values {
            data.extend_from_slice(&v.to_le_bytes());
        }
        Self {
            property: property.to_owned(),
            component_type: ComponentType::UnsignedShort,
            element_type: ElementType::Scalar,
            data,
        }
    }

    /// FLOAT VEC3 values (per-entity secondary colors).
    pub fn vectors_f32(property: &str, values: &[[f32; 3]]) -> Self {
        Self::positions(property, values)
    }
}

#[inline]
fn channel_byte(value: f64, scale: f64) -> u8 {
    (value.clamp(0.0, 1.0) * scale).round() as u8
}

#[inline]
fn sign_not_zero(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Octahedral encoding of a unit normal into two bytes.
///
/// The unit sphere is projected onto an octahedron, the lower half is
/// folded over the upper, and the resulting square is sampled on a
/// 256x256 grid.
pub fn oct_encode(n: [f32; 3]) -> [u8; 2] {
    let sum = n[0].abs() + n[1].abs() + n[2].abs();
    let mut px = n[0] / sum;
    let mut py = n[1] / sum;
    if n[2] < 0.0 {
        let folded_x = (1.0 - py.abs()) * sign_not_zero(px);
        let folded_y = (1.0 - px.abs()) * sign_not_zero(py);
        px = folded_x;
        py = folded_y;
    }
    [
        ((px * 0.5 + 0.5) * 255.0).round() as u8,
        ((py * 0.5 + 0.5) * 255.0).round() as u8,
    ]
}
