//! Component/element type metadata for binary table properties.

/// Numeric storage type of one attribute component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
    Float,
}

impl ComponentType {
    /// Size of one component in bytes. Doubles as the required alignment
    /// of the attribute's first byte inside a binary section.
    #[inline]
    pub fn size(self) -> usize {
        match self {
            ComponentType::UnsignedByte => 1,
            ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    /// Wire spelling used by the table JSON.
    pub fn name(self) -> &'static str {
        match self {
            ComponentType::UnsignedByte => "UNSIGNED_BYTE",
            ComponentType::UnsignedShort => "UNSIGNED_SHORT",
            ComponentType::UnsignedInt => "UNSIGNED_INT",
            ComponentType::Float => "FLOAT",
        }
    }
}

/// Vector arity of one attribute element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
}

impl ElementType {
    /// Components per element.
    #[inline]
    pub fn components(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 => 4,
        }
    }

    /// Wire spelling used by the table JSON.
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Scalar => "SCALAR",
            ElementType::Vec2 => "VEC2",
            ElementType::Vec3 => "VEC3",
            ElementType::Vec4 => "VEC4",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_sizes() {
        assert_eq!(ComponentType::UnsignedByte.size(), 1);
        assert_eq!(ComponentType::UnsignedShort.size(), 2);
        assert_eq!(ComponentType::UnsignedInt.size(), 4);
        assert_eq!(ComponentType::Float.size(), 4);
    }

    #[test]
    fn wire_names() {
        assert_eq!(ComponentType::UnsignedShort.name(), "UNSIGNED_SHORT");
        assert_eq!(ElementType::Vec3.name(), "VEC3");
        assert_eq!(ElementType::Scalar.components(), 1);
        assert_eq!(ElementType::Vec4.components(), 4);
    }
}
