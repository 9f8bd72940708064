use std::error::Error;
use std::fmt;
use std::str::FromStr;

/// Element type of a tensor in the IR.
///
/// `Dynamic` is used for values whose type has not been resolved yet, such as
/// the outputs of a node which has not been validated.
#[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ElementType {
    #[default]
    Dynamic,
    Boolean,
    BF16,
    F16,
    F32,
    F64,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

/// All element types which have a concrete representation.
const STATIC_TYPES: [ElementType; 13] = [
    ElementType::Boolean,
    ElementType::BF16,
    ElementType::F16,
    ElementType::F32,
    ElementType::F64,
    ElementType::I8,
    ElementType::I16,
    ElementType::I32,
    ElementType::I64,
    ElementType::U8,
    ElementType::U16,
    ElementType::U32,
    ElementType::U64,
];

impl ElementType {
    pub fn is_dynamic(self) -> bool {
        self == Self::Dynamic
    }

    pub fn is_static(self) -> bool {
        !self.is_dynamic()
    }

    /// Return true for signed and unsigned integer types.
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
        )
    }

    /// Return true for floating point types.
    pub fn is_real(self) -> bool {
        matches!(self, Self::BF16 | Self::F16 | Self::F32 | Self::F64)
    }

    /// Return the size of elements of this type in bytes, or `None` for
    /// `Dynamic`.
    pub fn size(self) -> Option<usize> {
        let size = match self {
            Self::Dynamic => return None,
            Self::Boolean | Self::I8 | Self::U8 => 1,
            Self::BF16 | Self::F16 | Self::I16 | Self::U16 => 2,
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::F64 | Self::I64 | Self::U64 => 8,
        };
        Some(size)
    }

    /// Combine two element types which must describe the same value.
    ///
    /// `Dynamic` merges with any type. Static types only merge with
    /// themselves.
    pub fn merge(self, other: ElementType) -> Option<ElementType> {
        match (self, other) {
            (Self::Dynamic, ty) | (ty, Self::Dynamic) => Some(ty),
            (a, b) if a == b => Some(a),
            _ => None,
        }
    }

    /// Short name of the type, eg. "f32" or "i64".
    pub fn name(self) -> &'static str {
        match self {
            Self::Dynamic => "dynamic",
            Self::Boolean => "boolean",
            Self::BF16 => "bf16",
            Self::F16 => "f16",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when parsing an unrecognized element type name.
#[derive(Clone, Debug, PartialEq)]
pub struct ParseElementTypeError(String);

impl fmt::Display for ParseElementTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown element type \"{}\"", self.0)
    }
}

impl Error for ParseElementTypeError {}

impl FromStr for ElementType {
    type Err = ParseElementTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "dynamic" {
            return Ok(Self::Dynamic);
        }
        STATIC_TYPES
            .iter()
            .copied()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| ParseElementTypeError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rten_testing::TestCases;

    use super::{ElementType, STATIC_TYPES};

    #[test]
    fn test_parse_and_display() {
        for ty in STATIC_TYPES.into_iter().chain([ElementType::Dynamic]) {
            assert_eq!(ty.to_string().parse::<ElementType>(), Ok(ty));
        }

        let err = "float".parse::<ElementType>().err().unwrap();
        assert_eq!(err.to_string(), "unknown element type \"float\"");
    }

    #[test]
    fn test_classification() {
        #[derive(Debug)]
        struct Case {
            ty: ElementType,
            integral: bool,
            real: bool,
            size: Option<usize>,
        }

        let cases = [
            Case {
                ty: ElementType::I64,
                integral: true,
                real: false,
                size: Some(8),
            },
            Case {
                ty: ElementType::U8,
                integral: true,
                real: false,
                size: Some(1),
            },
            Case {
                ty: ElementType::BF16,
                integral: false,
                real: true,
                size: Some(2),
            },
            Case {
                ty: ElementType::Boolean,
                integral: false,
                real: false,
                size: Some(1),
            },
            Case {
                ty: ElementType::Dynamic,
                integral: false,
                real: false,
                size: None,
            },
        ];

        cases.test_each(|case| {
            assert_eq!(case.ty.is_integral(), case.integral);
            assert_eq!(case.ty.is_real(), case.real);
            assert_eq!(case.ty.size(), case.size);
        })
    }

    #[test]
    fn test_merge() {
        assert_eq!(
            ElementType::Dynamic.merge(ElementType::F32),
            Some(ElementType::F32)
        );
        assert_eq!(
            ElementType::I32.merge(ElementType::Dynamic),
            Some(ElementType::I32)
        );
        assert_eq!(ElementType::I32.merge(ElementType::I32), Some(ElementType::I32));
        assert_eq!(ElementType::I32.merge(ElementType::I64), None);
    }
}
