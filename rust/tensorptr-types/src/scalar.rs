//! Scalar (element) types of a tensor.

/// Data types (dtypes) that can be used as element types in tensors.
///
/// Discriminants follow the runtime's C ABI numbering, so a `ScalarType` can be
/// exchanged with native code as a plain `i8`.
#[repr(i8)]
#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ScalarType {
    /// 8-bit unsigned integer, `u8`
    Byte = 0,
    /// 8-bit signed integer, `i8`
    Char = 1,
    /// 16-bit signed integer, `i16`
    Short = 2,
    /// 32-bit signed integer, `i32`
    Int = 3,
    /// 64-bit signed integer, `i64`
    Long = 4,
    /// 16-bit floating point, `half::f16`
    Half = 5,
    /// 32-bit floating point, `f32`
    Float = 6,
    /// 64-bit floating point, `f64`
    Double = 7,
    /// Complex number with 16-bit floating point parts
    ComplexHalf = 8,
    /// Complex number with 32-bit floating point parts
    ComplexFloat = 9,
    /// Complex number with 64-bit floating point parts
    ComplexDouble = 10,
    /// Boolean, `bool`
    Bool = 11,
    /// 8-bit quantized integer
    QInt8 = 12,
    /// 8-bit quantized unsigned integer
    QUInt8 = 13,
    /// 32-bit quantized integer
    QInt32 = 14,
    /// 16-bit floating point using the bfloat16 format, `half::bf16`
    BFloat16 = 15,
    /// Two 4-bit quantized unsigned integers packed in a byte
    QUInt4x2 = 16,
    /// Four 2-bit quantized unsigned integers packed in a byte
    QUInt2x4 = 17,
    Bits1x8 = 18,
    Bits2x4 = 19,
    Bits4x2 = 20,
    Bits8 = 21,
    Bits16 = 22,
    Float8_e5m2 = 23,
    Float8_e4m3fn = 24,
    Float8_e5m2fnuz = 25,
    Float8_e4m3fnuz = 26,
    /// 16-bit unsigned integer, `u16`
    UInt16 = 27,
    /// 32-bit unsigned integer, `u32`
    UInt32 = 28,
    /// 64-bit unsigned integer, `u64`
    UInt64 = 29,
}

impl ScalarType {
    /// Size in bytes of a single element of this type.
    pub const fn element_size(self) -> usize {
        match self {
            ScalarType::Byte
            | ScalarType::Char
            | ScalarType::Bool
            | ScalarType::QInt8
            | ScalarType::QUInt8
            | ScalarType::QUInt4x2
            | ScalarType::QUInt2x4
            | ScalarType::Bits1x8
            | ScalarType::Bits2x4
            | ScalarType::Bits4x2
            | ScalarType::Bits8
            | ScalarType::Float8_e5m2
            | ScalarType::Float8_e4m3fn
            | ScalarType::Float8_e5m2fnuz
            | ScalarType::Float8_e4m3fnuz => 1,
            ScalarType::Short
            | ScalarType::Half
            | ScalarType::BFloat16
            | ScalarType::Bits16
            | ScalarType::UInt16 => 2,
            ScalarType::Int
            | ScalarType::Float
            | ScalarType::QInt32
            | ScalarType::ComplexHalf
            | ScalarType::UInt32 => 4,
            ScalarType::Long
            | ScalarType::Double
            | ScalarType::ComplexFloat
            | ScalarType::UInt64 => 8,
            ScalarType::ComplexDouble => 16,
        }
    }

    pub const fn is_floating_point(self) -> bool {
        matches!(
            self,
            ScalarType::Half | ScalarType::Float | ScalarType::Double | ScalarType::BFloat16
        )
    }

    pub const fn is_complex(self) -> bool {
        matches!(
            self,
            ScalarType::ComplexHalf | ScalarType::ComplexFloat | ScalarType::ComplexDouble
        )
    }

    pub const fn is_quantized(self) -> bool {
        matches!(
            self,
            ScalarType::QInt8
                | ScalarType::QUInt8
                | ScalarType::QInt32
                | ScalarType::QUInt4x2
                | ScalarType::QUInt2x4
        )
    }
}

impl TryFrom<i8> for ScalarType {
    type Error = tensorptr_common::error::Error;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        const ALL: [ScalarType; 30] = [
            ScalarType::Byte,
            ScalarType::Char,
            ScalarType::Short,
            ScalarType::Int,
            ScalarType::Long,
            ScalarType::Half,
            ScalarType::Float,
            ScalarType::Double,
            ScalarType::ComplexHalf,
            ScalarType::ComplexFloat,
            ScalarType::ComplexDouble,
            ScalarType::Bool,
            ScalarType::QInt8,
            ScalarType::QUInt8,
            ScalarType::QInt32,
            ScalarType::BFloat16,
            ScalarType::QUInt4x2,
            ScalarType::QUInt2x4,
            ScalarType::Bits1x8,
            ScalarType::Bits2x4,
            ScalarType::Bits4x2,
            ScalarType::Bits8,
            ScalarType::Bits16,
            ScalarType::Float8_e5m2,
            ScalarType::Float8_e4m3fn,
            ScalarType::Float8_e5m2fnuz,
            ScalarType::Float8_e4m3fnuz,
            ScalarType::UInt16,
            ScalarType::UInt32,
            ScalarType::UInt64,
        ];
        usize::try_from(value)
            .ok()
            .and_then(|i| ALL.get(i).copied())
            .ok_or_else(|| {
                tensorptr_common::error::Error::invalid_arg(
                    "scalar_type",
                    format!("unknown scalar type code {value}"),
                )
            })
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// A Rust type that can be used as the element type of a tensor.
///
/// `NoUninit` guarantees that a buffer of these values can be exposed to the
/// runtime as initialized bytes.
pub trait Scalar: bytemuck::NoUninit + Send + Sync {
    /// The [`ScalarType`] tag of the implementing type.
    const TYPE: ScalarType;
}

macro_rules! impl_scalar {
    ($rust_type:ty, $variant:ident) => {
        impl Scalar for $rust_type {
            const TYPE: ScalarType = ScalarType::$variant;
        }
    };
}

impl_scalar!(u8, Byte);
impl_scalar!(i8, Char);
impl_scalar!(i16, Short);
impl_scalar!(i32, Int);
impl_scalar!(i64, Long);
impl_scalar!(f32, Float);
impl_scalar!(f64, Double);
impl_scalar!(bool, Bool);
impl_scalar!(u16, UInt16);
impl_scalar!(u32, UInt32);
impl_scalar!(u64, UInt64);
#[cfg(feature = "half")]
impl_scalar!(half::f16, Half);
#[cfg(feature = "half")]
impl_scalar!(half::bf16, BFloat16);
