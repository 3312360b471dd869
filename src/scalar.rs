//! The eight PLY scalar types and the Rust types representing them.

use std::{
    fmt,
    str::FromStr,
};

use byteorder::ByteOrder;
use derive_more::Display;

use crate::{
    Error,
    property::{ListColumn, Property, ValueColumn},
};


/// A primitive PLY type. There are 8 in total, 2 floating point types, 3
/// signed and 3 unsigned integers.
///
/// The `Display` impl prints the canonical (sized) type name as used in
/// headers, e.g. `int16`.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    #[display(fmt = "int8")]
    Int8,
    #[display(fmt = "uint8")]
    UInt8,
    #[display(fmt = "int16")]
    Int16,
    #[display(fmt = "uint16")]
    UInt16,
    #[display(fmt = "int32")]
    Int32,
    #[display(fmt = "uint32")]
    UInt32,
    #[display(fmt = "float32")]
    Float32,
    #[display(fmt = "float64")]
    Float64,
}

impl ScalarKind {
    /// Returns the number of bytes this type occupies in binary bodies.
    pub fn size(&self) -> usize {
        match self {
            ScalarKind::Int8 => 1,
            ScalarKind::UInt8 => 1,
            ScalarKind::Int16 => 2,
            ScalarKind::UInt16 => 2,
            ScalarKind::Int32 => 4,
            ScalarKind::UInt32 => 4,
            ScalarKind::Float32 => 4,
            ScalarKind::Float64 => 8,
        }
    }
}

/// Resolves a header type token. Both the sized names (`int8`, `float32`,
/// ...) and the classic names (`char`, `float`, ...) are accepted.
impl FromStr for ScalarKind {
    type Err = UnknownScalarType;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int8" | "char" => Ok(ScalarKind::Int8),
            "uint8" | "uchar" => Ok(ScalarKind::UInt8),
            "int16" | "short" => Ok(ScalarKind::Int16),
            "uint16" | "ushort" => Ok(ScalarKind::UInt16),
            "int32" | "int" => Ok(ScalarKind::Int32),
            "uint32" | "uint" => Ok(ScalarKind::UInt32),
            "float32" | "float" => Ok(ScalarKind::Float32),
            "float64" | "double" => Ok(ScalarKind::Float64),
            other => Err(UnknownScalarType(other.to_string())),
        }
    }
}

/// The error emitted when the `FromStr` implementation for `ScalarKind`
/// cannot parse the given string.
#[derive(Clone, PartialEq, Eq)]
pub struct UnknownScalarType(pub String);

impl fmt::Display for UnknownScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\" is not a valid PLY scalar type", self.0)
    }
}

impl fmt::Debug for UnknownScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// The type in which the length of each list row is stored.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListLenType {
    #[display(fmt = "uint8")]
    UInt8,
    #[display(fmt = "uint16")]
    UInt16,
    #[display(fmt = "uint32")]
    UInt32,
}

impl ListLenType {
    /// Returns `None` for every kind that is not an unsigned integer.
    pub fn from_scalar_kind(kind: ScalarKind) -> Option<Self> {
        match kind {
            ScalarKind::UInt8 => Some(ListLenType::UInt8),
            ScalarKind::UInt16 => Some(ListLenType::UInt16),
            ScalarKind::UInt32 => Some(ListLenType::UInt32),
            _ => None,
        }
    }

    pub fn to_scalar_kind(self) -> ScalarKind {
        match self {
            ListLenType::UInt8 => ScalarKind::UInt8,
            ListLenType::UInt16 => ScalarKind::UInt16,
            ListLenType::UInt32 => ScalarKind::UInt32,
        }
    }

    /// Returns the number of bytes the length prefix occupies (1, 2 or 4).
    pub fn size(&self) -> usize {
        self.to_scalar_kind().size()
    }
}


// ===========================================================================
// ===== The `Scalar` trait
// ===========================================================================

mod internal {
    pub trait DoNotImplement {}
}

/// Abstracts over the eight Rust types that represent PLY scalars.
///
/// This is a closed set: the trait is implemented for exactly `i8`, `u8`,
/// `i16`, `u16`, `i32`, `u32`, `f32` and `f64`, one for each
/// [`ScalarKind`]. The crate-private supertrait prevents implementations for
/// other types.
///
/// It is mostly used as type parameter for the typed lookup functions like
/// [`Element::value_property`](crate::Element::value_property).
pub trait Scalar:
    Copy + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static + internal::DoNotImplement
{
    /// The kind represented by this type.
    const KIND: ScalarKind;

    /// Parses an ASCII token. Returns `None` if the token is not a valid
    /// literal of this type (including values out of range).
    fn parse_ascii(token: &str) -> Option<Self>;

    /// Interprets the first `Self::KIND.size()` bytes of `buf` in byte order
    /// `B`. Panics if `buf` is too short.
    fn from_bytes<B: ByteOrder>(buf: &[u8]) -> Self;

    /// Returns the value column if `prop` holds values of this type.
    fn value_column(prop: &Property) -> Option<&ValueColumn<Self>>;

    /// Returns the list column if `prop` holds lists of this type.
    fn list_column(prop: &Property) -> Option<&ListColumn<Self>>;
}

macro_rules! impl_scalar {
    ($ty:ident, $kind:ident, $list_variant:ident, |$buf:ident| $read:expr) => {
        impl internal::DoNotImplement for $ty {}
        impl Scalar for $ty {
            const KIND: ScalarKind = ScalarKind::$kind;

            fn parse_ascii(token: &str) -> Option<Self> {
                token.parse::<$ty>().ok()
            }

            fn from_bytes<B: ByteOrder>($buf: &[u8]) -> Self {
                $read
            }

            fn value_column(prop: &Property) -> Option<&ValueColumn<Self>> {
                match prop {
                    Property::$kind(col) => Some(col),
                    _ => None,
                }
            }

            fn list_column(prop: &Property) -> Option<&ListColumn<Self>> {
                match prop {
                    Property::$list_variant(col) => Some(col),
                    _ => None,
                }
            }
        }
    }
}

impl_scalar!(i8,  Int8,    Int8List,    |buf| buf[0] as i8);
impl_scalar!(u8,  UInt8,   UInt8List,   |buf| buf[0]);
impl_scalar!(i16, Int16,   Int16List,   |buf| B::read_i16(buf));
impl_scalar!(u16, UInt16,  UInt16List,  |buf| B::read_u16(buf));
impl_scalar!(i32, Int32,   Int32List,   |buf| B::read_i32(buf));
impl_scalar!(u32, UInt32,  UInt32List,  |buf| B::read_u32(buf));
impl_scalar!(f32, Float32, Float32List, |buf| B::read_f32(buf));
impl_scalar!(f64, Float64, Float64List, |buf| B::read_f64(buf));


/// Resolves `token` and reports failures as `Error::UnknownType` for the
/// given header line.
pub(crate) fn resolve(token: &str, line: usize) -> Result<ScalarKind, Error> {
    token.parse().map_err(|UnknownScalarType(ty)| Error::UnknownType { line, ty })
}
