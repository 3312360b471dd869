use std::io;

use failure::Fail;

use crate::header::PropertyType;


/// Everything that can go wrong while opening, decoding or querying a PLY
/// file.
///
/// Decoding never returns a partially filled document: the first error
/// aborts the whole operation.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "file '{}' does not exist", _0)]
    FileNotFound(String),

    #[fail(display = "failed to open file '{}': {}", path, cause)]
    FileOpenFailure {
        path: String,
        #[cause]
        cause: io::Error,
    },

    #[fail(display = "IO error: {}", _0)]
    Io(#[cause] io::Error),

    #[fail(display = "not a valid PLY file (first line is not \"ply\")")]
    NotAPlyFile,

    #[fail(display = "malformed header line {}: {}", line, msg)]
    MalformedHeaderLine {
        line: usize,
        msg: String,
    },

    #[fail(display = "\"{}\" is not a valid PLY scalar type (header line {})", ty, line)]
    UnknownType {
        line: usize,
        ty: String,
    },

    #[fail(
        display = "\"{}\" cannot be used as list length type, only uint8, uint16 and \
            uint32 (or uchar, ushort and uint) are allowed (header line {})",
        ty,
        line
    )]
    UnsupportedListSizeType {
        line: usize,
        ty: String,
    },

    #[fail(display = "malformed value ({}): {}", context, msg)]
    MalformedValue {
        context: String,
        msg: String,
    },

    #[fail(display = "unexpected end of stream ({})", context)]
    UnexpectedEndOfStream {
        context: String,
    },

    #[fail(display = "element '{}' does not exist", _0)]
    ElementNotFound(String),

    #[fail(display = "element '{}' has no property '{}'", element, property)]
    PropertyNotFound {
        element: String,
        property: String,
    },

    #[fail(
        display = "property '{}' of element '{}' has type {}, but {} was requested",
        property,
        element,
        found,
        expected
    )]
    TypeMismatch {
        element: String,
        property: String,
        expected: PropertyType,
        found: PropertyType,
    },

    #[fail(display = "invalid mesh data: {}", _0)]
    InvalidMesh(String),
}

impl From<io::Error> for Error {
    fn from(src: io::Error) -> Self {
        Error::Io(src)
    }
}

/// Builds an `Error::MalformedHeaderLine` with a formatted message.
macro_rules! malformed_header {
    ($line:expr, $($t:tt)+) => {
        crate::error::Error::MalformedHeaderLine {
            line: $line,
            msg: format!($($t)+),
        }
    };
}
