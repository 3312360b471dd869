//! Decoding of single scalars and list rows from the three body encodings.
//!
//! [`ScalarSource`] is implemented once per encoding: [`AsciiRow`] reads
//! whitespace separated tokens of one body line, [`Binary`] reads raw bytes
//! in little or big endian order straight from the input.

use std::{
    fmt,
    io::Read,
    marker::PhantomData,
};

use byteorder::ByteOrder;
use tracing::warn;

use crate::{
    Error,
    parse::Input,
    property::ListColumn,
    scalar::{ListLenType, Scalar},
};


/// Upper bound for reserving memory based on a length read from the file.
/// Longer rows still work, they just grow the vector on the way.
pub(crate) const MAX_PREALLOC: usize = 1 << 16;

/// Where in the body we currently are. Only used for error messages.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location<'a> {
    pub(crate) element: &'a str,
    pub(crate) row: u64,
    pub(crate) property: &'a str,
}

impl fmt::Display for Location<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "element '{}', row {}, property '{}'",
            self.element,
            self.row,
            self.property,
        )
    }
}

/// Something scalars can be read from. Each call consumes exactly one value.
pub(crate) trait ScalarSource {
    fn read_scalar<T: Scalar>(&mut self, at: &Location<'_>) -> Result<T, Error>;

    /// Reads the length prefix of a list row.
    fn read_list_len(&mut self, ty: ListLenType, at: &Location<'_>) -> Result<u32, Error> {
        match ty {
            ListLenType::UInt8 => self.read_scalar::<u8>(at).map(u32::from),
            ListLenType::UInt16 => self.read_scalar::<u16>(at).map(u32::from),
            ListLenType::UInt32 => self.read_scalar::<u32>(at),
        }
    }
}

/// The tokens of one line of an ASCII body, i.e. one row of an element.
pub(crate) struct AsciiRow<'a> {
    tokens: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> AsciiRow<'a> {
    pub(crate) fn new(line: &'a str) -> Self {
        Self { tokens: line.split_ascii_whitespace() }
    }

    /// Ends the row. Values after the last property are ignored; their
    /// number is returned.
    pub(crate) fn finish(self, element: &str, row: u64) -> usize {
        let extra = self.tokens.count();
        if extra > 0 {
            warn!(
                "ignoring {} additional value(s) at the end of element '{}', row {}",
                extra,
                element,
                row,
            );
        }
        extra
    }
}

impl ScalarSource for AsciiRow<'_> {
    fn read_scalar<T: Scalar>(&mut self, at: &Location<'_>) -> Result<T, Error> {
        let token = self.tokens.next().ok_or_else(|| Error::MalformedValue {
            context: at.to_string(),
            msg: "line ended before all values of the row were read".into(),
        })?;

        T::parse_ascii(token).ok_or_else(|| {
            // Limit the size of the error string
            let shown = token.chars().take(50).collect::<String>();
            Error::MalformedValue {
                context: at.to_string(),
                msg: format!("invalid '{}' literal '{}'", T::KIND, shown),
            }
        })
    }
}

/// Binary body in byte order `B`, reading directly from the shared input.
pub(crate) struct Binary<'a, R: Read, B: ByteOrder> {
    input: &'a mut Input<R>,
    _order: PhantomData<B>,
}

impl<'a, R: Read, B: ByteOrder> Binary<'a, R, B> {
    pub(crate) fn new(input: &'a mut Input<R>) -> Self {
        Self {
            input,
            _order: PhantomData,
        }
    }
}

impl<R: Read, B: ByteOrder> ScalarSource for Binary<'_, R, B> {
    fn read_scalar<T: Scalar>(&mut self, at: &Location<'_>) -> Result<T, Error> {
        let mut buf = [0u8; 8];
        let buf = &mut buf[..T::KIND.size()];
        self.input.read_exact(buf, || at.to_string())?;

        Ok(T::from_bytes::<B>(buf))
    }
}

/// Reads one row of a list property: the length prefix, then exactly that
/// many values. The row is appended to `col`.
pub(crate) fn read_list_row<T: Scalar>(
    src: &mut impl ScalarSource,
    col: &mut ListColumn<T>,
    at: &Location<'_>,
) -> Result<(), Error> {
    let len = src.read_list_len(col.len_type(), at)?;
    col.push_row(len, || src.read_scalar::<T>(at))
}
