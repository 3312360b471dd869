//! Reading PLY files: header first, then the body element by element.
//!
//! Binary elements without list properties are read as one block and decoded
//! column by column, optionally on the rayon thread pool (see
//! [`ReadOptions`]).

use std::{
    fs::File,
    io,
    path::Path,
};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use rayon::prelude::*;
use tracing::{debug, debug_span};

use crate::{
    Document, Element, Error,
    codec::{self, AsciiRow, Binary, Location, ScalarSource},
    header::{ElementDef, Encoding, Header},
    parse::{Input, MAX_LINE_LEN},
    property::{Property, ValueColumn},
    scalar::Scalar,
};


/// Used to configure [`Reader::read`].
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    /// Specifies if binary elements consisting only of value properties may
    /// be decoded on multiple threads. *Default*: `true`.
    ///
    /// Rows of such elements all have the same size, so the whole element
    /// can be read from the file at once and its columns decoded
    /// independently. Elements with list properties and ASCII files are
    /// always decoded sequentially. The result is the same either way.
    pub parallel: bool,

    /// Minimum number of rows an element needs to be decoded in parallel.
    /// Below this, splitting up the work costs more than it saves.
    /// *Default*: 16384.
    pub parallel_min_rows: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_min_rows: 16 * 1024,
        }
    }
}


// ===========================================================================
// ===== Definition of `Reader`
// ===========================================================================

/// A reader able to read PLY files.
///
/// Creating a reader (with [`Reader::open`] or [`Reader::new`]) parses the
/// header; [`Reader::read`] then decodes the body into a [`Document`].
#[derive(Debug)]
pub struct Reader<R: io::Read> {
    input: Input<R>,
    header: Header,
    options: ReadOptions,
}

impl Reader<File> {
    /// Tries to open the file specified by the given path and creates a new
    /// `Reader` from that file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }

        // We don't need a `BufReader` here, because `Input` buffers anyway.
        let file = File::open(path).map_err(|cause| Error::FileOpenFailure {
            path: path.display().to_string(),
            cause,
        })?;

        Self::new(file)
    }
}

impl<R: io::Read> Reader<R> {
    /// Creates a new `Reader` from the given `io::Read` instance and parses
    /// the header of the given input.
    ///
    /// If you want to open a file, rather use [`Reader::open`].
    pub fn new(reader: R) -> Result<Self, Error> {
        let mut input = Input::new(reader);
        let header = Header::parse(&mut input)?;

        Ok(Self {
            input,
            header,
            options: ReadOptions::default(),
        })
    }

    /// Replaces the options used by [`Reader::read`].
    pub fn with_options(mut self, options: ReadOptions) -> Self {
        self.options = options;
        self
    }

    /// The already parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn encoding(&self) -> Encoding {
        self.header.encoding
    }

    /// Decodes the whole body.
    pub fn read(self) -> Result<Document, Error> {
        let Self { mut input, header, options } = self;
        let _span = debug_span!("read_body", encoding = %header.encoding).entered();

        let mut elements = Vec::with_capacity(header.elements.len());
        for def in &header.elements {
            let mut element = Element::from_def(def);
            let body_reader = BodyReader { input: &mut input, options: &options };

            match header.encoding {
                Encoding::Ascii => body_reader.read_ascii(def, &mut element)?,
                Encoding::BinaryBigEndian => {
                    body_reader.read_binary::<BigEndian>(def, &mut element)?
                }
                Encoding::BinaryLittleEndian => {
                    body_reader.read_binary::<LittleEndian>(def, &mut element)?
                }
            }

            elements.push(element);
        }

        debug!("finished PLY body after {} bytes", input.offset());
        Ok(Document::new(header, elements))
    }
}


// ===========================================================================
// ===== Body decoding
// ===========================================================================

/// Fills the columns of one element from the shared input.
struct BodyReader<'a, R: io::Read> {
    input: &'a mut Input<R>,
    options: &'a ReadOptions,
}

impl<R: io::Read> BodyReader<'_, R> {
    /// One line per row, all properties of the row consume tokens of it.
    /// Values after the last property of a row are ignored.
    fn read_ascii(self, def: &ElementDef, element: &mut Element) -> Result<(), Error> {
        debug!("reading {} ascii rows of element '{}'", def.count, def.name);

        let mut line = Vec::new();
        for row in 0..def.count {
            let too_long = |_: usize| Error::MalformedValue {
                context: format!("element '{}', row {}", def.name, row),
                msg: format!("line is longer than {} bytes", MAX_LINE_LEN),
            };
            if !self.input.read_line(&mut line, too_long)? {
                return Err(Error::UnexpectedEndOfStream {
                    context: format!("element '{}', row {} is missing", def.name, row),
                });
            }

            let text = std::str::from_utf8(&line).map_err(|_| Error::MalformedValue {
                context: format!("element '{}', row {}", def.name, row),
                msg: "line is not valid UTF-8".into(),
            })?;

            let mut src = AsciiRow::new(text);
            read_row(&mut src, def, element, row)?;
            src.finish(&def.name, row);
        }

        Ok(())
    }

    /// Properties are stored as consecutive bytes without any separators.
    fn read_binary<B: ByteOrder>(self, def: &ElementDef, element: &mut Element) -> Result<(), Error> {
        if let Some(row_size) = def.binary_row_size() {
            return self.read_fixed_block::<B>(def, element, row_size);
        }

        debug!("reading {} binary rows of element '{}' row by row", def.count, def.name);
        let mut src = Binary::<_, B>::new(self.input);
        for row in 0..def.count {
            read_row(&mut src, def, element, row)?;
        }

        Ok(())
    }

    /// Reads all rows of an element without list properties at once and
    /// decodes the columns from that buffer.
    fn read_fixed_block<B: ByteOrder>(
        self,
        def: &ElementDef,
        element: &mut Element,
        row_size: usize,
    ) -> Result<(), Error> {
        // Nothing to read. This also covers elements without properties, for
        // which `row_size` is 0.
        if def.count == 0 || row_size == 0 {
            return Ok(());
        }

        let len = def.count.checked_mul(row_size as u64).ok_or_else(|| {
            Error::UnexpectedEndOfStream {
                context: format!(
                    "element '{}' declares {} rows which is more than any file can hold",
                    def.name,
                    def.count,
                ),
            }
        })?;

        let mut block = Vec::new();
        self.input.read_block(len, &mut block, || format!("element '{}'", def.name))?;

        let parallel = self.options.parallel && def.count >= self.options.parallel_min_rows;
        debug!(
            "decoding {} binary rows of element '{}' from a {} byte block ({})",
            def.count,
            def.name,
            len,
            if parallel { "parallel" } else { "sequential" },
        );

        let mut offset = 0;
        for prop in element.properties_mut() {
            // `binary_row_size` returned `Some`, so there are no lists here.
            macro_rules! decode {
                ($col:ident) => {{
                    decode_column::<B, _>($col, &block, row_size, offset, parallel);
                    offset += prop_size($col);
                }};
            }

            match prop {
                Property::Int8(col) => decode!(col),
                Property::UInt8(col) => decode!(col),
                Property::Int16(col) => decode!(col),
                Property::UInt16(col) => decode!(col),
                Property::Int32(col) => decode!(col),
                Property::UInt32(col) => decode!(col),
                Property::Float32(col) => decode!(col),
                Property::Float64(col) => decode!(col),
                _ => debug_assert!(false, "list property in fixed size element"),
            }
        }

        Ok(())
    }
}

/// Reads one row of `element`: every property in declaration order.
fn read_row(
    src: &mut impl ScalarSource,
    def: &ElementDef,
    element: &mut Element,
    row: u64,
) -> Result<(), Error> {
    for (prop_def, prop) in def.property_defs.iter().zip(element.properties_mut()) {
        let at = Location {
            element: &def.name,
            row,
            property: &prop_def.name,
        };

        match_property!(prop, |col|
            value => col.push(src.read_scalar(&at)?),
            list => codec::read_list_row(src, col, &at)?,
        );
    }

    Ok(())
}

fn prop_size<T: Scalar>(_: &ValueColumn<T>) -> usize {
    T::KIND.size()
}

/// Decodes the value at `offset` of every row in `block`.
fn decode_column<B: ByteOrder, T: Scalar>(
    col: &mut ValueColumn<T>,
    block: &[u8],
    row_size: usize,
    offset: usize,
    parallel: bool,
) {
    let read = |row: &[u8]| T::from_bytes::<B>(&row[offset..]);
    let values = col.values_mut();
    values.clear();

    if parallel {
        values.par_extend(block.par_chunks_exact(row_size).map(read));
    } else {
        values.extend(block.chunks_exact(row_size).map(read));
    }
}
