//! The single sequential input cursor shared by the header parser and the
//! body reader.

use std::io::{self, BufRead, BufReader, Read};

use crate::Error;


/// Lines bigger than this are considered garbage. This is just a security
/// mechanism so that a binary blob without any `\n` does not make us buffer
/// the whole file while looking for the end of a line.
pub(crate) const MAX_LINE_LEN: usize = 4 * 1024 * 1024;

/// Wraps the underlying reader and keeps track of the position in the file.
///
/// There is exactly one `Input` per decode operation. It is never cloned or
/// rewound: the header parser reads the header lines and then hands the very
/// same cursor to the body reader.
#[derive(Debug)]
pub(crate) struct Input<R: Read> {
    reader: BufReader<R>,

    /// Number of bytes consumed so far.
    offset: u64,

    /// Number of lines consumed so far. Only updated by `read_line`.
    line: usize,
}

impl<R: Read> Input<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            offset: 0,
            line: 0,
        }
    }

    /// The number of bytes consumed so far.
    pub(crate) fn offset(&self) -> u64 {
        self.offset
    }

    /// The 1-based number of the line last returned by `read_line`.
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    /// Reads one line into `out` (which is cleared first). The line break
    /// (`\n` or `\r\n`) is not included. Returns `false` if the input is
    /// exhausted before any byte of a new line could be read.
    ///
    /// Lines longer than `MAX_LINE_LEN` are rejected with the error built by
    /// `too_long`, which gets the number of the offending line.
    pub(crate) fn read_line(
        &mut self,
        out: &mut Vec<u8>,
        too_long: impl FnOnce(usize) -> Error,
    ) -> Result<bool, Error> {
        out.clear();
        let n = (&mut self.reader)
            .take(MAX_LINE_LEN as u64 + 1)
            .read_until(b'\n', out)?;

        if n == 0 {
            return Ok(false);
        }
        if n > MAX_LINE_LEN {
            return Err(too_long(self.line + 1));
        }

        self.offset += n as u64;
        self.line += 1;

        if out.last() == Some(&b'\n') {
            out.pop();
        }
        if out.last() == Some(&b'\r') {
            out.pop();
        }

        Ok(true)
    }

    /// Fills `buf` completely or fails with `UnexpectedEndOfStream`. `context`
    /// is only called in the error case.
    pub(crate) fn read_exact(
        &mut self,
        buf: &mut [u8],
        context: impl FnOnce() -> String,
    ) -> Result<(), Error> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(ref e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::UnexpectedEndOfStream {
                    context: format!("{}, at byte {}", context(), self.offset),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reads exactly `len` bytes and appends them to `out`.
    ///
    /// Unlike `read_exact` this never allocates more than what the stream
    /// actually delivers, so a bogus `len` from a header does not lead to a
    /// huge allocation.
    pub(crate) fn read_block(
        &mut self,
        len: u64,
        out: &mut Vec<u8>,
        context: impl FnOnce() -> String,
    ) -> Result<(), Error> {
        let before = out.len();
        let n = (&mut self.reader).take(len).read_to_end(out)? as u64;
        self.offset += n;

        if n < len {
            out.truncate(before);
            return Err(Error::UnexpectedEndOfStream {
                context: format!(
                    "{}, needed {} bytes but only {} remain, at byte {}",
                    context(),
                    len,
                    n,
                    self.offset,
                ),
            });
        }

        Ok(())
    }
}
