//! The decoded file as a whole.

use std::{
    io,
    path::Path,
};

use fxhash::FxHashMap;

use crate::{
    Element, Error, Reader,
    header::{Encoding, Header},
};


/// A fully decoded PLY file: all elements with all their rows, in the order
/// they were declared in the header.
///
/// This is the result of [`Reader::read`] and is not modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    encoding: Encoding,
    version: Option<String>,
    comments: Vec<String>,
    obj_info: Vec<String>,
    elements: Vec<Element>,
    index: FxHashMap<String, usize>,
}

impl Document {
    /// Opens the file at `path` and decodes it with the default options. This
    /// is a shortcut for `Reader::open(path)?.read()`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        Reader::open(path)?.read()
    }

    /// Decodes a whole PLY file from `reader` with the default options.
    pub fn from_reader(reader: impl io::Read) -> Result<Self, Error> {
        Reader::new(reader)?.read()
    }

    pub(crate) fn new(header: Header, elements: Vec<Element>) -> Self {
        let index = elements.iter()
            .enumerate()
            .map(|(i, e)| (e.name().to_string(), i))
            .collect();

        Self {
            encoding: header.encoding,
            version: header.version,
            comments: header.comments,
            obj_info: header.obj_info,
            elements,
            index,
        }
    }

    /// The encoding the body was stored in.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// The version from the `format` line, if it was given.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Text of all `comment` lines of the header.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Text of all `obj_info` lines of the header.
    pub fn obj_info(&self) -> &[String] {
        &self.obj_info
    }

    pub fn contains_element(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns the element with the given name or `ElementNotFound`.
    pub fn element(&self, name: &str) -> Result<&Element, Error> {
        self.index.get(name)
            .map(|&i| &self.elements[i])
            .ok_or_else(|| Error::ElementNotFound(name.to_string()))
    }

    /// All elements in declaration order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }
}
