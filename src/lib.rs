//! Decoder for PLY files, also known as Polygon File Format or Stanford
//! Triangle Format.
//!
//! A PLY file consists of a header declaring *elements* (e.g. `vertex`,
//! `face`), each with a row count and an ordered list of typed *properties*,
//! followed by a body storing all rows in ASCII or binary form. This crate
//! decodes the whole file into a column-oriented [`Document`]; it does not
//! interpret any element names itself.
//!
//! ```
//! use plyload::Document;
//!
//! let src = b"ply\n\
//!     format ascii 1.0\n\
//!     element vertex 2\n\
//!     property float x\n\
//!     property list uchar int idx\n\
//!     end_header\n\
//!     1.5 2 7 8\n\
//!     -3 0\n" as &[u8];
//!
//! let doc = Document::from_reader(src)?;
//! let vertex = doc.element("vertex")?;
//! assert_eq!(vertex.size(), 2);
//! assert_eq!(vertex.value_property::<f32>("x")?.as_slice(), &[1.5, -3.0]);
//!
//! let idx = vertex.list_property::<i32>("idx")?;
//! assert_eq!(idx.row(0), &[7, 8]);
//! assert!(idx.row(1).is_empty());
//! # Ok::<(), plyload::Error>(())
//! ```
//!
//! Use [`Reader`] to look at the header before decoding the body or to
//! change the [`ReadOptions`].

#[macro_use]
mod error;
#[macro_use]
mod property;

mod codec;
mod document;
mod element;
pub mod header;
mod parse;
mod read;
pub mod scalar;

#[cfg(feature = "mesh")]
pub mod mesh;

#[cfg(test)]
#[macro_use]
mod test_utils;
#[cfg(test)]
mod tests;

pub use self::{
    document::Document,
    element::Element,
    error::Error,
    header::{ElementDef, Encoding, Header, PropertyDef, PropertyType},
    property::{ListColumn, ListRows, Property, ValueColumn},
    read::{ReadOptions, Reader},
    scalar::{ListLenType, Scalar, ScalarKind},
};
