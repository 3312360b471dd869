//! Parsing of the PLY header into a schema of elements and properties.

use std::{fmt, io::Read};

use derive_more::Display;
use fxhash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::{
    Error,
    parse::{Input, MAX_LINE_LEN},
    scalar::{self, ListLenType, ScalarKind},
};


/// The encoding of the body of a PLY file. There is exactly one for the
/// whole body.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    #[display(fmt = "ascii")]
    Ascii,
    #[display(fmt = "binary_big_endian")]
    BinaryBigEndian,
    #[display(fmt = "binary_little_endian")]
    BinaryLittleEndian,
}

impl Encoding {
    fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "ascii" => Some(Encoding::Ascii),
            "binary_little_endian" => Some(Encoding::BinaryLittleEndian),
            "binary_big_endian" => Some(Encoding::BinaryBigEndian),
            _ => None,
        }
    }
}

/// The declared type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyType {
    Scalar(ScalarKind),
    List {
        len_type: ListLenType,
        scalar_type: ScalarKind,
    }
}

impl PropertyType {
    pub fn len_type(&self) -> Option<ListLenType> {
        match self {
            PropertyType::Scalar(_) => None,
            PropertyType::List { len_type, .. } => Some(*len_type),
        }
    }

    pub fn scalar_type(&self) -> ScalarKind {
        match *self {
            PropertyType::Scalar(scalar_type) => scalar_type,
            PropertyType::List { scalar_type, .. } => scalar_type,
        }
    }

    pub fn is_list(&self) -> bool {
        self.len_type().is_some()
    }
}

/// Prints the type like in a header, e.g. `float32` or `list uint8 int32`.
impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PropertyType::Scalar(kind) => kind.fmt(f),
            PropertyType::List { len_type, scalar_type } => {
                write!(f, "list {} {}", len_type, scalar_type)
            }
        }
    }
}

/// The header definition of one property of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: PropertyType,
}

/// The header definition of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub name: String,

    /// Number of rows of this element.
    pub count: u64,

    /// Definitions for all properties of this element, in declaration order.
    pub property_defs: Vec<PropertyDef>,
}

impl ElementDef {
    /// Returns the position of the property with the given name.
    pub fn prop_pos(&self, prop_name: &str) -> Option<usize> {
        self.property_defs.iter().position(|p| p.name == prop_name)
    }

    /// Returns the size of one row in a binary body, or `None` if the element
    /// has a list property (and thus rows of varying size).
    pub fn binary_row_size(&self) -> Option<usize> {
        self.property_defs.iter()
            .map(|p| match p.ty {
                PropertyType::Scalar(kind) => Some(kind.size()),
                PropertyType::List { .. } => None,
            })
            .sum()
    }
}

/// Everything the header of a PLY file declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub encoding: Encoding,

    /// The version given in the `format` line (always `1.0` in practice).
    pub version: Option<String>,

    /// Text of all `comment` lines, in order.
    pub comments: Vec<String>,

    /// Text of all `obj_info` lines, in order.
    pub obj_info: Vec<String>,

    /// All elements in declaration order. This is the order in which they
    /// are stored in the body.
    pub elements: Vec<ElementDef>,
}

impl Header {
    /// Parses the header from the start of `input`, leaving `input` at the
    /// first byte of the body.
    pub(crate) fn parse<R: Read>(input: &mut Input<R>) -> Result<Self, Error> {
        let mut line = Vec::new();
        let too_long = |line_no: usize| malformed_header!(
            line_no,
            "line is longer than {} bytes",
            MAX_LINE_LEN,
        );

        // ===== Magic number ===============================================
        if !input.read_line(&mut line, too_long)? || line != b"ply" {
            return Err(Error::NotAPlyFile);
        }

        let mut encoding = None;
        let mut header = Header {
            encoding: Encoding::Ascii,
            version: None,
            comments: Vec::new(),
            obj_info: Vec::new(),
            elements: Vec::new(),
        };
        let mut element_names = FxHashSet::default();


        // ===== Header lines ===============================================
        loop {
            if !input.read_line(&mut line, too_long)? {
                return Err(Error::UnexpectedEndOfStream {
                    context: format!("header ended without \"end_header\" after line {}", input.line()),
                });
            }
            let line_no = input.line();

            // Comments are free text, so we are lenient about their encoding.
            let line = String::from_utf8_lossy(&line);
            let line: &str = &line;

            if line == "end_header" {
                break;
            }
            if let Some(text) = keyword_rest(line, "comment") {
                trace!("header line {}: comment", line_no);
                header.comments.push(text.to_string());
                continue;
            }
            if let Some(text) = keyword_rest(line, "obj_info") {
                trace!("header line {}: obj_info", line_no);
                header.obj_info.push(text.to_string());
                continue;
            }
            if !line.is_ascii() {
                return Err(malformed_header!(line_no, "header lines must be ASCII"));
            }

            let tokens: SmallVec<[&str; 5]> = line.split_ascii_whitespace().collect();
            match tokens[..] {
                // Format line, e.g. `format ascii 1.0`
                ["format", kind] | ["format", kind, _] => {
                    if encoding.is_some() {
                        return Err(malformed_header!(line_no, "duplicate \"format\" line"));
                    }

                    let e = Encoding::from_keyword(kind).ok_or_else(|| malformed_header!(
                        line_no,
                        "expected \"ascii\", \"binary_little_endian\" or \
                            \"binary_big_endian\", found \"{}\"",
                        kind,
                    ))?;
                    trace!("header line {}: format {}", line_no, e);

                    encoding = Some(e);
                    header.version = tokens.get(2).map(|v| v.to_string());
                }

                // Element definition, e.g. `element vertex 8`
                ["element", name, count] => {
                    let count = count.parse::<u64>().map_err(|e| malformed_header!(
                        line_no,
                        "invalid integer \"{}\" as element count ({})",
                        count,
                        e,
                    ))?;

                    if !element_names.insert(name.to_string()) {
                        return Err(malformed_header!(line_no, "duplicate element \"{}\"", name));
                    }
                    trace!("header line {}: element {} with {} rows", line_no, name, count);

                    header.elements.push(ElementDef {
                        name: name.to_string(),
                        count,
                        property_defs: Vec::new(),
                    });
                }

                // Property definition, e.g. `property float x` or
                // `property list uchar int vertex_indices`
                ["property", ..] => {
                    let elem = header.elements.last_mut().ok_or_else(|| malformed_header!(
                        line_no,
                        "property definition without preceding element definition",
                    ))?;
                    let def = parse_property(&tokens, line_no)?;

                    if elem.prop_pos(&def.name).is_some() {
                        return Err(malformed_header!(
                            line_no,
                            "duplicate property \"{}\" in element \"{}\"",
                            def.name,
                            elem.name,
                        ));
                    }
                    trace!("header line {}: property {} {}", line_no, def.ty, def.name);

                    elem.property_defs.push(def);
                }

                // Something else...
                _ => {
                    let shown = line.chars().take(50).collect::<String>();
                    return Err(malformed_header!(
                        line_no,
                        "expected \"format\", \"comment\", \"obj_info\", \"element\", \
                            \"property\" or \"end_header\" line, found \"{}\"",
                        shown,
                    ));
                }
            }
        }

        // Files without format line are treated as ASCII.
        header.encoding = encoding.unwrap_or(Encoding::Ascii);

        debug!(
            "parsed PLY header: encoding {}, {} element(s), {} comment(s)",
            header.encoding,
            header.elements.len(),
            header.comments.len(),
        );

        Ok(header)
    }

    /// Returns the definition of the element with the given name.
    pub fn element(&self, name: &str) -> Option<&ElementDef> {
        self.elements.iter().find(|e| e.name == name)
    }
}

/// If `line` starts with `keyword`, returns the rest of the line without
/// leading whitespace. `commentfoo` is a comment with the text `foo`.
fn keyword_rest<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    line.strip_prefix(keyword).map(str::trim_start)
}

/// Parses the tokens of a `property` line. `tokens[0]` is `"property"`.
fn parse_property(tokens: &[&str], line_no: usize) -> Result<PropertyDef, Error> {
    match *tokens {
        [_, "list", len_type, scalar_type, name] => {
            // Only unsigned integers of 1, 2 or 4 bytes can store list
            // lengths.
            let len_type = scalar::resolve(len_type, line_no)
                .ok()
                .and_then(ListLenType::from_scalar_kind)
                .ok_or_else(|| Error::UnsupportedListSizeType {
                    line: line_no,
                    ty: len_type.to_string(),
                })?;
            let scalar_type = scalar::resolve(scalar_type, line_no)?;

            Ok(PropertyDef {
                name: name.to_string(),
                ty: PropertyType::List { len_type, scalar_type },
            })
        }
        [_, "list", ..] => Err(malformed_header!(
            line_no,
            "expected \"property list <length type> <type> <name>\"",
        )),
        [_, ty, name] => Ok(PropertyDef {
            name: name.to_string(),
            ty: PropertyType::Scalar(scalar::resolve(ty, line_no)?),
        }),
        _ => Err(malformed_header!(line_no, "expected \"property <type> <name>\"")),
    }
}
