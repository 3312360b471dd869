//! Typed property columns.
//!
//! Every property of an element is stored as one column: a [`ValueColumn`]
//! for scalar properties and a [`ListColumn`] for list properties. The
//! dynamically typed [`Property`] enum has one variant per scalar kind and
//! shape.

use std::{
    cmp::min,
    ops,
    slice,
};

use crate::{
    Error,
    codec::MAX_PREALLOC,
    header::PropertyType,
    scalar::{ListLenType, Scalar, ScalarKind},
};


// ===========================================================================
// ===== Value columns
// ===========================================================================

/// One scalar of type `T` per row.
///
/// Derefs to `[T]`, so the usual slice methods (`len`, `get`, `iter`,
/// indexing) are available.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueColumn<T> {
    values: Vec<T>,
}

impl<T: Scalar> ValueColumn<T> {
    pub(crate) fn with_capacity(rows: u64) -> Self {
        Self {
            values: Vec::with_capacity(min(rows, MAX_PREALLOC as u64) as usize),
        }
    }

    pub(crate) fn push(&mut self, value: T) {
        self.values.push(value);
    }

    pub(crate) fn values_mut(&mut self) -> &mut Vec<T> {
        &mut self.values
    }

    /// Returns all values as slice.
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }
}

impl<T> ops::Deref for ValueColumn<T> {
    type Target = [T];
    fn deref(&self) -> &Self::Target {
        &self.values
    }
}


// ===========================================================================
// ===== List columns
// ===========================================================================

/// A variable length list of `T` per row.
///
/// All rows are stored in one flat vector; row `i` is the range
/// `ends[i - 1]..ends[i]` of it. Alongside, statistics about the row lengths
/// are kept. They are updated whenever a row is appended.
#[derive(Debug, Clone, PartialEq)]
pub struct ListColumn<T> {
    data: Vec<T>,
    ends: Vec<usize>,
    len_type: ListLenType,
    total_size: u64,

    /// `(min, max)` of all row lengths so far, `None` before the first row.
    bounds: Option<(u32, u32)>,
}

impl<T: Scalar> ListColumn<T> {
    /// Creates an empty column. The length type is part of the schema and has
    /// to be known up front; there is no default.
    #[cfg(test)]
    pub(crate) fn new(len_type: ListLenType) -> Self {
        Self::with_capacity(len_type, 0)
    }

    pub(crate) fn with_capacity(len_type: ListLenType, rows: u64) -> Self {
        Self {
            data: Vec::new(),
            ends: Vec::with_capacity(min(rows, MAX_PREALLOC as u64) as usize),
            len_type,
            total_size: 0,
            bounds: None,
        }
    }

    /// Appends a row of `len` values, each obtained by calling `next`. If
    /// `next` fails, the error is returned and the column must not be used
    /// anymore.
    pub(crate) fn push_row(
        &mut self,
        len: u32,
        mut next: impl FnMut() -> Result<T, Error>,
    ) -> Result<(), Error> {
        self.data.reserve(min(len as usize, MAX_PREALLOC));
        for _ in 0..len {
            self.data.push(next()?);
        }
        self.ends.push(self.data.len());

        self.total_size += u64::from(len);
        self.bounds = Some(match self.bounds {
            None => (len, len),
            Some((lo, hi)) => (lo.min(len), hi.max(len)),
        });

        Ok(())
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Returns the list of row `idx`. Panics if `idx` is out of bounds.
    pub fn row(&self, idx: usize) -> &[T] {
        let start = if idx == 0 { 0 } else { self.ends[idx - 1] };
        &self.data[start..self.ends[idx]]
    }

    /// Returns the list of row `idx` or `None` if `idx` is out of bounds.
    pub fn get(&self, idx: usize) -> Option<&[T]> {
        if idx < self.len() {
            Some(self.row(idx))
        } else {
            None
        }
    }

    /// Iterates over all rows in order.
    pub fn iter(&self) -> ListRows<'_, T> {
        ListRows {
            data: &self.data,
            ends: self.ends.iter(),
            start: 0,
        }
    }

    /// All values of all rows, concatenated.
    pub fn flat_values(&self) -> &[T] {
        &self.data
    }

    /// The type of the length prefix of each row.
    pub fn len_type(&self) -> ListLenType {
        self.len_type
    }

    /// Sum of the lengths of all rows.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Length of the shortest row, or 0 if there are no rows.
    pub fn min_size(&self) -> u32 {
        self.bounds.map(|(lo, _)| lo).unwrap_or(0)
    }

    /// Length of the longest row, or 0 if there are no rows.
    pub fn max_size(&self) -> u32 {
        self.bounds.map(|(_, hi)| hi).unwrap_or(0)
    }
}

impl<T: Scalar> ops::Index<usize> for ListColumn<T> {
    type Output = [T];
    fn index(&self, idx: usize) -> &Self::Output {
        self.row(idx)
    }
}

impl<'a, T: Scalar> IntoIterator for &'a ListColumn<T> {
    type Item = &'a [T];
    type IntoIter = ListRows<'a, T>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the rows of a [`ListColumn`]. Can be obtained via
/// [`ListColumn::iter`].
#[derive(Debug, Clone)]
pub struct ListRows<'a, T> {
    data: &'a [T],
    ends: slice::Iter<'a, usize>,
    start: usize,
}

impl<'a, T> Iterator for ListRows<'a, T> {
    type Item = &'a [T];
    fn next(&mut self) -> Option<Self::Item> {
        let end = *self.ends.next()?;
        let out = &self.data[self.start..end];
        self.start = end;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ends.size_hint()
    }
}

impl<T> ExactSizeIterator for ListRows<'_, T> {}


// ===========================================================================
// ===== Dynamically typed property
// ===========================================================================

/// The column of one property: values or lists of one of the eight scalar
/// kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Int8(ValueColumn<i8>),
    UInt8(ValueColumn<u8>),
    Int16(ValueColumn<i16>),
    UInt16(ValueColumn<u16>),
    Int32(ValueColumn<i32>),
    UInt32(ValueColumn<u32>),
    Float32(ValueColumn<f32>),
    Float64(ValueColumn<f64>),
    Int8List(ListColumn<i8>),
    UInt8List(ListColumn<u8>),
    Int16List(ListColumn<i16>),
    UInt16List(ListColumn<u16>),
    Int32List(ListColumn<i32>),
    UInt32List(ListColumn<u32>),
    Float32List(ListColumn<f32>),
    Float64List(ListColumn<f64>),
}

/// Matches all variants of `Property`. `$col` is bound to the column in all
/// arms; `$value` is used for the value variants, `$list` for the list
/// variants.
macro_rules! match_property {
    ($prop:expr, |$col:ident| value => $value:expr, list => $list:expr $(,)?) => {
        match $prop {
            Property::Int8($col) => $value,
            Property::UInt8($col) => $value,
            Property::Int16($col) => $value,
            Property::UInt16($col) => $value,
            Property::Int32($col) => $value,
            Property::UInt32($col) => $value,
            Property::Float32($col) => $value,
            Property::Float64($col) => $value,
            Property::Int8List($col) => $list,
            Property::UInt8List($col) => $list,
            Property::Int16List($col) => $list,
            Property::UInt16List($col) => $list,
            Property::Int32List($col) => $list,
            Property::UInt32List($col) => $list,
            Property::Float32List($col) => $list,
            Property::Float64List($col) => $list,
        }
    };
}

impl Property {
    /// Creates an empty column for a property of type `ty` with space for
    /// `rows` rows.
    pub(crate) fn new(ty: PropertyType, rows: u64) -> Self {
        macro_rules! value {
            ($variant:ident) => { Property::$variant(ValueColumn::with_capacity(rows)) };
        }
        macro_rules! list {
            ($variant:ident, $len_type:expr) => {
                Property::$variant(ListColumn::with_capacity($len_type, rows))
            };
        }

        match ty {
            PropertyType::Scalar(kind) => match kind {
                ScalarKind::Int8 => value!(Int8),
                ScalarKind::UInt8 => value!(UInt8),
                ScalarKind::Int16 => value!(Int16),
                ScalarKind::UInt16 => value!(UInt16),
                ScalarKind::Int32 => value!(Int32),
                ScalarKind::UInt32 => value!(UInt32),
                ScalarKind::Float32 => value!(Float32),
                ScalarKind::Float64 => value!(Float64),
            },
            PropertyType::List { len_type, scalar_type } => match scalar_type {
                ScalarKind::Int8 => list!(Int8List, len_type),
                ScalarKind::UInt8 => list!(UInt8List, len_type),
                ScalarKind::Int16 => list!(Int16List, len_type),
                ScalarKind::UInt16 => list!(UInt16List, len_type),
                ScalarKind::Int32 => list!(Int32List, len_type),
                ScalarKind::UInt32 => list!(UInt32List, len_type),
                ScalarKind::Float32 => list!(Float32List, len_type),
                ScalarKind::Float64 => list!(Float64List, len_type),
            },
        }
    }

    /// Returns the scalar type of the values or list elements.
    pub fn scalar_kind(&self) -> ScalarKind {
        self.ty().scalar_type()
    }

    /// Returns the full type of this property as it was declared in the
    /// header.
    pub fn ty(&self) -> PropertyType {
        fn kind_of<T: Scalar>(_: &[T]) -> ScalarKind {
            T::KIND
        }

        match_property!(self, |col|
            value => PropertyType::Scalar(kind_of(col.as_slice())),
            list => PropertyType::List {
                len_type: col.len_type(),
                scalar_type: kind_of(col.flat_values()),
            },
        )
    }

    /// Returns `true` if this is a list property.
    pub fn is_list(&self) -> bool {
        self.ty().is_list()
    }

    /// Number of rows stored in this column.
    pub fn len(&self) -> usize {
        match_property!(self, |col| value => col.len(), list => col.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
