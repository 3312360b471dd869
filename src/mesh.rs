//! A small consumer of [`Document`]: turns the usual `vertex`/`face` layout
//! into a triangle mesh.
//!
//! The decoder itself does not interpret elements at all. This module is an
//! example of how a caller enforces the schema it expects via the typed
//! lookup functions.

use cgmath::Point3;
use num_traits::ToPrimitive;

use crate::{Document, Element, Error, Property};


/// Names under which the face index list is commonly stored.
pub const VERTEX_INDICES_NAMES: &[&str] = &["vertex_indices", "vertex_index"];

/// Vertex positions and triangular faces referring to them by index.
#[derive(Debug, Clone, PartialEq)]
pub struct TriMesh {
    pub positions: Vec<Point3<f32>>,
    pub faces: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Extracts the mesh from `doc`.
    ///
    /// Requires a `vertex` element with numeric value properties `x`, `y` and
    /// `z` (converted to `f32`) and a `face` element with an integer list
    /// property `vertex_indices` (or `vertex_index`). Every face has to be
    /// a triangle and all indices have to refer to existing vertices. A
    /// missing `face` element is treated as a point cloud.
    pub fn from_document(doc: &Document) -> Result<Self, Error> {
        let vertex = doc.element("vertex")?;
        let xs = coordinates(vertex, "x")?;
        let ys = coordinates(vertex, "y")?;
        let zs = coordinates(vertex, "z")?;

        let positions: Vec<_> = xs.into_iter()
            .zip(ys)
            .zip(zs)
            .map(|((x, y), z)| Point3::new(x, y, z))
            .collect();

        let faces = if doc.contains_element("face") {
            faces(doc.element("face")?, positions.len())?
        } else {
            Vec::new()
        };

        Ok(Self { positions, faces })
    }
}

/// Reads the value property `name` of any numeric type as `f32`.
fn coordinates(vertex: &Element, name: &str) -> Result<Vec<f32>, Error> {
    fn convert<T: ToPrimitive + Copy>(values: &[T]) -> Vec<f32> {
        values.iter().map(|v| v.to_f32().unwrap_or(std::f32::NAN)).collect()
    }

    let out = match vertex.property(name)? {
        Property::Int8(col) => convert(col.as_slice()),
        Property::UInt8(col) => convert(col.as_slice()),
        Property::Int16(col) => convert(col.as_slice()),
        Property::UInt16(col) => convert(col.as_slice()),
        Property::Int32(col) => convert(col.as_slice()),
        Property::UInt32(col) => convert(col.as_slice()),
        Property::Float32(col) => col.as_slice().to_vec(),
        Property::Float64(col) => convert(col.as_slice()),
        other => {
            return Err(Error::InvalidMesh(format!(
                "vertex property '{}' has type {} (must be a scalar)",
                name,
                other.ty(),
            )));
        }
    };

    Ok(out)
}

fn faces(face: &Element, num_vertices: usize) -> Result<Vec<[u32; 3]>, Error> {
    let name = VERTEX_INDICES_NAMES.iter()
        .copied()
        .find(|n| face.contains_property(n))
        .ok_or_else(|| {
            Error::InvalidMesh("'face' element without 'vertex_indices' property".into())
        })?;

    fn triangles<'a, T: ToPrimitive + Copy + 'a>(
        rows: impl Iterator<Item = &'a [T]>,
        num_vertices: usize,
    ) -> Result<Vec<[u32; 3]>, Error> {
        let mut out = Vec::new();
        for (i, row) in rows.enumerate() {
            if row.len() != 3 {
                return Err(Error::InvalidMesh(format!(
                    "face {} has {} vertices, only triangles are supported",
                    i,
                    row.len(),
                )));
            }

            let mut tri = [0; 3];
            for (dst, src) in tri.iter_mut().zip(row) {
                *dst = src.to_u32()
                    .filter(|&idx| (idx as usize) < num_vertices)
                    .ok_or_else(|| Error::InvalidMesh(format!(
                        "face {} refers to non-existent vertex {}",
                        i,
                        src.to_i64().unwrap_or(-1),
                    )))?;
            }
            out.push(tri);
        }

        Ok(out)
    }

    match face.property(name)? {
        Property::Int8List(col) => triangles(col.iter(), num_vertices),
        Property::UInt8List(col) => triangles(col.iter(), num_vertices),
        Property::Int16List(col) => triangles(col.iter(), num_vertices),
        Property::UInt16List(col) => triangles(col.iter(), num_vertices),
        Property::Int32List(col) => triangles(col.iter(), num_vertices),
        Property::UInt32List(col) => triangles(col.iter(), num_vertices),
        other => Err(Error::InvalidMesh(format!(
            "'{}' property has type {} (must be a list of integers)",
            name,
            other.ty(),
        ))),
    }
}
