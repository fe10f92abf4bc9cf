//! PLY format support for multi-texture scanner exports
//!
//! Scanner exports (Artec Studio and similar) store positions and texture
//! coordinates as separate elements:
//!
//! ```text
//! element vertex N                 property float x, y, z
//! element face F                   property list uchar int vertex_indices
//! element multi_texture_vertex W   property uchar tx; property float u, v
//! element multi_texture_face F     property uchar tx; property uint tn;
//!                                  property list uchar int texture_vertex_indices
//! ```

use crate::{MeshWriter, ScanReader};
use ply_rs::{
    parser::Parser,
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use scanmesh_core::{Error, FinalMesh, Point2f, Point3f, RawGeometry, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Element and property names the reader pulls out of a PLY file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlySchema {
    pub vertex_element: String,
    pub position_properties: [String; 3],
    pub face_element: String,
    pub face_indices_property: String,
    pub wedge_vertex_element: String,
    pub uv_properties: [String; 2],
    /// Optional; wedges without it get no texture id
    pub texture_id_property: String,
    pub wedge_face_element: String,
    pub wedge_indices_property: String,
}

impl Default for PlySchema {
    fn default() -> Self {
        Self {
            vertex_element: "vertex".to_string(),
            position_properties: ["x".to_string(), "y".to_string(), "z".to_string()],
            face_element: "face".to_string(),
            face_indices_property: "vertex_indices".to_string(),
            wedge_vertex_element: "multi_texture_vertex".to_string(),
            uv_properties: ["u".to_string(), "v".to_string()],
            texture_id_property: "tx".to_string(),
            wedge_face_element: "multi_texture_face".to_string(),
            wedge_indices_property: "texture_vertex_indices".to_string(),
        }
    }
}

/// Reads multi-texture PLY files into [`RawGeometry`]
#[derive(Debug, Clone, Default)]
pub struct MultiTexturePlyReader {
    pub schema: PlySchema,
}

impl MultiTexturePlyReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(schema: PlySchema) -> Self {
        Self { schema }
    }

    /// Parse a PLY stream (ASCII or binary) and extract the schema's elements
    pub fn read_from<R: Read>(&self, reader: &mut R) -> Result<RawGeometry> {
        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(reader)
            .map_err(|e| Error::MalformedSource(format!("failed to parse PLY stream: {}", e)))?;
        self.extract(&ply)
    }

    /// Build [`RawGeometry`] from an already parsed PLY document
    pub fn extract(&self, ply: &Ply<DefaultElement>) -> Result<RawGeometry> {
        let schema = &self.schema;
        let vertices = required_element(ply, &schema.vertex_element)?;
        let faces = required_element(ply, &schema.face_element)?;
        let wedge_vertices = required_element(ply, &schema.wedge_vertex_element)?;
        let wedge_faces = required_element(ply, &schema.wedge_face_element)?;

        let mut raw = RawGeometry::new();

        raw.positions.reserve(vertices.len());
        for vertex in vertices {
            let [x, y, z] = &schema.position_properties;
            raw.positions.push(Point3f::new(
                scalar_f32(vertex, &schema.vertex_element, x)?,
                scalar_f32(vertex, &schema.vertex_element, y)?,
                scalar_f32(vertex, &schema.vertex_element, z)?,
            ));
        }

        raw.faces.reserve(faces.len());
        for face in faces {
            raw.faces.push(index_list(
                face,
                &schema.face_element,
                &schema.face_indices_property,
            )?);
        }

        raw.wedge_uvs.reserve(wedge_vertices.len());
        for wedge in wedge_vertices {
            let [u, v] = &schema.uv_properties;
            raw.wedge_uvs.push(Point2f::new(
                scalar_f32(wedge, &schema.wedge_vertex_element, u)?,
                scalar_f32(wedge, &schema.wedge_vertex_element, v)?,
            ));
            if let Some(tx) = wedge.get(&schema.texture_id_property).and_then(property_u8) {
                raw.wedge_texture_ids.push(tx);
            }
        }

        raw.face_wedges.reserve(wedge_faces.len() * 3);
        for wedge_face in wedge_faces {
            raw.face_wedges.extend(index_list(
                wedge_face,
                &schema.wedge_face_element,
                &schema.wedge_indices_property,
            )?);
        }

        tracing::debug!(
            vertices = raw.positions.len(),
            faces = raw.faces.len(),
            wedges = raw.wedge_uvs.len(),
            wedge_indices = raw.face_wedges.len(),
            "read multi-texture PLY"
        );

        Ok(raw)
    }
}

impl ScanReader for MultiTexturePlyReader {
    fn read_scan<P: AsRef<Path>>(&self, path: P) -> Result<RawGeometry> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::source_unavailable(path, e))?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser
            .read_ply(&mut reader)
            .map_err(|e| Error::source_unavailable(path, e))?;
        self.extract(&ply)
    }
}

/// Writes [`RawGeometry`] back out in the multi-texture layout.
///
/// Wedge indices are split across faces by face arity. Surplus wedge indices
/// are dropped; if the list runs short, later faces get short or empty lists.
/// Output is ASCII; see [`check_list_encoding`] for why binary is refused.
#[derive(Debug, Clone)]
pub struct MultiTexturePlyWriter {
    pub schema: PlySchema,
    pub encoding: Encoding,
}

impl Default for MultiTexturePlyWriter {
    fn default() -> Self {
        Self {
            schema: PlySchema::default(),
            encoding: Encoding::Ascii,
        }
    }
}

impl MultiTexturePlyWriter {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    pub fn write_to<W: Write>(&self, raw: &RawGeometry, out: &mut W) -> Result<()> {
        check_list_encoding(self.encoding)?;
        let schema = &self.schema;
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = self.encoding;

        let mut vertex_element = ElementDef::new(schema.vertex_element.clone());
        vertex_element.count = raw.positions.len();
        for name in &schema.position_properties {
            vertex_element.properties.add(float_property(name));
        }
        ply.header.elements.add(vertex_element);

        let mut face_element = ElementDef::new(schema.face_element.clone());
        face_element.count = raw.faces.len();
        face_element
            .properties
            .add(index_list_property(&schema.face_indices_property));
        ply.header.elements.add(face_element);

        let mut wedge_vertex_element = ElementDef::new(schema.wedge_vertex_element.clone());
        wedge_vertex_element.count = raw.wedge_uvs.len();
        wedge_vertex_element.properties.add(PropertyDef::new(
            schema.texture_id_property.clone(),
            PropertyType::Scalar(ScalarType::UChar),
        ));
        for name in &schema.uv_properties {
            wedge_vertex_element.properties.add(float_property(name));
        }
        ply.header.elements.add(wedge_vertex_element);

        let mut wedge_face_element = ElementDef::new(schema.wedge_face_element.clone());
        wedge_face_element.count = raw.faces.len();
        wedge_face_element.properties.add(PropertyDef::new(
            schema.texture_id_property.clone(),
            PropertyType::Scalar(ScalarType::UChar),
        ));
        wedge_face_element.properties.add(PropertyDef::new(
            "tn".to_string(),
            PropertyType::Scalar(ScalarType::UInt),
        ));
        wedge_face_element
            .properties
            .add(index_list_property(&schema.wedge_indices_property));
        ply.header.elements.add(wedge_face_element);

        let [x, y, z] = &schema.position_properties;
        let vertices = raw
            .positions
            .iter()
            .map(|p| {
                let mut element = DefaultElement::new();
                element.insert(x.clone(), Property::Float(p.x));
                element.insert(y.clone(), Property::Float(p.y));
                element.insert(z.clone(), Property::Float(p.z));
                element
            })
            .collect();
        ply.payload.insert(schema.vertex_element.clone(), vertices);

        let mut faces = Vec::with_capacity(raw.faces.len());
        for face in &raw.faces {
            let mut element = DefaultElement::new();
            element.insert(
                schema.face_indices_property.clone(),
                Property::ListInt(to_ply_indices(face)?),
            );
            faces.push(element);
        }
        ply.payload.insert(schema.face_element.clone(), faces);

        let [u, v] = &schema.uv_properties;
        let wedges = raw
            .wedge_uvs
            .iter()
            .enumerate()
            .map(|(i, uv)| {
                let tx = raw.wedge_texture_ids.get(i).copied().unwrap_or(0);
                let mut element = DefaultElement::new();
                element.insert(schema.texture_id_property.clone(), Property::UChar(tx));
                element.insert(u.clone(), Property::Float(uv.x));
                element.insert(v.clone(), Property::Float(uv.y));
                element
            })
            .collect();
        ply.payload.insert(schema.wedge_vertex_element.clone(), wedges);

        let mut wedge_faces = Vec::with_capacity(raw.faces.len());
        let mut offset = 0usize;
        for face in &raw.faces {
            let end = (offset + face.len()).min(raw.face_wedges.len());
            let indices = &raw.face_wedges[offset.min(end)..end];
            offset = end;

            let tx = indices
                .first()
                .and_then(|&w| usize::try_from(w).ok())
                .and_then(|w| raw.wedge_texture_ids.get(w))
                .copied()
                .unwrap_or(0);
            let mut element = DefaultElement::new();
            element.insert(schema.texture_id_property.clone(), Property::UChar(tx));
            element.insert("tn".to_string(), Property::UInt(0));
            element.insert(
                schema.wedge_indices_property.clone(),
                Property::ListInt(to_ply_indices(indices)?),
            );
            wedge_faces.push(element);
        }
        ply.payload.insert(schema.wedge_face_element.clone(), wedge_faces);

        let writer = Writer::new();
        writer.write_ply(out, &mut ply)?;
        Ok(())
    }

    pub fn write_path<P: AsRef<Path>>(&self, raw: &RawGeometry, path: P) -> Result<()> {
        check_list_encoding(self.encoding)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(raw, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Writes a [`FinalMesh`] as a PLY with per-vertex `u`, `v`
#[derive(Debug, Clone)]
pub struct TexturedPlyWriter {
    pub encoding: Encoding,
}

impl Default for TexturedPlyWriter {
    fn default() -> Self {
        Self {
            encoding: Encoding::Ascii,
        }
    }
}

impl TexturedPlyWriter {
    pub fn new(encoding: Encoding) -> Self {
        Self { encoding }
    }

    pub fn write_to<W: Write>(&self, mesh: &FinalMesh, out: &mut W) -> Result<()> {
        check_list_encoding(self.encoding)?;
        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = self.encoding;
        ply.header
            .comments
            .push("scanmesh: left-handed, bottom-left uv origin".to_string());

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = mesh.vertex_count();
        for name in ["x", "y", "z", "u", "v"] {
            vertex_element.properties.add(float_property(name));
        }
        ply.header.elements.add(vertex_element);

        let mut face_element = ElementDef::new("face".to_string());
        face_element.count = mesh.triangle_count();
        face_element
            .properties
            .add(index_list_property("vertex_indices"));
        ply.header.elements.add(face_element);

        let vertices = mesh
            .positions()
            .iter()
            .zip(mesh.uvs())
            .map(|(p, uv)| {
                let mut element = DefaultElement::new();
                element.insert("x".to_string(), Property::Float(p.x));
                element.insert("y".to_string(), Property::Float(p.y));
                element.insert("z".to_string(), Property::Float(p.z));
                element.insert("u".to_string(), Property::Float(uv.x));
                element.insert("v".to_string(), Property::Float(uv.y));
                element
            })
            .collect();
        ply.payload.insert("vertex".to_string(), vertices);

        let mut faces = Vec::with_capacity(mesh.triangle_count());
        for tri in mesh.triangles() {
            let indices = tri
                .iter()
                .map(|&i| {
                    i32::try_from(i).map_err(|_| {
                        Error::UnsupportedFormat(format!("vertex index {} exceeds PLY int range", i))
                    })
                })
                .collect::<Result<Vec<i32>>>()?;
            let mut element = DefaultElement::new();
            element.insert("vertex_indices".to_string(), Property::ListInt(indices));
            faces.push(element);
        }
        ply.payload.insert("face".to_string(), faces);

        let writer = Writer::new();
        writer.write_ply(out, &mut ply)?;
        Ok(())
    }
}

impl MeshWriter for TexturedPlyWriter {
    fn write_mesh<P: AsRef<Path>>(&self, mesh: &FinalMesh, path: P) -> Result<()> {
        check_list_encoding(self.encoding)?;
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(mesh, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Both writers emit list properties, and ply-rs 0.1 writes the element
/// count instead of the list length in front of binary lists. Only ASCII
/// output reads back correctly.
fn check_list_encoding(encoding: Encoding) -> Result<()> {
    match encoding {
        Encoding::Ascii => Ok(()),
        other => Err(Error::UnsupportedFormat(format!(
            "{:?} PLY output with list properties is not supported; use ASCII",
            other
        ))),
    }
}

fn required_element<'a>(ply: &'a Ply<DefaultElement>, name: &str) -> Result<&'a Vec<DefaultElement>> {
    ply.payload
        .get(name)
        .ok_or_else(|| Error::MalformedSource(format!("PLY has no '{}' element", name)))
}

fn float_property(name: &str) -> PropertyDef {
    PropertyDef::new(name.to_string(), PropertyType::Scalar(ScalarType::Float))
}

fn index_list_property(name: &str) -> PropertyDef {
    PropertyDef::new(
        name.to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::Int),
    )
}

fn to_ply_indices(indices: &[i64]) -> Result<Vec<i32>> {
    indices
        .iter()
        .map(|&i| {
            i32::try_from(i).map_err(|_| {
                Error::UnsupportedFormat(format!("index {} exceeds PLY int range", i))
            })
        })
        .collect()
}

/// Extract a scalar property as f32
fn scalar_f32(element: &DefaultElement, element_name: &str, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        Some(Property::Char(val)) => Ok(*val as f32),
        Some(Property::UChar(val)) => Ok(*val as f32),
        _ => Err(Error::MalformedSource(format!(
            "property '{}.{}' not found or not a scalar",
            element_name, name
        ))),
    }
}

fn property_u8(property: &Property) -> Option<u8> {
    match property {
        Property::UChar(val) => Some(*val),
        Property::Char(val) => u8::try_from(*val).ok(),
        Property::UShort(val) => u8::try_from(*val).ok(),
        Property::Short(val) => u8::try_from(*val).ok(),
        Property::UInt(val) => u8::try_from(*val).ok(),
        Property::Int(val) => u8::try_from(*val).ok(),
        _ => None,
    }
}

/// Extract an integer list property, widened so that no source value is lost
fn index_list(element: &DefaultElement, element_name: &str, name: &str) -> Result<Vec<i64>> {
    match element.get(name) {
        Some(Property::ListInt(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        Some(Property::ListUInt(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        Some(Property::ListShort(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        Some(Property::ListUShort(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        Some(Property::ListChar(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        Some(Property::ListUChar(indices)) => Ok(indices.iter().map(|&i| i as i64).collect()),
        _ => Err(Error::MalformedSource(format!(
            "property '{}.{}' not found or not an integer list",
            element_name, name
        ))),
    }
}
