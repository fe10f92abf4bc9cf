//! I/O operations for scanner exports and generated meshes
//!
//! This crate reads multi-texture PLY files produced by 3D scanners into
//! [`RawGeometry`] and writes validated meshes back out as PLY.

pub mod ply;

pub use ply::{MultiTexturePlyReader, MultiTexturePlyWriter, PlySchema, TexturedPlyWriter};
pub use ply_rs::ply::Encoding;

use scanmesh_core::{FinalMesh, RawGeometry, Result};

/// Trait for reading scanner exports from files
pub trait ScanReader {
    fn read_scan<P: AsRef<std::path::Path>>(&self, path: P) -> Result<RawGeometry>;
}

/// Trait for writing validated meshes to files
pub trait MeshWriter {
    fn write_mesh<P: AsRef<std::path::Path>>(&self, mesh: &FinalMesh, path: P) -> Result<()>;
}

/// Auto-detect format and read a scan with the default schema
pub fn read_scan<P: AsRef<std::path::Path>>(path: P) -> Result<RawGeometry> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ply") => MultiTexturePlyReader::new().read_scan(path),
        _ => Err(scanmesh_core::Error::UnsupportedFormat(format!(
            "Unsupported scan format: {:?}",
            path.extension()
        ))),
    }
}

/// Auto-detect format and write a mesh
pub fn write_mesh<P: AsRef<std::path::Path>>(mesh: &FinalMesh, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("ply") => TexturedPlyWriter::default().write_mesh(mesh, path),
        _ => Err(scanmesh_core::Error::UnsupportedFormat(format!(
            "Unsupported mesh format: {:?}",
            path.extension()
        ))),
    }
}
