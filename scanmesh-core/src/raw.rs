//! Geometry as read from a multi-texture scan, before wedge expansion

use crate::point::*;
use std::collections::BTreeSet;

/// Parsed but unprocessed scan data.
///
/// Indices are kept signed and wide so that negative or oversized values from
/// the source survive until the expander can reject them per face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeometry {
    /// Vertex positions in the source's coordinate system
    pub positions: Vec<Point3f>,
    /// Geometry index list of each face, any arity
    pub faces: Vec<Vec<i64>>,
    /// Texture coordinate of each wedge record, top-left origin
    pub wedge_uvs: Vec<Point2f>,
    /// Texture image index of each wedge record
    pub wedge_texture_ids: Vec<u8>,
    /// Wedge indices of all faces, flattened in face order
    pub face_wedges: Vec<i64>,
}

impl RawGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of faces with exactly three geometry indices
    pub fn triangle_face_count(&self) -> usize {
        self.faces.iter().filter(|f| f.len() == 3).count()
    }

    /// Distinct texture images referenced by the wedge records
    pub fn texture_ids(&self) -> BTreeSet<u8> {
        self.wedge_texture_ids.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.faces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let raw = RawGeometry {
            positions: vec![Point3f::origin(); 4],
            faces: vec![vec![0, 1, 2], vec![0, 1, 2, 3], vec![0, 2, 3]],
            wedge_uvs: vec![Point2f::origin(); 3],
            wedge_texture_ids: vec![1, 0, 1],
            face_wedges: vec![0, 1, 2],
        };
        assert_eq!(raw.triangle_face_count(), 2);
        assert_eq!(raw.texture_ids().into_iter().collect::<Vec<_>>(), vec![0, 1]);
        assert!(!raw.is_empty());
        assert!(RawGeometry::new().is_empty());
    }
}
