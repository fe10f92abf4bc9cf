//! Mesh data structures and functionality

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle mesh with one texture coordinate per vertex.
///
/// The expander produces these with every corner owning its own vertex, so
/// `positions` and `uvs` hold three entries per triangle. Simplification may
/// produce shared vertices; validation turns the result into a [`FinalMesh`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TexturedMesh {
    pub positions: Vec<Point3f>,
    pub uvs: Vec<Point2f>,
    pub triangles: Vec<[usize; 3]>,
}

impl TexturedMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            positions: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Create an empty mesh with room for `triangles` unshared triangles
    pub fn with_triangle_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 3),
            uvs: Vec::with_capacity(triangles * 3),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Create a mesh from its parts
    pub fn from_parts(positions: Vec<Point3f>, uvs: Vec<Point2f>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            positions,
            uvs,
            triangles,
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the mesh has no vertices or no triangles
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() || self.triangles.is_empty()
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3f, uv: Point2f) -> usize {
        let index = self.positions.len();
        self.positions.push(position);
        self.uvs.push(uv);
        index
    }

    /// Append a triangle given as three `(position, uv)` corners, each as a fresh vertex
    pub fn add_unshared_triangle(&mut self, corners: [(Point3f, Point2f); 3]) {
        let [a, b, c] = corners.map(|(p, uv)| self.add_vertex(p, uv));
        self.triangles.push([a, b, c]);
    }

    /// The `(position, uv)` pairs of triangle `t`, in winding order.
    ///
    /// Panics if `t` or any of its indices is out of range.
    pub fn triangle_corners(&self, t: usize) -> [(Point3f, Point2f); 3] {
        self.triangles[t].map(|i| (self.positions[i], self.uvs[i]))
    }

    /// Like [`triangle_corners`](Self::triangle_corners), but `None` when `t`
    /// or one of its positions is missing. A missing uv reads as the origin.
    pub fn get_triangle_corners(&self, t: usize) -> Option<[(Point3f, Point2f); 3]> {
        let tri = self.triangles.get(t)?;
        let corner = |i: usize| {
            let p = *self.positions.get(i)?;
            Some((p, self.uvs.get(i).copied().unwrap_or_else(Point2f::origin)))
        };
        Some([corner(tri[0])?, corner(tri[1])?, corner(tri[2])?])
    }

    /// Flat triangle index list, three entries per triangle
    pub fn flat_indices(&self) -> Vec<usize> {
        self.triangles.iter().flatten().copied().collect()
    }
}

impl Default for TexturedMesh {
    fn default() -> Self {
        Self::new()
    }
}

/// Width of the index buffer a renderer needs for a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexFormat {
    U16,
    U32,
}

impl IndexFormat {
    /// Largest vertex count addressable with 16-bit indices
    pub const U16_MAX_VERTICES: usize = u16::MAX as usize;

    pub fn for_vertex_count(count: usize) -> Self {
        if count > Self::U16_MAX_VERTICES {
            IndexFormat::U32
        } else {
            IndexFormat::U16
        }
    }
}

/// A validated, renderable mesh.
///
/// Only the validator builds these. Every coordinate is finite, every triangle
/// references three distinct in-range vertices, and there is at least one
/// vertex and one triangle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalMesh {
    mesh: TexturedMesh,
}

impl FinalMesh {
    pub(crate) fn from_validated(mesh: TexturedMesh) -> Self {
        debug_assert!(!mesh.is_empty());
        debug_assert_eq!(mesh.positions.len(), mesh.uvs.len());
        Self { mesh }
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.mesh.positions
    }

    pub fn uvs(&self) -> &[Point2f] {
        &self.mesh.uvs
    }

    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.mesh.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// The index width needed to draw this mesh
    pub fn index_format(&self) -> IndexFormat {
        IndexFormat::for_vertex_count(self.vertex_count())
    }

    /// Flat 32-bit index buffer, three entries per triangle
    pub fn flat_indices_u32(&self) -> Vec<u32> {
        self.mesh
            .triangles
            .iter()
            .flatten()
            .map(|&i| i as u32)
            .collect()
    }

    /// Flat 16-bit index buffer, or `None` if the mesh needs 32-bit indices
    pub fn flat_indices_u16(&self) -> Option<Vec<u16>> {
        match self.index_format() {
            IndexFormat::U16 => Some(
                self.mesh
                    .triangles
                    .iter()
                    .flatten()
                    .map(|&i| i as u16)
                    .collect(),
            ),
            IndexFormat::U32 => None,
        }
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> (Point3f, Point3f) {
        let first = self.mesh.positions[0];
        let mut min = first;
        let mut max = first;
        for p in &self.mesh.positions[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        (min, max)
    }

    /// Area-weighted vertex normals.
    ///
    /// Vertices touched only by zero-area triangles (or by none) get `+Z`.
    pub fn vertex_normals(&self) -> Vec<Vector3f> {
        let positions = &self.mesh.positions;
        let mut normals = vec![Vector3f::zeros(); positions.len()];
        for face in &self.mesh.triangles {
            let v0 = positions[face[0]];
            let edge1 = positions[face[1]] - v0;
            let edge2 = positions[face[2]] - v0;
            let n = edge1.cross(&edge2);
            for &vi in face {
                normals[vi] += n;
            }
        }
        for n in &mut normals {
            let len = n.magnitude();
            *n = if len > 1e-12 {
                *n / len
            } else {
                Vector3f::new(0.0, 0.0, 1.0)
            };
        }
        normals
    }

    /// Interleaved vertex buffer ready for GPU upload
    pub fn interleaved(&self) -> Vec<TexturedVertex> {
        self.mesh
            .positions
            .iter()
            .zip(&self.mesh.uvs)
            .map(|(p, uv)| TexturedVertex::new(p, uv))
            .collect()
    }

    /// Borrow the underlying mesh
    pub fn as_mesh(&self) -> &TexturedMesh {
        &self.mesh
    }

    /// Give up the validity guarantee and take the underlying mesh
    pub fn into_mesh(self) -> TexturedMesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> TexturedMesh {
        let mut mesh = TexturedMesh::new();
        mesh.add_unshared_triangle([
            (Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.0, 0.0)),
            (Point3f::new(1.0, 0.0, 0.0), Point2f::new(1.0, 0.0)),
            (Point3f::new(0.0, 1.0, 0.0), Point2f::new(0.0, 1.0)),
        ]);
        mesh
    }

    #[test]
    fn test_add_unshared_triangle_allocates_fresh_vertices() {
        let mut mesh = unit_triangle();
        let corners = mesh.triangle_corners(0);
        mesh.add_unshared_triangle(corners);

        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [3, 4, 5]]);
        assert_eq!(mesh.triangle_corners(0), mesh.triangle_corners(1));
        assert_eq!(mesh.flat_indices(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_get_triangle_corners_checks_indices() {
        let mut mesh = unit_triangle();
        assert_eq!(mesh.get_triangle_corners(0), Some(mesh.triangle_corners(0)));
        assert_eq!(mesh.get_triangle_corners(1), None);

        mesh.uvs.truncate(2);
        let corners = mesh.get_triangle_corners(0).unwrap();
        assert_eq!(corners[2].1, Point2f::origin());

        mesh.triangles.push([0, 1, 9]);
        assert_eq!(mesh.get_triangle_corners(1), None);
    }

    #[test]
    fn test_index_format_threshold() {
        assert_eq!(IndexFormat::for_vertex_count(3), IndexFormat::U16);
        assert_eq!(IndexFormat::for_vertex_count(65_535), IndexFormat::U16);
        assert_eq!(IndexFormat::for_vertex_count(65_536), IndexFormat::U32);
    }

    #[test]
    fn test_final_mesh_buffers() {
        let mesh = FinalMesh::from_validated(unit_triangle());

        assert_eq!(mesh.index_format(), IndexFormat::U16);
        assert_eq!(mesh.flat_indices_u32(), vec![0, 1, 2]);
        assert_eq!(mesh.flat_indices_u16(), Some(vec![0, 1, 2]));

        let (min, max) = mesh.bounds();
        assert_eq!(min, Point3f::new(0.0, 0.0, 0.0));
        assert_eq!(max, Point3f::new(1.0, 1.0, 0.0));

        let interleaved = mesh.interleaved();
        assert_eq!(interleaved.len(), 3);
        assert_eq!(interleaved[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(interleaved[2].uv, [0.0, 1.0]);
    }

    #[test]
    fn test_vertex_normals() {
        let mesh = FinalMesh::from_validated(unit_triangle());
        for n in mesh.vertex_normals() {
            assert_relative_eq!(n.z, 1.0, epsilon = 1e-6);
            assert_relative_eq!(n.magnitude(), 1.0, epsilon = 1e-6);
        }
    }
}
