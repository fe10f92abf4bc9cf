//! Mesh validation and cleanup
//!
//! The last stage before a mesh reaches a renderer. Non-finite vertices are
//! removed together with every triangle that touches them, and triangles that
//! are out of range or degenerate are dropped. If nothing drawable survives,
//! validation fails instead of returning an empty mesh.

use crate::error::{Diagnostic, Error, Result, MAX_DIAGNOSTIC_SAMPLES};
use crate::mesh::{FinalMesh, TexturedMesh};
use crate::point::*;

/// What the validator removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub invalid_vertices: usize,
    /// Texture coordinates added because `uvs` was shorter than `positions`
    pub padded_uvs: usize,
    pub out_of_range_triangles: usize,
    pub removed_vertex_triangles: usize,
    pub degenerate_triangles: usize,
    /// The first few removed vertices
    pub samples: Vec<Diagnostic>,
}

impl ValidationReport {
    pub fn dropped_triangles(&self) -> usize {
        self.out_of_range_triangles + self.removed_vertex_triangles + self.degenerate_triangles
    }
}

/// Validate `mesh`, producing a [`FinalMesh`] or [`Error::EmptyResult`].
pub fn validate_mesh(mesh: TexturedMesh) -> Result<(FinalMesh, ValidationReport)> {
    let _span = tracing::debug_span!("validate_mesh").entered();

    let TexturedMesh {
        positions,
        mut uvs,
        triangles,
    } = mesh;
    let mut report = ValidationReport::default();

    if positions.is_empty() {
        tracing::error!("no vertices available to build mesh");
        return Err(Error::EmptyResult("mesh has no vertices".to_string()));
    }

    if uvs.len() < positions.len() {
        report.padded_uvs = positions.len() - uvs.len();
        uvs.resize(positions.len(), Point2f::origin());
    }

    // Old index -> new index; `None` marks a removed vertex
    let mut remap: Vec<Option<usize>> = Vec::with_capacity(positions.len());
    let mut out = TexturedMesh::new();
    for (i, (p, uv)) in positions.iter().zip(&uvs).enumerate() {
        if is_finite_point(p) {
            remap.push(Some(out.add_vertex(*p, *uv)));
        } else {
            report.invalid_vertices += 1;
            if report.samples.len() < MAX_DIAGNOSTIC_SAMPLES {
                report.samples.push(Diagnostic::InvalidVertex { index: i });
            }
            remap.push(None);
        }
    }
    if report.invalid_vertices > 0 {
        tracing::warn!(count = report.invalid_vertices, "removed vertices with non-finite coordinates");
    }

    for tri in &triangles {
        if tri.iter().any(|&i| i >= remap.len()) {
            report.out_of_range_triangles += 1;
            continue;
        }
        let (Some(a), Some(b), Some(c)) = (remap[tri[0]], remap[tri[1]], remap[tri[2]]) else {
            report.removed_vertex_triangles += 1;
            continue;
        };
        if a == b || b == c || a == c {
            report.degenerate_triangles += 1;
            continue;
        }
        out.triangles.push([a, b, c]);
    }

    tracing::debug!(
        vertices = out.vertex_count(),
        triangles = out.triangle_count(),
        dropped = report.dropped_triangles(),
        "validated mesh"
    );

    if out.positions.is_empty() || out.triangles.is_empty() {
        tracing::warn!("cleanup removed all valid geometry");
        return Err(Error::EmptyResult(format!(
            "no valid triangles remain ({} vertices, {} triangles dropped)",
            out.vertex_count(),
            report.dropped_triangles()
        )));
    }

    Ok((FinalMesh::from_validated(out), report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_triangles() -> TexturedMesh {
        TexturedMesh::from_parts(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![
                Point2f::new(0.0, 0.0),
                Point2f::new(1.0, 0.0),
                Point2f::new(1.0, 1.0),
                Point2f::new(0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
    }

    #[test]
    fn test_valid_mesh_is_unchanged() {
        let mesh = two_triangles();
        let (result, report) = validate_mesh(mesh.clone()).unwrap();
        assert_eq!(result.as_mesh(), &mesh);
        assert_eq!(report, ValidationReport::default());
    }

    #[test]
    fn test_nan_vertex_removed_with_its_triangles() {
        let mut mesh = two_triangles();
        mesh.positions[1].y = f32::NAN;

        let (result, report) = validate_mesh(mesh.clone()).unwrap();

        assert_eq!(report.invalid_vertices, 1);
        assert_eq!(report.removed_vertex_triangles, 1);
        assert_eq!(report.samples, vec![Diagnostic::InvalidVertex { index: 1 }]);
        assert_eq!(result.vertex_count(), 3);
        assert_eq!(
            result.positions(),
            &[mesh.positions[0], mesh.positions[2], mesh.positions[3]]
        );
        assert_eq!(result.uvs(), &[mesh.uvs[0], mesh.uvs[2], mesh.uvs[3]]);
        // (0, 2, 3) remapped past the removed vertex
        assert_eq!(result.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_infinite_vertex_removed() {
        let mut mesh = two_triangles();
        mesh.positions[3].z = f32::INFINITY;
        let (result, report) = validate_mesh(mesh).unwrap();
        assert_eq!(report.invalid_vertices, 1);
        assert_eq!(result.triangles(), &[[0, 1, 2]]);
    }

    #[test]
    fn test_empty_vertex_list_is_empty_result() {
        let result = validate_mesh(TexturedMesh::new());
        assert!(matches!(result, Err(Error::EmptyResult(_))));
    }

    #[test]
    fn test_vertices_without_triangles_is_empty_result() {
        let mut mesh = two_triangles();
        mesh.triangles.clear();
        assert!(matches!(validate_mesh(mesh), Err(Error::EmptyResult(_))));
    }

    #[test]
    fn test_all_vertices_invalid_is_empty_result() {
        let mut mesh = two_triangles();
        for p in &mut mesh.positions {
            p.x = f32::NAN;
        }
        assert!(matches!(validate_mesh(mesh), Err(Error::EmptyResult(_))));
    }

    #[test]
    fn test_out_of_range_and_degenerate_triangles_dropped() {
        let mut mesh = two_triangles();
        mesh.triangles.push([0, 1, 7]);
        mesh.triangles.push([2, 2, 3]);

        let (result, report) = validate_mesh(mesh).unwrap();

        assert_eq!(result.triangle_count(), 2);
        assert_eq!(report.out_of_range_triangles, 1);
        assert_eq!(report.degenerate_triangles, 1);
        assert_eq!(report.dropped_triangles(), 2);
    }

    #[test]
    fn test_short_uvs_are_padded_with_zero() {
        let mut mesh = two_triangles();
        mesh.uvs.truncate(2);

        let (result, report) = validate_mesh(mesh).unwrap();

        assert_eq!(report.padded_uvs, 2);
        assert_eq!(result.uvs().len(), 4);
        assert_eq!(result.uvs()[3], Point2f::origin());
    }
}
