//! Uniform stride sampling
//!
//! Keeps every `step`-th triangle, in source order, until the target count is
//! reached. Cheap and deterministic, but blind to geometry: large scans keep
//! their overall silhouette while small features can disappear.

use crate::MeshSimplifier;
use scanmesh_core::TexturedMesh;

/// Keeps every Nth triangle until a triangle budget is met
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformSampler;

impl UniformSampler {
    pub fn new() -> Self {
        Self
    }

    /// Stride between kept triangles
    pub fn step(total_triangles: usize, target_triangles: usize) -> usize {
        if target_triangles == 0 {
            return 1;
        }
        (total_triangles / target_triangles).max(1)
    }

    /// Sample `mesh` down to `target_triangles`.
    ///
    /// A target of zero, or one at least as large as the mesh, returns a copy.
    /// Every kept triangle gets three fresh vertices with the source corner
    /// values in source winding order. Triangles on the stride that reference
    /// a missing vertex are skipped and do not count towards the target.
    pub fn sample(&self, mesh: &TexturedMesh, target_triangles: usize) -> TexturedMesh {
        let total = mesh.triangle_count();
        if target_triangles == 0 || target_triangles >= total {
            return mesh.clone();
        }

        let step = Self::step(total, target_triangles);
        let mut out = TexturedMesh::with_triangle_capacity(target_triangles);
        let mut invalid = 0usize;
        for t in (0..total).step_by(step) {
            let Some(corners) = mesh.get_triangle_corners(t) else {
                invalid += 1;
                continue;
            };
            out.add_unshared_triangle(corners);
            if out.triangle_count() >= target_triangles {
                break;
            }
        }

        if invalid > 0 {
            tracing::warn!(count = invalid, "skipped triangles referencing missing vertices");
        }
        tracing::debug!(
            step,
            kept = out.triangle_count(),
            total,
            "uniform sampling"
        );
        out
    }
}

impl MeshSimplifier for UniformSampler {
    fn simplify(&self, mesh: &TexturedMesh, target_triangles: usize) -> TexturedMesh {
        self.sample(mesh, target_triangles)
    }
}
