//! Triangle budget reduction
//!
//! This crate provides the two reduction strategies applied to expanded scan
//! meshes before validation:
//! - Uniform stride sampling
//! - Voxel-grid vertex clustering
//!
//! Both strategies take an absolute triangle budget and never return more
//! triangles than it allows. A budget of zero, or one at least as large as
//! the mesh, returns the mesh unchanged.

pub mod clustering;
pub mod uniform;

pub use clustering::*;
pub use uniform::*;

use scanmesh_core::TexturedMesh;

/// Reduce a mesh to a triangle budget
pub trait MeshSimplifier {
    fn simplify(&self, mesh: &TexturedMesh, target_triangles: usize) -> TexturedMesh;
}

/// Which reduction to run, with its triangle budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Simplification {
    None,
    Uniform(usize),
    Voxel(usize),
}

/// Result of [`simplify`]
#[derive(Debug, Clone, PartialEq)]
pub struct Simplified {
    pub mesh: TexturedMesh,
    /// Present when voxel clustering actually ran
    pub cluster_stats: Option<ClusterStats>,
}

/// Apply `variant` to `mesh`
pub fn simplify(mesh: &TexturedMesh, variant: Simplification) -> Simplified {
    match variant {
        Simplification::None => Simplified {
            mesh: mesh.clone(),
            cluster_stats: None,
        },
        Simplification::Uniform(target) => Simplified {
            mesh: UniformSampler::new().sample(mesh, target),
            cluster_stats: None,
        },
        Simplification::Voxel(target) => {
            let (mesh, cluster_stats) = VoxelClusterer::new().cluster(mesh, target);
            Simplified { mesh, cluster_stats }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanmesh_core::{Point2f, Point3f};

    fn fan(n: usize) -> TexturedMesh {
        let mut mesh = TexturedMesh::new();
        for i in 0..n {
            let a = i as f32 * 0.1;
            mesh.add_unshared_triangle([
                (Point3f::new(0.0, 0.0, 0.0), Point2f::new(0.5, 0.5)),
                (Point3f::new(a.cos(), a.sin(), 0.0), Point2f::new(a.cos(), 0.0)),
                (Point3f::new((a + 0.1).cos(), (a + 0.1).sin(), 0.0), Point2f::new(0.0, a.sin())),
            ]);
        }
        mesh
    }

    #[test]
    fn test_none_is_copy() {
        let mesh = fan(12);
        let result = simplify(&mesh, Simplification::None);
        assert_eq!(result.mesh, mesh);
        assert!(result.cluster_stats.is_none());
    }

    #[test]
    fn test_variants_respect_budget() {
        let mesh = fan(40);
        for variant in [Simplification::Uniform(10), Simplification::Voxel(10)] {
            let result = simplify(&mesh, variant);
            assert!(result.mesh.triangle_count() <= 10, "{:?}", variant);
        }
    }

    #[test]
    fn test_uniform_matches_sampler() {
        let mesh = fan(20);
        let result = simplify(&mesh, Simplification::Uniform(5));
        assert_eq!(result.mesh, UniformSampler::new().simplify(&mesh, 5));
    }

    #[test]
    fn test_voxel_reports_stats() {
        let mesh = fan(40);
        let result = simplify(&mesh, Simplification::Voxel(10));
        let stats = result.cluster_stats.unwrap();
        assert_eq!(stats.populated_cells, result.mesh.vertex_count());

        let unchanged = simplify(&mesh, Simplification::Voxel(40));
        assert!(unchanged.cluster_stats.is_none());
        assert_eq!(unchanged.mesh, mesh);
    }

    #[test]
    fn test_trait_objects() {
        let mesh = fan(16);
        let simplifiers: Vec<Box<dyn MeshSimplifier>> =
            vec![Box::new(UniformSampler::new()), Box::new(VoxelClusterer::new())];
        for s in &simplifiers {
            assert!(s.simplify(&mesh, 4).triangle_count() <= 4);
        }
    }
}
