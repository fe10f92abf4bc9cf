//! Voxel-grid clustering simplification
//!
//! Implements uniform-grid vertex clustering (Rossignac & Borrel 1993) sized
//! from a triangle budget. Vertices falling in the same grid cell are merged
//! into one vertex at the cell's average position and texture coordinate;
//! triangles whose corners collapse onto fewer than three cells are dropped.

use crate::uniform::UniformSampler;
use crate::MeshSimplifier;
use nalgebra::{Vector2, Vector3};
use scanmesh_core::{Point2f, Point3f, TexturedMesh};
use std::collections::HashMap;

// ============================================================
// Bounding Box
// ============================================================

#[derive(Debug, Clone, Copy)]
struct BBox {
    min: [f64; 3],
    max: [f64; 3],
}

impl BBox {
    fn from_vertices(vertices: &[Point3f]) -> Self {
        let mut min = [f64::MAX; 3];
        let mut max = [f64::MIN; 3];
        for v in vertices {
            for i in 0..3 {
                let c = v[i] as f64;
                if c < min[i] {
                    min[i] = c;
                }
                if c > max[i] {
                    max[i] = c;
                }
            }
        }
        BBox { min, max }
    }

    fn size(&self) -> [f64; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    fn max_extent(&self) -> f64 {
        let s = self.size();
        s[0].max(s[1]).max(s[2])
    }
}

// ============================================================
// Grid
// ============================================================

/// Integer coordinate of a grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellKey {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// A uniform grid laid over a mesh's bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelGrid {
    pub origin: [f64; 3],
    pub cells: [usize; 3],
    pub cell_size: [f64; 3],
}

impl VoxelGrid {
    /// Grid whose cell count roughly matches `target_vertices`, with cells as
    /// close to cubic as the bounding box allows. Flat axes get a single cell.
    fn for_target(bbox: &BBox, target_vertices: usize) -> Self {
        let base = ((target_vertices as f64).cbrt().round_ties_even() as usize).max(1);
        let size = bbox.size();
        let max_extent = bbox.max_extent();
        let denom = if max_extent > 0.0 { max_extent } else { 1.0 };

        let mut cells = [1usize; 3];
        let mut cell_size = [1.0f64; 3];
        for i in 0..3 {
            cells[i] = ((base as f64 * (size[i] / denom)).round_ties_even() as usize).max(1);
            if size[i] > 0.0 {
                cell_size[i] = size[i] / cells[i] as f64;
            }
        }

        VoxelGrid {
            origin: bbox.min,
            cells,
            cell_size,
        }
    }

    /// Cell containing `p`; points on or beyond the far faces go to the last cell
    pub fn cell_of(&self, p: &Point3f) -> CellKey {
        let axis = |i: usize| {
            let f = ((p[i] as f64 - self.origin[i]) / self.cell_size[i]).floor();
            (f as i64).clamp(0, self.cells[i] as i64 - 1) as usize
        };
        CellKey {
            x: axis(0),
            y: axis(1),
            z: axis(2),
        }
    }
}

/// Accumulated members of one populated cell
#[derive(Debug, Clone)]
struct VoxelGroup {
    sum_position: Vector3<f64>,
    sum_uv: Vector2<f64>,
    count: usize,
}

impl VoxelGroup {
    fn new() -> Self {
        Self {
            sum_position: Vector3::zeros(),
            sum_uv: Vector2::zeros(),
            count: 0,
        }
    }

    fn add(&mut self, p: &Point3f, uv: &Point2f) {
        self.sum_position += Vector3::new(p.x as f64, p.y as f64, p.z as f64);
        self.sum_uv += Vector2::new(uv.x as f64, uv.y as f64);
        self.count += 1;
    }

    fn average(&self) -> (Point3f, Point2f) {
        let n = self.count as f64;
        let p = self.sum_position / n;
        let uv = self.sum_uv / n;
        (
            Point3f::new(p.x as f32, p.y as f32, p.z as f32),
            Point2f::new(uv.x as f32, uv.y as f32),
        )
    }
}

// ============================================================
// Clusterer
// ============================================================

/// Figures from one clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterStats {
    pub target_vertices: usize,
    pub grid: VoxelGrid,
    pub populated_cells: usize,
    pub degenerate_triangles: usize,
    /// Triangles referencing missing vertices
    pub invalid_triangles: usize,
    /// Source triangles never looked at because the budget filled up
    pub unvisited_triangles: usize,
    /// Whether the result had to be sampled down afterwards
    pub resampled: bool,
}

/// Voxel-grid clustering simplifier.
///
/// Output vertices are shared between triangles. Cell iteration follows
/// first appearance in the vertex buffer, so identical input always yields
/// identical output.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoxelClusterer;

impl VoxelClusterer {
    pub fn new() -> Self {
        Self
    }

    /// Merged vertex count to aim for, proportional to the kept triangle share
    pub fn target_vertices(vertex_count: usize, triangle_count: usize, target_triangles: usize) -> usize {
        if vertex_count == 0 || triangle_count == 0 {
            return 1;
        }
        let estimate = (vertex_count as f64 / triangle_count as f64 * target_triangles as f64)
            .round_ties_even() as usize;
        estimate.clamp(1, vertex_count)
    }

    /// Cluster `mesh` down to at most `target_triangles`.
    ///
    /// Returns a copy and no stats when there is nothing to reduce. When every
    /// vertex collapses into one cell the result has no triangles; that is
    /// left for validation to reject.
    ///
    /// Input is expected to be finite. An infinite coordinate stretches the
    /// grid over an infinite extent, so every vertex lands in one cell and
    /// the whole mesh collapses. A NaN vertex is assigned to the first cell
    /// along each NaN axis and turns that cell's average into NaN.
    pub fn cluster(&self, mesh: &TexturedMesh, target_triangles: usize) -> (TexturedMesh, Option<ClusterStats>) {
        let total = mesh.triangle_count();
        if target_triangles == 0 || target_triangles >= total || mesh.positions.is_empty() {
            return (mesh.clone(), None);
        }
        let _span = tracing::debug_span!("voxel_cluster").entered();

        let bbox = BBox::from_vertices(&mesh.positions);
        let target_vertices = Self::target_vertices(mesh.vertex_count(), total, target_triangles);
        let grid = VoxelGrid::for_target(&bbox, target_vertices);
        tracing::debug!(
            target_vertices,
            cells = ?grid.cells,
            cell_size = ?grid.cell_size,
            "voxel grid"
        );

        // Group index doubles as the merged vertex index: groups are created
        // in first-encountered order and emitted in that order.
        let mut group_of_key: HashMap<CellKey, usize> = HashMap::new();
        let mut groups: Vec<VoxelGroup> = Vec::new();
        let mut vertex_group: Vec<usize> = Vec::with_capacity(mesh.vertex_count());
        for (i, p) in mesh.positions.iter().enumerate() {
            let uv = mesh.uvs.get(i).copied().unwrap_or_else(Point2f::origin);
            let key = grid.cell_of(p);
            let g = *group_of_key.entry(key).or_insert_with(|| {
                groups.push(VoxelGroup::new());
                groups.len() - 1
            });
            groups[g].add(p, &uv);
            vertex_group.push(g);
        }

        let mut out = TexturedMesh::new();
        for group in &groups {
            let (p, uv) = group.average();
            out.add_vertex(p, uv);
        }

        let mut stats = ClusterStats {
            target_vertices,
            grid,
            populated_cells: groups.len(),
            degenerate_triangles: 0,
            invalid_triangles: 0,
            unvisited_triangles: 0,
            resampled: false,
        };

        for (t, tri) in mesh.triangles.iter().enumerate() {
            let mapped = (
                vertex_group.get(tri[0]),
                vertex_group.get(tri[1]),
                vertex_group.get(tri[2]),
            );
            let (Some(&a), Some(&b), Some(&c)) = mapped else {
                stats.invalid_triangles += 1;
                continue;
            };
            if a == b || b == c || a == c {
                stats.degenerate_triangles += 1;
                continue;
            }
            out.triangles.push([a, b, c]);
            if out.triangle_count() >= target_triangles {
                stats.unvisited_triangles = total - t - 1;
                break;
            }
        }

        if out.triangle_count() > target_triangles {
            out = UniformSampler::new().sample(&out, target_triangles);
            stats.resampled = true;
        }

        tracing::debug!(
            cells = stats.populated_cells,
            triangles = out.triangle_count(),
            degenerate = stats.degenerate_triangles,
            "voxel clustering"
        );
        (out, Some(stats))
    }
}

impl MeshSimplifier for VoxelClusterer {
    fn simplify(&self, mesh: &TexturedMesh, target_triangles: usize) -> TexturedMesh {
        self.cluster(mesh, target_triangles).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// `size` x `size` vertex grid on z = 0 with unshared corners, uv = xy / (size - 1)
    fn make_plane_grid(size: usize) -> TexturedMesh {
        let corner = |x: usize, y: usize| {
            let s = (size - 1) as f32;
            (
                Point3f::new(x as f32, y as f32, 0.0),
                Point2f::new(x as f32 / s, y as f32 / s),
            )
        };
        let mut mesh = TexturedMesh::new();
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                mesh.add_unshared_triangle([corner(x, y), corner(x, y + 1), corner(x + 1, y)]);
                mesh.add_unshared_triangle([corner(x + 1, y), corner(x, y + 1), corner(x + 1, y + 1)]);
            }
        }
        mesh
    }

    fn make_curved_surface(size: usize) -> TexturedMesh {
        let mut mesh = make_plane_grid(size);
        for p in &mut mesh.positions {
            let fx = p.x / (size - 1) as f32 * std::f32::consts::PI;
            let fy = p.y / (size - 1) as f32 * std::f32::consts::PI;
            p.z = fx.sin() * fy.sin() * 2.0;
        }
        mesh
    }

    fn assert_no_degenerate(mesh: &TexturedMesh) {
        for tri in &mesh.triangles {
            assert!(
                tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2],
                "degenerate triangle {:?}",
                tri
            );
            for &i in tri {
                assert!(i < mesh.vertex_count());
            }
        }
    }

    // ---- Parameter tests ----

    #[test]
    fn test_target_vertices() {
        assert_eq!(VoxelClusterer::target_vertices(1200, 200, 50), 300);
        assert_eq!(VoxelClusterer::target_vertices(6, 2, 1), 3);
        assert_eq!(VoxelClusterer::target_vertices(10, 1000, 1), 1);
        assert_eq!(VoxelClusterer::target_vertices(10, 5, 100), 10);
    }

    #[test]
    fn test_grid_dimensions_follow_extents() {
        let bbox = BBox {
            min: [0.0; 3],
            max: [10.0, 5.0, 0.0],
        };
        let grid = VoxelGrid::for_target(&bbox, 27);
        assert_eq!(grid.cells, [3, 2, 1]);
        assert_relative_eq!(grid.cell_size[0], 10.0 / 3.0);
        assert_relative_eq!(grid.cell_size[1], 2.5);
        // Flat axis falls back to unit cells
        assert_relative_eq!(grid.cell_size[2], 1.0);
    }

    #[test]
    fn test_cell_of_clamps_far_face() {
        let bbox = BBox {
            min: [0.0; 3],
            max: [4.0, 4.0, 4.0],
        };
        let grid = VoxelGrid::for_target(&bbox, 8);
        assert_eq!(grid.cells, [2, 2, 2]);
        assert_eq!(grid.cell_of(&Point3f::new(0.0, 0.0, 0.0)), CellKey { x: 0, y: 0, z: 0 });
        assert_eq!(grid.cell_of(&Point3f::new(1.9, 2.0, 4.0)), CellKey { x: 0, y: 1, z: 1 });
    }

    // ---- Behaviour tests ----

    #[test]
    fn test_no_reduction_needed_is_copy() {
        let mesh = make_plane_grid(4);
        let total = mesh.triangle_count();
        let (out, stats) = VoxelClusterer::new().cluster(&mesh, total);
        assert_eq!(out, mesh);
        assert!(stats.is_none());
        assert_eq!(VoxelClusterer::new().simplify(&mesh, 0), mesh);
    }

    #[test]
    fn test_reduces_plane_grid() {
        let mesh = make_plane_grid(11);
        assert_eq!(mesh.triangle_count(), 200);

        let (out, stats) = VoxelClusterer::new().cluster(&mesh, 50);
        let stats = stats.unwrap();

        assert!(out.triangle_count() > 0);
        assert!(out.triangle_count() <= 50);
        assert!(out.vertex_count() < mesh.vertex_count());
        assert_eq!(out.vertex_count(), stats.populated_cells);
        assert_eq!(out.uvs.len(), out.vertex_count());
        assert_no_degenerate(&out);
    }

    #[test]
    fn test_never_degenerate_and_within_budget() {
        let mesh = make_curved_surface(9);
        let total = mesh.triangle_count();
        for target in [1, 5, 17, 40, total / 2, total - 1] {
            let out = VoxelClusterer::new().simplify(&mesh, target);
            assert!(out.triangle_count() <= target, "target {}", target);
            assert_no_degenerate(&out);
        }
    }

    #[test]
    fn test_merged_vertices_are_cell_averages() {
        // All positions coincide; uvs differ
        let p = Point3f::new(2.0, 2.0, 2.0);
        let mut mesh = TexturedMesh::new();
        mesh.add_unshared_triangle([
            (p, Point2f::new(0.0, 0.0)),
            (p, Point2f::new(1.0, 0.0)),
            (p, Point2f::new(1.0, 1.0)),
        ]);
        mesh.add_unshared_triangle([
            (p, Point2f::new(0.0, 0.0)),
            (p, Point2f::new(0.0, 1.0)),
            (p, Point2f::new(1.0, 1.0)),
        ]);

        let (out, stats) = VoxelClusterer::new().cluster(&mesh, 1);
        let stats = stats.unwrap();

        assert_eq!(stats.grid.cells, [1, 1, 1]);
        assert_eq!(stats.populated_cells, 1);
        assert_eq!(stats.degenerate_triangles, 2);
        assert_eq!(out.triangle_count(), 0);
        assert_eq!(out.positions, vec![p]);
        assert_relative_eq!(out.uvs[0].x, 0.5);
        assert_relative_eq!(out.uvs[0].y, 0.5);
    }

    #[test]
    fn test_first_encountered_cell_order() {
        let mesh = make_plane_grid(6);
        let (out, _) = VoxelClusterer::new().cluster(&mesh, 10);
        // The first source vertex sits at the origin, so the first merged
        // vertex is the average of the origin cell.
        assert!(out.positions[0].x < 2.5 && out.positions[0].y < 2.5);
    }

    #[test]
    fn test_deterministic() {
        let mesh = make_curved_surface(8);
        let a = VoxelClusterer::new().cluster(&mesh, 30);
        let b = VoxelClusterer::new().cluster(&mesh, 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_infinite_coordinate_collapses_grid() {
        let mut mesh = make_plane_grid(5);
        mesh.positions[7].x = f32::INFINITY;

        let (out, stats) = VoxelClusterer::new().cluster(&mesh, 8);
        let stats = stats.unwrap();

        assert_eq!(stats.grid.cells, [1, 1, 1]);
        assert_eq!(stats.populated_cells, 1);
        assert_eq!(out.triangle_count(), 0);
    }

    #[test]
    fn test_nan_vertex_joins_first_cell() {
        let mut mesh = make_plane_grid(5);
        let last = mesh.vertex_count() - 1;
        mesh.positions[last] = Point3f::new(f32::NAN, f32::NAN, f32::NAN);

        let (out, stats) = VoxelClusterer::new().cluster(&mesh, 8);

        // The grid still follows the finite vertices
        assert!(stats.unwrap().grid.cells[0] > 1);
        // Vertex 0 sits at the origin, so its cell is the first group
        assert!(out.positions[0].x.is_nan());
        assert!(out.positions[1..].iter().all(|p| p.x.is_finite()));
    }

    #[test]
    fn test_missing_vertices_are_skipped() {
        let mut mesh = make_plane_grid(5);
        mesh.triangles[0] = [0, 1, 10_000];
        let (out, stats) = VoxelClusterer::new().cluster(&mesh, 8);
        assert_eq!(stats.unwrap().invalid_triangles, 1);
        assert_no_degenerate(&out);
    }
}
