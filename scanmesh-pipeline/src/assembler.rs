//! Scan to renderable mesh assembly
//!
//! Runs parse, expand, optional reduction and validation in that order. Each
//! stage only sees the output of the one before it. A fatal error anywhere
//! produces no mesh at all.

use crate::config::AssemblerConfig;
use scanmesh_core::{
    validate_mesh, ExpandReport, FinalMesh, RawGeometry, Result, ValidationReport, WedgeExpander,
};
use scanmesh_io::{MultiTexturePlyReader, PlySchema, ScanReader};
use scanmesh_simplification::{simplify, ClusterStats, Simplification};
use std::path::Path;

/// Per-stage figures from one assembly
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    pub expand: ExpandReport,
    /// Triangles after expansion, before reduction
    pub triangles_before: usize,
    /// Triangles after reduction, before validation
    pub triangles_after: usize,
    pub simplification: Simplification,
    pub cluster_stats: Option<ClusterStats>,
    pub validation: ValidationReport,
}

/// A validated mesh and how it was made
#[derive(Debug, Clone)]
pub struct Assembly {
    pub mesh: FinalMesh,
    pub report: AssemblyReport,
}

/// Builds [`FinalMesh`]es from scanner exports
#[derive(Debug, Clone, Default)]
pub struct MeshAssembler {
    config: AssemblerConfig,
    reader: MultiTexturePlyReader,
}

impl MeshAssembler {
    /// Create an assembler; fails if `config` is out of range
    pub fn new(config: AssemblerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reader: MultiTexturePlyReader::new(),
        })
    }

    /// Read sources with a non-default element/property layout
    pub fn with_schema(mut self, schema: PlySchema) -> Self {
        self.reader = MultiTexturePlyReader::with_schema(schema);
        self
    }

    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Read `path` and assemble it
    pub fn assemble_path<P: AsRef<Path>>(&self, path: P) -> Result<Assembly> {
        let path = path.as_ref();
        let _span = tracing::info_span!("assemble", path = %path.display()).entered();

        let raw = {
            let _span = tracing::info_span!("parse").entered();
            self.reader.read_scan(path)?
        };
        tracing::debug!(
            vertices = raw.positions.len(),
            faces = raw.faces.len(),
            wedges = raw.wedge_uvs.len(),
            textures = raw.texture_ids().len(),
            "parsed scan"
        );
        self.assemble_raw(&raw)
    }

    /// Assemble already-parsed geometry
    pub fn assemble_raw(&self, raw: &RawGeometry) -> Result<Assembly> {
        let (expanded, expand) = {
            let _span = tracing::info_span!("expand").entered();
            WedgeExpander::with_options(self.config.expand).expand(raw)
        };

        let triangles_before = expanded.triangle_count();
        let simplification = self.config.simplification(triangles_before);
        let (reduced, cluster_stats) = {
            let _span = tracing::info_span!("simplify").entered();
            let simplified = simplify(&expanded, simplification);
            (simplified.mesh, simplified.cluster_stats)
        };
        let triangles_after = reduced.triangle_count();
        match simplification {
            Simplification::None => {
                tracing::info!(triangles = triangles_before, "reduction skipped")
            }
            _ => tracing::info!(
                before = triangles_before,
                after = triangles_after,
                strategy = ?simplification,
                "reduced triangle count"
            ),
        }

        let (mesh, validation) = {
            let _span = tracing::info_span!("validate").entered();
            validate_mesh(reduced)?
        };
        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            index_format = ?mesh.index_format(),
            "mesh ready"
        );

        Ok(Assembly {
            mesh,
            report: AssemblyReport {
                expand,
                triangles_before,
                triangles_after,
                simplification,
                cluster_stats,
                validation,
            },
        })
    }
}

/// Build a [`FinalMesh`] from the scan at `path`
pub fn generate<P: AsRef<Path>>(path: P, config: &AssemblerConfig) -> Result<FinalMesh> {
    let assembler = MeshAssembler::new(*config)?;
    Ok(assembler.assemble_path(path)?.mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReductionMode;
    use scanmesh_core::{Error, Point2f, Point3f};

    /// `n` separate triangles along x, wedges shared per face
    fn triangle_row(n: usize) -> RawGeometry {
        let mut raw = RawGeometry::new();
        for i in 0..n {
            let base = raw.positions.len() as i64;
            let x = i as f32 * 2.0;
            raw.positions.push(Point3f::new(x, 0.0, 0.0));
            raw.positions.push(Point3f::new(x + 1.0, 0.0, 0.0));
            raw.positions.push(Point3f::new(x, 1.0, 0.0));
            raw.faces.push(vec![base, base + 1, base + 2]);
            raw.face_wedges.extend([0, 1, 2]);
        }
        raw.wedge_uvs = vec![Point2f::new(0.0, 0.0), Point2f::new(1.0, 0.0), Point2f::new(0.0, 1.0)];
        raw.wedge_texture_ids = vec![0, 0, 0];
        raw
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AssemblerConfig {
            reduction_factor: 0.0,
            ..AssemblerConfig::default()
        };
        assert!(matches!(MeshAssembler::new(config), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_report_counts() {
        let config = AssemblerConfig {
            strategy: ReductionMode::Uniform,
            reduction_factor: 0.25,
            ..AssemblerConfig::default()
        };
        let assembly = MeshAssembler::new(config).unwrap().assemble_raw(&triangle_row(8)).unwrap();

        assert_eq!(assembly.report.expand.triangles_emitted, 8);
        assert_eq!(assembly.report.triangles_before, 8);
        assert_eq!(assembly.report.simplification, Simplification::Uniform(2));
        assert_eq!(assembly.report.triangles_after, 2);
        assert!(assembly.report.cluster_stats.is_none());
        assert_eq!(assembly.mesh.triangle_count(), 2);
    }

    /// `size` x `size` vertex grid, one wedge per vertex
    fn vertex_grid(size: usize) -> RawGeometry {
        let mut raw = RawGeometry::new();
        for y in 0..size {
            for x in 0..size {
                raw.positions.push(Point3f::new(x as f32, y as f32, 0.0));
                let s = (size - 1) as f32;
                raw.wedge_uvs.push(Point2f::new(x as f32 / s, y as f32 / s));
                raw.wedge_texture_ids.push(0);
            }
        }
        for y in 0..(size - 1) {
            for x in 0..(size - 1) {
                let tl = (y * size + x) as i64;
                let tr = tl + 1;
                let bl = tl + size as i64;
                let br = bl + 1;
                for face in [[tl, bl, tr], [tr, bl, br]] {
                    raw.faces.push(face.to_vec());
                    raw.face_wedges.extend(face);
                }
            }
        }
        raw
    }

    #[test]
    fn test_voxel_report_has_stats() {
        let raw = vertex_grid(10);
        let assembly = MeshAssembler::default().assemble_raw(&raw).unwrap();
        assert_eq!(assembly.report.triangles_before, 162);
        assert_eq!(assembly.report.simplification, Simplification::Voxel(81));
        let stats = assembly.report.cluster_stats.unwrap();
        assert!(stats.populated_cells < 162 * 3);
        assert!(assembly.mesh.triangle_count() <= 81);
        assert!(assembly.mesh.vertex_count() <= stats.populated_cells);
    }

    #[test]
    fn test_no_triangles_is_empty_result() {
        let mut raw = triangle_row(2);
        for face in &mut raw.faces {
            face.push(0);
        }
        let result = MeshAssembler::default().assemble_raw(&raw);
        assert!(matches!(result, Err(Error::EmptyResult(_))));
    }
}
