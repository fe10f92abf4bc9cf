//! Basic usage example for scanmesh
//!
//! Builds a synthetic multi-texture scan in memory, runs it through each
//! reduction strategy and prints what comes out.

use rand::{rngs::StdRng, Rng, SeedableRng};
use scanmesh_core::{Point2f, Point3f, RawGeometry};
use scanmesh_pipeline::{AssemblerConfig, MeshAssembler, ReductionMode};

/// Noisy hemisphere with per-vertex wedges split across two textures
fn synthetic_scan(rings: usize, segments: usize) -> RawGeometry {
    let mut rng = StdRng::seed_from_u64(7);
    let mut raw = RawGeometry::new();

    for r in 0..=rings {
        let phi = r as f32 / rings as f32 * std::f32::consts::FRAC_PI_2;
        for s in 0..=segments {
            let theta = s as f32 / segments as f32 * std::f32::consts::TAU;
            let radius = 1.0 + rng.gen_range(-0.01..0.01);
            raw.positions.push(Point3f::new(
                radius * phi.sin() * theta.cos(),
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
            ));
            let u = s as f32 / segments as f32;
            raw.wedge_uvs.push(Point2f::new(u, r as f32 / rings as f32));
            raw.wedge_texture_ids.push(if u < 0.5 { 0 } else { 1 });
        }
    }

    let row = (segments + 1) as i64;
    for r in 0..rings as i64 {
        for s in 0..segments as i64 {
            let a = r * row + s;
            let b = a + row;
            for face in [[a, b, a + 1], [a + 1, b, b + 1]] {
                raw.faces.push(face.to_vec());
                raw.face_wedges.extend(face);
            }
        }
    }
    raw
}

fn main() -> anyhow::Result<()> {
    println!("scanmesh Basic Usage Example");
    println!("============================");

    let raw = synthetic_scan(40, 80);
    println!(
        "Synthetic scan: {} positions, {} faces, {} wedges, textures {:?}",
        raw.positions.len(),
        raw.faces.len(),
        raw.wedge_uvs.len(),
        raw.texture_ids()
    );

    for strategy in [ReductionMode::None, ReductionMode::Uniform, ReductionMode::Voxel] {
        let config = AssemblerConfig {
            reduce: strategy != ReductionMode::None,
            strategy,
            reduction_factor: 0.2,
            ..AssemblerConfig::default()
        };
        let assembly = MeshAssembler::new(config)?.assemble_raw(&raw)?;
        let mesh = &assembly.mesh;

        println!("\n{:?}", strategy);
        println!("  triangles: {} -> {}", assembly.report.triangles_before, mesh.triangle_count());
        println!("  vertices:  {}", mesh.vertex_count());
        println!("  index format: {:?}", mesh.index_format());
        if let Some(stats) = &assembly.report.cluster_stats {
            println!(
                "  voxel grid: {:?} cells, {} populated",
                stats.grid.cells, stats.populated_cells
            );
        }

        let vertices = mesh.interleaved();
        let normals = mesh.vertex_normals();
        println!(
            "  first vertex: position {:?}, uv {:?}, normal [{:.3}, {:.3}, {:.3}]",
            vertices[0].position, vertices[0].uv, normals[0].x, normals[0].y, normals[0].z
        );
        match mesh.flat_indices_u16() {
            Some(indices) => println!("  u16 index buffer: {} entries", indices.len()),
            None => println!("  u32 index buffer: {} entries", mesh.flat_indices_u32().len()),
        }
    }

    Ok(())
}
