//! Convert a multi-texture scanner PLY export into a renderable mesh
//!
//! # Usage
//!
//! ```bash
//! # Default reduction (voxel clustering to half the triangles)
//! scan_to_mesh scan.ply --output mesh.ply
//!
//! # Keep every triangle
//! scan_to_mesh scan.ply --strategy none
//!
//! # Uniform sampling to a fixed budget, settings from a file
//! scan_to_mesh scan.ply --config scanmesh.toml --strategy uniform --target 20000
//! ```

use anyhow::Context;
use clap::{Parser, ValueEnum};
use scanmesh_io::write_mesh;
use scanmesh_pipeline::{AssemblerConfig, MeshAssembler, ReductionMode};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Strategy {
    None,
    Uniform,
    Voxel,
}

impl From<Strategy> for ReductionMode {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::None => ReductionMode::None,
            Strategy::Uniform => ReductionMode::Uniform,
            Strategy::Voxel => ReductionMode::Voxel,
        }
    }
}

/// Scan to mesh converter
#[derive(Parser, Debug)]
#[command(name = "scan_to_mesh")]
#[command(author, version, about = "Convert multi-texture PLY scans into renderable meshes", long_about = None)]
struct Cli {
    /// Scanner PLY export
    input: PathBuf,

    /// TOML file with assembler settings; flags override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Reduction strategy
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Share of triangles to keep, in (0, 1]
    #[arg(short, long)]
    factor: Option<f32>,

    /// Absolute triangle budget
    #[arg(short, long)]
    target: Option<usize>,

    /// Where to write the resulting PLY
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => AssemblerConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => AssemblerConfig::default(),
    };
    if let Some(strategy) = cli.strategy {
        config.strategy = strategy.into();
        config.reduce = !matches!(strategy, Strategy::None);
    }
    if let Some(factor) = cli.factor {
        config.reduction_factor = factor;
    }
    if cli.target.is_some() {
        config.target_triangle_count = cli.target;
    }

    let assembler = MeshAssembler::new(config)?;
    let assembly = assembler
        .assemble_path(&cli.input)
        .with_context(|| format!("Failed to build mesh from {}", cli.input.display()))?;

    let report = &assembly.report;
    if report.expand.skipped_faces() > 0 || report.expand.truncated_at.is_some() {
        warn!(
            skipped = report.expand.skipped_faces(),
            truncated_at = ?report.expand.truncated_at,
            "source had unusable faces"
        );
    }
    for diagnostic in report.expand.samples.iter().chain(&report.validation.samples) {
        warn!("{}", diagnostic);
    }
    if let Some(stats) = &report.cluster_stats {
        info!(
            cells = ?stats.grid.cells,
            populated = stats.populated_cells,
            degenerate = stats.degenerate_triangles,
            "voxel grid"
        );
    }

    let mesh = &assembly.mesh;
    let (min, max) = mesh.bounds();
    info!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        source_triangles = report.triangles_before,
        index_format = ?mesh.index_format(),
        "bounds: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
        min.x, min.y, min.z, max.x, max.y, max.z
    );

    if let Some(output) = &cli.output {
        write_mesh(mesh, output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("wrote {}", output.display());
    }

    Ok(())
}
