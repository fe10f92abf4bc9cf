//! Scan to renderable mesh assembly
//!
//! This crate ties the scanmesh stages together: it reads a multi-texture PLY
//! export, expands its wedges, optionally reduces the triangle count and
//! validates the result.
//!
//! ```no_run
//! use scanmesh_pipeline::{generate, AssemblerConfig, ReductionMode};
//!
//! let config = AssemblerConfig {
//!     strategy: ReductionMode::Uniform,
//!     reduction_factor: 0.25,
//!     ..AssemblerConfig::default()
//! };
//! let mesh = generate("scan.ply", &config)?;
//! println!("{} triangles", mesh.triangle_count());
//! # Ok::<(), scanmesh_core::Error>(())
//! ```

pub mod assembler;
pub mod config;
pub mod context;

pub use assembler::*;
pub use config::*;
pub use context::*;
