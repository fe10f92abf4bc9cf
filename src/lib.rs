//! # scanmesh
//!
//! Turn multi-texture 3D scanner PLY exports into renderable triangle meshes.
//!
//! This is the umbrella crate that provides convenient access to all scanmesh functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Textured mesh types, wedge expansion and mesh validation
//! - **I/O**: Multi-texture PLY reading and textured PLY writing
//! - **Simplification**: Uniform triangle sampling and voxel-grid clustering
//! - **Pipeline**: Parse, expand, reduce and validate in a single call
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scanmesh::prelude::*;
//!
//! let config = AssemblerConfig {
//!     strategy: ReductionMode::Uniform,
//!     reduction_factor: 0.25,
//!     ..AssemblerConfig::default()
//! };
//!
//! match generate("scan.ply", &config) {
//!     Ok(mesh) => println!("{} triangles", mesh.triangle_count()),
//!     Err(e) => eprintln!("could not build mesh: {}", e),
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables io, simplification and pipeline
//! - `io`: PLY support
//! - `simplification`: Triangle budget reduction
//! - `pipeline`: End-to-end assembly (implies `io` and `simplification`)

// Re-export core functionality
pub use scanmesh_core::*;

// Re-export sub-crates
#[cfg(feature = "io")]
pub use scanmesh_io as io;

#[cfg(feature = "simplification")]
pub use scanmesh_simplification as simplification;

#[cfg(feature = "pipeline")]
pub use scanmesh_pipeline as pipeline;

/// Convenient imports for common use cases
pub mod prelude {
    pub use scanmesh_core::*;

    #[cfg(feature = "io")]
    pub use scanmesh_io::*;

    #[cfg(feature = "simplification")]
    pub use scanmesh_simplification::*;

    #[cfg(feature = "pipeline")]
    pub use scanmesh_pipeline::*;
}
