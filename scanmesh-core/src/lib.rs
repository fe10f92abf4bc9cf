//! Core data structures and stages for scanmesh
//!
//! This crate provides the textured mesh types shared by every scanmesh crate,
//! the wedge expander that turns scanner face/wedge index streams into an
//! unshared corner-vertex buffer, and the validator that guards what reaches
//! a renderer.

pub mod point;
pub mod mesh;
pub mod raw;
pub mod transform;
pub mod wedge;
pub mod validation;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use raw::*;
pub use transform::*;
pub use wedge::*;
pub use validation::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point2, Point3, Vector3};
