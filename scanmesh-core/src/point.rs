//! Point types and related functionality

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 2D texture coordinate
pub type Point2f = Point2<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// An interleaved position + texture coordinate vertex, laid out for GPU upload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub fn new(position: &Point3f, uv: &Point2f) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            uv: [uv.x, uv.y],
        }
    }
}

impl Default for TexturedVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            uv: [0.0; 2],
        }
    }
}

/// True when every coordinate of the point is finite
pub fn is_finite_point(p: &Point3f) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_textured_vertex_layout() {
        assert_eq!(std::mem::size_of::<TexturedVertex>(), 20);
        let v = TexturedVertex::new(&Point3f::new(1.0, 2.0, 3.0), &Point2f::new(0.25, 0.75));
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 20);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.25, 0.75]);
    }

    #[test]
    fn test_is_finite_point() {
        assert!(is_finite_point(&Point3f::new(0.0, -1.0, 1e30)));
        assert!(!is_finite_point(&Point3f::new(f32::NAN, 0.0, 0.0)));
        assert!(!is_finite_point(&Point3f::new(0.0, f32::INFINITY, 0.0)));
        assert!(!is_finite_point(&Point3f::new(0.0, 0.0, f32::NEG_INFINITY)));
    }
}
