//! Coordinate-system conversion between the scanner's convention and the renderer's

use crate::point::*;
use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};

/// A 3D transformation that can be applied to points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a scaling transformation
    pub fn scaling(scale: Vector3f) -> Self {
        Self {
            matrix: Matrix4::new_nonuniform_scaling(&scale),
        }
    }

    /// Mirror across the plane orthogonal to X
    pub fn mirror_x() -> Self {
        Self::scaling(Vector3f::new(-1.0, 1.0, 1.0))
    }

    /// Apply the transformation to a point
    pub fn transform_point(&self, point: &Point3f) -> Point3f {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3f::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// True when the transformation flips orientation (negative determinant)
    pub fn flips_handedness(&self) -> bool {
        self.matrix.fixed_view::<3, 3>(0, 0).determinant() < 0.0
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// How source positions, texture coordinates and corner order are converted
/// when a face is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateConversion {
    pub position: Transform3D,
    /// Replace `v` with `1 - v`
    pub flip_v: bool,
}

impl CoordinateConversion {
    /// Right-handed, top-left UV origin (PLY scanner exports) to left-handed,
    /// bottom-left UV origin.
    pub fn right_to_left_handed() -> Self {
        Self {
            position: Transform3D::mirror_x(),
            flip_v: true,
        }
    }

    /// Leave everything as stored in the source
    pub fn identity() -> Self {
        Self {
            position: Transform3D::identity(),
            flip_v: false,
        }
    }

    pub fn convert_position(&self, p: &Point3f) -> Point3f {
        self.position.transform_point(p)
    }

    pub fn convert_uv(&self, uv: &Point2f) -> Point2f {
        if self.flip_v {
            Point2f::new(uv.x, 1.0 - uv.y)
        } else {
            *uv
        }
    }

    /// Source corner order to emit so face normals stay consistent with the
    /// converted positions.
    pub fn corner_order(&self) -> [usize; 3] {
        if self.position.flips_handedness() {
            [0, 2, 1]
        } else {
            [0, 1, 2]
        }
    }
}

impl Default for CoordinateConversion {
    fn default() -> Self {
        Self::right_to_left_handed()
    }
}
