//! Camera producing a view matrix
//!
//! The rasterizer consumes only the matrix; how the caller derives it is its
//! own business.

use crate::rasterizer::{Matrix4, Vec3};

/// Position plus yaw/pitch camera
#[derive(Debug, Clone, Copy, Default)]
pub struct Camera {
    pub position: Vec3,
    /// Horizontal rotation, radians
    pub yaw: f64,
    /// Vertical rotation, radians
    pub pitch: f64,
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// View matrix: rotate first, then apply the inverse translation.
    pub fn view_matrix(&self) -> Matrix4 {
        let rotation = Matrix4::rotation_y(-self.yaw).multiply(&Matrix4::rotation_x(-self.pitch));
        let translation =
            Matrix4::translation(-self.position.x, -self.position.y, -self.position.z);
        rotation.multiply(&translation)
    }
}
