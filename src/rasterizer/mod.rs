//! Software triangle rasterizer
//!
//! CPU-side rendering of 3D triangle meshes into an RGBA framebuffer:
//! - Row-major 3x3/4x4 affine transform builders
//! - Barycentric rasterization with a per-pixel z-buffer
//! - Flat shading from the face normal, or nearest-neighbor texture sampling

mod math;
mod types;
mod render;

pub use math::*;
pub use types::*;
pub use render::*;
