//! Triangle rasterization with a per-pixel depth buffer
//!
//! The mesh is expected in screen/pixel space already; no projection happens
//! here. Triangles are filled in input order, either flat-shaded by the face
//! normal or textured by nearest-neighbor UV sampling, and pixels are written
//! only when they win the depth test.

use super::math::{barycentric, signed_area, Vec2, Vec3};
use super::types::{Color, FaceKind, Image, Mesh, Triangle};

/// Rendering failure
#[derive(Debug)]
pub enum RenderError {
    /// Output resolution with a zero dimension
    InvalidResolution { width: usize, height: usize },
    /// A material's texture has no base layer; the frame is aborted
    MissingTextureLayer { material: String },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::InvalidResolution { width, height } => {
                write!(f, "invalid output resolution {}x{}", width, height)
            }
            RenderError::MissingTextureLayer { material } => {
                write!(f, "material '{}' has a texture with no layer 0", material)
            }
        }
    }
}

/// Framebuffer for software rendering
pub struct Framebuffer {
    /// RGBA, 4 bytes per pixel, row-major, origin top-left
    pub pixels: Vec<u8>,
    /// Depth per pixel; larger z is closer to the viewer
    pub zbuffer: Vec<f64>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    /// Fresh buffers: transparent pixels, every depth cell at -inf
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            zbuffer: vec![f64::NEG_INFINITY; width * height],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for i in 0..(self.width * self.height) {
            self.pixels[i * 4..i * 4 + 4].copy_from_slice(&bytes);
            self.zbuffer[i] = f64::NEG_INFINITY;
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    /// Write the pixel only when `z` is strictly greater than the stored
    /// depth. Returns whether the write happened.
    pub fn set_pixel_with_depth(&mut self, x: usize, y: usize, z: f64, color: Color) -> bool {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            if z > self.zbuffer[idx] {
                self.zbuffer[idx] = z;
                let pixel_idx = idx * 4;
                self.pixels[pixel_idx..pixel_idx + 4].copy_from_slice(&color.to_bytes());
                return true;
            }
        }
        false
    }
}

/// Render a mesh into freshly allocated buffers.
pub fn render(mesh: &Mesh, width: usize, height: usize) -> Result<Framebuffer, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidResolution { width, height });
    }
    let mut fb = Framebuffer::new(width, height);
    render_mesh(&mut fb, mesh)?;
    Ok(fb)
}

/// Rasterize every triangle of `mesh` into `fb`, in input order.
///
/// Does not clear the buffers; callers own the clear.
pub fn render_mesh(fb: &mut Framebuffer, mesh: &Mesh) -> Result<(), RenderError> {
    for t in mesh.triangles() {
        let shade = t.normal().z.abs();

        match &t.kind {
            FaceKind::Textured { uv, material } => {
                if let Some(texture) = &material.texture {
                    let layer = texture.layer(0).ok_or_else(|| {
                        RenderError::MissingTextureLayer { material: material.name.clone() }
                    })?;
                    fill_textured(fb, t, uv, layer);
                } else {
                    fill_flat(fb, t, material.diffuse.shade(shade));
                }
            }
            FaceKind::Flat(color) => fill_flat(fb, t, color.shade(shade)),
        }
    }
    Ok(())
}

/// Pixel-space bounding box clamped to the framebuffer, inclusive on both
/// ends. Empty when max < min.
fn raster_bounds(fb: &Framebuffer, v1: Vec3, v2: Vec3, v3: Vec3) -> (i32, i32, i32, i32) {
    let min_x = v1.x.min(v2.x).min(v3.x).ceil().max(0.0) as i32;
    let max_x = v1.x.max(v2.x).max(v3.x).floor().min(fb.width as f64 - 1.0) as i32;
    let min_y = v1.y.min(v2.y).min(v3.y).ceil().max(0.0) as i32;
    let max_y = v1.y.max(v2.y).max(v3.y).floor().min(fb.height as f64 - 1.0) as i32;
    (min_x, max_x, min_y, max_y)
}

/// Inclusive on both ends, so edge pixels on shared edges are admitted from
/// either side; depth ties keep the first writer.
fn covered(b1: f64, b2: f64, b3: f64) -> bool {
    (0.0..=1.0).contains(&b1) && (0.0..=1.0).contains(&b2) && (0.0..=1.0).contains(&b3)
}

fn fill_flat(fb: &mut Framebuffer, t: &Triangle, color: Color) {
    let area = signed_area(t.v1, t.v2, t.v3);
    if area == 0.0 {
        return; // degenerate triangle covers no pixels
    }
    let (min_x, max_x, min_y, max_y) = raster_bounds(fb, t.v1, t.v2, t.v3);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (b1, b2, b3) = barycentric(x as f64, y as f64, t.v1, t.v2, t.v3, area);
            if covered(b1, b2, b3) {
                let depth = b1 * t.v1.z + b2 * t.v2.z + b3 * t.v3.z;
                fb.set_pixel_with_depth(x as usize, y as usize, depth, color);
            }
        }
    }
}

fn fill_textured(fb: &mut Framebuffer, t: &Triangle, uv: &[Vec2; 3], layer: &Image) {
    let area = signed_area(t.v1, t.v2, t.v3);
    if area == 0.0 {
        return;
    }
    let (min_x, max_x, min_y, max_y) = raster_bounds(fb, t.v1, t.v2, t.v3);

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let (b1, b2, b3) = barycentric(x as f64, y as f64, t.v1, t.v2, t.v3, area);
            if covered(b1, b2, b3) {
                let depth = b1 * t.v1.z + b2 * t.v2.z + b3 * t.v3.z;
                let u = b1 * uv[0].x + b2 * uv[1].x + b3 * uv[2].x;
                let v = b1 * uv[0].y + b2 * uv[1].y + b3 * uv[2].y;
                fb.set_pixel_with_depth(x as usize, y as usize, depth, layer.sample_nearest(u, v));
            }
        }
    }
}
