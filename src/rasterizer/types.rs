//! Core data types for the rasterizer: colors, textures, materials,
//! triangles and meshes.
//!
//! Triangles own their vertices by value. Transforming a mesh produces fresh
//! triangles and never touches the source; materials are shared behind an
//! `Arc` rather than copied.

use super::math::{Transform, Vec2, Vec3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const CYAN: Color = Color { r: 0, g: 255, b: 255, a: 255 };

    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Apply shading (multiply by intensity, clamped to 0.0-1.0)
    pub fn shade(self, intensity: f64) -> Self {
        let i = intensity.clamp(0.0, 1.0);
        Self {
            r: (self.r as f64 * i) as u8,
            g: (self.g as f64 * i) as u8,
            b: (self.b as f64 * i) as u8,
            a: self.a,
        }
    }

    /// Convert to [u8; 4] for the framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Decoded pixel grid, origin top-left, row-major
#[derive(Debug, Clone)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Image {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::WHITE; width * height],
            name: String::new(),
        }
    }

    /// Decode an image file (PNG, JPEG, BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        use image::GenericImageView;

        let path = path.as_ref();
        let img = image::open(path)
            .map_err(|e| format!("Failed to load {}: {}", path.display(), e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Decode an image from raw encoded bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, String> {
        use image::GenericImageView;

        let img = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode image: {}", e))?;

        let (width, height) = img.dimensions();
        let rgba = img.to_rgba8();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test image
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Nearest-neighbor sample at UV coordinates.
    ///
    /// Both coordinates wrap to [0, 1); V is flipped because row 0 is the
    /// image's top row while v = 0 denotes the bottom of the texture.
    pub fn sample_nearest(&self, u: f64, v: f64) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::WHITE;
        }
        let u = u - u.floor();
        let v = v - v.floor();
        let px = (u * (self.width - 1) as f64) as usize;
        let py = ((1.0 - v) * (self.height - 1) as f64) as usize;
        self.pixels[py.min(self.height - 1) * self.width + px.min(self.width - 1)]
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }
}

/// Texture as a stack of decoded layers. The rasterizer samples layer 0 only.
#[derive(Debug, Clone)]
pub struct Texture {
    layers: Vec<Image>,
}

impl Texture {
    pub fn new(base: Image) -> Self {
        Self { layers: vec![base] }
    }

    pub fn from_layers(layers: Vec<Image>) -> Self {
        Self { layers }
    }

    pub fn add_layer(&mut self, layer: Image) {
        self.layers.push(layer);
    }

    pub fn layer(&self, index: usize) -> Option<&Image> {
        self.layers.get(index)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// Material with a diffuse color and an optional texture
#[derive(Debug, Clone)]
pub struct Material {
    pub name: String,
    pub diffuse: Color,
    pub texture: Option<Texture>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            diffuse: Color::WHITE,
            texture: None,
        }
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }
}

/// How a triangle face is filled
#[derive(Debug, Clone)]
pub enum FaceKind {
    /// Single color, shaded by the face normal
    Flat(Color),
    /// Per-vertex UVs sampling the material's texture
    Textured { uv: [Vec2; 3], material: Arc<Material> },
}

/// 3D triangle with owned vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
    pub kind: FaceKind,
}

impl Triangle {
    pub fn flat(v1: Vec3, v2: Vec3, v3: Vec3, color: Color) -> Self {
        Self { v1, v2, v3, kind: FaceKind::Flat(color) }
    }

    pub fn textured(v1: Vec3, v2: Vec3, v3: Vec3, uv: [Vec2; 3], material: Arc<Material>) -> Self {
        Self { v1, v2, v3, kind: FaceKind::Textured { uv, material } }
    }

    /// Face normal from the vertex winding; not guaranteed outward-facing.
    pub fn normal(&self) -> Vec3 {
        let ab = self.v2 - self.v1;
        let ac = self.v3 - self.v1;
        ab.cross(ac).normalize()
    }

    /// The flat color, or the material's diffuse color for textured faces
    pub fn color(&self) -> Color {
        match &self.kind {
            FaceKind::Flat(color) => *color,
            FaceKind::Textured { material, .. } => material.diffuse,
        }
    }
}

/// Ordered triangle list
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self { triangles: Vec::new() }
    }

    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// New mesh with every vertex mapped through `matrix`. UVs are copied
    /// unchanged and materials stay shared; the source mesh is not touched.
    pub fn transformed<T: Transform>(&self, matrix: &T) -> Mesh {
        let triangles = self
            .triangles
            .iter()
            .map(|t| {
                let v1 = matrix.transform(t.v1);
                let v2 = matrix.transform(t.v2);
                let v3 = matrix.transform(t.v3);
                match &t.kind {
                    FaceKind::Flat(color) => Triangle::flat(v1, v2, v3, *color),
                    FaceKind::Textured { uv, material } => {
                        Triangle::textured(v1, v2, v3, *uv, material.clone())
                    }
                }
            })
            .collect();
        Mesh { triangles }
    }
}
