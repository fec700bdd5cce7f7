//! Native model format
//!
//! Uses RON (Rusty Object Notation) for human-readable model files: indexed
//! vertices and UVs, index triples per triangle, and an optional material
//! whose texture path resolves relative to the model file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::rasterizer::{Color, Image, Material, Mesh, Texture, Triangle, Vec2, Vec3};

/// Model units are multiplied by this on load.
const SCALE: f64 = 400.0;

/// Error type for model loading and saving
#[derive(Debug)]
pub enum ModelError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
    /// An index triple references a vertex that does not exist
    BadIndex { mesh: String, index: usize },
}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        ModelError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ModelError {
    fn from(e: ron::error::SpannedError) -> Self {
        ModelError::Parse(e)
    }
}

impl From<ron::Error> for ModelError {
    fn from(e: ron::Error) -> Self {
        ModelError::Serialize(e)
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::Io(e) => write!(f, "IO error: {}", e),
            ModelError::Parse(e) => write!(f, "Parse error: {}", e),
            ModelError::Serialize(e) => write!(f, "Serialize error: {}", e),
            ModelError::BadIndex { mesh, index } => {
                write!(f, "mesh '{}' references missing vertex {}", mesh, index)
            }
        }
    }
}

/// On-disk model document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub meshes: Vec<MeshData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vec3>,
    #[serde(default)]
    pub uvs: Vec<Vec2>,
    pub triangles: Vec<[usize; 3]>,
    #[serde(default)]
    pub material: Option<MaterialData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialData {
    pub name: String,
    #[serde(default = "default_diffuse")]
    pub diffuse: Color,
    /// Texture path relative to the model file
    #[serde(default)]
    pub texture: Option<PathBuf>,
}

fn default_diffuse() -> Color {
    Color::WHITE
}

/// Load a model file; textures resolve relative to it.
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<Mesh, ModelError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let model: Model = ron::from_str(&contents)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    build_mesh(&model, base_dir)
}

/// Load a model from a RON string (for embedded models or testing).
pub fn load_model_from_str(s: &str, base_dir: &Path) -> Result<Mesh, ModelError> {
    let model: Model = ron::from_str(s)?;
    build_mesh(&model, base_dir)
}

/// Save a model document to a RON file.
pub fn save_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<(), ModelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(model, config)?;
    fs::write(path, contents)?;
    Ok(())
}

fn build_mesh(model: &Model, base_dir: &Path) -> Result<Mesh, ModelError> {
    let mut triangles = Vec::new();

    for mesh in &model.meshes {
        let material = resolve_material(mesh, base_dir);

        for &[i0, i1, i2] in &mesh.triangles {
            let v1 = vertex_at(mesh, i0)?;
            let v2 = vertex_at(mesh, i1)?;
            let v3 = vertex_at(mesh, i2)?;

            if mesh.uvs.len() <= i0.max(i1).max(i2) {
                eprintln!(
                    "UV fallback for triangle ({}, {}, {}) in mesh '{}'",
                    i0, i1, i2, mesh.name
                );
            }
            let uv = |i: usize| mesh.uvs.get(i).copied().unwrap_or_default();

            triangles.push(Triangle::textured(
                v1,
                v2,
                v3,
                [uv(i0), uv(i1), uv(i2)],
                material.clone(),
            ));
        }
    }

    println!("Loaded model: {} triangles", triangles.len());
    Ok(Mesh::from_triangles(triangles))
}

fn vertex_at(mesh: &MeshData, index: usize) -> Result<Vec3, ModelError> {
    mesh.vertices
        .get(index)
        .map(|v| Vec3::new(v.x * SCALE, v.y * SCALE, v.z * SCALE))
        .ok_or_else(|| ModelError::BadIndex {
            mesh: mesh.name.clone(),
            index,
        })
}

fn resolve_material(mesh: &MeshData, base_dir: &Path) -> Arc<Material> {
    let Some(data) = &mesh.material else {
        return Arc::new(Material::new("default"));
    };

    let mut material = Material::new(data.name.clone());
    material.diffuse = data.diffuse;

    if let Some(rel) = &data.texture {
        let tex_path = base_dir.join(rel);
        match Image::from_file(&tex_path) {
            Ok(img) => material.texture = Some(Texture::new(img)),
            Err(e) => eprintln!("Texture not found in model: {}", e),
        }
    }

    Arc::new(material)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_model() -> Model {
        Model {
            meshes: vec![MeshData {
                name: "quad".to_string(),
                vertices: vec![
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(1.0, 0.0, 0.0),
                    Vec3::new(1.0, 1.0, 0.0),
                    Vec3::new(0.0, 1.0, 0.0),
                ],
                uvs: vec![
                    Vec2::new(0.0, 0.0),
                    Vec2::new(1.0, 0.0),
                    Vec2::new(1.0, 1.0),
                    Vec2::new(0.0, 1.0),
                ],
                triangles: vec![[0, 1, 2], [0, 2, 3]],
                material: Some(MaterialData {
                    name: "paper".to_string(),
                    diffuse: Color::new(250, 240, 230),
                    texture: None,
                }),
            }],
        }
    }

    #[test]
    fn ron_round_trip_builds_mesh() {
        let doc = ron::to_string(&quad_model()).unwrap();
        let mesh = load_model_from_str(&doc, Path::new(".")).unwrap();
        assert_eq!(mesh.len(), 2);

        let t = &mesh.triangles()[0];
        assert_eq!(t.v2, Vec3::new(400.0, 0.0, 0.0));
        assert_eq!(t.color(), Color::new(250, 240, 230));
    }

    #[test]
    fn missing_material_gets_default() {
        let mut model = quad_model();
        model.meshes[0].material = None;
        let doc = ron::to_string(&model).unwrap();
        let mesh = load_model_from_str(&doc, Path::new(".")).unwrap();
        assert_eq!(mesh.triangles()[0].color(), Color::WHITE);
    }

    #[test]
    fn bad_index_is_rejected() {
        let mut model = quad_model();
        model.meshes[0].triangles.push([0, 1, 9]);
        let doc = ron::to_string(&model).unwrap();
        let err = load_model_from_str(&doc, Path::new(".")).unwrap_err();
        assert!(matches!(err, ModelError::BadIndex { index: 9, .. }));
    }
}
