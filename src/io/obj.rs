//! Wavefront OBJ loading with MTL materials and textures
//!
//! Supports `v`, `vt`, `f` (faces with more than 3 vertices are fan
//! triangulated), `mtllib` and `usemtl`. From MTL files: `newmtl`, `Kd` and
//! `map_Kd`. Model units are scaled on load and Y is negated to match screen
//! coordinates.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use crate::rasterizer::{Color, Image, Material, Mesh, Texture, Triangle, Vec2, Vec3};

/// Model units are multiplied by this on load.
const SCALE: f64 = 400.0;

/// Error type for OBJ loading
#[derive(Debug)]
pub enum ObjError {
    Io(std::io::Error),
    Parse { line: usize, message: String },
}

impl From<std::io::Error> for ObjError {
    fn from(e: std::io::Error) -> Self {
        ObjError::Io(e)
    }
}

impl std::fmt::Display for ObjError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjError::Io(e) => write!(f, "IO error: {}", e),
            ObjError::Parse { line, message } => write!(f, "Parse error at line {}: {}", line, message),
        }
    }
}

/// Load an OBJ file; MTL files and textures resolve relative to it.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, ObjError> {
    let path = path.as_ref();
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file = File::open(path)?;
    parse_obj(BufReader::new(file), base_dir)
}

/// Parse OBJ text from any reader.
pub fn parse_obj<R: BufRead>(reader: R, base_dir: &Path) -> Result<Mesh, ObjError> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut uvs: Vec<Vec2> = Vec::new();
    let mut triangles: Vec<Triangle> = Vec::new();
    let mut materials: HashMap<String, Arc<Material>> = HashMap::new();
    let mut current = Arc::new(Material::new("default"));

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = i + 1;

        if let Some(rest) = line.strip_prefix("v ") {
            let c = parse_floats(rest, 3, line_no)?;
            vertices.push(Vec3::new(c[0] * SCALE, -c[1] * SCALE, c[2] * SCALE));
        } else if let Some(rest) = line.strip_prefix("vt ") {
            let c = parse_floats(rest, 2, line_no)?;
            uvs.push(Vec2::new(c[0], c[1]));
        } else if let Some(name) = line.strip_prefix("usemtl ") {
            let name = name.trim();
            current = materials
                .get(name)
                .cloned()
                .unwrap_or_else(|| Arc::new(Material::new(name)));
        } else if let Some(name) = line.strip_prefix("mtllib ") {
            let mtl_path = base_dir.join(name.trim());
            match load_mtl(&mtl_path, base_dir) {
                Ok(loaded) => materials.extend(loaded),
                Err(e) => eprintln!("Failed to read MTL {}: {}", mtl_path.display(), e),
            }
        } else if let Some(rest) = line.strip_prefix("f ") {
            parse_face(rest, line_no, &vertices, &uvs, &current, &mut triangles)?;
        }
    }

    println!(
        "Loaded OBJ: {} vertices, {} triangles, {} UVs",
        vertices.len(),
        triangles.len(),
        uvs.len()
    );

    Ok(Mesh::from_triangles(triangles))
}

fn parse_face(
    rest: &str,
    line_no: usize,
    vertices: &[Vec3],
    uvs: &[Vec2],
    material: &Arc<Material>,
    triangles: &mut Vec<Triangle>,
) -> Result<(), ObjError> {
    let corners: Vec<&str> = rest.split_whitespace().collect();
    if corners.len() < 3 {
        return Ok(()); // ignore malformed face lines
    }

    let mut v_indices = Vec::with_capacity(corners.len());
    let mut t_indices = Vec::with_capacity(corners.len());

    for corner in &corners {
        let mut parts = corner.split('/');
        let v = parts.next().unwrap_or_default();
        v_indices.push(parse_index(v, line_no)?);

        match parts.next() {
            Some(t) if !t.is_empty() => t_indices.push(parse_index(t, line_no)?),
            _ => {
                eprintln!("Face without UV at line {}, using index 0", line_no);
                t_indices.push(0);
            }
        }
    }

    // Fan triangulation for faces with more than 3 corners
    for i in 1..v_indices.len() - 1 {
        let v1 = vertex_at(vertices, v_indices[0], line_no)?;
        let v2 = vertex_at(vertices, v_indices[i], line_no)?;
        let v3 = vertex_at(vertices, v_indices[i + 1], line_no)?;

        let uv1 = uvs.get(t_indices[0]).copied().unwrap_or_default();
        let uv2 = uvs.get(t_indices[i]).copied().unwrap_or_default();
        let uv3 = uvs.get(t_indices[i + 1]).copied().unwrap_or_default();

        triangles.push(Triangle::textured(v1, v2, v3, [uv1, uv2, uv3], material.clone()));
    }

    Ok(())
}

fn vertex_at(vertices: &[Vec3], index: usize, line_no: usize) -> Result<Vec3, ObjError> {
    vertices.get(index).copied().ok_or_else(|| ObjError::Parse {
        line: line_no,
        message: format!("vertex index {} out of range", index + 1),
    })
}

fn parse_index(token: &str, line_no: usize) -> Result<usize, ObjError> {
    let value: usize = token.parse().map_err(|_| ObjError::Parse {
        line: line_no,
        message: format!("bad index '{}'", token),
    })?;
    if value == 0 {
        return Err(ObjError::Parse {
            line: line_no,
            message: "indices are 1-based".to_string(),
        });
    }
    Ok(value - 1)
}

fn parse_floats(rest: &str, count: usize, line_no: usize) -> Result<Vec<f64>, ObjError> {
    let values: Vec<f64> = rest
        .split_whitespace()
        .take(count)
        .map(|t| t.parse())
        .collect::<Result<_, _>>()
        .map_err(|e| ObjError::Parse {
            line: line_no,
            message: format!("bad number: {}", e),
        })?;
    if values.len() < count {
        return Err(ObjError::Parse {
            line: line_no,
            message: format!("expected {} values, got {}", count, values.len()),
        });
    }
    Ok(values)
}

fn load_mtl(path: &Path, base_dir: &Path) -> Result<HashMap<String, Arc<Material>>, ObjError> {
    let file = File::open(path)?;
    let mut materials = HashMap::new();
    let mut current: Option<Material> = None;

    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        let line = line.trim();
        let line_no = i + 1;

        if let Some(name) = line.strip_prefix("newmtl ") {
            if let Some(done) = current.take() {
                materials.insert(done.name.clone(), Arc::new(done));
            }
            current = Some(Material::new(name.trim()));
        } else if let Some(rest) = line.strip_prefix("Kd ") {
            let c = parse_floats(rest, 3, line_no)?;
            if let Some(mat) = current.as_mut() {
                mat.diffuse = Color::new(
                    (c[0] * 255.0 + 0.5) as u8,
                    (c[1] * 255.0 + 0.5) as u8,
                    (c[2] * 255.0 + 0.5) as u8,
                );
            }
        } else if let Some(name) = line.strip_prefix("map_Kd ") {
            let tex_path = base_dir.join(name.trim());
            if tex_path.exists() {
                match Image::from_file(&tex_path) {
                    Ok(img) => {
                        if let Some(mat) = current.as_mut() {
                            mat.texture = Some(Texture::new(img));
                        }
                    }
                    Err(e) => eprintln!("{}", e),
                }
            } else {
                eprintln!("Texture not found: {}", tex_path.display());
            }
        }
    }

    if let Some(done) = current.take() {
        materials.insert(done.name.clone(), Arc::new(done));
    }

    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::FaceKind;
    use std::io::Cursor;

    #[test]
    fn parses_vertices_uvs_and_faces() {
        let data = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";
        let mesh = parse_obj(Cursor::new(data), Path::new(".")).unwrap();
        assert_eq!(mesh.len(), 1);

        let t = &mesh.triangles()[0];
        assert_eq!(t.v2, Vec3::new(400.0, 0.0, 0.0));
        // Y is negated on load
        assert_eq!(t.v3, Vec3::new(0.0, -400.0, 0.0));
        match &t.kind {
            FaceKind::Textured { uv, .. } => {
                assert_eq!(uv[1], Vec2::new(1.0, 0.0));
                assert_eq!(uv[2], Vec2::new(0.0, 1.0));
            }
            FaceKind::Flat(_) => panic!("OBJ faces carry a material"),
        }
    }

    #[test]
    fn fan_triangulates_quads() {
        let data = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let mesh = parse_obj(Cursor::new(data), Path::new(".")).unwrap();
        assert_eq!(mesh.len(), 2);
    }

    #[test]
    fn face_without_uv_falls_back() {
        let data = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let mesh = parse_obj(Cursor::new(data), Path::new(".")).unwrap();
        let t = &mesh.triangles()[0];
        match &t.kind {
            FaceKind::Textured { uv, .. } => assert_eq!(uv[0], Vec2::new(0.0, 0.0)),
            FaceKind::Flat(_) => panic!("OBJ faces carry a material"),
        }
    }

    #[test]
    fn bad_vertex_index_fails() {
        let data = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n";
        let err = parse_obj(Cursor::new(data), Path::new(".")).unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 4, .. }));
    }

    #[test]
    fn bad_number_reports_line() {
        let data = "v 0 0 zero\n";
        let err = parse_obj(Cursor::new(data), Path::new(".")).unwrap_err();
        assert!(matches!(err, ObjError::Parse { line: 1, .. }));
    }
}
