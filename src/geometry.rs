//! Mesh construction and subdivision utilities

use crate::rasterizer::{Color, Mesh, Triangle, Vec3};

/// Axis-aligned cube centered at the origin, 12 flat-shaded triangles.
pub fn cube(size: f64, color: Color) -> Mesh {
    let hs = size / 2.0;

    let v000 = Vec3::new(-hs, -hs, -hs);
    let v001 = Vec3::new(-hs, -hs, hs);
    let v010 = Vec3::new(-hs, hs, -hs);
    let v011 = Vec3::new(-hs, hs, hs);
    let v100 = Vec3::new(hs, -hs, -hs);
    let v101 = Vec3::new(hs, -hs, hs);
    let v110 = Vec3::new(hs, hs, -hs);
    let v111 = Vec3::new(hs, hs, hs);

    Mesh::from_triangles(vec![
        // Front
        Triangle::flat(v101, v001, v011, color),
        Triangle::flat(v101, v011, v111, color),
        // Back
        Triangle::flat(v100, v110, v010, color),
        Triangle::flat(v100, v010, v000, color),
        // Left
        Triangle::flat(v000, v010, v011, color),
        Triangle::flat(v000, v011, v001, color),
        // Right
        Triangle::flat(v100, v101, v111, color),
        Triangle::flat(v100, v111, v110, color),
        // Top
        Triangle::flat(v010, v110, v111, color),
        Triangle::flat(v010, v111, v011, color),
        // Bottom
        Triangle::flat(v000, v001, v101, color),
        Triangle::flat(v000, v101, v100, color),
    ])
}

/// Subdivide every triangle into four and project all vertices onto the
/// sphere of the given radius, rounding the mesh toward a sphere.
///
/// Output triangles are flat-shaded with the source triangle's color;
/// subdivision drops UVs. A vertex at the origin has no direction to project
/// along and comes out as NaN.
pub fn inflate(mesh: &Mesh, radius: f64) -> Mesh {
    let mut triangles = Vec::with_capacity(mesh.len() * 4);

    for t in mesh.triangles() {
        let m1 = midpoint(t.v1, t.v2);
        let m2 = midpoint(t.v2, t.v3);
        let m3 = midpoint(t.v1, t.v3);
        let color = t.color();

        triangles.push(Triangle::flat(t.v1, m1, m3, color));
        triangles.push(Triangle::flat(t.v2, m1, m2, color));
        triangles.push(Triangle::flat(t.v3, m2, m3, color));
        triangles.push(Triangle::flat(m1, m2, m3, color));
    }

    let projected = triangles
        .into_iter()
        .map(|t| {
            let color = t.color();
            Triangle::flat(
                project_to_sphere(t.v1, radius),
                project_to_sphere(t.v2, radius),
                project_to_sphere(t.v3, radius),
                color,
            )
        })
        .collect();

    Mesh::from_triangles(projected)
}

fn midpoint(a: Vec3, b: Vec3) -> Vec3 {
    (a + b).scale(0.5)
}

// No zero-length guard: the division is the documented NaN edge case.
fn project_to_sphere(v: Vec3, radius: f64) -> Vec3 {
    let l = v.len();
    Vec3::new(v.x / l * radius, v.y / l * radius, v.z / l * radius)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_faces() {
        let mesh = cube(2.0, Color::CYAN);
        assert_eq!(mesh.len(), 12);
        for t in mesh.triangles() {
            for v in [t.v1, t.v2, t.v3] {
                assert_eq!(v.x.abs(), 1.0);
                assert_eq!(v.y.abs(), 1.0);
                assert_eq!(v.z.abs(), 1.0);
            }
        }
    }

    #[test]
    fn inflate_quadruples_and_projects() {
        let mesh = inflate(&cube(2.0, Color::RED), 5.0);
        assert_eq!(mesh.len(), 48);
        for t in mesh.triangles() {
            assert_eq!(t.color(), Color::RED);
            for v in [t.v1, t.v2, t.v3] {
                assert!((v.len() - 5.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn inflate_leaves_source_untouched() {
        let mesh = cube(2.0, Color::RED);
        let before: Vec<Vec3> = mesh.triangles().iter().map(|t| t.v1).collect();
        let _ = inflate(&mesh, 3.0);
        let after: Vec<Vec3> = mesh.triangles().iter().map(|t| t.v1).collect();
        assert_eq!(before, after);
    }
}
