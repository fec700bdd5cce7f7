//! Vector and matrix math for 3D rendering
//!
//! All coordinates are f64. `Matrix3` keeps the legacy column-read transform
//! convention its rotation builders are written against; `Matrix4` uses the
//! standard row-major homogeneous product. The two conventions are not
//! interchangeable and callers compose rotations assuming each matrix type's
//! own `transform`.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 3D vector / point
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Returns the zero vector when the length is zero.
    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f64) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f64> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f64) -> Vec3 {
        self.scale(s)
    }
}

/// 2D vector (texture coordinates)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Error building a matrix from a slice of the wrong length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixError {
    pub expected: usize,
    pub got: usize,
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "matrix needs {} elements, got {}", self.expected, self.got)
    }
}

/// A spatial mapping applied to points
pub trait Transform {
    fn transform(&self, v: Vec3) -> Vec3;
}

/// Row-major 3x3 transform matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    m: [f64; 9],
}

impl Matrix3 {
    pub fn new(m: [f64; 9]) -> Self {
        Self { m }
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, MatrixError> {
        let m: [f64; 9] = values.try_into().map_err(|_| MatrixError {
            expected: 9,
            got: values.len(),
        })?;
        Ok(Self { m })
    }

    pub fn identity() -> Self {
        Self::new([
            1.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ])
    }

    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::new([
            sx, 0.0, 0.0, //
            0.0, sy, 0.0, //
            0.0, 0.0, sz,
        ])
    }

    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            1.0, 0.0, 0.0, //
            0.0, c, s, //
            0.0, -s, c,
        ])
    }

    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c, 0.0, -s, //
            0.0, 1.0, 0.0, //
            s, 0.0, c,
        ])
    }

    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c, s, 0.0, //
            -s, c, 0.0, //
            0.0, 0.0, 1.0,
        ])
    }

    pub fn multiply(&self, other: &Matrix3) -> Matrix3 {
        let mut r = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                for i in 0..3 {
                    r[row * 3 + col] += self.m[row * 3 + i] * other.m[i * 3 + col];
                }
            }
        }
        Matrix3 { m: r }
    }
}

impl Transform for Matrix3 {
    /// Reads matrix columns as the coefficient vectors; the rotation builders
    /// above store their entries against this convention.
    fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            v.x * m[0] + v.y * m[3] + v.z * m[6],
            v.x * m[1] + v.y * m[4] + v.z * m[7],
            v.x * m[2] + v.y * m[5] + v.z * m[8],
        )
    }
}

/// Row-major 4x4 homogeneous transform matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    m: [f64; 16],
}

impl Matrix4 {
    pub fn new(m: [f64; 16]) -> Self {
        Self { m }
    }

    pub fn from_slice(values: &[f64]) -> Result<Self, MatrixError> {
        let m: [f64; 16] = values.try_into().map_err(|_| MatrixError {
            expected: 16,
            got: values.len(),
        })?;
        Ok(Self { m })
    }

    pub fn identity() -> Self {
        Self::new([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn translation(tx: f64, ty: f64, tz: f64) -> Self {
        Self::new([
            1.0, 0.0, 0.0, tx, //
            0.0, 1.0, 0.0, ty, //
            0.0, 0.0, 1.0, tz, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, -s, 0.0, //
            0.0, s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c, 0.0, s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            -s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            c, -s, 0.0, 0.0, //
            s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Self::new([
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, sz, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn multiply(&self, other: &Matrix4) -> Matrix4 {
        let mut r = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                for i in 0..4 {
                    r[row * 4 + col] += self.m[row * 4 + i] * other.m[i * 4 + col];
                }
            }
        }
        Matrix4 { m: r }
    }
}

impl Transform for Matrix4 {
    /// Standard row-major homogeneous product. The divide is skipped when w
    /// is 0 or exactly 1, which covers every affine matrix built above.
    fn transform(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        let x = v.x * m[0] + v.y * m[1] + v.z * m[2] + m[3];
        let y = v.x * m[4] + v.y * m[5] + v.z * m[6] + m[7];
        let z = v.x * m[8] + v.y * m[9] + v.z * m[10] + m[11];
        let w = v.x * m[12] + v.y * m[13] + v.z * m[14] + m[15];
        if w != 0.0 && w != 1.0 {
            return Vec3::new(x / w, y / w, z / w);
        }
        Vec3::new(x, y, z)
    }
}

/// Signed area term shared by the barycentric weights below.
/// Zero means the screen-space triangle is degenerate.
pub fn signed_area(v1: Vec3, v2: Vec3, v3: Vec3) -> f64 {
    (v1.y - v3.y) * (v2.x - v3.x) + (v2.y - v3.y) * (v3.x - v1.x)
}

/// Barycentric weights of pixel center (x, y) in the screen-space triangle
/// (v1, v2, v3). `area` must come from [`signed_area`] of the same vertices.
pub fn barycentric(x: f64, y: f64, v1: Vec3, v2: Vec3, v3: Vec3, area: f64) -> (f64, f64, f64) {
    let b1 = ((y - v3.y) * (v2.x - v3.x) + (v2.y - v3.y) * (v3.x - x)) / area;
    let b2 = ((y - v1.y) * (v3.x - v1.x) + (v3.y - v1.y) * (v1.x - x)) / area;
    let b3 = ((y - v2.y) * (v1.x - v2.x) + (v1.y - v2.y) * (v2.x - x)) / area;
    (b1, b2, b3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS && (a.z - b.z).abs() < EPS
    }

    #[test]
    fn vec3_dot_cross() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(4.0, 5.0, 6.0);
        assert!((a.dot(b) - 32.0).abs() < EPS);

        let c = Vec3::new(1.0, 0.0, 0.0).cross(Vec3::new(0.0, 1.0, 0.0));
        assert!(approx(c, Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn normalize_zero_is_zero() {
        assert_eq!(Vec3::ZERO.normalize(), Vec3::ZERO);
    }

    #[test]
    fn vec3_operators() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(a + b, Vec3::new(1.5, 1.0, 5.0));
        assert_eq!(a - b, Vec3::new(0.5, 3.0, 1.0));
        assert_eq!(a * 2.0, Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn scale_matrices() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(
            Matrix3::scale(2.0, 3.0, 4.0).transform(p),
            Vec3::new(2.0, 6.0, 12.0)
        );
        assert_eq!(
            Matrix4::scale(2.0, 3.0, 4.0).transform(p),
            Vec3::new(2.0, 6.0, 12.0)
        );
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert_eq!(
            Matrix3::from_slice(&[1.0; 8]),
            Err(MatrixError { expected: 9, got: 8 })
        );
        assert_eq!(
            Matrix4::from_slice(&[1.0; 17]),
            Err(MatrixError { expected: 16, got: 17 })
        );
        assert!(Matrix3::from_slice(&[0.0; 9]).is_ok());
        assert!(Matrix4::from_slice(&[0.0; 16]).is_ok());
    }

    #[test]
    fn matrix4_identity_is_exact() {
        let p = Vec3::new(0.1, -2.5, 371.25);
        assert_eq!(Matrix4::identity().transform(p), p);
    }

    #[test]
    fn rotation_round_trips() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        for theta in [0.3, -1.2, 2.9] {
            assert!(approx(
                Matrix3::rotation_x(theta).transform(Matrix3::rotation_x(-theta).transform(p)),
                p
            ));
            assert!(approx(
                Matrix3::rotation_y(theta).transform(Matrix3::rotation_y(-theta).transform(p)),
                p
            ));
            assert!(approx(
                Matrix3::rotation_z(theta).transform(Matrix3::rotation_z(-theta).transform(p)),
                p
            ));
            assert!(approx(
                Matrix4::rotation_x(theta).transform(Matrix4::rotation_x(-theta).transform(p)),
                p
            ));
            assert!(approx(
                Matrix4::rotation_y(theta).transform(Matrix4::rotation_y(-theta).transform(p)),
                p
            ));
            assert!(approx(
                Matrix4::rotation_z(theta).transform(Matrix4::rotation_z(-theta).transform(p)),
                p
            ));
        }
    }

    #[test]
    fn matrix3_composition_applies_left_factor_first() {
        // With the column-read transform, a.multiply(b) maps a point through
        // a's transform and then b's.
        let a = Matrix3::rotation_y(0.7);
        let b = Matrix3::rotation_x(0.35);
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(approx(
            a.multiply(&b).transform(p),
            b.transform(a.transform(p))
        ));
    }

    #[test]
    fn matrix4_composition_applies_right_factor_first() {
        let a = Matrix4::translation(1.0, 2.0, 3.0);
        let b = Matrix4::rotation_z(0.5);
        let p = Vec3::new(-4.0, 0.5, 2.0);
        assert!(approx(
            a.multiply(&b).transform(p),
            a.transform(b.transform(p))
        ));
    }

    #[test]
    fn matrix4_translation() {
        let p = Matrix4::translation(10.0, -20.0, 0.5).transform(Vec3::new(1.0, 1.0, 1.0));
        assert_eq!(p, Vec3::new(11.0, -19.0, 1.5));
    }

    #[test]
    fn matrix4_divides_by_w_when_not_unit() {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 2.0; // w = 2 for every input point
        let p = Matrix4::new(m).transform(Vec3::new(4.0, 6.0, 8.0));
        assert!(approx(p, Vec3::new(2.0, 3.0, 4.0)));
    }

    #[test]
    fn barycentric_vertex_is_covered() {
        let v1 = Vec3::new(10.0, 10.0, 0.0);
        let v2 = Vec3::new(50.0, 10.0, 0.0);
        let v3 = Vec3::new(30.0, 50.0, 0.0);
        let area = signed_area(v1, v2, v3);
        let (b1, b2, b3) = barycentric(v1.x, v1.y, v1, v2, v3, area);
        assert!((b1 - 1.0).abs() < EPS);
        assert!(b2.abs() < EPS);
        assert!(b3.abs() < EPS);
    }

    #[test]
    fn barycentric_weights_sum_to_one_inside() {
        let v1 = Vec3::new(0.0, 0.0, 0.0);
        let v2 = Vec3::new(10.0, 0.0, 0.0);
        let v3 = Vec3::new(5.0, 10.0, 0.0);
        let area = signed_area(v1, v2, v3);
        let (b1, b2, b3) = barycentric(5.0, 3.0, v1, v2, v3, area);
        assert!(b1 >= 0.0 && b2 >= 0.0 && b3 >= 0.0);
        assert!((b1 + b2 + b3 - 1.0).abs() < EPS);
    }
}
