use approx::AbsDiffEq;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::Mul;

use super::vector::{Vec3, Vec4};
use crate::error::{Error, Result};

/// A 4x4 matrix of packed `f32` values in column-major order.
///
/// Element `(row, col)` lives at index `col * 4 + row`:
///
/// ```text
/// m[0] m[4] m[8]  m[12]
/// m[1] m[5] m[9]  m[13]
/// m[2] m[6] m[10] m[14]
/// m[3] m[7] m[11] m[15]
/// ```
///
/// The same layout is expected by `uniformMatrix4fv` with `transpose = false`, so
/// [`Mat4::as_slice`] can be handed to a shader uniform unchanged.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Mat4([f32; 16]);

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Sine and cosine evaluated in double precision, narrowed to `f32`.
fn sin_cos(angle: f32) -> (f32, f32) {
    let (s, c) = f64::from(angle).sin_cos();
    (s as f32, c as f32)
}

impl Mat4 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    pub const ZERO: Self = Self([0.0; 16]);

    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self(m)
    }

    pub const fn identity() -> Self {
        Self::IDENTITY
    }

    /// Identity with `(x, y, z)` packed into column 3.
    pub const fn translate(x: f32, y: f32, z: f32) -> Self {
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            x, y, z, 1.0,
        ])
    }

    pub fn rotate_x(angle: f32) -> Self {
        let (s, c) = sin_cos(angle);
        Self([
            1.0, 0.0, 0.0, 0.0, //
            0.0, c, s, 0.0, //
            0.0, -s, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotate_y(angle: f32) -> Self {
        let (s, c) = sin_cos(angle);
        Self([
            c, 0.0, -s, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            s, 0.0, c, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotate_z(angle: f32) -> Self {
        let (s, c) = sin_cos(angle);
        Self([
            c, s, 0.0, 0.0, //
            -s, c, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Right-handed view matrix looking from `eye` towards `center`.
    ///
    /// The result is undefined when `center - eye` is zero or parallel to `up`.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Self {
        let f = (center - eye).normalize();
        let s = f.cross(up).normalize();
        let u = s.cross(f);

        let tx = -s.dot(eye);
        let ty = -u.dot(eye);
        let tz = f.dot(eye);

        Self([
            s.x, u.x, -f.x, 0.0, //
            s.y, u.y, -f.y, 0.0, //
            s.z, u.z, -f.z, 0.0, //
            tx, ty, tz, 1.0,
        ])
    }

    /// OpenGL-style perspective projection mapping view-space depth to clip range `[-1, 1]`.
    ///
    /// `near` must be positive and `far` greater than `near`; nothing is checked.
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let f = 1.0 / (f64::from(fov_y) / 2.0).tan() as f32;
        let nf = 1.0 / (near - far);

        Self([
            f / aspect, 0.0, 0.0, 0.0, //
            0.0, f, 0.0, 0.0, //
            0.0, 0.0, (far + near) * nf, -1.0, //
            0.0, 0.0, (2.0 * far * near) * nf, 0.0,
        ])
    }

    /// Matrix product `self * rhs`: applied to a column vector, `rhs` acts first.
    pub fn multiply(&self, rhs: &Mat4) -> Mat4 {
        let a = &self.0;
        let b = &rhs.0;
        let mut c = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                c[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
            }
        }
        Self(c)
    }

    pub fn transpose(&self) -> Mat4 {
        let mut t = [0.0f32; 16];
        for row in 0..4 {
            for col in 0..4 {
                t[row * 4 + col] = self.0[col * 4 + row];
            }
        }
        Self(t)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    pub fn col(&self, col: usize) -> Vec4 {
        let i = col * 4;
        Vec4::new(self.0[i], self.0[i + 1], self.0[i + 2], self.0[i + 3])
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn to_cols_array(self) -> [f32; 16] {
        self.0
    }

    pub fn transform_vec4(&self, v: Vec4) -> Vec4 {
        let m = &self.0;
        Vec4::new(
            m[0] * v.x + m[4] * v.y + m[8] * v.z + m[12] * v.w,
            m[1] * v.x + m[5] * v.y + m[9] * v.z + m[13] * v.w,
            m[2] * v.x + m[6] * v.y + m[10] * v.z + m[14] * v.w,
            m[3] * v.x + m[7] * v.y + m[11] * v.z + m[15] * v.w,
        )
    }

    /// Applies the matrix to a point (w = 1) and performs the perspective divide.
    ///
    /// A point whose transformed w is exactly zero maps to the origin.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let h = self.transform_vec4(p.extend(1.0));
        if h.w != 0.0 {
            Vec3::new(h.x / h.w, h.y / h.w, h.z / h.w)
        } else {
            Vec3::ZERO
        }
    }

    pub fn transform_points(&self, points: &mut [Vec3]) {
        for p in points.iter_mut() {
            *p = self.transform_point(*p);
        }
    }

    /// Transforms packed `[x0, y0, z0, x1, ...]` coordinates in place, with perspective divide.
    ///
    /// Fails without touching `coords` if its length is not a multiple of 3.
    pub fn transform_vertices(&self, coords: &mut [f32]) -> Result<()> {
        check_triples(coords.len())?;
        for chunk in coords.chunks_exact_mut(3) {
            let p = self.transform_point(Vec3::new(chunk[0], chunk[1], chunk[2]));
            chunk.copy_from_slice(&p.to_array());
        }
        Ok(())
    }

    /// Applies the matrix to packed coordinates into a new vector, without perspective divide.
    ///
    /// Used to pre-transform static model data before it reaches the MVP pipeline.
    pub fn map_vertices(&self, coords: &[f32]) -> Result<Vec<f32>> {
        check_triples(coords.len())?;
        let mut out = Vec::with_capacity(coords.len());
        for chunk in coords.chunks_exact(3) {
            let h = self.transform_vec4(Vec4::new(chunk[0], chunk[1], chunk[2], 1.0));
            out.extend_from_slice(&[h.x, h.y, h.z]);
        }
        Ok(out)
    }
}

fn check_triples(len: usize) -> Result<()> {
    if len % 3 != 0 {
        return Err(Error::InvalidArgument(format!(
            "vertex coordinate count {len} is not a multiple of 3"
        )));
    }
    Ok(())
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        self.multiply(&rhs)
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    fn mul(self, rhs: Vec4) -> Vec4 {
        self.transform_vec4(rhs)
    }
}

impl From<[f32; 16]> for Mat4 {
    fn from(m: [f32; 16]) -> Self {
        Self(m)
    }
}

impl From<glam::Mat4> for Mat4 {
    fn from(m: glam::Mat4) -> Self {
        Self(m.to_cols_array())
    }
}

impl From<Mat4> for glam::Mat4 {
    fn from(m: Mat4) -> Self {
        glam::Mat4::from_cols_array(&m.0)
    }
}

impl fmt::Display for Mat4 {
    /// Prints one matrix row per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..4 {
            writeln!(
                f,
                "[{:.6} {:.6} {:.6} {:.6}]",
                self.get(row, 0),
                self.get(row, 1),
                self.get(row, 2),
                self.get(row, 3)
            )?;
        }
        Ok(())
    }
}

impl AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}
