use approx::AbsDiffEq;
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A 3D vector of packed `f32` components.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// A homogeneous 4D vector, the result of applying a [`Mat4`](super::Mat4) to a point.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    pub fn subtract(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    fn to_f64(self) -> (f64, f64, f64) {
        (f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }

    fn length_f64(self) -> f64 {
        let (x, y, z) = self.to_f64();
        (x * x + y * y + z * z).sqrt()
    }

    /// Euclidean length, accumulated in double precision so that neither very large
    /// nor very small components overflow or vanish when squared.
    pub fn length(self) -> f32 {
        self.length_f64() as f32
    }

    /// Unit vector in the same direction, or [`Vec3::ZERO`] for a zero-length input.
    pub fn normalize(self) -> Self {
        let len = self.length_f64();
        if len > 0.0 {
            let (x, y, z) = self.to_f64();
            Self::new((x / len) as f32, (y / len) as f32, (z / len) as f32)
        } else {
            Self::ZERO
        }
    }

    pub fn extend(self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Vec4 {
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn truncate(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

/// Component-wise `a - b`.
pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    a.subtract(b)
}

pub fn normalize(v: Vec3) -> Vec3 {
    v.normalize()
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b)
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.subtract(rhs)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        v.to_array()
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self::new(x, y, z, w)
    }
}

impl From<glam::Vec3> for Vec3 {
    fn from(v: glam::Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for glam::Vec3 {
    fn from(v: Vec3) -> Self {
        glam::Vec3::new(v.x, v.y, v.z)
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6} {:.6} {:.6}]", self.x, self.y, self.z)
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6} {:.6} {:.6} {:.6}]", self.x, self.y, self.z, self.w)
    }
}

impl AbsDiffEq for Vec3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl AbsDiffEq for Vec4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.truncate().abs_diff_eq(&other.truncate(), epsilon) && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f32 = 1e-6;

    #[test]
    fn subtract_is_component_wise() {
        let result = subtract(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0));
        assert_abs_diff_eq!(result, Vec3::splat(-3.0), epsilon = EPS);
        assert_eq!(Vec3::new(1.0, 2.0, 3.0) - Vec3::new(4.0, 5.0, 6.0), result);
    }

    #[test]
    fn normalize_scales_to_unit_length() {
        let result = normalize(Vec3::new(3.0, 4.0, 0.0));
        assert_abs_diff_eq!(result, Vec3::new(0.6, 0.8, 0.0), epsilon = EPS);
    }

    #[test]
    fn normalize_zero_vector_is_zero() {
        assert_eq!(normalize(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn normalized_random_vectors_have_unit_length() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let v = Vec3::new(
                rng.gen_range(-100.0..100.0),
                rng.gen_range(-100.0..100.0),
                rng.gen_range(-100.0..100.0),
            );
            if v.length() == 0.0 {
                continue;
            }
            assert_abs_diff_eq!(normalize(v).length(), 1.0, epsilon = EPS);
        }
    }

    #[test]
    fn normalize_survives_extreme_magnitudes() {
        for v in [
            Vec3::new(1e20, 0.0, 0.0),
            Vec3::new(1e-25, 0.0, 0.0),
            Vec3::new(3e19, 4e19, 0.0),
            Vec3::new(-2e-30, 1e-30, 2e-30),
        ] {
            let n = normalize(v);
            assert_ne!(n, Vec3::ZERO, "{v:?} collapsed to zero");
            assert_abs_diff_eq!(n.length(), 1.0, epsilon = EPS);
        }
        assert_abs_diff_eq!(normalize(Vec3::new(3e19, 4e19, 0.0)), Vec3::new(0.6, 0.8, 0.0), epsilon = EPS);
        assert_abs_diff_eq!(Vec3::new(3e19, 4e19, 0.0).length(), 5e19, epsilon = 1e13);
    }

    #[test]
    fn cross_of_x_and_y_is_z() {
        assert_abs_diff_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z, epsilon = EPS);
        assert_abs_diff_eq!(cross(Vec3::Y, Vec3::X), -Vec3::Z, epsilon = EPS);
    }

    #[test]
    fn cross_is_orthogonal_to_inputs() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 2.0);
        let c = cross(a, b);
        assert_abs_diff_eq!(dot(c, a), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dot(c, b), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn dot_product() {
        assert_abs_diff_eq!(dot(Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, -5.0, 6.0)), 12.0, epsilon = EPS);
    }

    #[test]
    fn display_uses_six_decimals() {
        assert_eq!(Vec3::new(1.0, -0.5, 2.25).to_string(), "[1.000000 -0.500000 2.250000]");
        assert_eq!(Vec4::new(0.0, 1.0, 0.0, 1.0).to_string(), "[0.000000 1.000000 0.000000 1.000000]");
    }

    #[test]
    fn glam_conversion_keeps_components() {
        let v = Vec3::new(1.5, -2.0, 8.0);
        let g: glam::Vec3 = v.into();
        assert_eq!(g, glam::Vec3::new(1.5, -2.0, 8.0));
        assert_eq!(Vec3::from(g), v);
    }
}
