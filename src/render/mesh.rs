use crate::error::{Error, Result};
use crate::math::{Mat4, Vec3, Vec4};
use rand::Rng;
use std::f32::consts::{FRAC_PI_2, PI};

const RED: [f32; 3] = [1.0, 0.0, 0.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const GRID_COLOR: [f32; 4] = [0.4, 0.4, 0.4, 1.0];

/// Flat vertex data: 3 position floats per vertex and `color_components` color
/// floats per vertex (3 for RGB, 4 for RGBA).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub positions: Vec<f32>,
    pub colors: Vec<f32>,
    pub color_components: usize,
}

impl Geometry {
    /// Positions with one color repeated for every vertex.
    pub fn with_uniform_color(positions: Vec<f32>, color: &[f32]) -> Self {
        let vertex_count = positions.len() / 3;
        let colors = color.repeat(vertex_count);
        Self {
            positions,
            colors,
            color_components: color.len(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Appends another geometry with the same color layout.
    ///
    /// Mixing RGB and RGBA data would misalign every color after the join, so a
    /// layout mismatch is rejected and `self` is left as it was.
    pub fn append(&mut self, other: Geometry) -> Result<()> {
        if self.is_empty() {
            *self = other;
            return Ok(());
        }
        if self.color_components != other.color_components {
            return Err(Error::InvalidArgument(format!(
                "cannot append {}-component colors to {}-component colors",
                other.color_components, self.color_components
            )));
        }
        self.positions.extend(other.positions);
        self.colors.extend(other.colors);
        Ok(())
    }
}

fn circle_point(radius: f32, angle: f32) -> (f32, f32) {
    let (s, c) = f64::from(angle).sin_cos();
    (radius * c as f32, radius * s as f32)
}

/// `count` white points uniformly distributed inside the unit ball (rejection sampling).
pub fn unit_sphere_points<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Geometry {
    let mut positions = Vec::with_capacity(count * 3);
    while positions.len() < count * 3 {
        let x = 2.0 * rng.gen::<f32>() - 1.0;
        let y = 2.0 * rng.gen::<f32>() - 1.0;
        let z = 2.0 * rng.gen::<f32>() - 1.0;
        if x * x + y * y + z * z <= 1.0 {
            positions.extend_from_slice(&[x, y, z]);
        }
    }
    Geometry::with_uniform_color(positions, &WHITE)
}

/// Gaussian cluster around `center` (Box-Muller), colored RGBA with full alpha.
pub fn normal_cluster<R: Rng + ?Sized>(rng: &mut R, count: usize, center: Vec3, std_dev: f32, color: Vec3) -> Geometry {
    let mut positions = Vec::with_capacity(count * 3);
    for _ in 0..count {
        // gen() is in [0, 1); shift away from 0 so ln() stays finite
        let u1 = 1.0 - f64::from(rng.gen::<f32>());
        let u2 = f64::from(rng.gen::<f32>());
        let mag = std_dev * (-2.0 * u1.ln()).sqrt() as f32;
        let z0 = mag * (2.0 * std::f64::consts::PI * u2).cos() as f32;
        let z1 = mag * (2.0 * std::f64::consts::PI * u2).sin() as f32;

        let u3 = 1.0 - f64::from(rng.gen::<f32>());
        let u4 = f64::from(rng.gen::<f32>());
        let mag2 = std_dev * (-2.0 * u3.ln()).sqrt() as f32;
        let z2 = mag2 * (2.0 * std::f64::consts::PI * u4).cos() as f32;

        positions.extend_from_slice(&[center.x + z0, center.y + z1, center.z + z2]);
    }
    Geometry::with_uniform_color(positions, &[color.x, color.y, color.z, 1.0])
}

/// Three axis lines from `-size` to `size`: X red, Y green, Z blue (RGBA).
pub fn axes(size: f32) -> Geometry {
    let positions = vec![
        -size, 0.0, 0.0, size, 0.0, 0.0, //
        0.0, -size, 0.0, 0.0, size, 0.0, //
        0.0, 0.0, -size, 0.0, 0.0, size,
    ];
    let mut colors = Vec::with_capacity(24);
    for rgb in [RED, GREEN, BLUE] {
        for _ in 0..2 {
            colors.extend_from_slice(&rgb);
            colors.push(1.0);
        }
    }
    Geometry {
        positions,
        colors,
        color_components: 4,
    }
}

/// Grid lines in the XZ, XY and YZ planes, skipping the centre line the axes already draw.
pub fn grid(size: f32, divisions: u32) -> Geometry {
    let mut positions = Vec::new();
    let step = size / divisions as f32;
    let divisions = divisions as i32;

    for i in -divisions..=divisions {
        if i == 0 {
            continue;
        }
        let pos = i as f32 * step;

        // XZ plane
        positions.extend_from_slice(&[-size, 0.0, pos, size, 0.0, pos]);
        positions.extend_from_slice(&[pos, 0.0, -size, pos, 0.0, size]);
        // XY plane
        positions.extend_from_slice(&[-size, pos, 0.0, size, pos, 0.0]);
        positions.extend_from_slice(&[pos, -size, 0.0, pos, size, 0.0]);
        // YZ plane
        positions.extend_from_slice(&[0.0, pos, -size, 0.0, pos, size]);
        positions.extend_from_slice(&[0.0, -size, pos, 0.0, size, pos]);
    }
    Geometry::with_uniform_color(positions, &GRID_COLOR)
}

/// Circle in the XY plane as line-segment pairs (two vertices per segment).
pub fn circle(radius: f32, segments: u32) -> Vec<f32> {
    let step = 2.0 * PI / segments as f32;
    let mut vertices = Vec::with_capacity(segments as usize * 6);
    for i in 0..segments {
        let (x1, y1) = circle_point(radius, i as f32 * step);
        let (x2, y2) = circle_point(radius, (i + 1) as f32 * step);
        vertices.extend_from_slice(&[x1, y1, 0.0, x2, y2, 0.0]);
    }
    vertices
}

/// Triangle soup for a cylinder centred at the origin along Y, with both caps.
pub fn cylinder(radius: f32, height: f32, segments: u32) -> Vec<f32> {
    let half_height = height / 2.0;
    let step = 2.0 * PI / segments as f32;
    let top_center = [0.0, half_height, 0.0];
    let bottom_center = [0.0, -half_height, 0.0];
    let mut vertices = Vec::with_capacity(segments as usize * 36);

    for i in 0..segments {
        let (x1, z1) = circle_point(radius, i as f32 * step);
        let (x2, z2) = circle_point(radius, (i + 1) as f32 * step);

        let bottom_left = [x1, -half_height, z1];
        let bottom_right = [x2, -half_height, z2];
        let top_left = [x1, half_height, z1];
        let top_right = [x2, half_height, z2];

        for v in [
            // side
            bottom_left,
            bottom_right,
            top_left,
            top_left,
            bottom_right,
            top_right,
            // top cap
            top_center,
            top_left,
            top_right,
            // bottom cap, reversed winding
            bottom_center,
            bottom_right,
            bottom_left,
        ] {
            vertices.extend_from_slice(&v);
        }
    }
    vertices
}

/// One thin cylinder per axis: X red, Y green, Z blue (RGB).
pub fn axis_cylinders(radius: f32, length: f32, segments: u32) -> Geometry {
    let y_axis = cylinder(radius, length, segments);
    tinted_copies(
        &y_axis,
        [
            (Mat4::rotate_z(-FRAC_PI_2), RED),
            (Mat4::IDENTITY, GREEN),
            (Mat4::rotate_x(FRAC_PI_2), BLUE),
        ],
    )
}

/// Unit circles around each axis: YZ plane red, XZ plane green, XY plane blue (RGB).
pub fn reference_circles(radius: f32, segments: u32) -> Geometry {
    let base = circle(radius, segments);
    tinted_copies(
        &base,
        [
            (Mat4::rotate_y(FRAC_PI_2), RED),
            (Mat4::rotate_x(FRAC_PI_2), GREEN),
            (Mat4::IDENTITY, BLUE),
        ],
    )
}

/// One transformed copy of `base` per entry, each in a single RGB color.
fn tinted_copies<const N: usize>(base: &[f32], copies: [(Mat4, [f32; 3]); N]) -> Geometry {
    let vertex_count = base.len() / 3;
    let mut positions = Vec::with_capacity(vertex_count * 3 * N);
    let mut colors = Vec::with_capacity(vertex_count * 3 * N);
    for (matrix, color) in copies {
        for p in base.chunks_exact(3) {
            let h = matrix.transform_vec4(Vec4::new(p[0], p[1], p[2], 1.0));
            positions.extend_from_slice(&[h.x, h.y, h.z]);
            colors.extend_from_slice(&color);
        }
    }
    Geometry {
        positions,
        colors,
        color_components: 3,
    }
}
