use crate::math::{FrameState, Mat4, Vec3};
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};

/// Perspective parameters behind [`Mat4::perspective`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: FRAC_PI_4,
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Lens {
    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov_y, self.aspect, self.near, self.far)
    }
}

/// Fixed viewpoint on the scene: an eye looking at `center` through a [`Lens`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub center: Vec3,
    pub up: Vec3,
    pub lens: Lens,
}

impl Default for Camera {
    fn default() -> Self {
        Self::looking_at(Vec3::splat(3.0), Vec3::ZERO)
    }
}

impl Camera {
    /// Y-up camera with the default lens.
    pub fn looking_at(eye: Vec3, center: Vec3) -> Self {
        Self {
            eye,
            center,
            up: Vec3::Y,
            lens: Lens::default(),
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.center, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        self.lens.matrix()
    }

    /// Matrices for drawing `model` from this camera.
    pub fn frame(&self, model: Mat4) -> FrameState {
        FrameState::new(model, self.view(), self.projection())
    }

    /// Matches the lens aspect to a viewport. A zero-height viewport keeps the old aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.lens.aspect = width as f32 / height as f32;
        }
    }

    pub fn distance(&self) -> f32 {
        (self.center - self.eye).length()
    }
}

/// Drag-to-rotate, wheel-to-zoom camera orbiting the origin, with inertia after release.
pub struct OrbitController {
    pub distance: f32,
    pub rotation_x: f32,
    pub rotation_y: f32,
    pub zoom: f32,
    pub damping: f32,
    pub min_rotation_x: f32,
    pub max_rotation_x: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    velocity_x: f32,
    velocity_y: f32,
    dragging: bool,
    last_mouse: (f64, f64),
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(3.0)
    }
}

const ROTATE_SPEED: f32 = 0.01;
const VELOCITY_SCALE: f32 = 0.5;
const ZOOM_FACTOR: f32 = 1.1;

impl OrbitController {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            rotation_x: 0.0,
            rotation_y: 0.0,
            zoom: 1.0,
            damping: 0.9,
            min_rotation_x: -FRAC_PI_2 * 0.999,
            max_rotation_x: FRAC_PI_2 * 0.999,
            min_zoom: 0.1,
            max_zoom: 10.0,
            velocity_x: 0.0,
            velocity_y: 0.0,
            dragging: false,
            last_mouse: (0.0, 0.0),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.velocity_x, self.velocity_y)
    }

    pub fn on_mouse_down(&mut self, x: f64, y: f64) {
        self.dragging = true;
        self.last_mouse = (x, y);
        self.velocity_x = 0.0;
        self.velocity_y = 0.0;
    }

    pub fn on_mouse_up(&mut self) {
        self.dragging = false;
    }

    pub fn on_mouse_move(&mut self, x: f64, y: f64) {
        if !self.dragging {
            return;
        }
        let dx = (x - self.last_mouse.0) as f32;
        let dy = (y - self.last_mouse.1) as f32;

        self.rotation_y += dx * ROTATE_SPEED;
        self.rotation_x += dy * ROTATE_SPEED;
        self.clamp_rotation();

        self.velocity_x = dx * VELOCITY_SCALE;
        self.velocity_y = dy * VELOCITY_SCALE;
        self.last_mouse = (x, y);
    }

    /// Negative deltas (wheel up) zoom in.
    pub fn on_scroll(&mut self, delta_y: f64) {
        if delta_y < 0.0 {
            self.zoom *= ZOOM_FACTOR;
        } else {
            self.zoom /= ZOOM_FACTOR;
        }
        self.zoom = self.zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Keeps rotating with decaying velocity once the drag has ended.
    pub fn update(&mut self) {
        if self.dragging || (self.velocity_x == 0.0 && self.velocity_y == 0.0) {
            return;
        }
        self.rotation_y += self.velocity_x * ROTATE_SPEED;
        self.rotation_x += self.velocity_y * ROTATE_SPEED;
        self.velocity_x *= self.damping;
        self.velocity_y *= self.damping;
        self.clamp_rotation();
    }

    fn clamp_rotation(&mut self) {
        self.rotation_x = self.rotation_x.clamp(self.min_rotation_x, self.max_rotation_x);
    }

    /// `translate(0, 0, -distance / zoom) * rotate_x(pitch) * rotate_y(yaw)`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::identity()
            .multiply(&Mat4::translate(0.0, 0.0, -self.distance / self.zoom))
            .multiply(&Mat4::rotate_x(self.rotation_x))
            .multiply(&Mat4::rotate_y(self.rotation_y))
    }
}
