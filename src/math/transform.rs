use super::matrix::Mat4;
use std::f32::consts::TAU;

/// The matrices needed to draw one frame.
///
/// Recomputed by the caller before any buffer or draw call of that frame reads it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

impl FrameState {
    pub fn new(model: Mat4, view: Mat4, projection: Mat4) -> Self {
        Self {
            model,
            view,
            projection,
        }
    }

    pub fn with_model(self, model: Mat4) -> Self {
        Self { model, ..self }
    }

    pub fn view_model(&self) -> Mat4 {
        self.view.multiply(&self.model)
    }

    /// `projection * (view * model)`.
    pub fn mvp(&self) -> Mat4 {
        self.projection.multiply(&self.view_model())
    }
}

/// Constant-rate rotation about the Y axis used as the scene's model matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    pub angle: f32,
    pub step: f32,
}

impl Default for Spin {
    fn default() -> Self {
        Self {
            angle: 0.0,
            step: 0.01,
        }
    }
}

impl Spin {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    /// Advances by one step, wrapping back into `[0, 2π)` for either sign of `step`.
    pub fn advance(&mut self) -> f32 {
        let angle = (self.angle + self.step).rem_euclid(TAU);
        // rem_euclid can round up to TAU itself for tiny negative inputs
        self.angle = if angle < TAU { angle } else { 0.0 };
        self.angle
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::rotate_y(self.angle)
    }
}
