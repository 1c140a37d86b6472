//! Math module
//!
//! Fixed-size vector and column-major matrix types used by the renderer, plus the
//! per-frame model/view/projection context.

mod matrix;
mod transform;
mod vector;

pub use matrix::Mat4;
pub use transform::{FrameState, Spin};
pub use vector::{cross, dot, normalize, subtract, Vec3, Vec4};
