//! # point-cloud-gl
//!
//! Column-major 3D math and typed GPU buffer uploads for an interactive point-cloud
//! viewer running in the browser over WebGL.
//!
//! ## Features
//! - `Vec3`/`Vec4`/`Mat4` with fixed arity and column-major layout (`col * 4 + row`)
//! - Camera and projection construction (`look_at`, OpenGL-style `perspective`)
//! - Typed buffer uploads with exact byte counts and explicit element types
//! - Backends: in-memory recorder, headless wgpu, WebGL (wasm32)
//!
//! ## Example
//! ```rust
//! use point_cloud_gl::math::{FrameState, Mat4, Vec3};
//! use point_cloud_gl::render::{upload_buffer, BufferTarget, BufferUsage, RecordingBackend};
//!
//! let frame = FrameState::new(
//!     Mat4::rotate_y(0.5),
//!     Mat4::look_at(Vec3::splat(3.0), Vec3::ZERO, Vec3::Y),
//!     Mat4::perspective(std::f32::consts::FRAC_PI_4, 1.0, 0.1, 100.0),
//! );
//! let mvp = frame.mvp();
//! assert_eq!(mvp.as_slice().len(), 16);
//!
//! let mut backend = RecordingBackend::new();
//! let positions = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0];
//! let handle = upload_buffer(&mut backend, &positions, BufferTarget::Array, BufferUsage::StaticDraw)?;
//! assert_eq!(backend.staged(handle).unwrap().view.byte_len(), 24);
//! # Ok::<(), point_cloud_gl::Error>(())
//! ```

pub mod error;
pub mod math;
pub mod render;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::{Error, Result};
pub use math::{FrameState, Mat4, Spin, Vec3, Vec4};
pub use render::{
    upload_buffer, BufferHandle, BufferTarget, BufferUsage, DrawBackend, ElementType, GraphicsBackend,
    PointCloudScene, RecordingBackend, SceneConfig, SceneGeometry,
};
