//! Rendering module
//!
//! This module contains the typed buffer upload bridge, the backends it drives, the
//! camera, geometry producers and the point-cloud scene.

pub mod buffer;
pub mod camera;
pub mod context;
pub mod mesh;
pub mod recording;
pub mod scene;

pub use buffer::{
    reupload_buffer, upload_buffer, upload_typed, BufferHandle, BufferTarget, BufferUsage, Element, ElementType,
    GraphicsBackend, TypedData, TypedView,
};
pub use camera::{Camera, Lens, OrbitController};
pub use context::{GpuContext, WgpuBackend};
pub use mesh::Geometry;
pub use recording::{BackendCall, RecordingBackend, StagedBuffer};
pub use scene::{DrawBackend, DrawMode, Drawable, PointCloudScene, SceneConfig, SceneGeometry};
