//! In-memory backend
//!
//! Keeps every staged buffer and an ordered log of calls. Used headless by the native
//! demo and by the tests to observe exactly what the upload bridge and the scene did.

use super::buffer::{BufferHandle, BufferTarget, BufferUsage, ElementType, GraphicsBackend, TypedView};
use super::scene::{DrawBackend, DrawMode, Drawable};
use crate::error::{Error, Result};
use crate::math::Mat4;

#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateBuffer(BufferHandle),
    BindBuffer {
        target: BufferTarget,
        handle: BufferHandle,
    },
    BufferData {
        target: BufferTarget,
        element_type: ElementType,
        byte_len: usize,
        usage: BufferUsage,
    },
    SetMvp([f32; 16]),
    Draw {
        mode: DrawMode,
        vertex_count: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StagedBuffer {
    pub target: BufferTarget,
    pub usage: BufferUsage,
    pub view: TypedView,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<BackendCall>,
    buffers: Vec<Option<StagedBuffer>>,
    bound_array: Option<BufferHandle>,
    bound_element_array: Option<BufferHandle>,
    mvp: Option<Mat4>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of buffers ever created.
    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn upload_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BackendCall::BufferData { .. }))
            .count()
    }

    pub fn staged(&self, handle: BufferHandle) -> Option<&StagedBuffer> {
        self.buffers.get(handle.0 as usize).and_then(Option::as_ref)
    }

    /// The last matrix passed to [`DrawBackend::set_mvp`].
    pub fn mvp(&self) -> Option<Mat4> {
        self.mvp
    }

    fn slot(&self, handle: BufferHandle) -> Result<&Option<StagedBuffer>> {
        self.buffers.get(handle.0 as usize).ok_or(Error::UnknownHandle(handle))
    }

    fn bound(&mut self, target: BufferTarget) -> &mut Option<BufferHandle> {
        match target {
            BufferTarget::Array => &mut self.bound_array,
            BufferTarget::ElementArray => &mut self.bound_element_array,
        }
    }

    /// Elements staged in `handle`, failing when the buffer is unknown or still empty.
    fn staged_len(&self, handle: BufferHandle) -> Result<usize> {
        match self.slot(handle)? {
            Some(staged) => Ok(staged.view.len()),
            None => Err(Error::InvalidArgument(format!("buffer {handle:?} has no data"))),
        }
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let id = u32::try_from(self.buffers.len())
            .map_err(|_| Error::BufferCreationFailed("handle space exhausted".into()))?;
        let handle = BufferHandle(id);
        self.buffers.push(None);
        self.calls.push(BackendCall::CreateBuffer(handle));
        Ok(handle)
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Result<()> {
        self.slot(handle)?;
        *self.bound(target) = Some(handle);
        self.calls.push(BackendCall::BindBuffer { target, handle });
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, view: &TypedView, usage: BufferUsage) -> Result<()> {
        let handle = (*self.bound(target)).ok_or(Error::NoBufferBound(target))?;
        self.buffers[handle.0 as usize] = Some(StagedBuffer {
            target,
            usage,
            view: view.clone(),
        });
        self.calls.push(BackendCall::BufferData {
            target,
            element_type: view.element_type(),
            byte_len: view.byte_len(),
            usage,
        });
        Ok(())
    }
}

impl DrawBackend for RecordingBackend {
    fn set_mvp(&mut self, mvp: &Mat4) -> Result<()> {
        self.mvp = Some(*mvp);
        self.calls.push(BackendCall::SetMvp(mvp.to_cols_array()));
        Ok(())
    }

    fn draw(&mut self, drawable: &Drawable) -> Result<()> {
        let positions = self.staged_len(drawable.positions)?;
        let colors = self.staged_len(drawable.colors)?;
        let needed_colors = drawable.vertex_count * drawable.color_components;
        if positions < drawable.vertex_count * 3 || colors < needed_colors {
            return Err(Error::InvalidArgument(format!(
                "draw of {} vertices exceeds staged data ({positions} position and {colors} color values)",
                drawable.vertex_count
            )));
        }

        *self.bound(BufferTarget::Array) = Some(drawable.colors);
        self.calls.push(BackendCall::Draw {
            mode: drawable.mode,
            vertex_count: drawable.vertex_count,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_data_without_binding_fails() {
        let mut backend = RecordingBackend::new();
        backend.create_buffer().unwrap();
        let view = TypedView::from_bytes(ElementType::U16, vec![0, 0]).unwrap();
        let err = backend
            .buffer_data(BufferTarget::ElementArray, &view, BufferUsage::StaticDraw)
            .unwrap_err();
        assert_eq!(err, Error::NoBufferBound(BufferTarget::ElementArray));
    }

    #[test]
    fn binding_unknown_handle_fails() {
        let mut backend = RecordingBackend::new();
        let err = backend.bind_buffer(BufferTarget::Array, BufferHandle(3)).unwrap_err();
        assert_eq!(err, Error::UnknownHandle(BufferHandle(3)));
    }

    #[test]
    fn targets_are_bound_independently() {
        let mut backend = RecordingBackend::new();
        let vertices = backend.create_buffer().unwrap();
        let indices = backend.create_buffer().unwrap();
        backend.bind_buffer(BufferTarget::Array, vertices).unwrap();
        backend.bind_buffer(BufferTarget::ElementArray, indices).unwrap();

        let view = TypedView::from_bytes(ElementType::U32, vec![1, 0, 0, 0]).unwrap();
        backend.buffer_data(BufferTarget::ElementArray, &view, BufferUsage::StaticDraw).unwrap();

        assert!(backend.staged(vertices).is_none());
        assert_eq!(backend.staged(indices).unwrap().view, view);
    }

    #[test]
    fn draw_rejects_unstaged_buffers() {
        let mut backend = RecordingBackend::new();
        let positions = backend.create_buffer().unwrap();
        let colors = backend.create_buffer().unwrap();
        let drawable = Drawable {
            positions,
            colors,
            color_components: 3,
            vertex_count: 1,
            mode: DrawMode::Points,
        };
        assert!(matches!(backend.draw(&drawable), Err(Error::InvalidArgument(_))));
    }
}
