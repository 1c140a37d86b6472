//! wgpu device and buffer backend
//!
//! `GpuContext` owns a device and queue obtained without a surface. `WgpuBackend`
//! maps [`BufferHandle`]s onto `wgpu::Buffer`s created on that device.

use super::buffer::{BufferHandle, BufferTarget, BufferUsage, ElementType, GraphicsBackend, TypedView};
use crate::error::{Error, Result};
use wgpu::util::DeviceExt;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: wgpu::AdapterInfo,
}

impl GpuContext {
    /// Requests an adapter and device with no presentation surface.
    pub async fn headless() -> Result<Self> {
        let instance = wgpu::Instance::default();
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| Error::ContextUnavailable("no suitable wgpu adapter".into()))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Point Cloud Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(|e| Error::ContextUnavailable(e.to_string()))?;

        let adapter_info = adapter.get_info();
        log::info!("using {} ({:?})", adapter_info.name, adapter_info.backend);

        Ok(Self {
            device,
            queue,
            adapter_info,
        })
    }
}

struct GpuBuffer {
    buffer: wgpu::Buffer,
    element_type: ElementType,
    byte_len: usize,
}

pub struct WgpuBackend<'a> {
    context: &'a GpuContext,
    buffers: Vec<Option<GpuBuffer>>,
    bound_array: Option<BufferHandle>,
    bound_element_array: Option<BufferHandle>,
}

impl<'a> WgpuBackend<'a> {
    pub fn new(context: &'a GpuContext) -> Self {
        Self {
            context,
            buffers: Vec::new(),
            bound_array: None,
            bound_element_array: None,
        }
    }

    /// The device buffer behind `handle`, once data has been uploaded to it.
    ///
    /// Its `size()` is rounded up to `wgpu::COPY_BUFFER_ALIGNMENT`, so it can exceed
    /// the uploaded data. Use [`WgpuBackend::byte_len`] for the staged byte count.
    pub fn buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.gpu_buffer(handle).map(|b| &b.buffer)
    }

    /// Bytes of host data last uploaded to `handle`, without alignment padding.
    pub fn byte_len(&self, handle: BufferHandle) -> Option<usize> {
        self.gpu_buffer(handle).map(|b| b.byte_len)
    }

    /// Index format for an index buffer holding `u16` or `u32` data.
    pub fn index_format(&self, handle: BufferHandle) -> Option<wgpu::IndexFormat> {
        match self.gpu_buffer(handle)?.element_type {
            ElementType::U16 => Some(wgpu::IndexFormat::Uint16),
            ElementType::U32 => Some(wgpu::IndexFormat::Uint32),
            ElementType::F32 => None,
        }
    }

    fn gpu_buffer(&self, handle: BufferHandle) -> Option<&GpuBuffer> {
        self.buffers.get(handle.0 as usize).and_then(Option::as_ref)
    }

    fn bound(&mut self, target: BufferTarget) -> &mut Option<BufferHandle> {
        match target {
            BufferTarget::Array => &mut self.bound_array,
            BufferTarget::ElementArray => &mut self.bound_element_array,
        }
    }
}

fn usages(target: BufferTarget) -> wgpu::BufferUsages {
    match target {
        BufferTarget::Array => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        BufferTarget::ElementArray => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    }
}

impl GraphicsBackend for WgpuBackend<'_> {
    fn create_buffer(&mut self) -> Result<BufferHandle> {
        let id = u32::try_from(self.buffers.len())
            .map_err(|_| Error::BufferCreationFailed("handle space exhausted".into()))?;
        self.buffers.push(None);
        Ok(BufferHandle(id))
    }

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Result<()> {
        if handle.0 as usize >= self.buffers.len() {
            return Err(Error::UnknownHandle(handle));
        }
        *self.bound(target) = Some(handle);
        Ok(())
    }

    fn buffer_data(&mut self, target: BufferTarget, view: &TypedView, usage: BufferUsage) -> Result<()> {
        let handle = (*self.bound(target)).ok_or(Error::NoBufferBound(target))?;
        let bytes = view.as_bytes();
        let slot = &mut self.buffers[handle.0 as usize];

        // same-size dynamic data is written in place; queue writes need 4-byte multiples
        if let Some(existing) = slot.as_mut() {
            let in_place = usage == BufferUsage::DynamicDraw
                && existing.buffer.size() == bytes.len() as u64
                && existing.buffer.usage().contains(usages(target))
                && bytes.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0;
            if in_place {
                self.context.queue.write_buffer(&existing.buffer, 0, bytes);
                existing.element_type = view.element_type();
                existing.byte_len = bytes.len();
                return Ok(());
            }
        }

        let label = match target {
            BufferTarget::Array => "Vertex Buffer",
            BufferTarget::ElementArray => "Index Buffer",
        };
        let buffer = self.context.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytes,
            usage: usages(target),
        });
        *slot = Some(GpuBuffer {
            buffer,
            element_type: view.element_type(),
            byte_len: bytes.len(),
        });
        Ok(())
    }
}
