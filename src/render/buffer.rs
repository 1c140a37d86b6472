//! Typed buffer uploads
//!
//! Moves host-owned `f32`/`u16`/`u32` arrays into backend buffer objects. The element
//! type is carried explicitly from the host slice to the backend view, and the bytes
//! handed to the backend are exactly `element_count * element_size` long.

use crate::error::{Error, Result};

/// Opaque token naming a buffer object owned by a [`GraphicsBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    F32,
    U16,
    U32,
}

impl ElementType {
    /// Size of one element in bytes.
    pub const fn size(self) -> usize {
        match self {
            ElementType::F32 | ElementType::U32 => 4,
            ElementType::U16 => 2,
        }
    }
}

/// Binding point for a buffer: vertex attributes or indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
}

/// Hint for how often the contents will be replaced. Never affects correctness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Host element types that can be uploaded: `f32`, `u16` and `u32`.
pub trait Element: Copy + sealed::Sealed {
    const ELEMENT_TYPE: ElementType;

    fn typed_data(data: &[Self]) -> TypedData<'_>;
}

impl Element for f32 {
    const ELEMENT_TYPE: ElementType = ElementType::F32;

    fn typed_data(data: &[Self]) -> TypedData<'_> {
        TypedData::F32(data)
    }
}

impl Element for u16 {
    const ELEMENT_TYPE: ElementType = ElementType::U16;

    fn typed_data(data: &[Self]) -> TypedData<'_> {
        TypedData::U16(data)
    }
}

impl Element for u32 {
    const ELEMENT_TYPE: ElementType = ElementType::U32;

    fn typed_data(data: &[Self]) -> TypedData<'_> {
        TypedData::U32(data)
    }
}

/// A borrowed host array tagged with its element type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypedData<'a> {
    F32(&'a [f32]),
    U16(&'a [u16]),
    U32(&'a [u32]),
}

impl TypedData<'_> {
    pub fn element_type(&self) -> ElementType {
        match self {
            TypedData::F32(_) => ElementType::F32,
            TypedData::U16(_) => ElementType::U16,
            TypedData::U32(_) => ElementType::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TypedData::F32(d) => d.len(),
            TypedData::U16(d) => d.len(),
            TypedData::U32(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.element_type().size()
    }
}

impl<'a, T: Element> From<&'a [T]> for TypedData<'a> {
    fn from(data: &'a [T]) -> Self {
        T::typed_data(data)
    }
}

impl<'a, T: Element> From<&'a Vec<T>> for TypedData<'a> {
    fn from(data: &'a Vec<T>) -> Self {
        T::typed_data(data.as_slice())
    }
}

/// Backend-ready copy of a host array: an element type tag plus the native-endian
/// bytes of every element, with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedView {
    element_type: ElementType,
    bytes: Vec<u8>,
}

impl TypedView {
    /// Serializes `data` element by element. Empty input is rejected.
    pub fn new(data: TypedData<'_>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidArgument(format!(
                "cannot upload an empty {:?} array",
                data.element_type()
            )));
        }

        let mut bytes = Vec::with_capacity(data.byte_len());
        match data {
            TypedData::F32(d) => d.iter().for_each(|v| bytes.extend_from_slice(&v.to_ne_bytes())),
            TypedData::U16(d) => d.iter().for_each(|v| bytes.extend_from_slice(&v.to_ne_bytes())),
            TypedData::U32(d) => d.iter().for_each(|v| bytes.extend_from_slice(&v.to_ne_bytes())),
        }
        debug_assert_eq!(bytes.len(), data.byte_len());

        Ok(Self {
            element_type: data.element_type(),
            bytes,
        })
    }

    /// Wraps raw native-endian bytes. The length must be a non-zero multiple of the element size.
    pub fn from_bytes(element_type: ElementType, bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() || bytes.len() % element_type.size() != 0 {
            return Err(Error::InvalidArgument(format!(
                "{} bytes do not form a whole number of {:?} elements",
                bytes.len(),
                element_type
            )));
        }
        Ok(Self { element_type, bytes })
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.bytes.len() / self.element_type.size()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decodes the contents as `f32` values, or `None` for integer views.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.element_type != ElementType::F32 {
            return None;
        }
        Some(
            self.bytes
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}

/// The buffer capabilities the upload bridge needs from a graphics API.
pub trait GraphicsBackend {
    /// Allocates a new, empty buffer object.
    fn create_buffer(&mut self) -> Result<BufferHandle>;

    fn bind_buffer(&mut self, target: BufferTarget, handle: BufferHandle) -> Result<()>;

    /// Replaces the contents of the buffer currently bound to `target`.
    fn buffer_data(&mut self, target: BufferTarget, view: &TypedView, usage: BufferUsage) -> Result<()>;
}

/// Uploads a host slice into a freshly allocated buffer and returns its handle.
///
/// The element type is picked from `T` at compile time.
pub fn upload_buffer<B, T>(backend: &mut B, data: &[T], target: BufferTarget, usage: BufferUsage) -> Result<BufferHandle>
where
    B: GraphicsBackend + ?Sized,
    T: Element,
{
    upload_typed(backend, TypedData::from(data), target, usage)
}

/// Uploads a tagged host array into a freshly allocated buffer.
///
/// Validation happens first: on failure the backend sees no call at all. On success
/// exactly one buffer is created and exactly one upload is issued.
pub fn upload_typed<B>(backend: &mut B, data: TypedData<'_>, target: BufferTarget, usage: BufferUsage) -> Result<BufferHandle>
where
    B: GraphicsBackend + ?Sized,
{
    let view = TypedView::new(data)?;
    let handle = backend.create_buffer()?;
    backend.bind_buffer(target, handle)?;
    backend.buffer_data(target, &view, usage)?;

    log::debug!(
        "uploaded {} {:?} elements ({} bytes) to {:?} {:?}",
        view.len(),
        view.element_type(),
        view.byte_len(),
        target,
        handle
    );
    Ok(handle)
}

/// Replaces the contents of an existing buffer without allocating a new one.
pub fn reupload_buffer<B, T>(
    backend: &mut B,
    handle: BufferHandle,
    data: &[T],
    target: BufferTarget,
    usage: BufferUsage,
) -> Result<()>
where
    B: GraphicsBackend + ?Sized,
    T: Element,
{
    let view = TypedView::new(TypedData::from(data))?;
    backend.bind_buffer(target, handle)?;
    backend.buffer_data(target, &view, usage)?;

    log::debug!("re-uploaded {} bytes to {:?}", view.byte_len(), handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::{BackendCall, RecordingBackend};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn element_sizes() {
        assert_eq!(ElementType::F32.size(), 4);
        assert_eq!(ElementType::U16.size(), 2);
        assert_eq!(ElementType::U32.size(), 4);
    }

    #[test]
    fn typed_data_infers_element_type() {
        let f: &[f32] = &[1.0, 2.0];
        let h: &[u16] = &[1, 2, 3];
        let w: &[u32] = &[7];
        assert_eq!(TypedData::from(f).element_type(), ElementType::F32);
        assert_eq!(TypedData::from(h).element_type(), ElementType::U16);
        assert_eq!(TypedData::from(h).byte_len(), 6);
        assert_eq!(TypedData::from(w).element_type(), ElementType::U32);
    }

    #[test]
    fn float_upload_stages_four_bytes_per_element() {
        let mut backend = RecordingBackend::new();
        let data = [0.5f32, -1.0, 2.0, 3.25, 4.0, 5.0];
        let handle = upload_buffer(&mut backend, &data, BufferTarget::Array, BufferUsage::StaticDraw).unwrap();

        let staged = backend.staged(handle).unwrap();
        assert_eq!(staged.view.element_type(), ElementType::F32);
        assert_eq!(staged.view.byte_len(), data.len() * 4);
        assert_eq!(staged.view.to_f32_vec().unwrap(), data.to_vec());
        assert_eq!(staged.target, BufferTarget::Array);
    }

    #[test]
    fn index_upload_stages_two_bytes_per_element() {
        let mut backend = RecordingBackend::new();
        let indices: Vec<u16> = vec![0, 1, 2, 2, 1, 3, 4];
        let handle =
            upload_buffer(&mut backend, &indices, BufferTarget::ElementArray, BufferUsage::StaticDraw).unwrap();

        let staged = backend.staged(handle).unwrap();
        assert_eq!(staged.view.element_type(), ElementType::U16);
        assert_eq!(staged.view.byte_len(), indices.len() * 2);
        assert_eq!(staged.view.to_f32_vec(), None);
    }

    #[test]
    fn empty_upload_is_invalid_and_touches_nothing() {
        let mut backend = RecordingBackend::new();
        let empty: [f32; 0] = [];
        let err = upload_buffer(&mut backend, &empty, BufferTarget::Array, BufferUsage::StaticDraw).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(backend.calls().is_empty());
        assert_eq!(backend.buffer_count(), 0);

        let empty: Vec<u32> = Vec::new();
        assert!(matches!(
            upload_typed(&mut backend, TypedData::from(&empty), BufferTarget::ElementArray, BufferUsage::StaticDraw),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn upload_issues_create_bind_data_once() {
        let mut backend = RecordingBackend::new();
        let handle = upload_buffer(&mut backend, &[1u32, 2, 3], BufferTarget::ElementArray, BufferUsage::DynamicDraw)
            .unwrap();
        assert_eq!(
            backend.calls(),
            &[
                BackendCall::CreateBuffer(handle),
                BackendCall::BindBuffer {
                    target: BufferTarget::ElementArray,
                    handle
                },
                BackendCall::BufferData {
                    target: BufferTarget::ElementArray,
                    element_type: ElementType::U32,
                    byte_len: 12,
                    usage: BufferUsage::DynamicDraw
                },
            ]
        );
    }

    #[test]
    fn each_upload_allocates_a_new_buffer() {
        let mut backend = RecordingBackend::new();
        let a = upload_buffer(&mut backend, &[1.0f32], BufferTarget::Array, BufferUsage::StaticDraw).unwrap();
        let b = upload_buffer(&mut backend, &[1.0f32], BufferTarget::Array, BufferUsage::StaticDraw).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.buffer_count(), 2);
    }

    #[test]
    fn reupload_replaces_contents_without_allocating() {
        let mut backend = RecordingBackend::new();
        let handle = upload_buffer(&mut backend, &[1.0f32, 2.0, 3.0], BufferTarget::Array, BufferUsage::DynamicDraw)
            .unwrap();
        reupload_buffer(&mut backend, handle, &[4.0f32, 5.0], BufferTarget::Array, BufferUsage::DynamicDraw).unwrap();

        assert_eq!(backend.buffer_count(), 1);
        assert_eq!(backend.upload_count(), 2);
        assert_eq!(backend.staged(handle).unwrap().view.to_f32_vec().unwrap(), vec![4.0, 5.0]);
    }

    #[test]
    fn reupload_to_unknown_handle_fails() {
        let mut backend = RecordingBackend::new();
        let err = reupload_buffer(&mut backend, BufferHandle(9), &[1u16], BufferTarget::ElementArray, BufferUsage::StaticDraw)
            .unwrap_err();
        assert_eq!(err, Error::UnknownHandle(BufferHandle(9)));
    }

    #[test]
    fn random_uploads_are_byte_exact() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut backend = RecordingBackend::new();
        for _ in 0..200 {
            let n = rng.gen_range(1..300);
            match rng.gen_range(0..3) {
                0 => {
                    let data: Vec<f32> = (0..n).map(|_| rng.gen_range(-1e6..1e6)).collect();
                    let h = upload_buffer(&mut backend, &data, BufferTarget::Array, BufferUsage::StaticDraw).unwrap();
                    let view = &backend.staged(h).unwrap().view;
                    assert_eq!(view.byte_len(), n * 4);
                    assert_eq!(view.as_bytes(), bytemuck::cast_slice::<f32, u8>(&data));
                }
                1 => {
                    let data: Vec<u16> = (0..n).map(|_| rng.gen()).collect();
                    let h = upload_buffer(&mut backend, &data, BufferTarget::ElementArray, BufferUsage::StaticDraw)
                        .unwrap();
                    let view = &backend.staged(h).unwrap().view;
                    assert_eq!(view.byte_len(), n * 2);
                    assert_eq!(view.as_bytes(), bytemuck::cast_slice::<u16, u8>(&data));
                }
                _ => {
                    let data: Vec<u32> = (0..n).map(|_| rng.gen()).collect();
                    let h = upload_buffer(&mut backend, &data, BufferTarget::ElementArray, BufferUsage::StaticDraw)
                        .unwrap();
                    let view = &backend.staged(h).unwrap().view;
                    assert_eq!(view.byte_len(), n * 4);
                    assert_eq!(view.len(), n);
                    assert_eq!(view.as_bytes(), bytemuck::cast_slice::<u32, u8>(&data));
                }
            }
        }
    }

    #[test]
    fn from_bytes_requires_whole_elements() {
        assert!(TypedView::from_bytes(ElementType::U16, vec![1, 2, 3, 4]).is_ok());
        assert!(matches!(
            TypedView::from_bytes(ElementType::F32, vec![0; 6]),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(TypedView::from_bytes(ElementType::U32, Vec::new()), Err(Error::InvalidArgument(_))));
    }
}
