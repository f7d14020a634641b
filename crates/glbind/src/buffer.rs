//! Typed GPU buffers.
//!
//! A [`Buffer<T>`] remembers the host scalar type and tuple size of its
//! contents so it can configure a vertex attribute pointer on its own.

use std::cell::Cell;
use std::marker::PhantomData;
use std::ops::BitOr;

use gl::types::{GLbitfield, GLenum, GLint, GLuint};
use glbind_core::bytes::slice_as_bytes;
use glbind_core::{check_errors, Gl, GlApi, GlScalar, ObjectKind, Result};

use crate::object::{Bindable, GpuObject, Handle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
    ShaderStorage,
    PixelPack,
    PixelUnpack,
    CopyRead,
    CopyWrite,
    Texture,
    TransformFeedback,
    DrawIndirect,
    DispatchIndirect,
    AtomicCounter,
    Query,
}

impl BufferTarget {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Array => gl::ARRAY_BUFFER,
            Self::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
            Self::Uniform => gl::UNIFORM_BUFFER,
            Self::ShaderStorage => gl::SHADER_STORAGE_BUFFER,
            Self::PixelPack => gl::PIXEL_PACK_BUFFER,
            Self::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
            Self::CopyRead => gl::COPY_READ_BUFFER,
            Self::CopyWrite => gl::COPY_WRITE_BUFFER,
            Self::Texture => gl::TEXTURE_BUFFER,
            Self::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
            Self::DrawIndirect => gl::DRAW_INDIRECT_BUFFER,
            Self::DispatchIndirect => gl::DISPATCH_INDIRECT_BUFFER,
            Self::AtomicCounter => gl::ATOMIC_COUNTER_BUFFER,
            Self::Query => gl::QUERY_BUFFER,
        }
    }
}

/// Usage hint for mutable storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    StreamDraw,
    StreamRead,
    StreamCopy,
    #[default]
    StaticDraw,
    StaticRead,
    StaticCopy,
    DynamicDraw,
    DynamicRead,
    DynamicCopy,
}

impl Usage {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::StreamDraw => gl::STREAM_DRAW,
            Self::StreamRead => gl::STREAM_READ,
            Self::StreamCopy => gl::STREAM_COPY,
            Self::StaticDraw => gl::STATIC_DRAW,
            Self::StaticRead => gl::STATIC_READ,
            Self::StaticCopy => gl::STATIC_COPY,
            Self::DynamicDraw => gl::DYNAMIC_DRAW,
            Self::DynamicRead => gl::DYNAMIC_READ,
            Self::DynamicCopy => gl::DYNAMIC_COPY,
        }
    }
}

/// `glBufferStorage` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StorageFlags(pub GLbitfield);

impl StorageFlags {
    pub const NONE: Self = Self(0);
    pub const DYNAMIC_STORAGE: Self = Self(gl::DYNAMIC_STORAGE_BIT);
    pub const MAP_READ: Self = Self(gl::MAP_READ_BIT);
    pub const MAP_WRITE: Self = Self(gl::MAP_WRITE_BIT);
    pub const MAP_PERSISTENT: Self = Self(gl::MAP_PERSISTENT_BIT);
    pub const MAP_COHERENT: Self = Self(gl::MAP_COHERENT_BIT);
    pub const CLIENT_STORAGE: Self = Self(gl::CLIENT_STORAGE_BIT);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for StorageFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// How a buffer's data store is specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Respecifiable with `glBufferData`.
    Mutable(Usage),
    /// Fixed size, allocated once with `glBufferStorage`.
    Immutable(StorageFlags),
}

impl Default for Storage {
    fn default() -> Self {
        Self::Mutable(Usage::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    pub target: BufferTarget,
    pub storage: Storage,
    /// GL type of one scalar, e.g. `GL_FLOAT`.
    pub scalar_type: GLenum,
    /// Scalars per vertex attribute element (1..=4).
    pub tuple_size: usize,
    /// Integer scalars reach float attributes mapped to [0, 1] or [-1, 1].
    pub normalized: bool,
}

/// A buffer a vertex attribute can be sourced from.
///
/// Object-safe view of [`Buffer<T>`] used by the binding resolver.
pub trait AttributeBuffer {
    /// Bind to the buffer's target, creating it if needed.
    fn bind_source(&self) -> Result<()>;
    fn scalar_type(&self) -> GLenum;
    fn tuple_size(&self) -> usize;
    fn normalized(&self) -> bool;
}

pub struct Buffer<T: GlScalar> {
    handle: Handle,
    target: BufferTarget,
    storage: Storage,
    scalar_type: GLenum,
    tuple_size: Cell<usize>,
    normalized: bool,
    len: Cell<usize>,
    _marker: PhantomData<T>,
}

impl<T: GlScalar> Buffer<T> {
    /// A mutable `GL_STATIC_DRAW` buffer.
    pub fn new(gl: Gl, target: BufferTarget) -> Self {
        Self::with_storage(gl, target, Storage::default())
    }

    pub fn with_storage(gl: Gl, target: BufferTarget, storage: Storage) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Buffer),
            target,
            storage,
            scalar_type: T::GL_TYPE,
            tuple_size: Cell::new(1),
            normalized: true,
            len: Cell::new(0),
            _marker: PhantomData,
        }
    }

    /// Create a buffer holding `data`, read as `tuple_size`-wide elements.
    #[track_caller]
    pub fn from_data(gl: Gl, target: BufferTarget, data: &[T], tuple_size: usize) -> Result<Self> {
        let buffer = Self::new(gl, target);
        buffer.allocate(data, tuple_size)?;
        Ok(buffer)
    }

    /// Report a different scalar type to attribute pointers, e.g.
    /// `GL_HALF_FLOAT` for `u16` storage.
    pub fn with_scalar_type(mut self, scalar_type: GLenum) -> Self {
        self.scalar_type = scalar_type;
        self
    }

    /// Whether integer data is normalized when sourced by a float
    /// attribute. On by default; GL ignores it for float data.
    pub fn with_normalized(mut self, normalized: bool) -> Self {
        self.normalized = normalized;
        self
    }

    /// Upload `data` as the whole data store.
    #[track_caller]
    pub fn allocate(&self, data: &[T], tuple_size: usize) -> Result<()> {
        self.specify(std::mem::size_of_val(data), Some(slice_as_bytes(data)))?;
        self.len.set(data.len());
        self.tuple_size.set(tuple_size);
        Ok(())
    }

    /// Allocate room for `len` scalars without initializing them.
    #[track_caller]
    pub fn reserve(&self, len: usize, tuple_size: usize) -> Result<()> {
        self.specify(len * std::mem::size_of::<T>(), None)?;
        self.len.set(len);
        self.tuple_size.set(tuple_size);
        Ok(())
    }

    #[track_caller]
    fn specify(&self, size: usize, data: Option<&[u8]>) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        let target = self.target.gl_enum();
        match self.storage {
            Storage::Mutable(usage) => gl.buffer_data(target, size, data, usage.gl_enum()),
            Storage::Immutable(flags) => gl.buffer_storage(target, size, data, flags.0),
        }
        check_errors(gl)?;
        self.unbind()
    }

    /// Overwrite scalars starting at element `offset`.
    ///
    /// Immutable buffers need [`StorageFlags::DYNAMIC_STORAGE`].
    #[track_caller]
    pub fn write(&self, offset: usize, data: &[T]) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        gl.buffer_sub_data(
            self.target.gl_enum(),
            offset * std::mem::size_of::<T>(),
            slice_as_bytes(data),
        );
        check_errors(gl)?;
        self.unbind()
    }

    pub fn descriptor(&self) -> BufferDescriptor {
        BufferDescriptor {
            target: self.target,
            storage: self.storage,
            scalar_type: self.scalar_type,
            tuple_size: self.tuple_size.get(),
            normalized: self.normalized,
        }
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// Number of scalars in the data store.
    pub fn len(&self) -> usize {
        self.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len.get() == 0
    }

    /// Number of `tuple_size`-wide elements.
    pub fn element_count(&self) -> usize {
        self.len.get() / self.tuple_size.get().max(1)
    }
}

impl<T: GlScalar> GpuObject for Buffer<T> {
    fn id(&self) -> GLuint {
        self.handle.id()
    }

    #[track_caller]
    fn create(&self) -> Result<()> {
        self.handle.create().map(drop)
    }

    #[track_caller]
    fn release(&self) -> Result<()> {
        self.handle.release()
    }
}

impl<T: GlScalar> Bindable for Buffer<T> {
    #[track_caller]
    fn bind(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.handle.gl().bind_buffer(self.target.gl_enum(), id);
        check_errors(self.handle.gl())
    }

    #[track_caller]
    fn unbind(&self) -> Result<()> {
        self.handle.gl().bind_buffer(self.target.gl_enum(), 0);
        check_errors(self.handle.gl())
    }
}

impl<T: GlScalar> AttributeBuffer for Buffer<T> {
    #[track_caller]
    fn bind_source(&self) -> Result<()> {
        self.bind()
    }

    fn scalar_type(&self) -> GLenum {
        self.scalar_type
    }

    fn tuple_size(&self) -> usize {
        self.tuple_size.get()
    }

    fn normalized(&self) -> bool {
        self.normalized
    }
}

/// Point attribute `index` at `buffer`, starting `offset` bytes in.
///
/// The buffer is left bound to its target.
#[track_caller]
pub(crate) fn set_attribute_pointer(
    gl: &dyn GlApi,
    index: GLuint,
    buffer: &dyn AttributeBuffer,
    offset: usize,
) -> Result<()> {
    buffer.bind_source()?;
    gl.vertex_attrib_pointer(
        index,
        buffer.tuple_size() as GLint,
        buffer.scalar_type(),
        buffer.normalized(),
        0,
        offset,
    );
    check_errors(gl)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;
    use glbind_core::Error;

    use super::*;

    #[test]
    fn allocate_tracks_layout() {
        let mock = Rc::new(MockGl::new());
        let positions = [0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0];
        let buffer = Buffer::from_data(mock.clone(), BufferTarget::Array, &positions, 2).unwrap();

        assert_eq!(buffer.len(), 6);
        assert_eq!(buffer.element_count(), 3);
        assert_eq!(
            buffer.descriptor(),
            BufferDescriptor {
                target: BufferTarget::Array,
                storage: Storage::Mutable(Usage::StaticDraw),
                scalar_type: gl::FLOAT,
                tuple_size: 2,
                normalized: true,
            }
        );
        assert_eq!(
            mock.buffer_contents(buffer.id()).unwrap(),
            slice_as_bytes(&positions)
        );
        assert_eq!(mock.bound_buffer(gl::ARRAY_BUFFER), 0);
    }

    #[test]
    fn write_updates_a_range() {
        let mock = Rc::new(MockGl::new());
        let buffer = Buffer::from_data(mock.clone(), BufferTarget::ElementArray, &[0u16, 1, 2, 3], 1)
            .unwrap();
        buffer.write(2, &[9, 9]).unwrap();
        assert_eq!(
            mock.buffer_contents(buffer.id()).unwrap(),
            slice_as_bytes(&[0u16, 1, 9, 9])
        );
        assert!(buffer.write(3, &[1, 2]).is_err());
    }

    #[test]
    fn immutable_storage_passes_flags() {
        let mock = Rc::new(MockGl::new());
        let flags = StorageFlags::DYNAMIC_STORAGE | StorageFlags::MAP_WRITE;
        let buffer: Buffer<u32> =
            Buffer::with_storage(mock.clone(), BufferTarget::ShaderStorage, Storage::Immutable(flags));
        buffer.reserve(8, 1).unwrap();

        let call = mock.calls().into_iter().find(|c| c.name == "buffer_storage").unwrap();
        assert!(call.args.ends_with(&format!("{:#06x}", flags.0)));

        let err = buffer.reserve(8, 1).unwrap_err();
        assert!(matches!(err, Error::Gl { .. }));
    }

    #[test]
    fn scalar_type_can_be_overridden() {
        let mock = Rc::new(MockGl::new());
        let buffer: Buffer<u16> = Buffer::new(mock, BufferTarget::Array).with_scalar_type(gl::HALF_FLOAT);
        assert_eq!(buffer.scalar_type(), gl::HALF_FLOAT);
    }

    #[test]
    fn byte_colors_are_normalized_unless_disabled() {
        let mock = Rc::new(MockGl::new());
        let colors = Buffer::from_data(mock.clone(), BufferTarget::Array, &[255u8, 0, 0, 255], 4).unwrap();
        set_attribute_pointer(&*mock, 3, &colors, 0).unwrap();
        let pointer = mock.attrib_pointer(3).unwrap();
        assert_eq!(pointer.ty, gl::UNSIGNED_BYTE);
        assert!(pointer.normalized);

        let ids = Buffer::from_data(mock.clone(), BufferTarget::Array, &[7u8], 1)
            .unwrap()
            .with_normalized(false);
        set_attribute_pointer(&*mock, 4, &ids, 0).unwrap();
        assert!(!mock.attrib_pointer(4).unwrap().normalized);
    }
}
