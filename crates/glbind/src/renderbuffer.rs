use std::cell::Cell;

use gl::types::{GLsizei, GLuint};
use glbind_core::{check_errors, Gl, InternalFormat, ObjectKind, Result};

use crate::object::{Bindable, GpuObject, Handle};

/// Off-screen image storage usable only as a framebuffer attachment.
pub struct Renderbuffer {
    handle: Handle,
    internal_format: InternalFormat,
    size: Cell<(u32, u32)>,
}

impl Renderbuffer {
    pub fn new(gl: Gl, internal_format: InternalFormat) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Renderbuffer),
            internal_format,
            size: Cell::new((0, 0)),
        }
    }

    /// Create and allocate `width` x `height` storage.
    #[track_caller]
    pub fn with_size(gl: Gl, internal_format: InternalFormat, width: u32, height: u32) -> Result<Self> {
        let rb = Self::new(gl, internal_format);
        rb.allocate(width, height)?;
        Ok(rb)
    }

    /// (Re)specify the storage. Leaves the renderbuffer binding at 0.
    #[track_caller]
    pub fn allocate(&self, width: u32, height: u32) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        gl.renderbuffer_storage(
            self.internal_format.gl_enum(),
            width as GLsizei,
            height as GLsizei,
        );
        check_errors(gl)?;
        self.size.set((width, height));
        self.unbind()
    }

    pub fn internal_format(&self) -> InternalFormat {
        self.internal_format
    }

    pub fn width(&self) -> u32 {
        self.size.get().0
    }

    pub fn height(&self) -> u32 {
        self.size.get().1
    }
}

impl GpuObject for Renderbuffer {
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

impl Bindable for Renderbuffer {
    #[track_caller]
    fn bind(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.handle.gl().bind_renderbuffer(id);
        check_errors(self.handle.gl())
    }

    #[track_caller]
    fn unbind(&self) -> Result<()> {
        self.handle.gl().bind_renderbuffer(0);
        check_errors(self.handle.gl())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;

    use super::*;

    #[test]
    fn allocation_records_storage() {
        let mock = Rc::new(MockGl::new());
        let rb = Renderbuffer::with_size(mock.clone(), InternalFormat::DEPTH24_STENCIL8, 64, 32)
            .unwrap();
        assert_eq!(
            mock.renderbuffer_storage_of(rb.id()),
            Some((gl::DEPTH24_STENCIL8, 64, 32))
        );
        assert_eq!((rb.width(), rb.height()), (64, 32));
    }
}
