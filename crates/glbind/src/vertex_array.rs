use gl::types::GLuint;
use glbind_core::{check_errors, Gl, ObjectKind, Result};

use crate::object::{Bindable, GpuObject, Handle};

/// Records the attribute pointer setup for one draw.
///
/// Pass it as the first [`crate::Binding`] so the attribute bindings that
/// follow are captured in it.
pub struct VertexArray {
    handle: Handle,
}

impl VertexArray {
    pub fn new(gl: Gl) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::VertexArray),
        }
    }
}

impl GpuObject for VertexArray {
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

impl Bindable for VertexArray {
    #[track_caller]
    fn bind(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.handle.gl().bind_vertex_array(id);
        check_errors(self.handle.gl())
    }

    #[track_caller]
    fn unbind(&self) -> Result<()> {
        self.handle.gl().bind_vertex_array(0);
        check_errors(self.handle.gl())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;

    use super::*;

    #[test]
    fn bind_creates_lazily() {
        let mock = Rc::new(MockGl::new());
        let vao = VertexArray::new(mock.clone());
        assert!(!vao.is_created());

        vao.bind().unwrap();
        assert!(vao.is_created());
        assert_eq!(mock.bound_vertex_array(), vao.id());

        vao.unbind().unwrap();
        assert_eq!(mock.bound_vertex_array(), 0);
    }
}
