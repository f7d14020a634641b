//! Lifecycle shared by every GPU object wrapper.
//!
//! Wrappers hold a [`Handle`]: a lazily created GL name that is deleted
//! exactly once, either by an explicit [`GpuObject::release`] or on drop.

use std::cell::Cell;

use gl::types::GLuint;
use glbind_core::{check_errors, Gl, GlApi, ObjectKind, Result};
use tracing::{debug, warn};

/// A GPU-side object with a create/release lifecycle.
///
/// Names are created on first use, so wrappers can be constructed before
/// any GL call is made.
pub trait GpuObject {
    /// The GL name, or 0 if not yet created.
    fn id(&self) -> GLuint;

    fn is_created(&self) -> bool {
        self.id() != 0
    }

    /// Allocate a fresh name. Calling this on a created object leaks the
    /// previous name; use [`GpuObject::release`] first.
    fn create(&self) -> Result<()>;

    /// Delete the name and reset the id to 0. A no-op when never created.
    fn release(&self) -> Result<()>;
}

/// A [`GpuObject`] with a binding point.
pub trait Bindable: GpuObject {
    /// Bind to the object's target, creating the name if needed.
    fn bind(&self) -> Result<()>;

    /// Bind 0 to the object's target.
    fn unbind(&self) -> Result<()>;
}

pub(crate) struct Handle {
    gl: Gl,
    kind: ObjectKind,
    id: Cell<GLuint>,
}

impl Handle {
    pub(crate) fn new(gl: Gl, kind: ObjectKind) -> Self {
        Self {
            gl,
            kind,
            id: Cell::new(0),
        }
    }

    pub(crate) fn gl(&self) -> &dyn GlApi {
        &*self.gl
    }

    pub(crate) fn shared_gl(&self) -> &Gl {
        &self.gl
    }

    pub(crate) fn id(&self) -> GLuint {
        self.id.get()
    }

    #[track_caller]
    pub(crate) fn create(&self) -> Result<GLuint> {
        let id = self.gl.create_object(self.kind);
        check_errors(self.gl())?;
        self.id.set(id);
        debug!(kind = self.kind.name(), id, "created");
        Ok(id)
    }

    /// The current name, creating one if needed.
    #[track_caller]
    pub(crate) fn ensure(&self) -> Result<GLuint> {
        match self.id.get() {
            0 => self.create(),
            id => Ok(id),
        }
    }

    #[track_caller]
    pub(crate) fn release(&self) -> Result<()> {
        let id = self.id.replace(0);
        if id == 0 {
            return Ok(());
        }
        self.gl.delete_object(self.kind, id);
        debug!(kind = self.kind.name(), id, "released");
        check_errors(self.gl())
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if let Err(err) = self.release() {
            warn!(kind = self.kind.name(), %err, "release failed during drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;

    use super::*;

    #[test]
    fn never_created_handles_issue_no_calls() {
        let mock = Rc::new(MockGl::new());
        drop(Handle::new(mock.clone(), ObjectKind::Texture));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn release_resets_and_is_idempotent() {
        let mock = Rc::new(MockGl::new());
        let handle = Handle::new(mock.clone(), ObjectKind::Buffer);
        let id = handle.ensure().unwrap();
        assert_eq!(handle.ensure().unwrap(), id);
        assert!(mock.is_live(ObjectKind::Buffer, id));

        handle.release().unwrap();
        handle.release().unwrap();
        assert_eq!(handle.id(), 0);
        assert!(!mock.is_live(ObjectKind::Buffer, id));
        assert_eq!(mock.call_count("delete_object"), 1);

        drop(handle);
        assert_eq!(mock.call_count("delete_object"), 1);
    }

    #[test]
    fn drop_releases_once() {
        let mock = Rc::new(MockGl::new());
        let handle = Handle::new(mock.clone(), ObjectKind::Program);
        let id = handle.ensure().unwrap();
        drop(handle);
        assert!(!mock.is_live(ObjectKind::Program, id));
        assert_eq!(mock.call_count("delete_object"), 1);
    }
}
