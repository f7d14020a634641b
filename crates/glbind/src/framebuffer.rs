//! Framebuffers and their attachments.

use std::cell::RefCell;
use std::collections::BTreeMap;

use gl::types::{GLenum, GLuint};
use glbind_core::{check_errors, Error, FramebufferStatus, Gl, GlApi, ObjectKind, Result};
use tracing::trace;

use crate::object::{Bindable, GpuObject, Handle};
use crate::renderbuffer::Renderbuffer;
use crate::texture::Texture2D;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttachmentPoint {
    Color(u32),
    Depth,
    Stencil,
    DepthStencil,
}

impl AttachmentPoint {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Color(n) => gl::COLOR_ATTACHMENT0 + n,
            Self::Depth => gl::DEPTH_ATTACHMENT,
            Self::Stencil => gl::STENCIL_ATTACHMENT,
            Self::DepthStencil => gl::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Texture,
    Renderbuffer,
}

/// An object recorded at an attachment point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attached {
    pub kind: AttachmentKind,
    pub id: GLuint,
}

/// Something a framebuffer can render into.
pub trait Attachable {
    fn attachment_kind(&self) -> AttachmentKind;

    /// The object's name, created and bound once if needed so GL accepts
    /// it as an attachment. Storage stays unspecified.
    fn attachment_id(&self) -> Result<GLuint>;
}

impl Attachable for Texture2D {
    fn attachment_kind(&self) -> AttachmentKind {
        AttachmentKind::Texture
    }

    #[track_caller]
    fn attachment_id(&self) -> Result<GLuint> {
        // A generated name only becomes an object once bound.
        self.bind()?;
        self.unbind()?;
        Ok(self.id())
    }
}

impl Attachable for Renderbuffer {
    fn attachment_kind(&self) -> AttachmentKind {
        AttachmentKind::Renderbuffer
    }

    #[track_caller]
    fn attachment_id(&self) -> Result<GLuint> {
        // A generated name only becomes an object once bound.
        self.bind()?;
        self.unbind()?;
        Ok(self.id())
    }
}

pub struct Framebuffer {
    handle: Handle,
    attachments: RefCell<BTreeMap<AttachmentPoint, Attached>>,
}

impl Framebuffer {
    pub fn new(gl: Gl) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Framebuffer),
            attachments: RefCell::new(BTreeMap::new()),
        }
    }

    /// Attach `object` at `point`, replacing any previous attachment there.
    ///
    /// Leaves the framebuffer binding at 0.
    #[track_caller]
    pub fn attach(&self, point: AttachmentPoint, object: &dyn Attachable) -> Result<()> {
        self.attach_all(&[(point, object)])
    }

    /// Attach several objects with a single bind.
    #[track_caller]
    pub fn attach_all(&self, targets: &[(AttachmentPoint, &dyn Attachable)]) -> Result<()> {
        self.bind()?;
        for &(point, object) in targets {
            self.detach_bound(point)?;
            let attached = Attached {
                kind: object.attachment_kind(),
                id: object.attachment_id()?,
            };
            issue_attach(self.handle.gl(), point, attached)?;
            trace!(fb = self.id(), ?point, ?attached, "attached");
            self.attachments.borrow_mut().insert(point, attached);
        }
        self.unbind()
    }

    /// Detach whatever is attached at `point`.
    #[track_caller]
    pub fn detach(&self, point: AttachmentPoint) -> Result<()> {
        if !self.attachments.borrow().contains_key(&point) {
            return Ok(());
        }
        self.bind()?;
        self.detach_bound(point)?;
        self.unbind()
    }

    #[track_caller]
    fn detach_bound(&self, point: AttachmentPoint) -> Result<()> {
        let previous = self.attachments.borrow_mut().remove(&point);
        match previous {
            Some(previous) => issue_attach(self.handle.gl(), point, Attached { id: 0, ..previous }),
            None => Ok(()),
        }
    }

    pub fn attachments(&self) -> BTreeMap<AttachmentPoint, Attached> {
        self.attachments.borrow().clone()
    }

    pub fn attachment(&self, point: AttachmentPoint) -> Option<Attached> {
        self.attachments.borrow().get(&point).copied()
    }

    /// Completeness of this framebuffer as a draw target.
    #[track_caller]
    pub fn status(&self) -> Result<FramebufferStatus> {
        self.bind()?;
        let gl = self.handle.gl();
        let status = FramebufferStatus::from_raw(gl.check_framebuffer_status(gl::FRAMEBUFFER));
        check_errors(gl)?;
        self.unbind()?;
        Ok(status)
    }

    /// Fail with [`Error::FramebufferIncomplete`] unless complete.
    #[track_caller]
    pub fn check_complete(&self) -> Result<()> {
        match self.status()? {
            FramebufferStatus::Complete => Ok(()),
            status => Err(Error::FramebufferIncomplete { status }),
        }
    }
}

#[track_caller]
fn issue_attach(gl: &dyn GlApi, point: AttachmentPoint, attached: Attached) -> Result<()> {
    match attached.kind {
        AttachmentKind::Texture => {
            gl.framebuffer_texture_2d(gl::FRAMEBUFFER, point.gl_enum(), gl::TEXTURE_2D, attached.id, 0)
        }
        AttachmentKind::Renderbuffer => {
            gl.framebuffer_renderbuffer(gl::FRAMEBUFFER, point.gl_enum(), attached.id)
        }
    }
    check_errors(gl)
}

impl GpuObject for Framebuffer {
    fn id(&self) -> GLuint {
        self.handle.id()
    }

    #[track_caller]
    fn create(&self) -> Result<()> {
        self.handle.create().map(drop)
    }

    #[track_caller]
    fn release(&self) -> Result<()> {
        self.attachments.borrow_mut().clear();
        self.handle.release()
    }
}

impl Bindable for Framebuffer {
    /// Bind as both the draw and read framebuffer.
    #[track_caller]
    fn bind(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.handle.gl().bind_framebuffer(gl::FRAMEBUFFER, id);
        check_errors(self.handle.gl())
    }

    #[track_caller]
    fn unbind(&self) -> Result<()> {
        self.handle.gl().bind_framebuffer(gl::FRAMEBUFFER, 0);
        check_errors(self.handle.gl())
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::MockGl;
    use glbind_core::InternalFormat;

    use super::*;

    #[test]
    fn empty_framebuffers_are_incomplete() {
        let mock = Rc::new(MockGl::new());
        let fb = Framebuffer::new(mock.clone());
        assert_eq!(fb.status().unwrap(), FramebufferStatus::MissingAttachment);
        assert!(matches!(
            fb.check_complete(),
            Err(Error::FramebufferIncomplete {
                status: FramebufferStatus::MissingAttachment
            })
        ));
        assert_eq!(mock.bound_framebuffer(), 0);
    }

    #[test]
    fn detach_clears_the_point() {
        let mock = Rc::new(MockGl::new());
        let fb = Framebuffer::new(mock.clone());
        let depth = Renderbuffer::with_size(mock.clone(), InternalFormat::DEPTH_COMPONENT24, 8, 8).unwrap();

        fb.attach(AttachmentPoint::Depth, &depth).unwrap();
        assert_eq!(mock.attachments(fb.id()).get(&gl::DEPTH_ATTACHMENT), Some(&depth.id()));

        fb.detach(AttachmentPoint::Depth).unwrap();
        assert!(mock.attachments(fb.id()).is_empty());
        assert!(fb.attachments().is_empty());

        mock.clear_calls();
        fb.detach(AttachmentPoint::Depth).unwrap();
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn unallocated_objects_become_attachable() {
        let mock = Rc::new(MockGl::new());
        let fb = Framebuffer::new(mock.clone());
        let color = Texture2D::new(mock.clone(), InternalFormat::RGBA8);
        let depth = Renderbuffer::new(mock.clone(), InternalFormat::DEPTH_COMPONENT16);
        depth.create().unwrap();

        fb.attach_all(&[
            (AttachmentPoint::Color(0), &color as &dyn Attachable),
            (AttachmentPoint::Depth, &depth as &dyn Attachable),
        ])
        .unwrap();

        let attached = mock.attachments(fb.id());
        assert_eq!(attached.get(&gl::COLOR_ATTACHMENT0), Some(&color.id()));
        assert_eq!(attached.get(&gl::DEPTH_ATTACHMENT), Some(&depth.id()));
        assert_eq!(mock.bound_texture(0), 0);
        assert_eq!(mock.pending_errors(), 0);
    }
}
