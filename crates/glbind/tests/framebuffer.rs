use std::rc::Rc;

use glbind::{
    Attachable, Attached, AttachmentKind, AttachmentPoint, Bindable, Error, Framebuffer, FramebufferStatus,
    GpuObject, InternalFormat, Renderbuffer, Texture2D,
};
use glbind_core::mock::MockGl;
use glbind_core::GlErrorCode;

#[test]
fn attachments_are_tracked_in_point_order() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let fb = Framebuffer::new(mock.clone());
    let color = Texture2D::new(mock.clone(), InternalFormat::RGBA16F);
    color.allocate::<f32>(32, 32, None, 0)?;
    let depth = Renderbuffer::with_size(mock.clone(), InternalFormat::DEPTH24_STENCIL8, 32, 32)?;

    fb.attach_all(&[
        (AttachmentPoint::DepthStencil, &depth as &dyn Attachable),
        (AttachmentPoint::Color(0), &color as &dyn Attachable),
    ])?;

    let points: Vec<_> = fb.attachments().into_keys().collect();
    assert_eq!(points, vec![AttachmentPoint::Color(0), AttachmentPoint::DepthStencil]);
    assert_eq!(fb.status()?, FramebufferStatus::Complete);
    fb.check_complete()?;
    assert_eq!(mock.bound_framebuffer(), 0);
    Ok(())
}

#[test]
fn reattaching_detaches_the_previous_object() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let fb = Framebuffer::new(mock.clone());
    let first = Texture2D::new(mock.clone(), InternalFormat::RGBA8);
    let second = Renderbuffer::with_size(mock.clone(), InternalFormat::RGBA8, 4, 4)?;

    fb.attach(AttachmentPoint::Color(1), &first)?;
    mock.clear_calls();
    fb.attach(AttachmentPoint::Color(1), &second)?;

    let calls = mock.calls();
    let detach = calls
        .iter()
        .position(|c| c.name == "framebuffer_texture_2d" && c.args.contains(", 0, 0"))
        .expect("previous texture detached");
    let attach = calls
        .iter()
        .position(|c| c.name == "framebuffer_renderbuffer")
        .expect("renderbuffer attached");
    assert!(detach < attach);

    assert_eq!(
        fb.attachment(AttachmentPoint::Color(1)),
        Some(Attached {
            kind: AttachmentKind::Renderbuffer,
            id: second.id(),
        })
    );
    let attached = mock.attachments(fb.id());
    assert_eq!(attached.len(), 1);
    assert_eq!(attached.get(&(gl::COLOR_ATTACHMENT0 + 1)), Some(&second.id()));
    Ok(())
}

#[test]
fn attaching_creates_lazy_textures() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let fb = Framebuffer::new(mock.clone());
    let color = Texture2D::new(mock.clone(), InternalFormat::RGBA8);
    assert!(!color.is_created());

    fb.attach(AttachmentPoint::Color(0), &color)?;
    assert!(color.is_created());
    Ok(())
}

#[test]
fn framebuffer_errors_carry_completeness() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let fb = Framebuffer::new(mock.clone());
    fb.bind()?;

    mock.push_error(gl::INVALID_FRAMEBUFFER_OPERATION);
    let err = fb.bind().unwrap_err();
    match err {
        Error::Gl { code, detail, .. } => {
            assert_eq!(code, GlErrorCode::InvalidFramebufferOperation);
            assert_eq!(detail, Some(FramebufferStatus::MissingAttachment));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
