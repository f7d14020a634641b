use std::rc::Rc;

use glbind::{
    Bindable, Buffer, BufferTarget, Context, Framebuffer, GpuObject, InternalFormat, Primitive,
    Renderbuffer, Shader, ShaderProgram, ShaderSource, ShaderStage, Texture2D, VertexArray,
};
use glbind_core::mock::MockGl;
use glbind_core::ObjectKind;

#[test]
fn unused_wrappers_touch_nothing() {
    let mock = Rc::new(MockGl::new());
    {
        let _texture = Texture2D::new(mock.clone(), InternalFormat::RGBA8);
        let _rb = Renderbuffer::new(mock.clone(), InternalFormat::DEPTH_COMPONENT16);
        let _fb = Framebuffer::new(mock.clone());
        let _vao = VertexArray::new(mock.clone());
        let _buffer: Buffer<f32> = Buffer::new(mock.clone(), BufferTarget::Array);
        let _shader = Shader::new(mock.clone(), ShaderStage::Compute);
        let _program = ShaderProgram::new(mock.clone());
    }
    assert!(mock.calls().is_empty());
    assert_eq!(mock.pending_errors(), 0);
}

#[test]
fn release_is_idempotent() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let texture = Texture2D::new(mock.clone(), InternalFormat::RGBA8);
    texture.create()?;
    let id = texture.id();
    assert!(texture.is_created());

    texture.release()?;
    texture.release()?;
    assert!(!texture.is_created());
    assert!(!mock.is_live(ObjectKind::Texture, id));
    assert_eq!(mock.call_count("delete_object"), 1);

    drop(texture);
    assert_eq!(mock.call_count("delete_object"), 1);
    Ok(())
}

#[test]
fn released_objects_recreate_on_use() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    let vao = VertexArray::new(mock.clone());
    vao.bind()?;
    let first = vao.id();
    vao.release()?;
    vao.bind()?;
    assert!(vao.is_created());
    assert_ne!(vao.id(), first);
    Ok(())
}

#[test]
fn a_full_draw_frees_everything() -> anyhow::Result<()> {
    let mock = Rc::new(MockGl::new());
    {
        let ctx = Context::new(mock.clone());
        let program = ShaderProgram::from_sources(
            ctx.gl(),
            &[
                ShaderSource::Source(ShaderStage::Vertex, "in vec2 position;\nvoid main() {}\n"),
                ShaderSource::Source(ShaderStage::Fragment, "uniform sampler2D image;\nvoid main() {}\n"),
            ],
        )?;
        let positions =
            Buffer::from_data(ctx.gl(), BufferTarget::Array, &[0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0], 2)?;
        let indices = Buffer::from_data(ctx.gl(), BufferTarget::ElementArray, &[0u16, 1, 2], 1)?;
        let image = Texture2D::with_data(ctx.gl(), InternalFormat::RGBA8, 1, 1, &[255u8, 0, 0, 255])?;
        let vao = VertexArray::new(ctx.gl());

        program.bind(&[
            glbind::Binding::vertex_array(&vao),
            glbind::Binding::attribute("position", &positions),
            glbind::Binding::texture("image", &image),
        ])?;
        ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
        indices.bind()?;
        ctx.draw_elements::<u16>(Primitive::Triangles, 3, 0)?;
        assert_eq!(mock.draw_count(), 2);
    }
    assert_eq!(mock.live_objects(), 0);
    assert_eq!(mock.pending_errors(), 0);
    Ok(())
}
