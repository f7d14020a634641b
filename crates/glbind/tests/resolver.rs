use std::rc::Rc;

use glbind::{
    Binding, Buffer, BufferTarget, Error, GpuObject, InternalFormat, ShaderProgram, ShaderSource,
    ShaderStage, Texture2D, VertexArray,
};
use glbind_core::mock::{AttribPointer, MockGl, MockUniform};

const VERT: &str = "\
in vec2 position;
in vec2 uv;
uniform mat4 mvp;
void main() {}
";

const FRAG: &str = "\
uniform sampler2D a;
uniform sampler2D b;
uniform sampler2D c;
uniform float gain;
void main() {}
";

struct Scene {
    mock: Rc<MockGl>,
    program: ShaderProgram,
    vao: VertexArray,
    positions: Buffer<f32>,
    a: Texture2D,
    b: Texture2D,
    c: Texture2D,
}

fn scene() -> anyhow::Result<Scene> {
    let mock = Rc::new(MockGl::new());
    let program = ShaderProgram::from_sources(
        mock.clone(),
        &[
            ShaderSource::Source(ShaderStage::Vertex, VERT),
            ShaderSource::Source(ShaderStage::Fragment, FRAG),
        ],
    )?;
    let positions = Buffer::from_data(
        mock.clone(),
        BufferTarget::Array,
        &[-1.0, -1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0],
        2,
    )?;
    Ok(Scene {
        vao: VertexArray::new(mock.clone()),
        a: Texture2D::new(mock.clone(), InternalFormat::RGBA8),
        b: Texture2D::new(mock.clone(), InternalFormat::RGBA8),
        c: Texture2D::new(mock.clone(), InternalFormat::R32F),
        positions,
        program,
        mock,
    })
}

fn sampler_unit(mock: &MockGl, program: &ShaderProgram, name: &str) -> Option<i32> {
    match mock.uniform(program.id(), name)? {
        MockUniform::Int { values, .. } => values.first().copied(),
        _ => None,
    }
}

#[test]
fn textures_take_sequential_units() -> anyhow::Result<()> {
    let s = scene()?;
    s.program.bind(&[
        Binding::vertex_array(&s.vao),
        Binding::attribute("position", &s.positions),
        Binding::texture("a", &s.a),
        Binding::texture("b", &s.b),
        Binding::uniform("gain", 0.25f32),
    ])?;

    assert_eq!(s.mock.current_program(), s.program.id());
    assert_eq!(s.mock.bound_vertex_array(), s.vao.id());
    assert_eq!(sampler_unit(&s.mock, &s.program, "a"), Some(0));
    assert_eq!(sampler_unit(&s.mock, &s.program, "b"), Some(1));
    assert_eq!(s.mock.bound_texture(0), s.a.id());
    assert_eq!(s.mock.bound_texture(1), s.b.id());
    assert_eq!(s.program.texture_units_used(), 2);

    let location = s.program.attribute_location("position")? as u32;
    assert!(s.mock.is_attrib_enabled(location));
    assert_eq!(
        s.mock.attrib_pointer(location),
        Some(AttribPointer {
            buffer: s.positions.id(),
            size: 2,
            ty: gl::FLOAT,
            normalized: true,
            stride: 0,
            offset: 0,
        })
    );
    assert_eq!(s.mock.pending_errors(), 0);
    Ok(())
}

#[test]
fn vertex_array_is_bound_before_the_program() -> anyhow::Result<()> {
    let s = scene()?;
    s.mock.clear_calls();
    s.program.bind(&[Binding::vertex_array(&s.vao), Binding::uniform("gain", 1.0f32)])?;

    let names = s.mock.call_names();
    let vao = names.iter().position(|n| *n == "bind_vertex_array").unwrap();
    let program = names.iter().position(|n| *n == "use_program").unwrap();
    assert!(vao < program);
    Ok(())
}

#[test]
fn update_continues_the_unit_count() -> anyhow::Result<()> {
    let s = scene()?;
    s.program.bind(&[Binding::texture("a", &s.a), Binding::texture("b", &s.b)])?;
    s.program.update(&[Binding::texture("c", &s.c)])?;

    assert_eq!(sampler_unit(&s.mock, &s.program, "c"), Some(2));
    assert_eq!(s.program.texture_units_used(), 3);
    assert_eq!(s.mock.bound_texture(0), s.a.id());

    s.program.bind(&[Binding::texture("c", &s.c)])?;
    assert_eq!(sampler_unit(&s.mock, &s.program, "c"), Some(0));
    assert_eq!(s.program.texture_units_used(), 1);
    Ok(())
}

#[test]
fn unit_exhaustion_stops_at_the_failing_texture() -> anyhow::Result<()> {
    let s = scene()?;
    s.mock.set_integer(gl::MAX_TEXTURE_IMAGE_UNITS, 2);

    let err = s
        .program
        .bind(&[
            Binding::texture("a", &s.a),
            Binding::texture("b", &s.b),
            Binding::texture("c", &s.c),
            Binding::uniform("gain", 2.0f32),
        ])
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TooManyTextureUnits {
            requested: 3,
            max: 2
        }
    ));
    assert_eq!(sampler_unit(&s.mock, &s.program, "a"), Some(0));
    assert_eq!(sampler_unit(&s.mock, &s.program, "b"), Some(1));
    assert_eq!(sampler_unit(&s.mock, &s.program, "c"), None);
    assert_eq!(s.mock.uniform(s.program.id(), "gain"), None);
    Ok(())
}

#[test]
fn unknown_names_are_not_errors() -> anyhow::Result<()> {
    let s = scene()?;
    s.program.bind(&[
        Binding::attribute("normal", &s.positions),
        Binding::uniform("exposure", 1.5f32),
        Binding::uniform("gain", 0.5f32),
    ])?;

    assert_eq!(s.mock.call_count("enable_vertex_attrib_array"), 0);
    assert_eq!(s.mock.call_count("vertex_attrib_pointer"), 0);
    assert_eq!(s.program.uniform_location("exposure")?, -1);
    assert_eq!(
        s.mock.uniform(s.program.id(), "gain"),
        Some(MockUniform::Float {
            tuple: 1,
            values: vec![0.5]
        })
    );
    assert_eq!(s.mock.pending_errors(), 0);
    Ok(())
}

#[test]
fn attribute_offsets_reach_the_pointer() -> anyhow::Result<()> {
    let s = scene()?;
    s.program.bind(&[
        Binding::vertex_array(&s.vao),
        Binding::attribute_at("uv", &s.positions, 8),
    ])?;

    let location = s.program.attribute_location("uv")? as u32;
    assert_eq!(s.mock.attrib_pointer(location).map(|p| p.offset), Some(8));
    Ok(())
}

#[test]
fn byte_attributes_are_normalized() -> anyhow::Result<()> {
    let s = scene()?;
    let colors = Buffer::from_data(s.mock.clone(), BufferTarget::Array, &[255u8, 128, 0, 255], 4)?;
    s.program.bind(&[
        Binding::vertex_array(&s.vao),
        Binding::attribute("uv", &colors),
    ])?;

    let location = s.program.attribute_location("uv")? as u32;
    let pointer = s.mock.attrib_pointer(location).expect("pointer set");
    assert_eq!(pointer.buffer, colors.id());
    assert_eq!(pointer.size, 4);
    assert_eq!(pointer.ty, gl::UNSIGNED_BYTE);
    assert!(pointer.normalized);
    Ok(())
}

#[test]
fn unbind_clears_the_program() -> anyhow::Result<()> {
    let s = scene()?;
    s.program.bind(&[])?;
    s.program.unbind()?;
    assert_eq!(s.mock.current_program(), 0);
    Ok(())
}
