//! Shader programs: linking and the binding resolver.
//!
//! [`ShaderProgram::link`] compiles any stages given as files or source
//! text, attaches them, links and detaches them again. The stage of every
//! file is inferred before anything is compiled.
//!
//! [`ShaderProgram::bind`] takes an ordered slice of [`Binding`]s and
//! applies them left to right: the optional vertex array first, then the
//! program, then every attribute, texture and uniform. Textures are given
//! consecutive units starting at 0 on every full bind.

use std::cell::Cell;
use std::path::Path;

use gl::types::{GLint, GLuint};
use glbind_core::{check_errors, Error, Gl, GlApi, ObjectKind, Result, ShaderStage};
use tracing::{debug, error, trace};

use crate::binding::{Binding, Uniform};
use crate::buffer::{set_attribute_pointer, AttributeBuffer};
use crate::object::{Bindable, GpuObject, Handle};
use crate::shader::Shader;
use crate::texture::Texture2D;

/// One input to [`ShaderProgram::link`].
#[derive(Clone, Copy)]
pub enum ShaderSource<'a> {
    /// An already compiled shader, attached as is.
    Shader(&'a Shader),
    /// A file whose stage is inferred from its extension.
    File(&'a Path),
    /// A file of an explicit stage.
    FileAs(ShaderStage, &'a Path),
    /// Source text of an explicit stage.
    Source(ShaderStage, &'a str),
}

impl<'a> From<&'a Shader> for ShaderSource<'a> {
    fn from(shader: &'a Shader) -> Self {
        Self::Shader(shader)
    }
}

impl<'a> From<&'a Path> for ShaderSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::File(path)
    }
}

enum Staged<'a> {
    Borrowed(&'a Shader),
    Owned(Shader),
}

impl Staged<'_> {
    fn shader(&self) -> &Shader {
        match self {
            Self::Borrowed(shader) => *shader,
            Self::Owned(shader) => shader,
        }
    }
}

pub struct ShaderProgram {
    handle: Handle,
    texture_unit: Cell<u32>,
}

impl ShaderProgram {
    pub fn new(gl: Gl) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Program),
            texture_unit: Cell::new(0),
        }
    }

    /// Create a program linked from `sources`.
    #[track_caller]
    pub fn from_sources(gl: Gl, sources: &[ShaderSource<'_>]) -> Result<Self> {
        let program = Self::new(gl);
        program.link(sources)?;
        Ok(program)
    }

    fn gl(&self) -> &dyn GlApi {
        self.handle.gl()
    }

    /// Compile, attach and link `sources`.
    ///
    /// Shaders are detached again whether or not linking succeeds, and the
    /// ones compiled here are deleted on return.
    #[track_caller]
    pub fn link(&self, sources: &[ShaderSource<'_>]) -> Result<()> {
        let mut stages = Vec::with_capacity(sources.len());
        for source in sources {
            let stage = match *source {
                ShaderSource::Shader(shader) => shader.stage(),
                ShaderSource::File(path) => ShaderStage::from_path(path)?,
                ShaderSource::FileAs(stage, _) | ShaderSource::Source(stage, _) => stage,
            };
            stages.push(stage);
        }

        let gl_shared = self.handle.shared_gl();
        let mut staged = Vec::with_capacity(sources.len());
        for (source, stage) in sources.iter().zip(stages) {
            let shader = match *source {
                ShaderSource::Shader(shader) => Staged::Borrowed(shader),
                ShaderSource::File(path) | ShaderSource::FileAs(_, path) => {
                    let shader = Shader::new(gl_shared.clone(), stage);
                    shader.compile_file(path)?;
                    Staged::Owned(shader)
                }
                ShaderSource::Source(_, text) => {
                    let shader = Shader::new(gl_shared.clone(), stage);
                    shader.compile_source(text)?;
                    Staged::Owned(shader)
                }
            };
            staged.push(shader);
        }

        let id = self.handle.ensure()?;
        let gl = self.gl();
        let mut attached: Vec<GLuint> = Vec::with_capacity(staged.len());
        let mut linked = Ok(());
        for shader in &staged {
            gl.attach_shader(id, shader.shader().id());
            if let Err(err) = check_errors(gl) {
                linked = Err(err);
                break;
            }
            attached.push(shader.shader().id());
        }
        if linked.is_ok() {
            gl.link_program(id);
            linked = check_errors(gl);
        }

        let mut detached = Ok(());
        for shader in attached {
            gl.detach_shader(id, shader);
            if let Err(err) = check_errors(gl) {
                detached = detached.and(Err(err));
            }
        }
        linked?;
        detached?;

        if !self.is_linked() {
            let mut info_log = self.info_log();
            if info_log.is_empty() {
                info_log = "link failed without an info log".to_string();
            }
            error!(id, %info_log, "program link failed");
            return Err(Error::ShaderLink { info_log });
        }
        debug!(id, stages = staged.len(), "linked program");
        Ok(())
    }

    pub fn is_linked(&self) -> bool {
        match self.handle.id() {
            0 => false,
            id => self.gl().get_program_iv(id, gl::LINK_STATUS) != 0,
        }
    }

    pub fn info_log(&self) -> String {
        match self.handle.id() {
            0 => String::new(),
            id => self.gl().get_program_info_log(id),
        }
    }

    /// Make the program current and apply `bindings` in order.
    ///
    /// Resets the texture unit counter. Bindings before a failing one stay
    /// applied; the rest are not issued.
    #[track_caller]
    pub fn bind(&self, bindings: &[Binding<'_>]) -> Result<()> {
        let rest = self.bind_vertex_array(bindings)?;
        self.use_program()?;
        self.resolve_all(rest)
    }

    /// Apply `bindings` to the already current program without resetting
    /// the texture unit counter.
    #[track_caller]
    pub fn update(&self, bindings: &[Binding<'_>]) -> Result<()> {
        let rest = self.bind_vertex_array(bindings)?;
        self.resolve_all(rest)
    }

    #[track_caller]
    fn bind_vertex_array<'b, 'a>(&self, bindings: &'b [Binding<'a>]) -> Result<&'b [Binding<'a>]> {
        if let Some(index) = bindings
            .iter()
            .skip(1)
            .position(|b| matches!(b, Binding::VertexArray(_)))
        {
            return Err(Error::MisplacedVertexArray { index: index + 1 });
        }
        match bindings.split_first() {
            Some((Binding::VertexArray(vao), rest)) => {
                vao.bind()?;
                Ok(rest)
            }
            _ => Ok(bindings),
        }
    }

    #[track_caller]
    fn use_program(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.gl().use_program(id);
        check_errors(self.gl())?;
        self.texture_unit.set(0);
        Ok(())
    }

    #[track_caller]
    fn resolve_all(&self, bindings: &[Binding<'_>]) -> Result<()> {
        for binding in bindings {
            trace!(program = self.id(), ?binding, "resolving");
            match *binding {
                Binding::VertexArray(vao) => vao.bind()?,
                Binding::Attribute {
                    name,
                    buffer,
                    offset,
                } => self.set_attribute_buffer(name, buffer, offset)?,
                Binding::Texture { name, texture } => self.set_texture(name, texture)?,
                Binding::Uniform { name, value } => self.set_uniform(name, value)?,
            }
        }
        Ok(())
    }

    /// Bind program 0.
    #[track_caller]
    pub fn unbind(&self) -> Result<()> {
        self.gl().use_program(0);
        check_errors(self.gl())
    }

    /// Number of texture units handed out since the last full bind.
    pub fn texture_units_used(&self) -> u32 {
        self.texture_unit.get()
    }

    /// Location of uniform `name`, or -1 when it is not active.
    #[track_caller]
    pub fn uniform_location(&self, name: &str) -> Result<GLint> {
        let id = self.handle.ensure()?;
        let location = self.gl().get_uniform_location(id, name);
        check_errors(self.gl())?;
        Ok(location)
    }

    /// Location of attribute `name`, or -1 when it is not active.
    #[track_caller]
    pub fn attribute_location(&self, name: &str) -> Result<GLint> {
        let id = self.handle.ensure()?;
        let location = self.gl().get_attrib_location(id, name);
        check_errors(self.gl())?;
        Ok(location)
    }

    /// Upload `value` to uniform `name` of the current program.
    ///
    /// Inactive names are skipped.
    #[track_caller]
    pub fn set_uniform<'a>(&self, name: &str, value: impl Into<Uniform<'a>>) -> Result<()> {
        let location = self.uniform_location(name)?;
        if location == -1 {
            trace!(program = self.id(), name, "uniform not active, skipped");
            return Ok(());
        }
        let gl = self.gl();
        match value.into() {
            Uniform::F1(v) => gl.uniform_f(location, 1, &[v]),
            Uniform::F2(v) => gl.uniform_f(location, 2, &v),
            Uniform::F3(v) => gl.uniform_f(location, 3, &v),
            Uniform::F4(v) => gl.uniform_f(location, 4, &v),
            Uniform::I1(v) => gl.uniform_i(location, 1, &[v]),
            Uniform::I2(v) => gl.uniform_i(location, 2, &v),
            Uniform::I3(v) => gl.uniform_i(location, 3, &v),
            Uniform::I4(v) => gl.uniform_i(location, 4, &v),
            Uniform::Mat2(m) => gl.uniform_matrix_f(location, 2, false, &m),
            Uniform::Mat3(m) => gl.uniform_matrix_f(location, 3, false, &m),
            Uniform::Mat4(m) => gl.uniform_matrix_f(location, 4, false, &m),
            Uniform::FloatArray { data, tuple } => {
                let n = data.len() / tuple.size() * tuple.size();
                gl.uniform_f(location, tuple.size(), &data[..n])
            }
            Uniform::IntArray { data, tuple } => {
                let n = data.len() / tuple.size() * tuple.size();
                gl.uniform_i(location, tuple.size(), &data[..n])
            }
        }
        check_errors(gl)
    }

    /// Bind `texture` to the next free unit and point sampler `name` at it.
    #[track_caller]
    pub fn set_texture(&self, name: &str, texture: &Texture2D) -> Result<()> {
        let gl = self.gl();
        let max = gl.get_integer(gl::MAX_TEXTURE_IMAGE_UNITS).max(0) as u32;
        check_errors(gl)?;
        let unit = self.texture_unit.get();
        if unit >= max {
            return Err(Error::TooManyTextureUnits {
                requested: unit + 1,
                max,
            });
        }

        gl.active_texture(gl::TEXTURE0 + unit);
        check_errors(gl)?;
        texture.bind()?;
        self.set_uniform(name, Uniform::I1(unit as i32))?;
        self.texture_unit.set(unit + 1);
        trace!(program = self.id(), name, unit, texture = texture.id(), "texture bound");
        Ok(())
    }

    /// Source attribute `name` from `buffer`, starting `offset` bytes in.
    ///
    /// Inactive names are skipped after binding the buffer.
    #[track_caller]
    pub fn set_attribute_buffer(&self, name: &str, buffer: &dyn AttributeBuffer, offset: usize) -> Result<()> {
        buffer.bind_source()?;
        let location = self.attribute_location(name)?;
        if location < 0 {
            trace!(program = self.id(), name, "attribute not active, skipped");
            return Ok(());
        }
        let gl = self.gl();
        gl.enable_vertex_attrib_array(location as GLuint);
        check_errors(gl)?;
        set_attribute_pointer(gl, location as GLuint, buffer, offset)
    }

    /// Enable the vertex array for attribute `name`, returning its index.
    #[track_caller]
    pub fn enable_attribute_array(&self, name: &str) -> Result<Option<GLuint>> {
        let location = self.attribute_location(name)?;
        if location < 0 {
            return Ok(None);
        }
        self.gl().enable_vertex_attrib_array(location as GLuint);
        check_errors(self.gl())?;
        Ok(Some(location as GLuint))
    }
}

impl GpuObject for ShaderProgram {
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

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use glbind_core::mock::{MockGl, MockUniform};

    use super::*;

    const VERT: &str = "in vec2 position;\nuniform mat4 mvp;\nvoid main() {}\n";
    const FRAG: &str = "uniform float gain;\nuniform int count;\nvoid main() {}\n";

    fn program(mock: &Rc<MockGl>) -> ShaderProgram {
        ShaderProgram::from_sources(
            mock.clone(),
            &[
                ShaderSource::Source(ShaderStage::Vertex, VERT),
                ShaderSource::Source(ShaderStage::Fragment, FRAG),
            ],
        )
        .unwrap()
    }

    #[test]
    fn link_detaches_and_releases_temporaries() {
        let mock = Rc::new(MockGl::new());
        let program = program(&mock);
        assert!(program.is_linked());
        assert!(mock.attached_shaders(program.id()).is_empty());
        assert_eq!(mock.live_objects(), 1);
    }

    #[test]
    fn uniforms_upload_by_arity() {
        let mock = Rc::new(MockGl::new());
        let program = program(&mock);
        program
            .bind(&[
                Binding::uniform("gain", 0.5f32),
                Binding::uniform("count", 3),
                Binding::uniform("mvp", [[1.0f32, 0.0, 0.0, 0.0]; 4]),
            ])
            .unwrap();

        assert_eq!(
            mock.uniform(program.id(), "gain"),
            Some(MockUniform::Float {
                tuple: 1,
                values: vec![0.5]
            })
        );
        assert_eq!(
            mock.uniform(program.id(), "count"),
            Some(MockUniform::Int {
                tuple: 1,
                values: vec![3]
            })
        );
        match mock.uniform(program.id(), "mvp") {
            Some(MockUniform::Matrix { dim, transpose, values }) => {
                assert_eq!((dim, transpose, values.len()), (4, false, 16));
            }
            other => panic!("unexpected mvp value: {other:?}"),
        }
    }

    #[test]
    fn misplaced_vertex_arrays_fail_before_any_call() {
        let mock = Rc::new(MockGl::new());
        let program = program(&mock);
        let vao = crate::VertexArray::new(mock.clone());
        mock.clear_calls();

        let err = program
            .bind(&[Binding::uniform("gain", 1.0f32), Binding::vertex_array(&vao)])
            .unwrap_err();
        assert!(matches!(err, Error::MisplacedVertexArray { index: 1 }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn array_uniforms_drop_partial_tuples() {
        let mock = Rc::new(MockGl::new());
        let program = program(&mock);
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        program.bind(&[]).unwrap();
        program
            .set_uniform("gain", Uniform::float_array(&data, crate::Tuple::Two))
            .unwrap();
        assert_eq!(
            mock.uniform(program.id(), "gain"),
            Some(MockUniform::Float {
                tuple: 2,
                values: vec![1.0, 2.0, 3.0, 4.0]
            })
        );
    }
}
