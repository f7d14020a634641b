//! The graphics API seam.
//!
//! [`GlApi`] is a thin, call-for-call mirror of the OpenGL entry points the
//! wrappers need. `glbind_gl::RawGl` forwards each method to the loaded GL
//! functions; [`crate::mock::MockGl`] records them for tests. Methods never
//! check errors themselves: callers drain the queue with
//! [`crate::check::check_errors`] after every state-changing call.

use std::rc::Rc;

use gl::types::{GLbitfield, GLenum, GLfloat, GLint, GLsizei, GLuint};

use crate::stage::ShaderStage;

/// Shared handle to the current context's API.
///
/// `Rc` keeps every wrapper on the thread that owns the context.
pub type Gl = Rc<dyn GlApi>;

/// Kinds of GL objects, each with its own create/delete entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Texture,
    Renderbuffer,
    Framebuffer,
    VertexArray,
    Shader(ShaderStage),
    Program,
}

impl ObjectKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Buffer => "buffer",
            Self::Texture => "texture",
            Self::Renderbuffer => "renderbuffer",
            Self::Framebuffer => "framebuffer",
            Self::VertexArray => "vertex array",
            Self::Shader(_) => "shader",
            Self::Program => "program",
        }
    }
}

pub trait GlApi {
    // Objects

    /// `glGen*` / `glCreateShader` / `glCreateProgram`.
    fn create_object(&self, kind: ObjectKind) -> GLuint;
    /// `glDelete*`. Deleting name 0 is a no-op.
    fn delete_object(&self, kind: ObjectKind, id: GLuint);

    // Errors and queries

    fn get_error(&self) -> GLenum;
    fn get_integer(&self, pname: GLenum) -> GLint;
    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]);
    fn check_framebuffer_status(&self, target: GLenum) -> GLenum;

    // Binding points

    fn bind_buffer(&self, target: GLenum, id: GLuint);
    fn bind_texture(&self, target: GLenum, id: GLuint);
    /// `unit` is the full enumerant, `GL_TEXTURE0 + n`.
    fn active_texture(&self, unit: GLenum);
    fn bind_renderbuffer(&self, id: GLuint);
    fn bind_framebuffer(&self, target: GLenum, id: GLuint);
    fn bind_vertex_array(&self, id: GLuint);
    fn use_program(&self, id: GLuint);

    // Storage

    /// `glBufferData`; `data`, when given, holds exactly `size` bytes.
    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum);
    /// `glBufferStorage`; `data`, when given, holds exactly `size` bytes.
    fn buffer_storage(&self, target: GLenum, size: usize, data: Option<&[u8]>, flags: GLbitfield);
    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]);
    fn renderbuffer_storage(&self, internal_format: GLenum, width: GLsizei, height: GLsizei);
    #[allow(clippy::too_many_arguments)]
    fn tex_image_2d(
        &self,
        target: GLenum,
        level: GLint,
        internal_format: GLenum,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        ty: GLenum,
        data: Option<&[u8]>,
    );
    /// `glGetTexImage`; GL writes the whole level, so `out` must hold it.
    fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]);
    /// `glGetTexLevelParameteriv` for the texture bound to `target`.
    fn get_tex_level_parameter_i(&self, target: GLenum, level: GLint, pname: GLenum) -> GLint;
    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint);
    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat);
    fn generate_mipmap(&self, target: GLenum);
    fn pixel_store_i(&self, pname: GLenum, param: GLint);

    // Framebuffer attachments

    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        tex_target: GLenum,
        texture: GLuint,
        level: GLint,
    );
    fn framebuffer_renderbuffer(&self, target: GLenum, attachment: GLenum, renderbuffer: GLuint);

    // Shaders and programs

    fn shader_source(&self, shader: GLuint, source: &str);
    fn compile_shader(&self, shader: GLuint);
    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint;
    fn get_shader_info_log(&self, shader: GLuint) -> String;
    fn attach_shader(&self, program: GLuint, shader: GLuint);
    fn detach_shader(&self, program: GLuint, shader: GLuint);
    fn link_program(&self, program: GLuint);
    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint;
    fn get_program_info_log(&self, program: GLuint) -> String;

    // Resource lookup. Unknown names yield -1.

    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint;
    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint;

    // Vertex attributes

    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn disable_vertex_attrib_array(&self, index: GLuint);
    #[allow(clippy::too_many_arguments)]
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    // Uniforms. `values.len()` is a multiple of the tuple (or dim * dim).

    /// `glUniform{tuple}fv` with `count = values.len() / tuple`.
    fn uniform_f(&self, location: GLint, tuple: usize, values: &[GLfloat]);
    /// `glUniform{tuple}iv` with `count = values.len() / tuple`.
    fn uniform_i(&self, location: GLint, tuple: usize, values: &[GLint]);
    /// `glUniformMatrix{dim}fv`.
    fn uniform_matrix_f(&self, location: GLint, dim: usize, transpose: bool, values: &[GLfloat]);

    // Drawing and fixed state

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei);
    fn draw_elements(&self, mode: GLenum, count: GLsizei, ty: GLenum, offset: usize);
    fn clear(&self, mask: GLbitfield);
    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn enable(&self, cap: GLenum);
    fn disable(&self, cap: GLenum);
}
