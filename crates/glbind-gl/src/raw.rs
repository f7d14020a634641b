//! [`RawGl`]: the `gl` crate behind [`GlApi`].

use std::ffi::{c_void, CString};
use std::ptr;

use gl::types::{GLbitfield, GLboolean, GLchar, GLenum, GLfloat, GLint, GLsizei, GLuint};
use glbind_core::{clear_errors, GlApi, ObjectKind};

use crate::loader::load_functions;

/// OpenGL entry points of the context current on this thread.
///
/// Holds no state: every method is a direct call. The type is `!Send` so it
/// cannot leave the thread that owns the context.
#[derive(Debug)]
pub struct RawGl {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl RawGl {
    /// Load function pointers and discard errors left over from context
    /// creation.
    ///
    /// # Safety
    ///
    /// A GL context must be current on this thread, and must stay current
    /// for as long as the returned value (or any wrapper using it) is used.
    pub unsafe fn load() -> anyhow::Result<Self> {
        load_functions()?;
        let gl = Self {
            _not_send: std::marker::PhantomData,
        };
        clear_errors(&gl);

        let version = gl::GetString(gl::VERSION);
        if !version.is_null() {
            let version = std::ffi::CStr::from_ptr(version.cast());
            tracing::debug!("OPENGL_VERSION {}", version.to_string_lossy());
        }
        Ok(gl)
    }
}

fn gl_bool(value: bool) -> GLboolean {
    if value {
        gl::TRUE
    } else {
        gl::FALSE
    }
}

fn data_ptr(data: Option<&[u8]>) -> *const c_void {
    data.map_or(ptr::null(), |d| d.as_ptr().cast())
}

/// Read an info log whose length (including NUL) is `len`.
fn read_log(len: GLint, read: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> String {
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u8; len as usize];
    let mut written: GLsizei = 0;
    read(len, &mut written, buf.as_mut_ptr().cast());
    buf.truncate(written.max(0) as usize);
    String::from_utf8_lossy(&buf).into_owned()
}

impl GlApi for RawGl {
    fn create_object(&self, kind: ObjectKind) -> GLuint {
        let mut id = 0;
        unsafe {
            match kind {
                ObjectKind::Buffer => gl::GenBuffers(1, &mut id),
                ObjectKind::Texture => gl::GenTextures(1, &mut id),
                ObjectKind::Renderbuffer => gl::GenRenderbuffers(1, &mut id),
                ObjectKind::Framebuffer => gl::GenFramebuffers(1, &mut id),
                ObjectKind::VertexArray => gl::GenVertexArrays(1, &mut id),
                ObjectKind::Shader(stage) => id = gl::CreateShader(stage.gl_enum()),
                ObjectKind::Program => id = gl::CreateProgram(),
            }
        }
        id
    }

    fn delete_object(&self, kind: ObjectKind, id: GLuint) {
        unsafe {
            match kind {
                ObjectKind::Buffer => gl::DeleteBuffers(1, &id),
                ObjectKind::Texture => gl::DeleteTextures(1, &id),
                ObjectKind::Renderbuffer => gl::DeleteRenderbuffers(1, &id),
                ObjectKind::Framebuffer => gl::DeleteFramebuffers(1, &id),
                ObjectKind::VertexArray => gl::DeleteVertexArrays(1, &id),
                ObjectKind::Shader(_) => gl::DeleteShader(id),
                ObjectKind::Program => gl::DeleteProgram(id),
            }
        }
    }

    fn get_error(&self) -> GLenum {
        unsafe { gl::GetError() }
    }

    fn get_integer(&self, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetIntegerv(pname, &mut value) };
        value
    }

    fn get_integer_v(&self, pname: GLenum, out: &mut [GLint]) {
        // Queries written here return at most 4 values.
        let mut values = [0; 4];
        unsafe { gl::GetIntegerv(pname, values.as_mut_ptr()) };
        for (dst, src) in out.iter_mut().zip(values) {
            *dst = src;
        }
    }

    fn check_framebuffer_status(&self, target: GLenum) -> GLenum {
        unsafe { gl::CheckFramebufferStatus(target) }
    }

    fn bind_buffer(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindBuffer(target, id) }
    }

    fn bind_texture(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindTexture(target, id) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { gl::ActiveTexture(unit) }
    }

    fn bind_renderbuffer(&self, id: GLuint) {
        unsafe { gl::BindRenderbuffer(gl::RENDERBUFFER, id) }
    }

    fn bind_framebuffer(&self, target: GLenum, id: GLuint) {
        unsafe { gl::BindFramebuffer(target, id) }
    }

    fn bind_vertex_array(&self, id: GLuint) {
        unsafe { gl::BindVertexArray(id) }
    }

    fn use_program(&self, id: GLuint) {
        unsafe { gl::UseProgram(id) }
    }

    fn buffer_data(&self, target: GLenum, size: usize, data: Option<&[u8]>, usage: GLenum) {
        debug_assert!(data.map_or(true, |d| d.len() == size));
        unsafe { gl::BufferData(target, size as isize, data_ptr(data), usage) }
    }

    fn buffer_storage(&self, target: GLenum, size: usize, data: Option<&[u8]>, flags: GLbitfield) {
        debug_assert!(data.map_or(true, |d| d.len() == size));
        unsafe { gl::BufferStorage(target, size as isize, data_ptr(data), flags) }
    }

    fn buffer_sub_data(&self, target: GLenum, offset: usize, data: &[u8]) {
        unsafe {
            gl::BufferSubData(
                target,
                offset as isize,
                data.len() as isize,
                data.as_ptr().cast(),
            )
        }
    }

    fn renderbuffer_storage(&self, internal_format: GLenum, width: GLsizei, height: GLsizei) {
        unsafe { gl::RenderbufferStorage(gl::RENDERBUFFER, internal_format, width, height) }
    }

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
    ) {
        unsafe {
            gl::TexImage2D(
                target,
                level,
                internal_format as GLint,
                width,
                height,
                0, // border: "must be 0"
                format,
                ty,
                data_ptr(data),
            )
        }
    }

    fn get_tex_image(&self, target: GLenum, level: GLint, format: GLenum, ty: GLenum, out: &mut [u8]) {
        unsafe {
            if gl::GetnTexImage::is_loaded() {
                gl::GetnTexImage(
                    target,
                    level,
                    format,
                    ty,
                    out.len() as GLsizei,
                    out.as_mut_ptr().cast(),
                );
            } else {
                gl::GetTexImage(target, level, format, ty, out.as_mut_ptr().cast());
            }
        }
    }

    fn get_tex_level_parameter_i(&self, target: GLenum, level: GLint, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetTexLevelParameteriv(target, level, pname, &mut value) };
        value
    }

    fn tex_parameter_i(&self, target: GLenum, pname: GLenum, param: GLint) {
        unsafe { gl::TexParameteri(target, pname, param) }
    }

    fn tex_parameter_f(&self, target: GLenum, pname: GLenum, param: GLfloat) {
        unsafe { gl::TexParameterf(target, pname, param) }
    }

    fn generate_mipmap(&self, target: GLenum) {
        unsafe { gl::GenerateMipmap(target) }
    }

    fn pixel_store_i(&self, pname: GLenum, param: GLint) {
        unsafe { gl::PixelStorei(pname, param) }
    }

    fn framebuffer_texture_2d(
        &self,
        target: GLenum,
        attachment: GLenum,
        tex_target: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        unsafe { gl::FramebufferTexture2D(target, attachment, tex_target, texture, level) }
    }

    fn framebuffer_renderbuffer(&self, target: GLenum, attachment: GLenum, renderbuffer: GLuint) {
        unsafe { gl::FramebufferRenderbuffer(target, attachment, gl::RENDERBUFFER, renderbuffer) }
    }

    fn shader_source(&self, shader: GLuint, source: &str) {
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        unsafe { gl::ShaderSource(shader, 1, &ptr, &len) }
    }

    fn compile_shader(&self, shader: GLuint) {
        unsafe { gl::CompileShader(shader) }
    }

    fn get_shader_iv(&self, shader: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetShaderiv(shader, pname, &mut value) };
        value
    }

    fn get_shader_info_log(&self, shader: GLuint) -> String {
        let len = self.get_shader_iv(shader, gl::INFO_LOG_LENGTH);
        read_log(len, |len, written, buf| unsafe {
            gl::GetShaderInfoLog(shader, len, written, buf)
        })
    }

    fn attach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::AttachShader(program, shader) }
    }

    fn detach_shader(&self, program: GLuint, shader: GLuint) {
        unsafe { gl::DetachShader(program, shader) }
    }

    fn link_program(&self, program: GLuint) {
        unsafe { gl::LinkProgram(program) }
    }

    fn get_program_iv(&self, program: GLuint, pname: GLenum) -> GLint {
        let mut value = 0;
        unsafe { gl::GetProgramiv(program, pname, &mut value) };
        value
    }

    fn get_program_info_log(&self, program: GLuint) -> String {
        let len = self.get_program_iv(program, gl::INFO_LOG_LENGTH);
        read_log(len, |len, written, buf| unsafe {
            gl::GetProgramInfoLog(program, len, written, buf)
        })
    }

    fn get_attrib_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetAttribLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn get_uniform_location(&self, program: GLuint, name: &str) -> GLint {
        match CString::new(name) {
            Ok(name) => unsafe { gl::GetUniformLocation(program, name.as_ptr()) },
            Err(_) => -1,
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::EnableVertexAttribArray(index) }
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { gl::DisableVertexAttribArray(index) }
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        ty: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        unsafe {
            gl::VertexAttribPointer(
                index,
                size,
                ty,
                gl_bool(normalized),
                stride,
                offset as *const c_void,
            )
        }
    }

    fn uniform_f(&self, location: GLint, tuple: usize, values: &[GLfloat]) {
        let count = (values.len() / tuple.max(1)) as GLsizei;
        let ptr = values.as_ptr();
        unsafe {
            match tuple {
                1 => gl::Uniform1fv(location, count, ptr),
                2 => gl::Uniform2fv(location, count, ptr),
                3 => gl::Uniform3fv(location, count, ptr),
                4 => gl::Uniform4fv(location, count, ptr),
                _ => tracing::warn!(tuple, "unsupported float uniform tuple size"),
            }
        }
    }

    fn uniform_i(&self, location: GLint, tuple: usize, values: &[GLint]) {
        let count = (values.len() / tuple.max(1)) as GLsizei;
        let ptr = values.as_ptr();
        unsafe {
            match tuple {
                1 => gl::Uniform1iv(location, count, ptr),
                2 => gl::Uniform2iv(location, count, ptr),
                3 => gl::Uniform3iv(location, count, ptr),
                4 => gl::Uniform4iv(location, count, ptr),
                _ => tracing::warn!(tuple, "unsupported int uniform tuple size"),
            }
        }
    }

    fn uniform_matrix_f(&self, location: GLint, dim: usize, transpose: bool, values: &[GLfloat]) {
        let count = (values.len() / (dim * dim).max(1)) as GLsizei;
        let ptr = values.as_ptr();
        let transpose = gl_bool(transpose);
        unsafe {
            match dim {
                2 => gl::UniformMatrix2fv(location, count, transpose, ptr),
                3 => gl::UniformMatrix3fv(location, count, transpose, ptr),
                4 => gl::UniformMatrix4fv(location, count, transpose, ptr),
                _ => tracing::warn!(dim, "unsupported matrix uniform dimension"),
            }
        }
    }

    fn draw_arrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        unsafe { gl::DrawArrays(mode, first, count) }
    }

    fn draw_elements(&self, mode: GLenum, count: GLsizei, ty: GLenum, offset: usize) {
        unsafe { gl::DrawElements(mode, count, ty, offset as *const c_void) }
    }

    fn clear(&self, mask: GLbitfield) {
        unsafe { gl::Clear(mask) }
    }

    fn viewport(&self, x: GLint, y: GLint, width: GLsizei, height: GLsizei) {
        unsafe { gl::Viewport(x, y, width, height) }
    }

    fn enable(&self, cap: GLenum) {
        unsafe { gl::Enable(cap) }
    }

    fn disable(&self, cap: GLenum) {
        unsafe { gl::Disable(cap) }
    }
}
