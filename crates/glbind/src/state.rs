//! Snapshot and restore of GL binding points.
//!
//! Wrappers never cache what is bound. Code that shares a context with a
//! host renderer captures the host's bindings first and restores them
//! afterwards.

use gl::types::{GLenum, GLint, GLuint};
use glbind_core::{check_errors, GlApi, Result};

/// Bindings captured by [`SavedBindings::capture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SavedBindings {
    pub program: GLint,
    pub vertex_array: GLint,
    pub array_buffer: GLint,
    pub active_texture: GLint,
    /// `GL_TEXTURE_2D` on the active unit.
    pub texture_2d: GLint,
    pub draw_framebuffer: GLint,
    pub read_framebuffer: GLint,
    pub renderbuffer: GLint,
    pub viewport: [GLint; 4],
}

impl SavedBindings {
    #[track_caller]
    pub fn capture(gl: &dyn GlApi) -> Result<Self> {
        let mut viewport = [0; 4];
        gl.get_integer_v(gl::VIEWPORT, &mut viewport);
        let saved = Self {
            program: gl.get_integer(gl::CURRENT_PROGRAM),
            vertex_array: gl.get_integer(gl::VERTEX_ARRAY_BINDING),
            array_buffer: gl.get_integer(gl::ARRAY_BUFFER_BINDING),
            active_texture: gl.get_integer(gl::ACTIVE_TEXTURE),
            texture_2d: gl.get_integer(gl::TEXTURE_BINDING_2D),
            draw_framebuffer: gl.get_integer(gl::DRAW_FRAMEBUFFER_BINDING),
            read_framebuffer: gl.get_integer(gl::READ_FRAMEBUFFER_BINDING),
            renderbuffer: gl.get_integer(gl::RENDERBUFFER_BINDING),
            viewport,
        };
        check_errors(gl)?;
        Ok(saved)
    }

    /// Rebind everything captured. Objects deleted in between bind as
    /// errors.
    #[track_caller]
    pub fn restore(&self, gl: &dyn GlApi) -> Result<()> {
        gl.use_program(self.program as GLuint);
        gl.bind_vertex_array(self.vertex_array as GLuint);
        gl.bind_buffer(gl::ARRAY_BUFFER, self.array_buffer as GLuint);
        gl.active_texture(self.active_texture as GLenum);
        gl.bind_texture(gl::TEXTURE_2D, self.texture_2d as GLuint);
        gl.bind_framebuffer(gl::DRAW_FRAMEBUFFER, self.draw_framebuffer as GLuint);
        gl.bind_framebuffer(gl::READ_FRAMEBUFFER, self.read_framebuffer as GLuint);
        gl.bind_renderbuffer(self.renderbuffer as GLuint);
        let [x, y, w, h] = self.viewport;
        gl.viewport(x, y, w, h);
        check_errors(gl)
    }
}

/// Unbind the program, every 2-D texture unit, the array buffer, the
/// vertex array and the framebuffer, leaving unit 0 active.
#[track_caller]
pub fn reset_bindings(gl: &dyn GlApi) -> Result<()> {
    gl.use_program(0);
    let units = gl.get_integer(gl::MAX_TEXTURE_IMAGE_UNITS).max(0) as GLuint;
    for unit in 0..units {
        gl.active_texture(gl::TEXTURE0 + unit);
        gl.bind_texture(gl::TEXTURE_2D, 0);
    }
    gl.active_texture(gl::TEXTURE0);
    gl.bind_buffer(gl::ARRAY_BUFFER, 0);
    gl.bind_vertex_array(0);
    gl.bind_framebuffer(gl::FRAMEBUFFER, 0);
    gl.bind_renderbuffer(0);
    check_errors(gl)
}
