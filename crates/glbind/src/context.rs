//! Draw calls and fixed-function state, each checked for errors.

use gl::types::{GLbitfield, GLenum, GLint, GLsizei};
use glbind_core::{check_errors, Gl, GlApi, GlScalar, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Patches,
}

impl Primitive {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Points => gl::POINTS,
            Self::Lines => gl::LINES,
            Self::LineStrip => gl::LINE_STRIP,
            Self::LineLoop => gl::LINE_LOOP,
            Self::Triangles => gl::TRIANGLES,
            Self::TriangleStrip => gl::TRIANGLE_STRIP,
            Self::TriangleFan => gl::TRIANGLE_FAN,
            Self::Patches => gl::PATCHES,
        }
    }
}

/// The shared API handle plus checked helpers for calls that belong to no
/// particular object.
#[derive(Clone)]
pub struct Context {
    gl: Gl,
}

impl Context {
    pub fn new(gl: Gl) -> Self {
        Self { gl }
    }

    /// The handle to pass to wrapper constructors.
    pub fn gl(&self) -> Gl {
        self.gl.clone()
    }

    pub fn api(&self) -> &dyn GlApi {
        &*self.gl
    }

    #[track_caller]
    pub fn draw_arrays(&self, mode: Primitive, first: i32, count: i32) -> Result<()> {
        self.gl.draw_arrays(mode.gl_enum(), first as GLint, count as GLsizei);
        check_errors(self.api())
    }

    /// Draw `count` indices of type `I` from the bound element buffer,
    /// starting `offset` bytes in.
    #[track_caller]
    pub fn draw_elements<I: GlScalar>(&self, mode: Primitive, count: i32, offset: usize) -> Result<()> {
        self.gl.draw_elements(mode.gl_enum(), count as GLsizei, I::GL_TYPE, offset);
        check_errors(self.api())
    }

    #[track_caller]
    pub fn clear(&self, mask: GLbitfield) -> Result<()> {
        self.gl.clear(mask);
        check_errors(self.api())
    }

    #[track_caller]
    pub fn viewport(&self, x: i32, y: i32, width: i32, height: i32) -> Result<()> {
        self.gl.viewport(x, y, width, height);
        check_errors(self.api())
    }

    #[track_caller]
    pub fn enable(&self, cap: GLenum) -> Result<()> {
        self.gl.enable(cap);
        check_errors(self.api())
    }

    #[track_caller]
    pub fn disable(&self, cap: GLenum) -> Result<()> {
        self.gl.disable(cap);
        check_errors(self.api())
    }

    pub fn max_texture_units(&self) -> u32 {
        self.gl.get_integer(gl::MAX_TEXTURE_IMAGE_UNITS).max(0) as u32
    }
}
