//! 2-D textures.
//!
//! A [`Texture2D`] owns one image store whose layout is fixed by its sized
//! [`InternalFormat`]. Storage is (re)specified with [`Texture2D::allocate`]
//! or loaded from a PNG; pixels can be read back or saved as a PNG.
//!
//! Every operation binds the texture on the currently active unit and
//! leaves `GL_TEXTURE_2D` bound to 0 on that unit afterwards.

use std::cell::Cell;
use std::path::Path;

use gl::types::{GLenum, GLfloat, GLint, GLsizei, GLuint};
use glbind_core::bytes::slice_as_bytes;
use glbind_core::{
    check_errors, BaseFormat, CodecOperation, Error, Gl, GlScalar, InternalFormat, ObjectKind,
    Result,
};
use tracing::debug;

use crate::image_io;
use crate::object::{Bindable, GpuObject, Handle};

/// A sampler or level parameter applied with `glTexParameter*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextureParameter {
    /// `GL_NEAREST`, `GL_LINEAR` or one of the mipmap filters.
    MinFilter(GLenum),
    /// `GL_NEAREST` or `GL_LINEAR`.
    MagFilter(GLenum),
    WrapS(GLenum),
    WrapT(GLenum),
    BaseLevel(GLint),
    MaxLevel(GLint),
    MinLod(GLfloat),
    MaxLod(GLfloat),
    LodBias(GLfloat),
    /// Any other integer parameter.
    Int(GLenum, GLint),
    /// Any other float parameter.
    Float(GLenum, GLfloat),
}

enum ParamValue {
    Int(GLint),
    Float(GLfloat),
}

impl TextureParameter {
    fn split(self) -> (GLenum, ParamValue) {
        match self {
            Self::MinFilter(f) => (gl::TEXTURE_MIN_FILTER, ParamValue::Int(f as GLint)),
            Self::MagFilter(f) => (gl::TEXTURE_MAG_FILTER, ParamValue::Int(f as GLint)),
            Self::WrapS(w) => (gl::TEXTURE_WRAP_S, ParamValue::Int(w as GLint)),
            Self::WrapT(w) => (gl::TEXTURE_WRAP_T, ParamValue::Int(w as GLint)),
            Self::BaseLevel(l) => (gl::TEXTURE_BASE_LEVEL, ParamValue::Int(l)),
            Self::MaxLevel(l) => (gl::TEXTURE_MAX_LEVEL, ParamValue::Int(l)),
            Self::MinLod(v) => (gl::TEXTURE_MIN_LOD, ParamValue::Float(v)),
            Self::MaxLod(v) => (gl::TEXTURE_MAX_LOD, ParamValue::Float(v)),
            Self::LodBias(v) => (gl::TEXTURE_LOD_BIAS, ParamValue::Float(v)),
            Self::Int(pname, v) => (pname, ParamValue::Int(v)),
            Self::Float(pname, v) => (pname, ParamValue::Float(v)),
        }
    }
}

pub struct Texture2D {
    handle: Handle,
    internal_format: InternalFormat,
    width: Cell<u32>,
    height: Cell<u32>,
}

impl Texture2D {
    pub fn new(gl: Gl, internal_format: InternalFormat) -> Self {
        Self {
            handle: Handle::new(gl, ObjectKind::Texture),
            internal_format,
            width: Cell::new(0),
            height: Cell::new(0),
        }
    }

    /// Create a texture and upload `data` to level 0.
    #[track_caller]
    pub fn with_data<T: GlScalar>(
        gl: Gl,
        internal_format: InternalFormat,
        width: u32,
        height: u32,
        data: &[T],
    ) -> Result<Self> {
        let texture = Self::new(gl, internal_format);
        texture.allocate(width, height, Some(data), 0)?;
        Ok(texture)
    }

    /// Create a texture from the PNG at `path`.
    #[track_caller]
    pub fn from_image_file(gl: Gl, internal_format: InternalFormat, path: impl AsRef<Path>) -> Result<Self> {
        let texture = Self::new(gl, internal_format);
        texture.load_image(path, 0)?;
        Ok(texture)
    }

    pub fn internal_format(&self) -> InternalFormat {
        self.internal_format
    }

    pub fn width(&self) -> u32 {
        self.width.get()
    }

    pub fn height(&self) -> u32 {
        self.height.get()
    }

    /// Size of `level` as GL reports it, `(0, 0)` when the level has no
    /// image.
    #[track_caller]
    pub fn level_size(&self, level: i32) -> Result<(u32, u32)> {
        if !self.is_created() {
            return Ok((0, 0));
        }
        self.bind()?;
        let gl = self.handle.gl();
        let width = gl.get_tex_level_parameter_i(gl::TEXTURE_2D, level, gl::TEXTURE_WIDTH);
        let height = gl.get_tex_level_parameter_i(gl::TEXTURE_2D, level, gl::TEXTURE_HEIGHT);
        check_errors(gl)?;
        self.unbind()?;
        Ok((width.max(0) as u32, height.max(0) as u32))
    }

    #[track_caller]
    fn stored_level_size(&self, level: i32) -> Result<(u32, u32)> {
        match self.level_size(level)? {
            (0, _) | (_, 0) => Err(Error::EmptyLevel { level }),
            size => Ok(size),
        }
    }

    /// Transfer format, pixel type and bytes per pixel for host data of
    /// type `T`.
    fn transfer_layout<T: GlScalar>(&self) -> (GLenum, GLenum, usize) {
        match self.internal_format.base_format() {
            // GL_DEPTH_STENCIL only accepts packed 24/8 texels.
            BaseFormat::DepthStencil => (gl::DEPTH_STENCIL, gl::UNSIGNED_INT_24_8, 4),
            base => (
                self.internal_format.transfer_format(),
                T::GL_TYPE,
                base.channel_count() * std::mem::size_of::<T>(),
            ),
        }
    }

    /// (Re)specify `level` as `width` x `height`.
    ///
    /// `data`, when given, is laid out in the format's transfer layout
    /// (one `T` per channel, rows tightly packed) and must cover the whole
    /// image. Depth-stencil data is one packed `UNSIGNED_INT_24_8` word per
    /// pixel whatever `T` is. `None` allocates without initializing.
    #[track_caller]
    pub fn allocate<T: GlScalar>(&self, width: u32, height: u32, data: Option<&[T]>, level: i32) -> Result<()> {
        let (format, ty, bytes_per_pixel) = self.transfer_layout::<T>();
        if let Some(data) = data {
            check_len::<T>(width as usize * height as usize * bytes_per_pixel, data.len())?;
        }
        self.upload(width, height, level, format, ty, data.map(slice_as_bytes))
    }

    #[track_caller]
    fn upload(
        &self,
        width: u32,
        height: u32,
        level: i32,
        format: GLenum,
        ty: GLenum,
        data: Option<&[u8]>,
    ) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        gl.pixel_store_i(gl::UNPACK_ALIGNMENT, 1);
        gl.tex_image_2d(
            gl::TEXTURE_2D,
            level,
            self.internal_format.gl_enum(),
            width as GLsizei,
            height as GLsizei,
            format,
            ty,
            data,
        );
        check_errors(gl)?;
        if level == 0 {
            self.width.set(width);
            self.height.set(height);
        }
        self.unbind()
    }

    /// Read `level` back in the format's transfer layout, one `T` per
    /// channel.
    #[track_caller]
    pub fn get_image<T: GlScalar>(&self, level: i32, out: &mut [T]) -> Result<()> {
        let (width, height) = self.stored_level_size(level)?;
        let (format, ty, bytes_per_pixel) = self.transfer_layout::<T>();
        check_len::<T>(width as usize * height as usize * bytes_per_pixel, out.len())?;
        // SAFETY: `GlScalar` types are plain data; any byte pattern GL
        // writes is a valid `T`.
        let bytes = unsafe {
            std::slice::from_raw_parts_mut(out.as_mut_ptr().cast::<u8>(), std::mem::size_of_val(out))
        };
        self.download(level, format, ty, bytes)
    }

    /// Read `level` back as unsigned bytes per channel.
    ///
    /// Depth-stencil textures are read as packed `UNSIGNED_INT_24_8`, four
    /// bytes per pixel.
    #[track_caller]
    pub fn read_pixels(&self, level: i32) -> Result<Vec<u8>> {
        let (width, height) = self.stored_level_size(level)?;
        let (format, ty, bytes_per_pixel) = self.transfer_layout::<u8>();
        let mut out = vec![0u8; width as usize * height as usize * bytes_per_pixel];
        self.download(level, format, ty, &mut out)?;
        Ok(out)
    }

    #[track_caller]
    fn download(&self, level: i32, format: GLenum, ty: GLenum, out: &mut [u8]) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        gl.pixel_store_i(gl::PACK_ALIGNMENT, 1);
        gl.get_tex_image(gl::TEXTURE_2D, level, format, ty, out);
        check_errors(gl)?;
        self.unbind()
    }

    #[track_caller]
    pub fn set_parameter(&self, parameter: TextureParameter) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        match parameter.split() {
            (pname, ParamValue::Int(v)) => gl.tex_parameter_i(gl::TEXTURE_2D, pname, v),
            (pname, ParamValue::Float(v)) => gl.tex_parameter_f(gl::TEXTURE_2D, pname, v),
        }
        check_errors(gl)?;
        self.unbind()
    }

    #[track_caller]
    pub fn generate_mipmap(&self) -> Result<()> {
        self.bind()?;
        let gl = self.handle.gl();
        gl.generate_mipmap(gl::TEXTURE_2D);
        check_errors(gl)?;
        self.unbind()
    }

    fn rgba8_transfer(&self, operation: CodecOperation) -> Result<GLenum> {
        match self.internal_format.base_format() {
            BaseFormat::DepthComponent | BaseFormat::DepthStencil => Err(Error::IncompatibleFormat {
                internal_format: self.internal_format.gl_enum(),
                operation,
            }),
            _ if self.internal_format.is_integer() => Ok(gl::RGBA_INTEGER),
            _ => Ok(gl::RGBA),
        }
    }

    /// Save `level` as an RGBA8 PNG.
    #[track_caller]
    pub fn save_image(&self, path: impl AsRef<Path>, level: i32) -> Result<()> {
        let path = path.as_ref();
        let format = self.rgba8_transfer(CodecOperation::Encode)?;
        let (width, height) = self.stored_level_size(level)?;
        let mut pixels =
            vec![0u8; width as usize * height as usize * InternalFormat::RGBA8.pixel_byte_depth()];
        self.download(level, format, gl::UNSIGNED_BYTE, &mut pixels)?;
        image_io::encode_rgba8(path, width, height, &pixels)?;
        debug!(id = self.id(), path = %path.display(), width, height, "saved texture image");
        Ok(())
    }

    /// Replace `level` with the PNG at `path`.
    #[track_caller]
    pub fn load_image(&self, path: impl AsRef<Path>, level: i32) -> Result<()> {
        let path = path.as_ref();
        let format = self.rgba8_transfer(CodecOperation::Decode)?;
        let image = image_io::decode_rgba8(path)?;
        self.upload(
            image.width,
            image.height,
            level,
            format,
            gl::UNSIGNED_BYTE,
            Some(&image.pixels),
        )?;
        debug!(
            id = self.id(),
            path = %path.display(),
            width = image.width,
            height = image.height,
            "loaded texture image"
        );
        Ok(())
    }
}

/// Fail unless `provided` elements of `T` cover `required_bytes`.
fn check_len<T>(required_bytes: usize, provided: usize) -> Result<()> {
    let required = required_bytes.div_ceil(std::mem::size_of::<T>());
    if provided < required {
        return Err(Error::BufferTooSmall { required, provided });
    }
    Ok(())
}

impl GpuObject for Texture2D {
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

impl Bindable for Texture2D {
    /// Bind to `GL_TEXTURE_2D` on the active unit.
    #[track_caller]
    fn bind(&self) -> Result<()> {
        let id = self.handle.ensure()?;
        self.handle.gl().bind_texture(gl::TEXTURE_2D, id);
        check_errors(self.handle.gl())
    }

    #[track_caller]
    fn unbind(&self) -> Result<()> {
        self.handle.gl().bind_texture(gl::TEXTURE_2D, 0);
        check_errors(self.handle.gl())
    }
}
