//! Sized internal formats and the layout facts derived from them.
//!
//! Every [`InternalFormat`] maps to exactly one [`BaseFormat`] and one pixel
//! byte size. Raw enumerants outside the supported set are rejected with
//! [`Error::UnknownFormat`].

use gl::types::GLenum;
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

use crate::error::{Error, Result};

/// Channel layout of a texture or renderbuffer ("base internal format").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
    DepthComponent,
    DepthStencil,
}

impl BaseFormat {
    pub fn gl_enum(self) -> GLenum {
        match self {
            Self::Red => gl::RED,
            Self::Rg => gl::RG,
            Self::Rgb => gl::RGB,
            Self::Rgba => gl::RGBA,
            Self::DepthComponent => gl::DEPTH_COMPONENT,
            Self::DepthStencil => gl::DEPTH_STENCIL,
        }
    }

    /// Pixel transfer format for integer textures (`GL_RGBA_INTEGER` etc).
    pub fn integer_gl_enum(self) -> GLenum {
        match self {
            Self::Red => gl::RED_INTEGER,
            Self::Rg => gl::RG_INTEGER,
            Self::Rgb => gl::RGB_INTEGER,
            Self::Rgba => gl::RGBA_INTEGER,
            other => other.gl_enum(),
        }
    }

    pub fn channel_count(self) -> usize {
        match self {
            Self::Red | Self::DepthComponent => 1,
            Self::Rg | Self::DepthStencil => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn is_depth(self) -> bool {
        matches!(self, Self::DepthComponent | Self::DepthStencil)
    }
}

#[allow(non_camel_case_types)]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, ToPrimitive)]
pub enum InternalFormat {
    R8 = gl::R8,
    R8_SNORM = gl::R8_SNORM,
    R16 = gl::R16,
    R16F = gl::R16F,
    R32F = gl::R32F,
    R8I = gl::R8I,
    R16I = gl::R16I,
    R32I = gl::R32I,
    R8UI = gl::R8UI,
    R16UI = gl::R16UI,
    R32UI = gl::R32UI,

    RG8 = gl::RG8,
    RG8_SNORM = gl::RG8_SNORM,
    RG16 = gl::RG16,
    RG16F = gl::RG16F,
    RG32F = gl::RG32F,
    RG8I = gl::RG8I,
    RG16I = gl::RG16I,
    RG32I = gl::RG32I,
    RG8UI = gl::RG8UI,
    RG16UI = gl::RG16UI,
    RG32UI = gl::RG32UI,

    RGB8 = gl::RGB8,
    RGB9_E5 = gl::RGB9_E5,
    RGB16F = gl::RGB16F,
    RGB32F = gl::RGB32F,
    RGB32I = gl::RGB32I,
    RGB32UI = gl::RGB32UI,

    RGBA8 = gl::RGBA8,
    RGBA16 = gl::RGBA16,
    RGBA16F = gl::RGBA16F,
    RGBA32F = gl::RGBA32F,
    RGBA8I = gl::RGBA8I,
    RGBA16I = gl::RGBA16I,
    RGBA32I = gl::RGBA32I,
    RGBA8UI = gl::RGBA8UI,
    RGBA16UI = gl::RGBA16UI,
    RGBA32UI = gl::RGBA32UI,
    SRGB8_ALPHA8 = gl::SRGB8_ALPHA8,

    DEPTH_COMPONENT16 = gl::DEPTH_COMPONENT16,
    DEPTH_COMPONENT24 = gl::DEPTH_COMPONENT24,
    DEPTH_COMPONENT32F = gl::DEPTH_COMPONENT32F,
    DEPTH24_STENCIL8 = gl::DEPTH24_STENCIL8,
}

impl InternalFormat {
    pub const ALL: [InternalFormat; 43] = [
        Self::R8,
        Self::R8_SNORM,
        Self::R16,
        Self::R16F,
        Self::R32F,
        Self::R8I,
        Self::R16I,
        Self::R32I,
        Self::R8UI,
        Self::R16UI,
        Self::R32UI,
        Self::RG8,
        Self::RG8_SNORM,
        Self::RG16,
        Self::RG16F,
        Self::RG32F,
        Self::RG8I,
        Self::RG16I,
        Self::RG32I,
        Self::RG8UI,
        Self::RG16UI,
        Self::RG32UI,
        Self::RGB8,
        Self::RGB9_E5,
        Self::RGB16F,
        Self::RGB32F,
        Self::RGB32I,
        Self::RGB32UI,
        Self::RGBA8,
        Self::RGBA16,
        Self::RGBA16F,
        Self::RGBA32F,
        Self::RGBA8I,
        Self::RGBA16I,
        Self::RGBA32I,
        Self::RGBA8UI,
        Self::RGBA16UI,
        Self::RGBA32UI,
        Self::SRGB8_ALPHA8,
        Self::DEPTH_COMPONENT16,
        Self::DEPTH_COMPONENT24,
        Self::DEPTH_COMPONENT32F,
        Self::DEPTH24_STENCIL8,
    ];

    /// Parse a raw GL enumerant.
    pub fn from_gl(raw: GLenum) -> Result<Self> {
        Self::from_u32(raw).ok_or(Error::UnknownFormat {
            internal_format: raw,
        })
    }

    pub fn gl_enum(self) -> GLenum {
        self as GLenum
    }

    pub fn base_format(self) -> BaseFormat {
        use InternalFormat::*;
        match self {
            R8 | R8_SNORM | R16 | R16F | R32F | R8I | R16I | R32I | R8UI | R16UI | R32UI => {
                BaseFormat::Red
            }
            RG8 | RG8_SNORM | RG16 | RG16F | RG32F | RG8I | RG16I | RG32I | RG8UI | RG16UI
            | RG32UI => BaseFormat::Rg,
            RGB8 | RGB9_E5 | RGB16F | RGB32F | RGB32I | RGB32UI => BaseFormat::Rgb,
            RGBA8 | RGBA16 | RGBA16F | RGBA32F | RGBA8I | RGBA16I | RGBA32I | RGBA8UI
            | RGBA16UI | RGBA32UI | SRGB8_ALPHA8 => BaseFormat::Rgba,
            DEPTH_COMPONENT16 | DEPTH_COMPONENT24 | DEPTH_COMPONENT32F => {
                BaseFormat::DepthComponent
            }
            DEPTH24_STENCIL8 => BaseFormat::DepthStencil,
        }
    }

    /// Bytes per channel, from the bit-width suffix. `None` for packed formats.
    pub fn bytes_per_channel(self) -> Option<usize> {
        use InternalFormat::*;
        match self {
            RGB9_E5 | DEPTH24_STENCIL8 => None,
            R8 | R8I | R8UI | R8_SNORM | RG8 | RG8I | RG8UI | RG8_SNORM | RGB8 | RGBA8
            | RGBA8I | RGBA8UI | SRGB8_ALPHA8 => Some(1),
            R16 | R16F | R16I | R16UI | RG16 | RG16F | RG16I | RG16UI | RGB16F | RGBA16
            | RGBA16F | RGBA16I | RGBA16UI | DEPTH_COMPONENT16 => Some(2),
            DEPTH_COMPONENT24 => Some(3),
            R32F | R32I | R32UI | RG32F | RG32I | RG32UI | RGB32F | RGB32I | RGB32UI
            | RGBA32F | RGBA32I | RGBA32UI | DEPTH_COMPONENT32F => Some(4),
        }
    }

    /// Packed formats occupy a fixed 4 bytes regardless of channel count.
    pub fn is_packed(self) -> bool {
        self.bytes_per_channel().is_none()
    }

    pub fn pixel_byte_depth(self) -> usize {
        match self.bytes_per_channel() {
            Some(bytes) => self.base_format().channel_count() * bytes,
            None => 4,
        }
    }

    /// Signed or unsigned integer (non-normalized) formats.
    pub fn is_integer(self) -> bool {
        use InternalFormat::*;
        matches!(
            self,
            R8I | R16I
                | R32I
                | R8UI
                | R16UI
                | R32UI
                | RG8I
                | RG16I
                | RG32I
                | RG8UI
                | RG16UI
                | RG32UI
                | RGB32I
                | RGB32UI
                | RGBA8I
                | RGBA16I
                | RGBA32I
                | RGBA8UI
                | RGBA16UI
                | RGBA32UI
        )
    }

    /// Transfer format to pair with this internal format in pixel calls.
    pub fn transfer_format(self) -> GLenum {
        if self.is_integer() {
            self.base_format().integer_gl_enum()
        } else {
            self.base_format().gl_enum()
        }
    }
}

impl TryFrom<GLenum> for InternalFormat {
    type Error = Error;

    fn try_from(raw: GLenum) -> Result<Self> {
        Self::from_gl(raw)
    }
}

/// Base format of a raw sized internal format.
pub fn base_format(internal_format: GLenum) -> Result<BaseFormat> {
    InternalFormat::from_gl(internal_format).map(InternalFormat::base_format)
}

/// Bytes per pixel of a raw sized internal format.
pub fn pixel_byte_depth(internal_format: GLenum) -> Result<usize> {
    InternalFormat::from_gl(internal_format).map(InternalFormat::pixel_byte_depth)
}
