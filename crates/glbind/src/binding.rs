//! Declarative shader input bindings.
//!
//! A draw's inputs are described as a slice of [`Binding`]s and handed to
//! [`crate::ShaderProgram::bind`], which applies them left to right.

use std::fmt;

use crate::buffer::AttributeBuffer;
use crate::texture::Texture2D;
use crate::vertex_array::VertexArray;

/// Scalars per element of a uniform array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tuple {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
}

impl Tuple {
    pub fn size(self) -> usize {
        self as usize
    }
}

/// A value for a uniform slot. Matrices are column-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform<'a> {
    F1(f32),
    F2([f32; 2]),
    F3([f32; 3]),
    F4([f32; 4]),
    I1(i32),
    I2([i32; 2]),
    I3([i32; 3]),
    I4([i32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
    /// `count = data.len() / tuple` elements; a trailing partial element is
    /// not uploaded.
    FloatArray { data: &'a [f32], tuple: Tuple },
    IntArray { data: &'a [i32], tuple: Tuple },
}

impl<'a> Uniform<'a> {
    pub fn float_array(data: &'a [f32], tuple: Tuple) -> Self {
        Self::FloatArray { data, tuple }
    }

    pub fn int_array(data: &'a [i32], tuple: Tuple) -> Self {
        Self::IntArray { data, tuple }
    }
}

macro_rules! uniform_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Uniform<'_> {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

uniform_from! {
    f32 => F1,
    [f32; 2] => F2,
    [f32; 3] => F3,
    [f32; 4] => F4,
    i32 => I1,
    [i32; 2] => I2,
    [i32; 3] => I3,
    [i32; 4] => I4,
}

impl From<bool> for Uniform<'_> {
    fn from(value: bool) -> Self {
        Self::I1(value as i32)
    }
}

impl From<[[f32; 2]; 2]> for Uniform<'_> {
    fn from(cols: [[f32; 2]; 2]) -> Self {
        let [a, b] = cols;
        Self::Mat2([a[0], a[1], b[0], b[1]])
    }
}

impl From<[[f32; 3]; 3]> for Uniform<'_> {
    fn from(cols: [[f32; 3]; 3]) -> Self {
        let mut m = [0.0; 9];
        for (dst, src) in m.chunks_exact_mut(3).zip(cols) {
            dst.copy_from_slice(&src);
        }
        Self::Mat3(m)
    }
}

impl From<[[f32; 4]; 4]> for Uniform<'_> {
    fn from(cols: [[f32; 4]; 4]) -> Self {
        let mut m = [0.0; 16];
        for (dst, src) in m.chunks_exact_mut(4).zip(cols) {
            dst.copy_from_slice(&src);
        }
        Self::Mat4(m)
    }
}

impl<'a> From<&'a [f32]> for Uniform<'a> {
    fn from(data: &'a [f32]) -> Self {
        Self::float_array(data, Tuple::One)
    }
}

impl<'a> From<&'a [i32]> for Uniform<'a> {
    fn from(data: &'a [i32]) -> Self {
        Self::int_array(data, Tuple::One)
    }
}

/// One named shader input.
#[derive(Clone, Copy)]
pub enum Binding<'a> {
    /// Only valid as the first binding.
    VertexArray(&'a VertexArray),
    Attribute {
        name: &'a str,
        buffer: &'a dyn AttributeBuffer,
        /// Byte offset of the first element.
        offset: usize,
    },
    Texture {
        name: &'a str,
        texture: &'a Texture2D,
    },
    Uniform {
        name: &'a str,
        value: Uniform<'a>,
    },
}

impl<'a> Binding<'a> {
    pub fn vertex_array(vao: &'a VertexArray) -> Self {
        Self::VertexArray(vao)
    }

    pub fn attribute(name: &'a str, buffer: &'a dyn AttributeBuffer) -> Self {
        Self::attribute_at(name, buffer, 0)
    }

    pub fn attribute_at(name: &'a str, buffer: &'a dyn AttributeBuffer, offset: usize) -> Self {
        Self::Attribute {
            name,
            buffer,
            offset,
        }
    }

    pub fn texture(name: &'a str, texture: &'a Texture2D) -> Self {
        Self::Texture { name, texture }
    }

    pub fn uniform(name: &'a str, value: impl Into<Uniform<'a>>) -> Self {
        Self::Uniform {
            name,
            value: value.into(),
        }
    }

    /// The slot name, or `None` for a vertex array.
    pub fn name(&self) -> Option<&'a str> {
        match *self {
            Self::VertexArray(_) => None,
            Self::Attribute { name, .. } | Self::Texture { name, .. } | Self::Uniform { name, .. } => {
                Some(name)
            }
        }
    }
}

impl fmt::Debug for Binding<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VertexArray(_) => f.write_str("VertexArray"),
            Self::Attribute { name, offset, .. } => f
                .debug_struct("Attribute")
                .field("name", name)
                .field("offset", offset)
                .finish_non_exhaustive(),
            Self::Texture { name, .. } => {
                f.debug_struct("Texture").field("name", name).finish_non_exhaustive()
            }
            Self::Uniform { name, value } => f
                .debug_struct("Uniform")
                .field("name", name)
                .field("value", value)
                .finish(),
        }
    }
}
