//! Byte views over host scalar data handed to GL.

use gl::types::GLenum;

/// View plain numeric data as bytes for buffer and texture uploads.
///
/// # Safety
///
/// Only implement on types with no padding, pointers or invalid bit
/// patterns: plain integer and float scalars.
pub unsafe trait AsBytes: Copy + 'static {
    /// View `self` as a byte slice of length `size_of::<Self>()`.
    fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(self as *const Self as *const u8, std::mem::size_of::<Self>())
        }
    }
}

/// View a slice of scalars as its underlying bytes.
pub fn slice_as_bytes<T: AsBytes>(data: &[T]) -> &[u8] {
    // SAFETY: `AsBytes` guarantees `T` is plain data without padding.
    unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, std::mem::size_of_val(data)) }
}

/// A host scalar type with a matching GL data type enumerant.
///
/// # Safety
///
/// `GL_TYPE` must describe exactly the in-memory layout of `Self`.
pub unsafe trait GlScalar: AsBytes {
    const GL_TYPE: GLenum;
}

macro_rules! gl_scalar {
    ($($ty:ty => $gl:expr),* $(,)?) => {
        $(
            unsafe impl AsBytes for $ty {}
            unsafe impl GlScalar for $ty {
                const GL_TYPE: GLenum = $gl;
            }
        )*
    };
}

gl_scalar! {
    f32 => gl::FLOAT,
    f64 => gl::DOUBLE,
    u8 => gl::UNSIGNED_BYTE,
    i8 => gl::BYTE,
    i16 => gl::SHORT,
    u16 => gl::UNSIGNED_SHORT,
    i32 => gl::INT,
    u32 => gl::UNSIGNED_INT,
}

/// Size in bytes of one scalar of the given GL data type.
pub fn gl_type_size(ty: GLenum) -> Option<usize> {
    match ty {
        gl::BYTE | gl::UNSIGNED_BYTE => Some(1),
        gl::SHORT | gl::UNSIGNED_SHORT | gl::HALF_FLOAT => Some(2),
        gl::INT | gl::UNSIGNED_INT | gl::FLOAT | gl::FIXED => Some(4),
        gl::DOUBLE => Some(8),
        _ => None,
    }
}
