//! Error taxonomy shared by every wrapper.
//!
//! All fallible operations return [`Result<T>`]. Errors are raised at the
//! point of detection and never retried.

use std::fmt;
use std::panic::Location;
use std::path::PathBuf;

use gl::types::GLenum;
use thiserror::Error;

use crate::stage::ShaderStage;

/// Result alias used throughout glbind.
pub type Result<T> = std::result::Result<T, Error>;

/// Source location of the wrapper call that observed a GL error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// Location of the caller of the `#[track_caller]` function invoking this.
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for CallSite {
    fn from(loc: &'static Location<'static>) -> Self {
        Self {
            file: loc.file(),
            line: loc.line(),
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// An enumerant read from `glGetError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlErrorCode {
    InvalidEnum,
    InvalidValue,
    InvalidOperation,
    StackOverflow,
    StackUnderflow,
    OutOfMemory,
    InvalidFramebufferOperation,
    ContextLost,
    Other(GLenum),
}

impl GlErrorCode {
    pub fn from_raw(code: GLenum) -> Self {
        match code {
            gl::INVALID_ENUM => Self::InvalidEnum,
            gl::INVALID_VALUE => Self::InvalidValue,
            gl::INVALID_OPERATION => Self::InvalidOperation,
            gl::STACK_OVERFLOW => Self::StackOverflow,
            gl::STACK_UNDERFLOW => Self::StackUnderflow,
            gl::OUT_OF_MEMORY => Self::OutOfMemory,
            gl::INVALID_FRAMEBUFFER_OPERATION => Self::InvalidFramebufferOperation,
            gl::CONTEXT_LOST => Self::ContextLost,
            other => Self::Other(other),
        }
    }

    pub fn raw(self) -> GLenum {
        match self {
            Self::InvalidEnum => gl::INVALID_ENUM,
            Self::InvalidValue => gl::INVALID_VALUE,
            Self::InvalidOperation => gl::INVALID_OPERATION,
            Self::StackOverflow => gl::STACK_OVERFLOW,
            Self::StackUnderflow => gl::STACK_UNDERFLOW,
            Self::OutOfMemory => gl::OUT_OF_MEMORY,
            Self::InvalidFramebufferOperation => gl::INVALID_FRAMEBUFFER_OPERATION,
            Self::ContextLost => gl::CONTEXT_LOST,
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for GlErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnum => f.write_str("INVALID_ENUM"),
            Self::InvalidValue => f.write_str("INVALID_VALUE"),
            Self::InvalidOperation => f.write_str("INVALID_OPERATION"),
            Self::StackOverflow => f.write_str("STACK_OVERFLOW"),
            Self::StackUnderflow => f.write_str("STACK_UNDERFLOW"),
            Self::OutOfMemory => f.write_str("OUT_OF_MEMORY"),
            Self::InvalidFramebufferOperation => f.write_str("INVALID_FRAMEBUFFER_OPERATION"),
            Self::ContextLost => f.write_str("CONTEXT_LOST"),
            Self::Other(code) => write!(f, "error code {code:#06x}"),
        }
    }
}

/// Not exposed by desktop GL headers; reported by some ES-derived drivers.
pub const FRAMEBUFFER_INCOMPLETE_DIMENSIONS: GLenum = 0x8CD9;

/// Result of `glCheckFramebufferStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    Complete,
    Undefined,
    IncompleteAttachment,
    MissingAttachment,
    IncompleteDimensions,
    IncompleteDrawBuffer,
    IncompleteReadBuffer,
    Unsupported,
    IncompleteMultisample,
    IncompleteLayerTargets,
    Other(GLenum),
}

impl FramebufferStatus {
    pub fn from_raw(status: GLenum) -> Self {
        match status {
            gl::FRAMEBUFFER_COMPLETE => Self::Complete,
            gl::FRAMEBUFFER_UNDEFINED => Self::Undefined,
            gl::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => Self::IncompleteAttachment,
            gl::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => Self::MissingAttachment,
            FRAMEBUFFER_INCOMPLETE_DIMENSIONS => Self::IncompleteDimensions,
            gl::FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER => Self::IncompleteDrawBuffer,
            gl::FRAMEBUFFER_INCOMPLETE_READ_BUFFER => Self::IncompleteReadBuffer,
            gl::FRAMEBUFFER_UNSUPPORTED => Self::Unsupported,
            gl::FRAMEBUFFER_INCOMPLETE_MULTISAMPLE => Self::IncompleteMultisample,
            gl::FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS => Self::IncompleteLayerTargets,
            other => Self::Other(other),
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

impl fmt::Display for FramebufferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => f.write_str("FRAMEBUFFER_COMPLETE"),
            Self::Undefined => f.write_str("FRAMEBUFFER_UNDEFINED"),
            Self::IncompleteAttachment => f.write_str("FRAMEBUFFER_INCOMPLETE_ATTACHMENT"),
            Self::MissingAttachment => f.write_str("FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT"),
            Self::IncompleteDimensions => f.write_str("FRAMEBUFFER_INCOMPLETE_DIMENSIONS"),
            Self::IncompleteDrawBuffer => f.write_str("FRAMEBUFFER_INCOMPLETE_DRAW_BUFFER"),
            Self::IncompleteReadBuffer => f.write_str("FRAMEBUFFER_INCOMPLETE_READ_BUFFER"),
            Self::Unsupported => f.write_str("FRAMEBUFFER_UNSUPPORTED"),
            Self::IncompleteMultisample => f.write_str("FRAMEBUFFER_INCOMPLETE_MULTISAMPLE"),
            Self::IncompleteLayerTargets => f.write_str("FRAMEBUFFER_INCOMPLETE_LAYER_TARGETS"),
            Self::Other(status) => write!(f, "status {status:#06x}"),
        }
    }
}

/// Direction of an image codec call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecOperation {
    Decode,
    Encode,
}

impl fmt::Display for CodecOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode => f.write_str("decode"),
            Self::Encode => f.write_str("encode"),
        }
    }
}

fn framebuffer_detail(detail: &Option<FramebufferStatus>) -> String {
    match detail {
        Some(status) => format!(": status {status}"),
        None => String::new(),
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// An error drained from the GL error queue.
    #[error("{site}: OpenGL error ({code}{})", framebuffer_detail(.detail))]
    Gl {
        code: GlErrorCode,
        site: CallSite,
        /// Completeness of the bound framebuffer, for framebuffer errors.
        detail: Option<FramebufferStatus>,
    },

    #[error("unknown internal format: {internal_format:#06x}")]
    UnknownFormat { internal_format: GLenum },

    #[error("{stage} shader compile failed: {info_log}")]
    ShaderCompile { stage: ShaderStage, info_log: String },

    #[error("program link failed: {info_log}")]
    ShaderLink { info_log: String },

    #[error("cannot detect the shader type of: {identifier}")]
    UnknownShaderStage { identifier: String },

    #[error("cannot bind more than {max} textures at one time (requested unit count {requested})")]
    TooManyTextureUnits { requested: u32, max: u32 },

    #[error("png {operation} error for {}: {message}", .path.display())]
    ImageCodec {
        operation: CodecOperation,
        path: PathBuf,
        message: String,
    },

    #[error("cannot read {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a vertex array must be the first binding, found one at index {index}")]
    MisplacedVertexArray { index: usize },

    #[error("host buffer holds {provided} elements, {required} required")]
    BufferTooSmall { required: usize, provided: usize },

    #[error("texture level {level} has no image")]
    EmptyLevel { level: i32 },

    #[error("framebuffer incomplete: {status}")]
    FramebufferIncomplete { status: FramebufferStatus },

    #[error("internal format {internal_format:#06x} cannot be used to {operation} an RGBA8 image")]
    IncompatibleFormat {
        internal_format: GLenum,
        operation: CodecOperation,
    },
}
