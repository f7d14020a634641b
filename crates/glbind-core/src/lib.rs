//! Core types for glbind: the [`GlApi`] seam, the error taxonomy, GL error
//! draining, sized texture formats and shader stages.
//!
//! Nothing in this crate calls OpenGL directly. `glbind-gl` provides the
//! real implementation of [`GlApi`]; [`mock::MockGl`] (feature `mock`) is an
//! in-memory one for tests.

pub mod api;
pub mod bytes;
pub mod check;
pub mod error;
pub mod format;
pub mod stage;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use api::{Gl, GlApi, ObjectKind};
pub use bytes::{AsBytes, GlScalar};
pub use check::{check_errors, check_errors_at, clear_errors};
pub use error::{CallSite, CodecOperation, Error, FramebufferStatus, GlErrorCode, Result};
pub use format::{BaseFormat, InternalFormat};
pub use stage::ShaderStage;
