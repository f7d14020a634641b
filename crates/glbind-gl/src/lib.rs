//! OpenGL implementation of [`glbind_core::GlApi`].
//!
//! [`RawGl`] forwards every call to the function pointers loaded through
//! `gl_loader`. Create it once the windowing layer has made a context
//! current, then share it as a [`glbind_core::Gl`]:
//!
//! ```rust,ignore
//! let gl: glbind_core::Gl = std::rc::Rc::new(unsafe { glbind_gl::RawGl::load()? });
//! ```

mod loader;
mod raw;

pub use loader::load_functions;
pub use raw::RawGl;
